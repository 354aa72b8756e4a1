//! Turns user-typed path tokens into absolute, normalized locations.
//!
//! Resolution is purely lexical: nothing here touches the disk, callers
//! check existence themselves.

use std::path::{Component, Path, PathBuf};

/// Classification of a raw path token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathToken<'a> {
    Home,
    Parent,
    Current,
    Relative(&'a str),
    Absolute(&'a str),
}

impl<'a> PathToken<'a> {
    pub fn classify(raw: &'a str) -> Self {
        match raw {
            "~" => Self::Home,
            ".." => Self::Parent,
            "." => Self::Current,
            _ if Path::new(raw).is_absolute() => Self::Absolute(raw),
            _ => Self::Relative(raw),
        }
    }
}

/// Resolves path tokens against a current directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    home: PathBuf,
}

impl PathResolver {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn resolve(&self, raw: &str, current_dir: &Path) -> PathBuf {
        let joined = match PathToken::classify(raw) {
            PathToken::Home => self.home.clone(),
            PathToken::Parent => parent_of(current_dir),
            PathToken::Current => current_dir.to_path_buf(),
            PathToken::Absolute(path) => PathBuf::from(path),
            PathToken::Relative(path) => current_dir.join(path),
        };
        normalize(&joined)
    }
}

/// String-level parent; the root is its own parent.
pub fn parent_of(path: &Path) -> PathBuf {
    let normalized = normalize(path);
    normalized
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(normalized)
}

/// Collapses `.` and `..` segments and redundant separators.
///
/// `..` never climbs above the root of an absolute path; for relative
/// inputs leading `..` segments are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push(prefix.as_os_str()),
            Component::RootDir => out.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
