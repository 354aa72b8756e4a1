use crate::helpers::canonical_or_relaxed;
use crate::path::{normalize, parent_of};
use std::path::{Component, Path, PathBuf};

/// Locations a delete may never target, computed from the shell's
/// current directory (not the process working directory).
#[derive(Debug, Clone)]
pub struct ProtectedPaths {
    root: PathBuf,
    parent: PathBuf,
    current: PathBuf,
}

impl ProtectedPaths {
    pub fn for_current_dir(current_dir: &Path) -> Self {
        let current = normalize(current_dir);
        Self {
            root: canonical_or_relaxed(&root_of(&current)),
            parent: canonical_or_relaxed(&parent_of(&current)),
            current: canonical_or_relaxed(&current),
        }
    }

    pub fn contains(&self, target: &Path) -> bool {
        let target = canonical_or_relaxed(&normalize(target));
        target == self.root || target == self.parent || target == self.current
    }
}

/// True when a resolved delete target is the root, the current directory
/// or the current directory's parent.
pub fn is_protected(target: &Path, current_dir: &Path) -> bool {
    ProtectedPaths::for_current_dir(current_dir).contains(target)
}

fn root_of(path: &Path) -> PathBuf {
    path.components()
        .take_while(|component| matches!(component, Component::Prefix(_) | Component::RootDir))
        .collect()
}
