use crate::fs::FileSystem;
use crate::helpers::{base_name, truncate_chars};
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Matched lines are cut to this many characters.
pub const MAX_LINE_DISPLAY: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepMatch {
    pub path: PathBuf,
    pub line_number: usize,
    pub line: String,
}

impl fmt::Display for GrepMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", base_name(&self.path), self.line_number, self.line)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GrepOptions {
    pub recursive: bool,
    pub ignore_case: bool,
}

pub fn compile(pattern: &str, options: GrepOptions) -> crate::Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(options.ignore_case)
        .build()?)
}

/// Searches a file, or a directory tree when `recursive` is set.
///
/// Anything else (missing path, directory without `-r`) yields no matches.
/// Unreadable files are skipped.
pub fn grep(
    fs: &dyn FileSystem,
    pattern: &str,
    target: &Path,
    options: GrepOptions,
) -> crate::Result<Vec<GrepMatch>> {
    let regex = compile(pattern, options)?;
    let mut matches = Vec::new();

    if fs.is_dir(target) {
        if options.recursive {
            for entry in WalkDir::new(target).sort_by_file_name().into_iter().flatten() {
                if entry.file_type().is_file() {
                    search_file(fs, &regex, entry.path(), &mut matches);
                }
            }
        }
    } else if fs.exists(target) {
        search_file(fs, &regex, target, &mut matches);
    }
    Ok(matches)
}

fn search_file(fs: &dyn FileSystem, regex: &Regex, path: &Path, out: &mut Vec<GrepMatch>) {
    let bytes = match fs.read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::debug!("grep skipping {}: {err}", path.display());
            return;
        }
    };
    let text = String::from_utf8_lossy(&bytes);
    for (idx, line) in text.lines().enumerate() {
        if regex.is_match(line) {
            out.push(GrepMatch {
                path: path.to_path_buf(),
                line_number: idx + 1,
                line: truncate_chars(line.trim(), MAX_LINE_DISPLAY).to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::RealFileSystem;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn recursive_search_reports_file_and_line() {
        let temp = tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("a/b")).unwrap();
        fs::write(temp.path().join("a/b/hay.txt"), "one\n  the needle here  \nthree\n").unwrap();
        fs::write(temp.path().join("a/other.txt"), "nothing\n").unwrap();

        let found = grep(
            &RealFileSystem,
            "needle",
            temp.path(),
            GrepOptions { recursive: true, ignore_case: false },
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].to_string(), "hay.txt:2: the needle here");
    }

    #[test]
    fn directory_without_recursive_has_no_matches() {
        let temp = tempdir().expect("tempdir");
        fs::write(temp.path().join("f.txt"), "needle").unwrap();
        let found = grep(&RealFileSystem, "needle", temp.path(), GrepOptions::default()).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn ignore_case_and_long_lines() {
        let temp = tempdir().expect("tempdir");
        let file = temp.path().join("f.txt");
        fs::write(&file, format!("NEEDLE{}\n", "x".repeat(200))).unwrap();

        let strict = grep(&RealFileSystem, "needle", &file, GrepOptions::default()).unwrap();
        assert!(strict.is_empty());
        let loose = grep(
            &RealFileSystem,
            "needle",
            &file,
            GrepOptions { recursive: false, ignore_case: true },
        )
        .unwrap();
        assert_eq!(loose[0].line.chars().count(), MAX_LINE_DISPLAY);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let temp = tempdir().expect("tempdir");
        assert!(grep(&RealFileSystem, "(", temp.path(), GrepOptions::default()).is_err());
    }
}
