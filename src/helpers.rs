//! Small formatting and naming helpers shared by the shell operations.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Timestamp format used in operation log lines.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Modification time format used by `ls -l`.
pub const LISTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Separator between an entry's base name and its deletion timestamp in the trash.
pub const TRASH_NAME_SEPARATOR: char = '_';

/// Returns a user-safe, trimmed path string that can be used in logs and messages.
pub fn sanitize_user_path(path: &Path) -> String {
    path.display().to_string().trim().to_string()
}

/// Last path component as a string, or `item` when the path has none (e.g. `/`).
pub fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "item".to_string())
}

/// Builds the trash name `<base>_<unix seconds>`.
pub fn build_trash_name(base: &str, deleted_at: u64) -> String {
    format!("{base}{TRASH_NAME_SEPARATOR}{deleted_at}")
}

/// Recovers the original base name from a trash name by splitting on the
/// last separator. Names without a separator come back unchanged.
pub fn split_trash_name(trash_name: &str) -> (&str, Option<&str>) {
    match trash_name.rsplit_once(TRASH_NAME_SEPARATOR) {
        Some((base, suffix)) => (base, Some(suffix)),
        None => (trash_name, None),
    }
}

/// Whole seconds since the Unix epoch; clamps pre-epoch clocks to zero.
pub fn unix_timestamp(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

/// Formats a wall-clock time in the local timezone.
pub fn format_local_time(time: SystemTime, format: &str) -> String {
    let dt = DateTime::<Local>::from(time);
    dt.format(format).to_string()
}

/// Canonical form when the path exists, the path itself otherwise.
pub fn canonical_or_relaxed(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Truncates to at most `max` characters without splitting a code point.
pub fn truncate_chars(value: &str, max: usize) -> &str {
    match value.char_indices().nth(max) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Last three octal digits of a unix mode (`0o100644` -> `644`).
pub fn format_permissions(mode: u32) -> String {
    format!("{:03o}", mode & 0o777)
}
