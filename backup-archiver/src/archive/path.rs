//! Destination naming inside the archive tree.
//!
//! `<archive_root>/<hostname>/<hostname>_<YYYY-MM-DD_HH-MM>.conf`, with the
//! timestamp taken from the backup's modification time in UTC.

use crate::extract::Identifier;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Timestamp layout with true minutes.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Layout written by the earlier script: the last field is the month, not
/// the minute. Kept so new files sort alongside existing archives.
pub const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%m";

const ARCHIVE_EXTENSION: &str = "conf";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampStyle {
    #[default]
    Minutes,
    Legacy,
}

impl TimestampStyle {
    fn pattern(self) -> &'static str {
        match self {
            TimestampStyle::Minutes => TIMESTAMP_FORMAT,
            TimestampStyle::Legacy => LEGACY_TIMESTAMP_FORMAT,
        }
    }
}

pub fn format_timestamp(modified: DateTime<Utc>, style: TimestampStyle) -> String {
    modified.format(style.pattern()).to_string()
}

/// Where a backup lands in the archive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePath {
    /// Per-device directory under the archive root
    pub dir: PathBuf,

    /// `<hostname>_<timestamp>.conf`
    pub file_name: String,
}

impl ArchivePath {
    /// Pure function of its inputs; touches no filesystem state.
    pub fn new(
        archive_root: &Path,
        identifier: &Identifier,
        modified: DateTime<Utc>,
        style: TimestampStyle,
    ) -> Self {
        let name = identifier.as_str();
        Self {
            dir: archive_root.join(name),
            file_name: format!(
                "{name}_{}.{ARCHIVE_EXTENSION}",
                format_timestamp(modified, style)
            ),
        }
    }

    pub fn full_path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn modified() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 22, 14, 7, 42).unwrap()
    }

    fn identifier(name: &str) -> Identifier {
        Identifier::from_marker_tail(name).unwrap()
    }

    #[test]
    fn test_timestamp_minutes() {
        assert_eq!(format_timestamp(modified(), TimestampStyle::Minutes), "2020-08-22_14-07");
    }

    #[test]
    fn test_timestamp_legacy_renders_month() {
        assert_eq!(format_timestamp(modified(), TimestampStyle::Legacy), "2020-08-22_14-08");
    }

    #[test]
    fn test_archive_path_layout() {
        let path = ArchivePath::new(
            Path::new("/archive/"),
            &identifier("fw-edge-1"),
            modified(),
            TimestampStyle::Minutes,
        );

        assert_eq!(path.dir, PathBuf::from("/archive/fw-edge-1"));
        assert_eq!(path.file_name, "fw-edge-1_2020-08-22_14-07.conf");
        assert_eq!(
            path.full_path(),
            PathBuf::from("/archive/fw-edge-1/fw-edge-1_2020-08-22_14-07.conf")
        );
    }

    #[test]
    fn test_trailing_separator_on_root_is_irrelevant() {
        let id = identifier("fw");
        let with = ArchivePath::new(Path::new("/archive/"), &id, modified(), TimestampStyle::Minutes);
        let without = ArchivePath::new(Path::new("/archive"), &id, modified(), TimestampStyle::Minutes);
        assert_eq!(with, without);
    }

    #[test]
    fn test_same_inputs_same_path() {
        let id = identifier("fw-edge-1");
        let first = ArchivePath::new(Path::new("/archive"), &id, modified(), TimestampStyle::Minutes);
        let second = ArchivePath::new(Path::new("/archive"), &id, modified(), TimestampStyle::Minutes);
        assert_eq!(first, second);
    }

    #[test]
    fn test_seconds_do_not_change_the_name() {
        let id = identifier("fw");
        let early = Utc.with_ymd_and_hms(2020, 8, 22, 14, 7, 0).unwrap();
        let a = ArchivePath::new(Path::new("/archive"), &id, early, TimestampStyle::Minutes);
        let b = ArchivePath::new(Path::new("/archive"), &id, modified(), TimestampStyle::Minutes);
        assert_eq!(a.full_path(), b.full_path());
    }
}
