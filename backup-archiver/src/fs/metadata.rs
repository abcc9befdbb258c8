//! Backup file metadata.
//!
//! Only the modification time and size are read; the backup itself is never
//! modified.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ArtifactMetadata {
    /// File size in bytes
    pub size: u64,

    /// Last modified time
    pub modified: DateTime<Utc>,

    /// Regular file (not a directory or other special file)
    pub is_file: bool,
}

impl ArtifactMetadata {
    /// Read metadata for `path`, following symlinks.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;

        Ok(Self {
            size: metadata.len(),
            modified: DateTime::<Utc>::from(metadata.modified()?),
            is_file: metadata.is_file(),
        })
    }
}
