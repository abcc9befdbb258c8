//! Error types for the backup archiver.
//!
//! Every variant is terminal for an invocation; the binary maps each one to
//! its own process exit code so scripts can tell the outcomes apart.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    #[error("No backup to check at {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Cannot read backup file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot find hostname in backup file {}", .0.display())]
    MissingIdentifier(PathBuf),

    #[error("Hostname {0:?} cannot be used as an archive directory name")]
    UnsafeIdentifier(String),

    #[error("Access denied creating target directory {}: {source}", dir.display())]
    PermissionDenied {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create target directory {}: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error moving {} to {}: {source}", from.display(), to.display())]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArchiveError {
    /// Process exit status for this outcome. Never zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            ArchiveError::Config(_) | ArchiveError::ConfigSource(_) => 2,
            ArchiveError::MissingArtifact(_) => 10,
            ArchiveError::Unreadable { .. } => 11,
            ArchiveError::MissingIdentifier(_) => 12,
            ArchiveError::UnsafeIdentifier(_) => 13,
            ArchiveError::PermissionDenied { .. } => 14,
            ArchiveError::CreateDir { .. } => 15,
            ArchiveError::MoveFailed { .. } => 16,
        }
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
