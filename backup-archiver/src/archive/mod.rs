//! Archiver - files one incoming backup into the per-device archive tree.
//!
//! One invocation handles one backup:
//! 1. make sure the backup exists
//! 2. read its modification time
//! 3. extract the device name
//! 4. compute the destination
//! 5. create the device directory if needed
//! 6. move the backup
//!
//! Steps 1-4 are read-only and make up [`Archiver::plan`]. Any failure stops
//! the run with the backup left where it was.

pub mod path;

use crate::extract::{extract_identifier, Identifier};
use crate::fs::metadata::ArtifactMetadata;
use crate::fs::mover::{move_file, MoveMethod};
use crate::settings::ArchiveSettings;
use crate::utils::errors::{ArchiveError, Result};
use chrono::{DateTime, Utc};
use path::ArchivePath;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything needed to move a backup, computed without side effects.
#[derive(Debug, Clone)]
pub struct ArchivePlan {
    pub source: PathBuf,
    pub identifier: Identifier,
    pub modified: DateTime<Utc>,
    pub destination: ArchivePath,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct ArchivedBackup {
    pub identifier: Identifier,
    pub destination: PathBuf,
    pub method: MoveMethod,
    pub created_dir: bool,
}

pub struct Archiver<'a> {
    settings: &'a ArchiveSettings,
}

impl<'a> Archiver<'a> {
    pub fn new(settings: &'a ArchiveSettings) -> Self {
        Self { settings }
    }

    /// Run all steps.
    pub fn archive(&self) -> Result<ArchivedBackup> {
        let plan = self.plan()?;
        self.execute(&plan)
    }

    /// Validate the backup and work out where it goes.
    pub fn plan(&self) -> Result<ArchivePlan> {
        let source = self.settings.backup_file();

        let metadata = match ArtifactMetadata::from_path(&source) {
            Ok(metadata) if metadata.is_file => metadata,
            Ok(_) => return Err(ArchiveError::MissingArtifact(source)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ArchiveError::MissingArtifact(source));
            }
            Err(source_err) => {
                return Err(ArchiveError::Unreadable { path: source, source: source_err });
            }
        };
        debug!(path = %source.display(), size = metadata.size, "Found backup file");

        let identifier = match extract_identifier(&source, &self.settings.marker) {
            Ok(Some(identifier)) => identifier,
            Ok(None) => return Err(ArchiveError::MissingIdentifier(source)),
            Err(e) => return Err(ArchiveError::Unreadable { path: source, source: e }),
        };
        info!("Found hostname {}", identifier);

        if !identifier.is_path_safe() {
            return Err(ArchiveError::UnsafeIdentifier(identifier.as_str().to_string()));
        }

        let destination = ArchivePath::new(
            &self.settings.archive_path,
            &identifier,
            metadata.modified,
            self.settings.timestamp_style,
        );
        info!("Archive will be written to {}", destination.full_path().display());

        Ok(ArchivePlan {
            source,
            identifier,
            modified: metadata.modified,
            destination,
        })
    }

    /// Create the device directory if needed and move the backup into it.
    pub fn execute(&self, plan: &ArchivePlan) -> Result<ArchivedBackup> {
        let created_dir = ensure_directory(&plan.destination.dir)?;
        if created_dir {
            info!("Created archive directory {}", plan.destination.dir.display());
        }

        let target = plan.destination.full_path();
        let method = move_file(&plan.source, &target).map_err(|e| ArchiveError::MoveFailed {
            from: plan.source.clone(),
            to: target.clone(),
            source: e,
        })?;

        info!(
            method = ?method,
            "Archived {} to {}",
            plan.source.display(),
            target.display()
        );

        Ok(ArchivedBackup {
            identifier: plan.identifier.clone(),
            destination: target,
            method,
            created_dir,
        })
    }
}

/// Create `dir` (one level only). Returns whether it was created.
fn ensure_directory(dir: &Path) -> Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }

    match fs::create_dir(dir) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(ArchiveError::PermissionDenied { dir: dir.to_path_buf(), source: e })
        }
        Err(e) => Err(ArchiveError::CreateDir { dir: dir.to_path_buf(), source: e }),
    }
}
