//! Backup Archiver Library
//!
//! Files configuration backups pushed by firewalls into a per-device archive
//! tree, named after the device and the backup's modification time.

pub mod archive;
pub mod extract;
pub mod fs;
pub mod settings;
pub mod utils;

// Re-export commonly used types
pub use archive::{ArchivePlan, ArchivedBackup, Archiver};
pub use settings::Settings;
pub use utils::errors::ArchiveError;
pub type Result<T> = std::result::Result<T, ArchiveError>;
