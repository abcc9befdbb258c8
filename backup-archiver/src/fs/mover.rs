//! Moving a backup into the archive tree.
//!
//! `rename(2)` is tried first. When source and destination sit on different
//! filesystems the file is copied into a staging file next to the
//! destination. The source is removed next, and only then is the staged copy
//! persisted over the final name. A failed removal leaves both the source and
//! any existing archive of the same name untouched, and the destination never
//! holds a partial copy.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveMethod {
    Renamed,
    Copied,
}

/// Move `from` to `to`, replacing any existing file at `to`.
pub fn move_file(from: &Path, to: &Path) -> io::Result<MoveMethod> {
    match fs::rename(from, to) {
        Ok(()) => Ok(MoveMethod::Renamed),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(
                from = %from.display(),
                to = %to.display(),
                "rename crosses devices, copying instead"
            );
            copy_then_remove(from, to)?;
            Ok(MoveMethod::Copied)
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let dir = to.parent().unwrap_or_else(|| Path::new("."));

    let mut source = File::open(from)?;
    let source_meta = source.metadata()?;

    let mut staged = tempfile::Builder::new()
        .prefix(".incoming-")
        .tempfile_in(dir)?;
    io::copy(&mut source, staged.as_file_mut())?;
    staged.as_file().set_modified(source_meta.modified()?)?;
    staged.as_file().sync_all()?;
    fs::set_permissions(staged.path(), source_meta.permissions())?;

    if let Err(e) = fs::remove_file(from) {
        debug!(
            from = %from.display(),
            error = %e,
            "could not remove source, discarding staged copy"
        );
        return Err(e);
    }

    if let Err(e) = staged.persist(to) {
        // The source is gone; keep the staged copy so the backup survives.
        let kept = e.file.path().to_path_buf();
        if let Err(keep_err) = e.file.keep() {
            debug!(error = %keep_err, "could not keep staged copy");
        }
        warn!(
            staged = %kept.display(),
            to = %to.display(),
            "backup left in staging file after failed persist"
        );
        return Err(e.error);
    }

    Ok(())
}
