//! Device name extraction from configuration backups.
//!
//! FortiGate backups carry the device name on a line such as
//! `    set hostname "fw-edge-1"`. The first line containing the marker wins.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Marker that precedes the device name in a FortiGate backup.
pub const HOSTNAME_MARKER: &str = "set hostname";

/// Device name taken from a backup. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Build an identifier from the text following the marker.
    ///
    /// Surrounding whitespace is trimmed, then a leading and a trailing `"`
    /// are each removed if present. Returns `None` when nothing is left.
    pub fn from_marker_tail(tail: &str) -> Option<Self> {
        let value = tail.trim();
        let value = value.strip_prefix('"').unwrap_or(value);
        let value = value.strip_suffix('"').unwrap_or(value);

        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name can be used as a single directory and file name
    /// component under the archive root.
    pub fn is_path_safe(&self) -> bool {
        let name = self.0.as_str();
        name != "." && name != ".." && !name.contains(['/', '\\', '\0'])
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scan `reader` line by line for `marker` and return the value after the
/// first match.
///
/// Lines are decoded lossily so stray non-UTF-8 bytes elsewhere in a backup
/// do not abort the scan.
pub fn find_identifier<R: BufRead>(mut reader: R, marker: &str) -> io::Result<Option<Identifier>> {
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }

        let line = String::from_utf8_lossy(&buf);
        if let Some(pos) = line.find(marker) {
            return Ok(Identifier::from_marker_tail(&line[pos + marker.len()..]));
        }
    }
}

/// Open the backup at `path` and extract the device name from it.
pub fn extract_identifier(path: &Path, marker: &str) -> io::Result<Option<Identifier>> {
    let file = File::open(path)?;
    find_identifier(BufReader::new(file), marker)
}
