//! Configuration management for the backup archiver.
//!
//! Settings are layered: JSON config file, then `ARCHIVER_*` environment
//! variables, then command line overrides. The result is validated once into
//! an immutable [`Settings`] value that is passed down by reference.

use crate::archive::path::TimestampStyle;
use crate::extract::HOSTNAME_MARKER;
use crate::utils::errors::{ArchiveError, Result};
use config::{Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

const ENV_PREFIX: &str = "ARCHIVER";

#[derive(Debug, Clone)]
pub struct Settings {
    pub archive: ArchiveSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone)]
pub struct ArchiveSettings {
    /// Directory the device drops its backup into
    pub incoming_path: PathBuf,

    /// File name of the backup inside `incoming_path`
    pub backup_name: String,

    /// Root of the per-device archive tree
    pub archive_path: PathBuf,

    /// Text that precedes the device name in the backup
    pub marker: String,

    pub timestamp_style: TimestampStyle,
}

impl ArchiveSettings {
    /// Full path of the expected backup file.
    pub fn backup_file(&self) -> PathBuf {
        self.incoming_path.join(&self.backup_name)
    }
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Remote syslog sink, only set when both host and port are configured
    pub remote: Option<RemoteLog>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLog {
    pub host: String,
    pub port: u16,
}

/// Values supplied on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config_file: Option<PathBuf>,
    pub incoming_path: Option<String>,
    pub archive_path: Option<String>,
    pub backup_name: Option<String>,
    pub log_level: Option<String>,
}

/// Flat key layout of the JSON config file.
#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    incoming_path: Option<String>,
    archive_path: Option<String>,
    backup_name: Option<String>,
    log_host: Option<String>,
    log_port: Option<u16>,
    log_level: Option<String>,
    marker: Option<String>,
    #[serde(default)]
    timestamp_style: TimestampStyle,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load and validate settings from all layers.
    ///
    /// An explicitly named config file must exist; the default
    /// `config.json` is optional so everything can come from the CLI.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let (config_file, required) = match &overrides.config_file {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        Self::load_from(&config_file, required, overrides)
    }

    fn load_from(config_file: &Path, required: bool, overrides: &Overrides) -> Result<Self> {
        if required && !config_file.is_file() {
            return Err(ArchiveError::Config(format!(
                "JSON config file {} could not be loaded",
                config_file.display()
            )));
        }

        let raw: RawSettings = config::Config::builder()
            .add_source(File::from(config_file).format(FileFormat::Json).required(required))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("incoming_path", overrides.incoming_path.clone())?
            .set_override_option("archive_path", overrides.archive_path.clone())?
            .set_override_option("backup_name", overrides.backup_name.clone())?
            .set_override_option("log_level", overrides.log_level.clone())?
            .build()?
            .try_deserialize()?;

        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings> {
        let incoming_path = require("incoming_path", self.incoming_path)?;
        let archive_path = require("archive_path", self.archive_path)?;
        let backup_name = require("backup_name", self.backup_name)?;

        let marker = match self.marker {
            Some(marker) if marker.trim().is_empty() => {
                return Err(ArchiveError::Config("marker must not be empty".into()));
            }
            Some(marker) => marker,
            None => HOSTNAME_MARKER.to_string(),
        };

        let remote = match (non_empty(self.log_host), self.log_port) {
            (Some(host), Some(port)) => Some(RemoteLog { host, port }),
            _ => None,
        };

        Ok(Settings {
            archive: ArchiveSettings {
                incoming_path: PathBuf::from(incoming_path),
                backup_name,
                archive_path: PathBuf::from(archive_path),
                marker,
                timestamp_style: self.timestamp_style,
            },
            log: LogSettings {
                level: non_empty(self.log_level).unwrap_or_else(default_log_level),
                remote,
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn require(key: &str, value: Option<String>) -> Result<String> {
    non_empty(value).ok_or_else(|| {
        ArchiveError::Config(format!(
            "configuration option {key} is not in config file or arguments"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, value: serde_json::Value) -> std::io::Result<PathBuf> {
        let path = dir.path().join("config.json");
        fs::write(&path, serde_json::to_vec_pretty(&value)?)?;
        Ok(path)
    }

    #[test]
    fn test_load_from_json_file() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            serde_json::json!({
                "incoming_path": "/srv/tftp/",
                "archive_path": "/home/rancid/data/",
                "backup_name": "fgt.conf",
                "log_host": "syslog.example.net",
                "log_port": 514
            }),
        )?;

        let settings = Settings::load_from(&path, true, &Overrides::default()).unwrap();

        assert_eq!(settings.archive.backup_file(), PathBuf::from("/srv/tftp/fgt.conf"));
        assert_eq!(settings.archive.archive_path, PathBuf::from("/home/rancid/data/"));
        assert_eq!(settings.archive.marker, HOSTNAME_MARKER);
        assert_eq!(settings.archive.timestamp_style, TimestampStyle::Minutes);
        assert_eq!(settings.log.level, "info");
        assert_eq!(
            settings.log.remote,
            Some(RemoteLog { host: "syslog.example.net".into(), port: 514 })
        );
        Ok(())
    }

    #[test]
    fn test_cli_overrides_win() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            serde_json::json!({
                "incoming_path": "/srv/tftp",
                "archive_path": "/archive",
                "backup_name": "fgt.conf"
            }),
        )?;
        let overrides = Overrides {
            archive_path: Some("/mnt/other".into()),
            backup_name: Some("edge.conf".into()),
            log_level: Some("debug".into()),
            ..Default::default()
        };

        let settings = Settings::load_from(&path, true, &overrides).unwrap();

        assert_eq!(settings.archive.incoming_path, PathBuf::from("/srv/tftp"));
        assert_eq!(settings.archive.archive_path, PathBuf::from("/mnt/other"));
        assert_eq!(settings.archive.backup_name, "edge.conf");
        assert_eq!(settings.log.level, "debug");
        Ok(())
    }

    #[test]
    fn test_missing_required_option() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            serde_json::json!({ "incoming_path": "/srv/tftp", "backup_name": "fgt.conf" }),
        )?;

        let err = Settings::load_from(&path, true, &Overrides::default()).unwrap_err();

        assert!(matches!(err, ArchiveError::Config(_)));
        assert!(err.to_string().contains("archive_path"));
        Ok(())
    }

    #[test]
    fn test_empty_value_counts_as_missing() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            serde_json::json!({
                "incoming_path": "/srv/tftp",
                "archive_path": "/archive",
                "backup_name": ""
            }),
        )?;

        let err = Settings::load_from(&path, true, &Overrides::default()).unwrap_err();

        assert!(err.to_string().contains("backup_name"));
        Ok(())
    }

    #[test]
    fn test_remote_log_needs_host_and_port() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            serde_json::json!({
                "incoming_path": "/srv/tftp",
                "archive_path": "/archive",
                "backup_name": "fgt.conf",
                "log_host": "syslog.example.net"
            }),
        )?;

        let settings = Settings::load_from(&path, true, &Overrides::default()).unwrap();

        assert!(settings.log.remote.is_none());
        Ok(())
    }

    #[test]
    fn test_explicit_config_file_must_exist() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let overrides = Overrides {
            config_file: Some(dir.path().join("missing.json")),
            ..Default::default()
        };

        let err = Settings::load(&overrides).unwrap_err();

        assert!(matches!(err, ArchiveError::Config(_)));
        Ok(())
    }

    #[test]
    fn test_optional_config_file_with_cli_values() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let overrides = Overrides {
            incoming_path: Some("/srv/tftp".into()),
            archive_path: Some("/archive".into()),
            backup_name: Some("fgt.conf".into()),
            ..Default::default()
        };

        let settings =
            Settings::load_from(&dir.path().join("config.json"), false, &overrides).unwrap();

        assert_eq!(settings.archive.backup_name, "fgt.conf");
        Ok(())
    }

    #[test]
    fn test_custom_marker_and_legacy_timestamps() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            serde_json::json!({
                "incoming_path": "/srv/tftp",
                "archive_path": "/archive",
                "backup_name": "fgt.conf",
                "marker": "hostname",
                "timestamp_style": "legacy"
            }),
        )?;

        let settings = Settings::load_from(&path, true, &Overrides::default()).unwrap();

        assert_eq!(settings.archive.marker, "hostname");
        assert_eq!(settings.archive.timestamp_style, TimestampStyle::Legacy);
        Ok(())
    }

    #[test]
    fn test_blank_marker_rejected() -> std::io::Result<()> {
        let dir = TempDir::new()?;
        let path = write_config(
            &dir,
            serde_json::json!({
                "incoming_path": "/srv/tftp",
                "archive_path": "/archive",
                "backup_name": "fgt.conf",
                "marker": "  "
            }),
        )?;

        let err = Settings::load_from(&path, true, &Overrides::default()).unwrap_err();

        assert!(err.to_string().contains("marker"));
        Ok(())
    }
}
