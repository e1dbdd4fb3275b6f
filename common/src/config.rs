//! Persisted backup configuration
//!
//! One backup profile is a small plain-text file, written once by the setup
//! wizard and read on every run:
//!
//! ```text
//! # Source directory:
//! /home/me/
//! # Backup directory:
//! /mnt/usb/Backup/
//! # Ignored subdirectories:
//! /home/me/logs
//! ```
//!
//! Lines 1, 3 and 5 are fixed comment headers and skipped unconditionally;
//! lines 2 and 4 hold the source and backup directories; every remaining
//! line (possibly none) is an ignore entry. The backup directory always
//! contains the two fixed subdirectories `Current/` (live mirror) and
//! `Archive/` (superseded copies); the setup phase creates them and the
//! core assumes they exist.

use std::path::{Path, PathBuf};

use crate::filter::IgnoreList;
use crate::modtime::MinuteStamp;

/// Name of the backup root directory itself
pub const BACKUP_DIR: &str = "Backup";
/// Live mirror subdirectory under the backup root
pub const CURRENT_DIR: &str = "Current";
/// Superseded-copies subdirectory under the backup root
pub const ARCHIVE_DIR: &str = "Archive";
/// Default config file location, next to where the tool is run
pub const DEFAULT_CONFIG_PATH: &str = "config";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// the config file does not exist yet; callers run the setup wizard
    /// instead of failing
    #[error("no configuration found at {0:?}")]
    NotConfigured(PathBuf),
    #[error("malformed config file {path:?}: {reason}")]
    Malformed { path: PathBuf, reason: String },
    #[error("failed reading config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A resolved backup profile, immutable for the duration of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// directory tree being backed up
    pub source_root: PathBuf,
    /// directory containing `Current/` and `Archive/`
    pub backup_root: PathBuf,
    /// substring entries excluding directories from traversal
    pub ignore_entries: Vec<String>,
}

impl Config {
    pub fn ignore_list(&self) -> IgnoreList {
        IgnoreList::from_entries(self.ignore_entries.iter().cloned())
    }

    pub fn current_dir(&self) -> PathBuf {
        self.backup_root.join(CURRENT_DIR)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.backup_root.join(ARCHIVE_DIR)
    }

    /// Path of `source_file` relative to the source root
    pub fn relative_path<'a>(&self, source_file: &'a Path) -> anyhow::Result<&'a Path> {
        source_file.strip_prefix(&self.source_root).map_err(|_| {
            anyhow::anyhow!(
                "{:?} is not under the source root {:?}",
                source_file,
                &self.source_root
            )
        })
    }

    /// Where the live backup copy of `source_file` lives
    pub fn backup_path(&self, source_file: &Path) -> anyhow::Result<PathBuf> {
        Ok(self.current_dir().join(self.relative_path(source_file)?))
    }

    /// Where a superseded copy of `source_file` goes, tagged with the prior
    /// backup copy's own minute stamp so distinct versions never clobber
    /// each other
    pub fn archive_path(
        &self,
        source_file: &Path,
        prior_stamp: MinuteStamp,
    ) -> anyhow::Result<PathBuf> {
        let relative = self.relative_path(source_file)?;
        let file_name = relative
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("{:?} has no file name", source_file))?;
        let archived_name = format!("{}-{}", file_name.to_string_lossy(), prior_stamp);
        let mut path = self.archive_dir();
        if let Some(parent) = relative.parent() {
            path.push(parent);
        }
        path.push(archived_name);
        Ok(path)
    }

    /// Create the `Current/` and `Archive/` layout. Run by the setup phase;
    /// the sync engine itself never creates these.
    pub async fn ensure_layout(&self) -> anyhow::Result<()> {
        for dir in [self.current_dir(), self.archive_dir()] {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|error| anyhow::anyhow!("cannot create directory {:?}: {}", &dir, error))?;
        }
        Ok(())
    }
}

fn parse_content(content: &str, path: &Path) -> Result<Config, ConfigError> {
    let malformed = |reason: &str| ConfigError::Malformed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let mut lines = content.lines();
    lines.next().ok_or_else(|| malformed("missing source directory header"))?;
    let source_root = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| malformed("missing source directory value"))?;
    lines.next().ok_or_else(|| malformed("missing backup directory header"))?;
    let backup_root = lines
        .next()
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| malformed("missing backup directory value"))?;
    // the ignored-subdirectories header is optional when no entries follow
    lines.next();
    let ignore_entries = lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect();
    Ok(Config {
        source_root: PathBuf::from(source_root),
        backup_root: PathBuf::from(backup_root),
        ignore_entries,
    })
}

/// Read a backup profile from `path`.
///
/// A missing file is reported as [`ConfigError::NotConfigured`] so the
/// caller can fall into the setup flow rather than treat it as a failure.
pub async fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotConfigured(path.to_path_buf()))
        }
        Err(error) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source: error,
            })
        }
    };
    parse_content(&content, path)
}

/// Write a backup profile to `path` in the fixed line layout.
/// Both directory lines are stored with a trailing separator.
pub async fn write_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    let mut content = String::new();
    content.push_str("# Source directory:\n");
    let source = config.source_root.to_string_lossy();
    content.push_str(source.trim_end_matches('/'));
    content.push_str("/\n");
    content.push_str("# Backup directory:\n");
    let backup = config.backup_root.to_string_lossy();
    content.push_str(backup.trim_end_matches('/'));
    content.push_str("/\n");
    content.push_str("# Ignored subdirectories:\n");
    for entry in &config.ignore_entries {
        content.push_str(entry);
        content.push('\n');
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|error| anyhow::anyhow!("failed writing config file {:?}: {}", path, error))
}
