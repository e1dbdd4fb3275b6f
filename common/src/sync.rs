//! Sync decisions and the backup pass
//!
//! For every candidate file the engine makes a three-way call against the
//! live mirror under `Current/`:
//!
//! - no backup counterpart -> **New**: create parent directories, copy
//! - source minute-stamp strictly newer -> **Updated**: move the prior copy
//!   into `Archive/`, install the new content
//! - otherwise -> **Unchanged**: nothing beyond the two metadata reads
//!
//! Updates are transactional: the new content is staged under a temporary
//! name next to the backup path before the prior copy is renamed away, so a
//! crash mid-update leaves the backup path holding either the old or the
//! new version, never neither. A staging file stranded by an interrupted
//! update is removed the next time its file is copied or updated.

use anyhow::{anyhow, Context};
use tracing::instrument;

use crate::config::Config;
use crate::copy;
use crate::modtime::{self, MinuteStamp};
use crate::walk;

/// Error type for the backup pass that preserves the summary of the work
/// done before the failure.
#[derive(Debug, thiserror::Error)]
#[error("{source:#}")]
pub struct Error {
    #[source]
    pub source: anyhow::Error,
    pub summary: Summary,
}

impl Error {
    #[must_use]
    pub fn new(source: anyhow::Error, summary: Summary) -> Self {
        Error { source, summary }
    }
}

#[derive(Copy, Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Summary {
    /// files with no prior backup counterpart
    pub files_copied: usize,
    /// files whose prior copy was archived and replaced
    pub files_updated: usize,
    pub files_unchanged: usize,
    /// tolerated per-file failures (not counted as copied)
    pub files_skipped: usize,
}

impl Summary {
    /// The user-visible copied count: new plus updated files
    pub fn total_copied(&self) -> usize {
        self.files_copied + self.files_updated
    }
}

impl std::ops::Add for Summary {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            files_copied: self.files_copied + other.files_copied,
            files_updated: self.files_updated + other.files_updated,
            files_unchanged: self.files_unchanged + other.files_unchanged,
            files_skipped: self.files_skipped + other.files_skipped,
        }
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "files copied: {}\n\
            files updated: {}\n\
            files unchanged: {}\n\
            files skipped: {}",
            self.files_copied, self.files_updated, self.files_unchanged, self.files_skipped,
        )
    }
}

/// Outcome of comparing a source file with its backup counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    New,
    Updated { prior_stamp: MinuteStamp },
    Unchanged,
}

/// Classify `source_file` against `backup_path`.
///
/// A failed metadata lookup on the backup side means the file was never
/// backed up (or the prior copy is gone), which is the New case, not an
/// error. Source-side metadata failures propagate.
pub async fn classify(
    source_file: &std::path::Path,
    backup_path: &std::path::Path,
) -> anyhow::Result<SyncAction> {
    let backup_stamp = match modtime::file_minute_stamp(backup_path).await {
        Ok(stamp) => stamp,
        Err(_) => return Ok(SyncAction::New),
    };
    let source_stamp = modtime::file_minute_stamp(source_file).await?;
    if source_stamp > backup_stamp {
        Ok(SyncAction::Updated {
            prior_stamp: backup_stamp,
        })
    } else {
        Ok(SyncAction::Unchanged)
    }
}

/// Move the prior backup copy into `Archive/`, tagged with its own minute
/// stamp.
///
/// The archive layout is owned by the setup phase; a missing parent
/// directory here is a fatal, propagated error rather than something to
/// paper over.
#[instrument(skip(config))]
pub async fn archive_prior(
    config: &Config,
    source_file: &std::path::Path,
    backup_path: &std::path::Path,
    prior_stamp: MinuteStamp,
) -> anyhow::Result<std::path::PathBuf> {
    let archive_path = config.archive_path(source_file, prior_stamp)?;
    tokio::fs::rename(backup_path, &archive_path)
        .await
        .with_context(|| {
            format!(
                "failed archiving {:?} to {:?}, is the Archive/ folder structure in place?",
                backup_path, &archive_path
            )
        })?;
    tracing::debug!("archived {:?} -> {:?}", backup_path, &archive_path);
    Ok(archive_path)
}

fn staging_path(backup_path: &std::path::Path) -> anyhow::Result<std::path::PathBuf> {
    let file_name = backup_path
        .file_name()
        .ok_or_else(|| anyhow!("{:?} has no file name", backup_path))?;
    let parent = backup_path
        .parent()
        .ok_or_else(|| anyhow!("{:?} has no parent directory", backup_path))?;
    Ok(parent.join(format!(".{}.bkup-tmp", file_name.to_string_lossy())))
}

/// Replace an outdated backup copy: stage the new content, archive the old
/// copy, rename the staged file into place. Returns false when the source
/// could not be read (tolerated, backup left untouched).
async fn replace_prior(
    config: &Config,
    source_file: &std::path::Path,
    backup_path: &std::path::Path,
    prior_stamp: MinuteStamp,
) -> anyhow::Result<bool> {
    let staged = staging_path(backup_path)?;
    // an interrupted earlier update may have left a staging file behind
    let _ = tokio::fs::remove_file(&staged).await;
    if !copy::copy_file(source_file, &staged).await {
        // a partial staging file may be left behind by a failed copy
        let _ = tokio::fs::remove_file(&staged).await;
        return Ok(false);
    }
    if let Err(error) = archive_prior(config, source_file, backup_path, prior_stamp).await {
        let _ = tokio::fs::remove_file(&staged).await;
        return Err(error);
    }
    tokio::fs::rename(&staged, backup_path)
        .await
        .with_context(|| format!("failed installing {:?} at {:?}", &staged, backup_path))?;
    Ok(true)
}

async fn sync_file(
    config: &Config,
    source_file: &std::path::Path,
    summary: &mut Summary,
) -> anyhow::Result<()> {
    let backup_path = config.backup_path(source_file)?;
    match classify(source_file, &backup_path).await? {
        SyncAction::New => {
            if let Some(parent) = backup_path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("cannot create directory {:?}", parent))?;
            }
            // an update interrupted after the archive move leaves the
            // backup path missing and its staging file stranded
            let _ = tokio::fs::remove_file(staging_path(&backup_path)?).await;
            if copy::copy_file(source_file, &backup_path).await {
                summary.files_copied += 1;
            } else {
                summary.files_skipped += 1;
            }
        }
        SyncAction::Updated { prior_stamp } => {
            if replace_prior(config, source_file, &backup_path, prior_stamp).await? {
                summary.files_updated += 1;
            } else {
                summary.files_skipped += 1;
            }
        }
        SyncAction::Unchanged => {
            tracing::debug!("{:?} unchanged", source_file);
            summary.files_unchanged += 1;
        }
    }
    Ok(())
}

/// One full backup pass: enumerate candidates, apply the decision engine to
/// each in sequence, and return the summary. Re-running immediately after a
/// successful pass copies nothing.
#[instrument(skip(config))]
pub async fn run_backup(config: &Config) -> Result<Summary, Error> {
    let ignore = config.ignore_list();
    let candidates = walk::list_files(&config.source_root, &ignore)
        .await
        .map_err(|err| Error::new(err, Summary::default()))?;
    tracing::info!("{} candidate files under {:?}", candidates.len(), &config.source_root);
    let mut summary = Summary::default();
    for source_file in &candidates {
        sync_file(config, source_file, &mut summary)
            .await
            .map_err(|err| Error::new(err, summary))?;
    }
    tracing::info!("backup pass complete: {} files copied", summary.total_copied());
    Ok(summary)
}
