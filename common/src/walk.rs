//! Source-tree enumeration
//!
//! Produces the candidate file set for a backup pass. Ignore filtering is
//! applied per visited directory; the walk itself is never pruned, so a
//! directory that matches an ignore entry still gets descended into and each
//! nested directory is tested on its own. With substring matching the two
//! policies yield the same candidate set (a child path contains every
//! substring its parent path does), the unpruned walk just spends traversal
//! time inside ignored trees.
//!
//! A directory the walk cannot open for lack of permission is logged and
//! skipped with everything beneath it; the rest of the pass continues. Other
//! traversal errors (a missing root included) propagate.

use anyhow::{Context, Result};
use async_recursion::async_recursion;

use crate::filter::{IgnoreList, IgnoreResult};

/// List the immediate subdirectories of `root`, sorted by name.
///
/// Directories whose name contains a `.` or the substring `Backup` are left
/// out: hidden trees are never offered for backup and the backup destination
/// must not be re-entered when it lives inside the source. Used by the setup
/// wizard and the pre-run confirmation display.
pub async fn list_subdirs(root: &std::path::Path) -> Result<Vec<std::path::PathBuf>> {
    let mut entries = tokio::fs::read_dir(root)
        .await
        .with_context(|| format!("cannot open directory {:?} for reading", root))?;
    let mut subdirs = vec![];
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("failed traversing directory {:?}", root))?
    {
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("failed reading file type of {:?}", entry.path()))?;
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.contains('.') || name.contains("Backup") {
            continue;
        }
        subdirs.push(entry.path());
    }
    subdirs.sort();
    Ok(subdirs)
}

#[async_recursion]
async fn collect_files(
    dir: &std::path::Path,
    ignore: &IgnoreList,
    files: &mut Vec<std::path::PathBuf>,
) -> Result<()> {
    let include_files = match ignore.check(dir) {
        IgnoreResult::Included => true,
        IgnoreResult::ExcludedByEntry(entry) => {
            tracing::debug!("{:?} matches ignore entry {:?}, files skipped", dir, entry);
            false
        }
    };
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        // one unreadable directory must not abort the pass
        Err(error) if error.kind() == std::io::ErrorKind::PermissionDenied => {
            tracing::warn!("cannot open {:?} for reading: permission denied, subtree skipped", dir);
            return Ok(());
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("cannot open directory {:?} for reading", dir))
        }
    };
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("failed traversing directory {:?}", dir))?
    {
        let file_type = entry
            .file_type()
            .await
            .with_context(|| format!("failed reading file type of {:?}", entry.path()))?;
        if file_type.is_dir() {
            collect_files(&entry.path(), ignore, files).await?;
        } else if include_files {
            files.push(entry.path());
        }
    }
    Ok(())
}

/// Walk `root` recursively and return every file not excluded by `ignore`.
/// Result order follows the walk and is not significant to callers.
pub async fn list_files(
    root: &std::path::Path,
    ignore: &IgnoreList,
) -> Result<Vec<std::path::PathBuf>> {
    let mut files = vec![];
    collect_files(root, ignore, &mut files).await?;
    Ok(files)
}
