//! Tolerant single-file copy
//!
//! Copies file data plus the metadata the sync engine depends on: permission
//! bits travel with the data copy and the source mtime is stamped onto the
//! destination afterwards, so an untouched file compares Unchanged on the
//! next run.
//!
//! Any I/O failure on the individual file (open, copy, metadata) is logged
//! and the file is skipped; one unreadable or unwritable file must not abort
//! the whole backup pass.

use anyhow::{Context, Result};

async fn try_copy(src: &std::path::Path, dst: &std::path::Path) -> Result<()> {
    let src_metadata = tokio::fs::metadata(src)
        .await
        .with_context(|| format!("failed reading metadata from {:?}", &src))?;
    tokio::fs::copy(src, dst)
        .await
        .with_context(|| format!("failed copying {:?} to {:?}", &src, &dst))?;
    let mtime = src_metadata
        .modified()
        .with_context(|| format!("no modification time available for {:?}", &src))?;
    let dst = dst.to_owned();
    tokio::task::spawn_blocking(move || {
        filetime::set_file_mtime(&dst, filetime::FileTime::from_system_time(mtime))
            .with_context(|| format!("failed setting modification time on {:?}", &dst))
    })
    .await??;
    Ok(())
}

/// Copy `src` to `dst`, returning whether the copy happened.
///
/// Failures are tolerated by design: the error is logged at `warn!` and
/// `false` is returned so the caller leaves the file out of the copied
/// count and moves on.
pub async fn copy_file(src: &std::path::Path, dst: &std::path::Path) -> bool {
    match try_copy(src, dst).await {
        Ok(()) => {
            tracing::debug!("copied {:?} -> {:?}", src, dst);
            true
        }
        Err(error) => {
            tracing::warn!("skipping {:?}: {:#}", src, &error);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tracing_test::traced_test;

    #[tokio::test]
    #[traced_test]
    async fn test_copy_preserves_content_mode_and_mtime() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let src = tmp_dir.path().join("src.txt");
        let dst = tmp_dir.path().join("dst.txt");
        tokio::fs::write(&src, "payload").await?;
        tokio::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o640)).await?;
        crate::testutils::set_minute_mtime(&src, 2023, 1, 1, 12, 30)?;
        assert!(copy_file(&src, &dst).await);
        assert_eq!(tokio::fs::read_to_string(&dst).await?, "payload");
        let dst_metadata = tokio::fs::metadata(&dst).await?;
        assert_eq!(dst_metadata.permissions().mode() & 0o777, 0o640);
        assert_eq!(
            crate::modtime::file_minute_stamp(&dst).await?,
            crate::modtime::file_minute_stamp(&src).await?
        );
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unreadable_source_is_skipped() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let src = tmp_dir.path().join("secret.txt");
        let dst = tmp_dir.path().join("dst.txt");
        tokio::fs::write(&src, "secret").await?;
        tokio::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o000)).await?;
        if tokio::fs::File::open(&src).await.is_ok() {
            // privileged user, permission bits are not enforced
            return Ok(());
        }
        assert!(!copy_file(&src, &dst).await);
        assert!(tokio::fs::metadata(&dst).await.is_err());
        Ok(())
    }

    #[tokio::test]
    #[traced_test]
    async fn test_missing_destination_parent_is_skipped() -> Result<()> {
        let tmp_dir = tempfile::tempdir()?;
        let src = tmp_dir.path().join("src.txt");
        tokio::fs::write(&src, "payload").await?;
        let dst = tmp_dir.path().join("no/such/dir/dst.txt");
        assert!(!copy_file(&src, &dst).await);
        Ok(())
    }
}
