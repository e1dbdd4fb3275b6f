pub async fn setup_source_tree() -> anyhow::Result<tempfile::TempDir> {
    let tmp_dir = tempfile::tempdir()?;
    // source
    // |- a.txt
    // |- docs
    //    |- notes.txt
    //    |- work
    //       |- report.txt
    // |- logs
    //    |- d.txt
    let source = tmp_dir.path().join("source");
    tokio::fs::create_dir(&source).await?;
    tokio::fs::write(source.join("a.txt"), "a").await?;
    let docs = source.join("docs");
    tokio::fs::create_dir(&docs).await?;
    tokio::fs::write(docs.join("notes.txt"), "notes").await?;
    let work = docs.join("work");
    tokio::fs::create_dir(&work).await?;
    tokio::fs::write(work.join("report.txt"), "report").await?;
    let logs = source.join("logs");
    tokio::fs::create_dir(&logs).await?;
    tokio::fs::write(logs.join("d.txt"), "d").await?;
    Ok(tmp_dir)
}

/// Create the `Current/` + `Archive/` layout under `<root>/Backup`, the way
/// the setup wizard would.
pub async fn setup_backup_layout(root: &std::path::Path) -> anyhow::Result<std::path::PathBuf> {
    let backup_root = root.join("Backup");
    tokio::fs::create_dir_all(backup_root.join("Current")).await?;
    tokio::fs::create_dir_all(backup_root.join("Archive")).await?;
    Ok(backup_root)
}

pub fn set_minute_mtime(
    path: &std::path::Path,
    y: i32,
    mo: u32,
    d: u32,
    h: u32,
    mi: u32,
) -> anyhow::Result<()> {
    use chrono::TimeZone;
    let mtime: std::time::SystemTime = chrono::Local
        .with_ymd_and_hms(y, mo, d, h, mi, 0)
        .single()
        .expect("unambiguous local time")
        .into();
    filetime::set_file_mtime(path, filetime::FileTime::from_system_time(mtime))?;
    Ok(())
}
