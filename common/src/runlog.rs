//! Append-only record of completed backup runs

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;

pub const DEFAULT_LOG_PATH: &str = "log";

/// Render one run-log stanza for a pass that copied `files_copied` files at
/// `finished`. The log keeps one blank line between stanzas.
pub fn format_entry(finished: DateTime<Local>, files_copied: usize) -> String {
    format!(
        "Backup made on {} at {}\n{} files backed up\n\n",
        finished.format("%d/%m/%y"),
        finished.format("%H:%M"),
        files_copied
    )
}

/// Append a stanza for a just-finished run to the log at `path`, creating
/// the file on first use.
pub async fn append_entry(path: &std::path::Path, files_copied: usize) -> Result<()> {
    let entry = format_entry(Local::now(), files_copied);
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("cannot open run log {:?}", path))?;
    file.write_all(entry.as_bytes())
        .await
        .with_context(|| format!("cannot append to run log {:?}", path))?;
    Ok(())
}
