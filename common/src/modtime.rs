//! Minute-quantized modification timestamps
//!
//! Change detection compares local-time stamps of the form `YYMMDDHHMM`
//! (e.g. `2301010000` for 2023-01-01 00:00). The stamp is a sortable integer
//! used only for ordering, never for uniqueness: two edits within the same
//! minute compare equal. Seconds and finer granularity are deliberately
//! discarded; this is a cheap heuristic, not a content check.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, Timelike};

/// Sortable `YYMMDDHHMM` stamp in local time
pub type MinuteStamp = i64;

/// Quantize a filesystem modification time to minute resolution
pub fn minute_stamp(mtime: std::time::SystemTime) -> MinuteStamp {
    let dt: DateTime<Local> = mtime.into();
    (dt.year() as MinuteStamp % 100) * 100_000_000
        + dt.month() as MinuteStamp * 1_000_000
        + dt.day() as MinuteStamp * 10_000
        + dt.hour() as MinuteStamp * 100
        + dt.minute() as MinuteStamp
}

/// Read the minute stamp of the file at `path`.
///
/// Fails for missing files; the sync engine treats that failure as "never
/// backed up" rather than an error.
pub async fn file_minute_stamp(path: &std::path::Path) -> Result<MinuteStamp> {
    let metadata = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("failed reading metadata from {:?}", &path))?;
    let mtime = metadata
        .modified()
        .with_context(|| format!("no modification time available for {:?}", &path))?;
    Ok(minute_stamp(mtime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn system_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> std::time::SystemTime {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .single()
            .expect("unambiguous local time")
            .into()
    }

    #[test]
    fn test_stamp_layout() {
        assert_eq!(minute_stamp(system_time(2023, 1, 1, 0, 0, 0)), 2301010000);
        assert_eq!(minute_stamp(system_time(2022, 12, 31, 23, 59, 0)), 2212312359);
    }

    #[test]
    fn test_seconds_are_discarded() {
        let a = minute_stamp(system_time(2023, 6, 15, 10, 30, 1));
        let b = minute_stamp(system_time(2023, 6, 15, 10, 30, 59));
        assert_eq!(a, b);
    }

    #[test]
    fn test_stamps_sort_chronologically() {
        let older = minute_stamp(system_time(2022, 1, 1, 0, 0, 0));
        let newer = minute_stamp(system_time(2023, 1, 1, 0, 0, 0));
        assert!(newer > older);
        let minute_apart = minute_stamp(system_time(2022, 1, 1, 0, 1, 0));
        assert!(minute_apart > older);
    }

    #[tokio::test]
    async fn test_file_minute_stamp_missing_file() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let result = file_minute_stamp(&tmp_dir.path().join("nope.txt")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_file_minute_stamp_matches_set_mtime() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let path = tmp_dir.path().join("a.txt");
        tokio::fs::write(&path, "a").await.unwrap();
        let mtime = system_time(2023, 1, 1, 0, 0, 30);
        filetime::set_file_mtime(&path, filetime::FileTime::from_system_time(mtime)).unwrap();
        assert_eq!(file_minute_stamp(&path).await.unwrap(), 2301010000);
    }
}
