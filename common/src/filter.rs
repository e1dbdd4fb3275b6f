//! Ignore-list matching for directory traversal
//!
//! An ignore entry excludes a visited directory when the directory's path
//! *contains* the entry as a plain substring. There is no glob syntax, no
//! separator awareness and no case folding.
//!
//! # Matching is loose on purpose
//!
//! Substring matching means an entry like `logs` also excludes a sibling
//! named `backend_logs`. This mirrors the tool's long-standing observable
//! behavior; callers that need tighter semantics must pass more specific
//! entries (e.g. `/home/me/logs`).
//!
//! # Examples
//!
//! ```
//! use common::filter::IgnoreList;
//! use std::path::Path;
//!
//! let mut ignore = IgnoreList::new();
//! ignore.add("/home/me/logs");
//!
//! assert!(ignore.should_skip(Path::new("/home/me/logs")));
//! assert!(ignore.should_skip(Path::new("/home/me/logs/2023")));
//! assert!(!ignore.should_skip(Path::new("/home/me/docs")));
//! ```

use std::path::Path;

/// Result of checking a directory against the ignore list
#[derive(Debug, Clone)]
pub enum IgnoreResult {
    /// directory should be traversed and its files collected
    Included,
    /// directory matched an ignore entry (the entry is carried for logging)
    ExcludedByEntry(String),
}

/// A set of ignore entries matched as substrings against directory paths
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
    entries: Vec<String>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an ignore list from configured entries, dropping empty ones.
    /// An empty entry would match every path, which is never what a config
    /// author meant.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for entry in entries {
            list.add(entry);
        }
        list
    }

    pub fn add(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        if !entry.is_empty() {
            self.entries.push(entry);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Check a visited directory path against the list
    pub fn check(&self, dir: &Path) -> IgnoreResult {
        let dir_str = dir.to_string_lossy();
        for entry in &self.entries {
            if dir_str.contains(entry.as_str()) {
                return IgnoreResult::ExcludedByEntry(entry.clone());
            }
        }
        IgnoreResult::Included
    }

    /// True if any entry occurs in `dir` as a substring
    pub fn should_skip(&self, dir: &Path) -> bool {
        matches!(self.check(dir), IgnoreResult::ExcludedByEntry(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_skips_nothing() {
        let ignore = IgnoreList::new();
        assert!(!ignore.should_skip(Path::new("/home/me")));
        assert!(!ignore.should_skip(Path::new("")));
    }

    #[test]
    fn test_exact_and_nested_match() {
        let mut ignore = IgnoreList::new();
        ignore.add("/home/me/logs");
        assert!(ignore.should_skip(Path::new("/home/me/logs")));
        // nested directories contain the parent path as a substring
        assert!(ignore.should_skip(Path::new("/home/me/logs/2023/jan")));
        assert!(!ignore.should_skip(Path::new("/home/me/docs")));
    }

    #[test]
    fn test_substring_matches_unrelated_sibling() {
        // loose matching: "logs" also excludes "backend_logs"
        let mut ignore = IgnoreList::new();
        ignore.add("logs");
        assert!(ignore.should_skip(Path::new("/home/me/logs")));
        assert!(ignore.should_skip(Path::new("/home/me/backend_logs")));
        assert!(ignore.should_skip(Path::new("/home/me/logs_old")));
    }

    #[test]
    fn test_no_case_folding() {
        let mut ignore = IgnoreList::new();
        ignore.add("Logs");
        assert!(!ignore.should_skip(Path::new("/home/me/logs")));
        assert!(ignore.should_skip(Path::new("/home/me/Logs")));
    }

    #[test]
    fn test_check_reports_matched_entry() {
        let mut ignore = IgnoreList::new();
        ignore.add("tmp");
        ignore.add("cache");
        match ignore.check(Path::new("/home/me/cache")) {
            IgnoreResult::ExcludedByEntry(entry) => assert_eq!(entry, "cache"),
            other => panic!("expected ExcludedByEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let mut ignore = IgnoreList::new();
        ignore.add("me");
        ignore.add("cache");
        match ignore.check(Path::new("/home/me/cache")) {
            IgnoreResult::ExcludedByEntry(entry) => assert_eq!(entry, "me"),
            other => panic!("expected ExcludedByEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_entries_dropped() {
        let ignore = IgnoreList::from_entries(["", "logs"]);
        assert_eq!(ignore.entries().len(), 1);
        assert!(!ignore.should_skip(Path::new("/home/me/docs")));
        assert!(ignore.should_skip(Path::new("/home/me/logs")));
    }
}
