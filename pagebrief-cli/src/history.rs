//! Capped most-recent-N summary history, stored as JSON in the data dir.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pagebrief_models::SummaryType;
use serde::{Deserialize, Serialize};

const HISTORY_FILE: &str = "history.json";

/// One stored summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub created_at: DateTime<Utc>,
    pub provider: String,
    pub summary_type: SummaryType,
    #[serde(default)]
    pub title: String,
    pub summary: String,
}

impl HistoryEntry {
    pub fn new(
        provider: impl Into<String>,
        summary_type: SummaryType,
        title: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            created_at: Utc::now(),
            provider: provider.into(),
            summary_type,
            title: title.into(),
            summary: summary.into(),
        }
    }
}

/// History file handle. Newest entries first.
#[derive(Debug, Clone)]
pub struct SummaryHistory {
    path: PathBuf,
    limit: usize,
}

impl SummaryHistory {
    /// History in the pagebrief data directory.
    pub fn open_default(limit: usize) -> Self {
        Self::at(pagebrief_paths::data_dir().join(HISTORY_FILE), limit)
    }

    pub fn at(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored entries, newest first. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents)
            .with_context(|| format!("corrupt history file {}", self.path.display()))
    }

    /// Prepend `entry` and drop anything past the limit.
    pub fn record(&self, entry: HistoryEntry) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(0, entry);
        entries.truncate(self.limit);
        self.write(&entries)
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }

    fn write(&self, entries: &[HistoryEntry]) -> Result<()> {
        let parent = self
            .path
            .parent()
            .context("history path has no parent directory")?;
        fs::create_dir_all(parent)?;

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = parent.join(".history.json.tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(summary: &str) -> HistoryEntry {
        HistoryEntry::new("openai", SummaryType::Brief, "Title", summary)
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let history = SummaryHistory::at(dir.path().join("history.json"), 10);
        assert!(history.load().unwrap().is_empty());
    }

    #[test]
    fn record_prepends_newest() {
        let dir = TempDir::new().unwrap();
        let history = SummaryHistory::at(dir.path().join("history.json"), 10);

        history.record(entry("first")).unwrap();
        history.record(entry("second")).unwrap();

        let summaries: Vec<_> = history
            .load()
            .unwrap()
            .into_iter()
            .map(|e| e.summary)
            .collect();
        assert_eq!(summaries, ["second", "first"]);
    }

    #[test]
    fn record_caps_at_limit() {
        let dir = TempDir::new().unwrap();
        let history = SummaryHistory::at(dir.path().join("history.json"), 2);

        for text in ["a", "b", "c"] {
            history.record(entry(text)).unwrap();
        }

        let entries = history.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].summary, "c");
        assert_eq!(entries[1].summary, "b");
    }

    #[test]
    fn record_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let history = SummaryHistory::at(dir.path().join("nested").join("history.json"), 5);

        history.record(entry("x")).unwrap();

        assert!(history.path().exists());
    }

    #[test]
    fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let history = SummaryHistory::at(dir.path().join("history.json"), 5);
        history.record(entry("x")).unwrap();

        history.clear().unwrap();

        assert!(!history.path().exists());
        assert!(history.load().unwrap().is_empty());
        // clearing twice is fine
        history.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "{not json").unwrap();

        assert!(SummaryHistory::at(path, 5).load().is_err());
    }
}
