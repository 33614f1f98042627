//! Per-mode result history and personal bests.
//!
//! Each game mode owns one [`GameStatsRecord`]: the last [`HISTORY_LIMIT`]
//! results in chronological order and the best result ever recorded. Stats
//! are a convenience feature, so reads never fail and write failures are
//! logged and dropped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;
use crate::model::GameMode;

/// Maximum number of results kept per mode.
pub const HISTORY_LIMIT: usize = 20;

/// Persisted statistics for one game mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameStatsRecord {
    /// Most recent results, oldest first.
    #[serde(default)]
    pub history: Vec<f64>,
    /// Best result ever recorded, `None` until the first result.
    #[serde(default)]
    pub best: Option<f64>,
}

impl GameStatsRecord {
    /// Append a result and update the best value under `mode`'s comparison.
    pub fn record(&mut self, mode: GameMode, value: f64) {
        self.history.push(value);
        if self.history.len() > HISTORY_LIMIT {
            let excess = self.history.len() - HISTORY_LIMIT;
            self.history.drain(..excess);
        }

        if mode.is_better(value, self.best) {
            self.best = Some(value);
        }
    }

    /// Most recent result, if any.
    pub fn last(&self) -> Option<f64> {
        self.history.last().copied()
    }

    /// Older files stored `best: 0` to mean "nothing recorded yet".
    fn normalize(mut self) -> Self {
        if self.history.is_empty() && self.best == Some(0.0) {
            self.best = None;
        }
        self
    }
}

/// Storage backend for per-mode stats.
pub trait StatsStore: Send + Sync {
    /// Load the record for `mode`. Missing or unreadable data yields the
    /// empty record.
    fn load(&self, mode: GameMode) -> GameStatsRecord;

    /// Durably replace the record for `mode`.
    fn save(&self, mode: GameMode, record: &GameStatsRecord) -> Result<(), StatsError>;

    /// Append `value` to `mode`'s history and update its best.
    ///
    /// Best-effort: a failed write is logged and otherwise ignored.
    fn record_result(&self, mode: GameMode, value: f64) {
        let mut record = self.load(mode);
        record.record(mode, value);
        match self.save(mode, &record) {
            Ok(()) => tracing::debug!(%mode, value, best = ?record.best, "recorded result"),
            Err(e) => tracing::warn!(%mode, value, "failed to persist stats: {e}"),
        }
    }

    /// Best result for `mode`, `None` if nothing has been recorded.
    fn best(&self, mode: GameMode) -> Option<f64> {
        self.load(mode).best
    }

    /// Up to the last [`HISTORY_LIMIT`] results, oldest first.
    fn history(&self, mode: GameMode) -> Vec<f64> {
        self.load(mode).history
    }
}

/// JSON-file stats store, one file per mode.
#[derive(Debug, Clone)]
pub struct FileStatsStore {
    dir: PathBuf,
}

impl FileStatsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform data directory.
    ///
    /// `$XDG_DATA_HOME/neuromaster`, falling back to
    /// `~/.local/share/neuromaster`, then `./.neuromaster`.
    pub fn in_default_location() -> Self {
        Self::new(default_data_dir())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, mode: GameMode) -> PathBuf {
        self.dir.join(format!("{}.json", mode.storage_key()))
    }
}

impl StatsStore for FileStatsStore {
    fn load(&self, mode: GameMode) -> GameStatsRecord {
        let path = self.path_for(mode);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return GameStatsRecord::default()
            }
            Err(e) => {
                tracing::warn!("cannot read {}: {e}", path.display());
                return GameStatsRecord::default();
            }
        };

        match serde_json::from_str::<GameStatsRecord>(&content) {
            Ok(record) => record.normalize(),
            Err(e) => {
                tracing::warn!("ignoring corrupt stats file {}: {e}", path.display());
                GameStatsRecord::default()
            }
        }
    }

    fn save(&self, mode: GameMode, record: &GameStatsRecord) -> Result<(), StatsError> {
        std::fs::create_dir_all(&self.dir).map_err(io_err(&self.dir))?;

        let path = self.path_for(mode);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&tmp, json).map_err(io_err(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_err(&path))?;
        Ok(())
    }
}

/// In-process stats store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    records: Mutex<HashMap<GameMode, GameStatsRecord>>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatsStore for MemoryStatsStore {
    fn load(&self, mode: GameMode) -> GameStatsRecord {
        self.records
            .lock()
            .map(|records| records.get(&mode).cloned().unwrap_or_default())
            .unwrap_or_default()
    }

    fn save(&self, mode: GameMode, record: &GameStatsRecord) -> Result<(), StatsError> {
        if let Ok(mut records) = self.records.lock() {
            records.insert(mode, record.clone());
        }
        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StatsError {
    let path = path.to_path_buf();
    move |source| StatsError::Io { path, source }
}

fn default_data_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("neuromaster");
    }
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("neuromaster"),
        None => PathBuf::from(".neuromaster"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded_and_keeps_most_recent() {
        let store = MemoryStatsStore::new();
        for i in 1..=25 {
            store.record_result(GameMode::Clinical, i as f64);
        }
        let history = store.history(GameMode::Clinical);
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.first(), Some(&6.0));
        assert_eq!(history.last(), Some(&25.0));
        assert_eq!(history, (6..=25).map(|i| i as f64).collect::<Vec<_>>());
    }

    #[test]
    fn ordering_best_is_minimum() {
        let store = MemoryStatsStore::new();
        for v in [31.4, 27.9, 40.2, 28.0] {
            store.record_result(GameMode::Ordering, v);
        }
        assert_eq!(store.best(GameMode::Ordering), Some(27.9));
    }

    #[test]
    fn score_modes_best_is_maximum() {
        let store = MemoryStatsStore::new();
        for v in [3.0, 7.0, 2.0, 7.0, 5.0] {
            store.record_result(GameMode::Visual, v);
        }
        assert_eq!(store.best(GameMode::Visual), Some(7.0));
    }

    #[test]
    fn best_survives_eviction() {
        let mut record = GameStatsRecord::default();
        record.record(GameMode::Clinical, 50.0);
        for _ in 0..HISTORY_LIMIT {
            record.record(GameMode::Clinical, 1.0);
        }
        assert!(!record.history.contains(&50.0));
        assert_eq!(record.best, Some(50.0));
    }

    #[test]
    fn zero_second_run_is_a_real_best() {
        let mut record = GameStatsRecord::default();
        record.record(GameMode::Ordering, 0.0);
        record.record(GameMode::Ordering, 9.5);
        assert_eq!(record.best, Some(0.0));
    }

    #[test]
    fn reads_do_not_mutate() {
        let store = MemoryStatsStore::new();
        store.record_result(GameMode::Clinical, 4.0);
        let before = store.load(GameMode::Clinical);
        let _ = store.best(GameMode::Clinical);
        let _ = store.history(GameMode::Clinical);
        let _ = store.best(GameMode::Visual);
        assert_eq!(store.load(GameMode::Clinical), before);
        assert_eq!(store.load(GameMode::Visual), GameStatsRecord::default());
    }

    #[test]
    fn modes_are_independent() {
        let store = MemoryStatsStore::new();
        store.record_result(GameMode::Clinical, 3.0);
        assert_eq!(store.best(GameMode::Visual), None);
        assert!(store.history(GameMode::Ordering).is_empty());
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStatsStore::new(dir.path());
        for v in [22.5, 19.1, 30.0] {
            store.record_result(GameMode::Ordering, v);
        }

        let reopened = FileStatsStore::new(dir.path());
        let record = reopened.load(GameMode::Ordering);
        assert_eq!(record.history, vec![22.5, 19.1, 30.0]);
        assert_eq!(record.best, Some(19.1));
        assert!(dir.path().join("nm_stats_ordering.json").exists());
        assert!(!dir.path().join("nm_stats_ordering.json.tmp").exists());
    }

    #[test]
    fn missing_file_is_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStatsStore::new(dir.path().join("never-created"));
        assert_eq!(store.load(GameMode::Visual), GameStatsRecord::default());
        assert_eq!(store.best(GameMode::Visual), None);
    }

    #[test]
    fn corrupt_file_is_empty_record() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nm_stats_clinical.json"), "{not json").unwrap();
        let store = FileStatsStore::new(dir.path());
        assert_eq!(store.load(GameMode::Clinical), GameStatsRecord::default());

        // Recording over a corrupt file starts a fresh history
        store.record_result(GameMode::Clinical, 2.0);
        assert_eq!(store.history(GameMode::Clinical), vec![2.0]);
    }

    #[test]
    fn legacy_zero_sentinel_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("nm_stats_ordering.json"),
            r#"{"history": [], "best": 0}"#,
        )
        .unwrap();
        let store = FileStatsStore::new(dir.path());
        assert_eq!(store.best(GameMode::Ordering), None);

        store.record_result(GameMode::Ordering, 41.7);
        assert_eq!(store.best(GameMode::Ordering), Some(41.7));
    }

    #[test]
    fn unwritable_store_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        // A regular file where the directory should be makes every save fail
        let store = FileStatsStore::new(blocker.join("stats"));
        store.record_result(GameMode::Visual, 3.0);
        assert_eq!(store.best(GameMode::Visual), None);
    }
}
