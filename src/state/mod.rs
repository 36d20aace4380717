//! Client-side gamification counters and their persistence.
//!
//! The store owns the [`SessionState`] and is the only thing allowed to
//! mutate it. Every mutation writes the blob through a [`StateStorage`] and
//! then fires the refresh callback, so a dashboard always mirrors what is on
//! disk.

use chrono::{Local, NaiveDate};
use fs_err as fs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

use crate::errors::{MindSparkError, Result};

pub const XP_PER_LEVEL: u32 = 100;
pub const CREATION_XP: u32 = 20;
pub const CORRECT_ANSWER_XP: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub xp: u32,
    pub streak: u32,
    pub items_created: u32,
    #[serde(rename = "lastLogin")]
    pub last_active: NaiveDate,
}

impl SessionState {
    pub fn new_on(today: NaiveDate) -> Self {
        Self { xp: 0, streak: 1, items_created: 0, last_active: today }
    }

    pub fn level(&self) -> u32 {
        self.xp / XP_PER_LEVEL + 1
    }

    pub fn level_title(&self) -> String {
        format!("Level {} Scholar", self.level())
    }

    /// Decode a persisted blob; a blob that breaks the invariants counts as corrupt.
    pub fn decode(blob: &str) -> Option<Self> {
        let state: SessionState = serde_json::from_str(blob).ok()?;
        (state.streak >= 1).then_some(state)
    }
}

/// Backing store for the single session blob.
pub trait StateStorage {
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, blob: &str) -> Result<()>;
}

fn storage_err(path: &Path, e: impl std::fmt::Display) -> MindSparkError {
    MindSparkError::Storage(format!("{}: {}", path.display(), e))
}

/// JSON file on disk, replaced atomically on each write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for FileStorage {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| storage_err(&self.path, e))
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| storage_err(&parent, e))?;
        let tmp = NamedTempFile::new_in(&parent).map_err(|e| storage_err(&parent, e))?;
        fs::write(tmp.path(), blob).map_err(|e| storage_err(tmp.path(), e))?;
        tmp.persist(&self.path).map_err(|e| storage_err(&self.path, e))?;
        Ok(())
    }
}

/// In-memory blob. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self { slot: Arc::new(Mutex::new(Some(blob.into()))) }
    }

    pub fn blob(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.lock().clone())
    }

    fn write(&mut self, blob: &str) -> Result<()> {
        *self.slot.lock() = Some(blob.to_string());
        Ok(())
    }
}

pub type RefreshFn = Box<dyn FnMut(&SessionState) + Send>;

pub struct SessionStore<S: StateStorage> {
    storage: S,
    state: SessionState,
    on_change: Option<RefreshFn>,
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl<S: StateStorage> SessionStore<S> {
    pub fn load(storage: S) -> Self {
        Self::load_on(storage, today())
    }

    /// Read the persisted blob; anything unreadable falls back to the default.
    pub fn load_on(storage: S, today: NaiveDate) -> Self {
        let state = match storage.read() {
            Ok(Some(blob)) => SessionState::decode(&blob).unwrap_or_else(|| {
                tracing::warn!("persisted session state is corrupt; starting fresh");
                SessionState::new_on(today)
            }),
            Ok(None) => SessionState::new_on(today),
            Err(e) => {
                tracing::warn!(error = %e, "could not read session state; starting fresh");
                SessionState::new_on(today)
            }
        };
        Self { storage, state, on_change: None }
    }

    pub fn with_refresh(mut self, f: impl FnMut(&SessionState) + Send + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn level(&self) -> u32 {
        self.state.level()
    }

    pub fn record_activity(&mut self) -> bool {
        self.record_activity_on(today())
    }

    /// Move the last-active date to `today`. Returns whether anything changed.
    pub fn record_activity_on(&mut self, today: NaiveDate) -> bool {
        if self.state.last_active == today {
            return false;
        }
        self.state.last_active = today;
        self.commit();
        true
    }

    /// Add `points` XP and return the resulting level.
    pub fn award(&mut self, points: u32) -> u32 {
        self.state.xp = self.state.xp.saturating_add(points);
        self.commit();
        self.state.level()
    }

    /// One more generated item, worth [`CREATION_XP`].
    pub fn record_creation(&mut self) -> u32 {
        self.state.items_created = self.state.items_created.saturating_add(1);
        self.award(CREATION_XP)
    }

    fn commit(&mut self) {
        match serde_json::to_string(&self.state) {
            Ok(blob) => {
                if let Err(e) = self.storage.write(&blob) {
                    tracing::warn!(error = %e, "failed to persist session state");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to encode session state"),
        }
        if let Some(refresh) = self.on_change.as_mut() {
            refresh(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn missing_blob_loads_default() {
        let store = SessionStore::load_on(MemoryStorage::default(), day(18));
        assert_eq!(store.state(), &SessionState::new_on(day(18)));
        assert_eq!(store.state().streak, 1);
        assert_eq!(store.level(), 1);
    }

    #[test]
    fn corrupt_blob_loads_default() {
        for blob in ["{not json", "{\"xp\": 5}", "{\"xp\":1,\"streak\":0,\"itemsCreated\":0,\"lastLogin\":\"2026-10-01\"}"] {
            let store = SessionStore::load_on(MemoryStorage::with_blob(blob), day(18));
            assert_eq!(store.state(), &SessionState::new_on(day(18)), "blob: {blob}");
        }
    }

    #[test]
    fn persisted_blob_uses_camel_case_keys() {
        let mut store = SessionStore::load_on(MemoryStorage::default(), day(18));
        store.award(5);
        let blob: serde_json::Value = serde_json::from_str(&store.storage().blob().unwrap()).unwrap();
        assert_eq!(
            blob,
            serde_json::json!({ "xp": 5, "streak": 1, "itemsCreated": 0, "lastLogin": "2026-10-18" })
        );
    }

    #[test]
    fn award_recomputes_level() {
        let mut store = SessionStore::load_on(MemoryStorage::default(), day(18));
        assert_eq!(store.award(99), 1);
        assert_eq!(store.award(1), 2);
        assert_eq!(store.state().level_title(), "Level 2 Scholar");
    }

    #[test]
    fn record_creation_counts_item_and_awards() {
        let mut store = SessionStore::load_on(MemoryStorage::default(), day(18));
        store.record_creation();
        assert_eq!(store.state().items_created, 1);
        assert_eq!(store.state().xp, CREATION_XP);
    }

    #[test]
    fn activity_only_persists_on_date_change() {
        let storage = MemoryStorage::default();
        let mut store = SessionStore::load_on(storage.clone(), day(18));
        assert!(!store.record_activity_on(day(18)));
        assert!(storage.blob().is_none());

        assert!(store.record_activity_on(day(19)));
        let reloaded = SessionStore::load_on(storage, day(25));
        assert_eq!(reloaded.state().last_active, day(19));
        assert_eq!(reloaded.state().streak, 1);
    }

    #[test]
    fn every_mutation_fires_refresh() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut store = SessionStore::load_on(MemoryStorage::default(), day(18))
            .with_refresh(move |s| sink.lock().push(s.xp));
        store.award(10);
        store.record_creation();
        store.record_activity_on(day(20));
        assert_eq!(*seen.lock(), vec![10, 30, 30]);
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut store = SessionStore::load_on(FileStorage::new(&path), day(18));
        store.award(130);
        store.record_creation();
        let saved = store.state().clone();

        let reloaded = SessionStore::load_on(FileStorage::new(&path), day(30));
        assert_eq!(reloaded.state(), &saved);
        assert_eq!(reloaded.level(), 2);
    }

    #[test]
    fn unreadable_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "garbage").unwrap();
        let store = SessionStore::load_on(FileStorage::new(&path), day(18));
        assert_eq!(store.state().xp, 0);
    }
}
