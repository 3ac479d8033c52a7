//! Flat key-value persistence
//!
//! Everything the game saves is a scalar under a string key: high score,
//! per-track upgrade levels, the mid-run score/health checkpoint, and the
//! user preferences. [`KvStore`] is the narrow seam the host implements;
//! [`FileStore`] backs it with a JSON map on disk and [`MemoryStore`] backs
//! tests.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::sim::GameState;
use crate::sim::upgrade::UpgradeTrack;

/// Storage keys
pub mod keys {
    pub const HIGH_SCORE: &str = "high_score";
    pub const SAVED_SCORE: &str = "saved_score";
    pub const SAVED_HEALTH: &str = "saved_health";
    pub const LEVEL_HEALTH: &str = "level_health";
    pub const LEVEL_SPEED: &str = "level_speed";
    pub const LEVEL_FIRE_RATE: &str = "level_fire_rate";
    pub const LEVEL_BULLET_SPEED: &str = "level_bullet_speed";
    pub const AUTO_FIRE: &str = "auto_fire";
    pub const FIXED_JOYSTICKS: &str = "fixed_joysticks";
    pub const MUSIC: &str = "music";
    pub const SOUND: &str = "sound";
    pub const HIGH_SCORE_TABLE: &str = "high_score_table";
}

/// A flat string-to-string store
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    /// Push pending writes to the backing medium
    fn flush(&mut self) -> io::Result<()>;
}

/// Typed helpers over the string store
pub trait KvStoreExt: KvStore {
    fn get_parsed<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.parse().ok())
    }

    fn set_value<T: Display>(&mut self, key: &str, value: T) {
        self.set(key, &value.to_string());
    }
}

impl<S: KvStore + ?Sized> KvStoreExt for S {}

/// In-memory store for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    map: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        let _ = self.map.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        let _ = self.map.remove(key);
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// JSON-file-backed store. Reads once at open; writes on `flush`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    map: BTreeMap<String, String>,
    dirty: bool,
}

impl FileStore {
    /// Open a store at `path`. A missing or corrupt file degrades to an
    /// empty store with a warning rather than an error.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let map = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(map) => map,
                Err(err) => {
                    log::warn!("corrupt save file {}: {err}", path.display());
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                log::warn!("unreadable save file {}: {err}", path.display());
                BTreeMap::new()
            }
        };
        Self {
            path,
            map,
            dirty: false,
        }
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        if self.map.get(key).map(String::as_str) != Some(value) {
            let _ = self.map.insert(key.to_string(), value.to_string());
            self.dirty = true;
        }
    }

    fn remove(&mut self, key: &str) {
        if self.map.remove(key).is_some() {
            self.dirty = true;
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let text = serde_json::to_string_pretty(&self.map)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, text)?;
        self.dirty = false;
        Ok(())
    }
}

/// Mid-run checkpoint: saved every tick while playing, cleared on game over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub score: u64,
    pub health: i32,
    pub levels: [u32; 4],
}

impl Checkpoint {
    pub fn capture(state: &GameState) -> Self {
        Self {
            score: state.score,
            health: state.player.health,
            levels: [
                state.upgrades.level(UpgradeTrack::Health),
                state.upgrades.level(UpgradeTrack::Speed),
                state.upgrades.level(UpgradeTrack::FireRate),
                state.upgrades.level(UpgradeTrack::BulletSpeed),
            ],
        }
    }

    pub fn save(&self, store: &mut dyn KvStore) {
        store.set_value(keys::SAVED_SCORE, self.score);
        store.set_value(keys::SAVED_HEALTH, self.health);
        store.set_value(keys::LEVEL_HEALTH, self.levels[0]);
        store.set_value(keys::LEVEL_SPEED, self.levels[1]);
        store.set_value(keys::LEVEL_FIRE_RATE, self.levels[2]);
        store.set_value(keys::LEVEL_BULLET_SPEED, self.levels[3]);
    }

    /// Load a saved checkpoint, if a complete one exists
    pub fn load(store: &dyn KvStore) -> Option<Self> {
        Some(Self {
            score: store.get_parsed(keys::SAVED_SCORE)?,
            health: store.get_parsed(keys::SAVED_HEALTH)?,
            levels: [
                store.get_parsed(keys::LEVEL_HEALTH)?,
                store.get_parsed(keys::LEVEL_SPEED)?,
                store.get_parsed(keys::LEVEL_FIRE_RATE)?,
                store.get_parsed(keys::LEVEL_BULLET_SPEED)?,
            ],
        })
    }

    /// Apply to a fresh state (restores score, health, and track levels)
    pub fn restore(&self, state: &mut GameState) {
        state.restore_session(self.score, self.health, self.levels);
    }

    /// Drop the mid-run save (called on game over)
    pub fn clear(store: &mut dyn KvStore) {
        store.remove(keys::SAVED_SCORE);
        store.remove(keys::SAVED_HEALTH);
        store.remove(keys::LEVEL_HEALTH);
        store.remove(keys::LEVEL_SPEED);
        store.remove(keys::LEVEL_FIRE_RATE);
        store.remove(keys::LEVEL_BULLET_SPEED);
    }
}

/// Read the persisted high score (0 if absent)
pub fn load_high_score(store: &dyn KvStore) -> u64 {
    store.get_parsed(keys::HIGH_SCORE).unwrap_or(0)
}

/// Persist the high score if it improved
pub fn save_high_score(store: &mut dyn KvStore, score: u64) {
    if score > load_high_score(store) {
        store.set_value(keys::HIGH_SCORE, score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SessionConfig;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        store.set_value(keys::HIGH_SCORE, 1234u64);
        assert_eq!(store.get_parsed::<u64>(keys::HIGH_SCORE), Some(1234));
        store.remove(keys::HIGH_SCORE);
        assert_eq!(store.get(keys::HIGH_SCORE), None);
    }

    #[test]
    fn checkpoint_roundtrip_through_store() {
        let mut store = MemoryStore::new();
        let mut state = GameState::new(1, SessionConfig::default());
        state.score = 720;
        state.player.health = 5;
        assert!(state.upgrades.choose(UpgradeTrack::Speed));

        Checkpoint::capture(&state).save(&mut store);
        let loaded = Checkpoint::load(&store).unwrap();
        assert_eq!(loaded.score, 720);
        assert_eq!(loaded.health, 5);
        assert_eq!(loaded.levels, [1, 2, 1, 1]);

        let mut restored = GameState::new(2, SessionConfig::default());
        loaded.restore(&mut restored);
        assert_eq!(restored.score, 720);
        assert_eq!(restored.player.health, 5);
        assert_eq!(restored.upgrades.level(UpgradeTrack::Speed), 2);
        // Crossed triggers are gone: next is the first threshold above 720
        assert_eq!(restored.upgrades.next_trigger(), Some(750));
    }

    #[test]
    fn clear_removes_the_checkpoint_but_not_the_high_score() {
        let mut store = MemoryStore::new();
        save_high_score(&mut store, 900);
        let state = GameState::new(1, SessionConfig::default());
        Checkpoint::capture(&state).save(&mut store);

        Checkpoint::clear(&mut store);
        assert!(Checkpoint::load(&store).is_none());
        assert_eq!(load_high_score(&store), 900);
    }

    #[test]
    fn high_score_only_improves() {
        let mut store = MemoryStore::new();
        save_high_score(&mut store, 500);
        save_high_score(&mut store, 300);
        assert_eq!(load_high_score(&store), 500);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = FileStore::open(&path);
        store.set_value(keys::HIGH_SCORE, 4321u64);
        store.flush().unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get_parsed::<u64>(keys::HIGH_SCORE), Some(4321));
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert_eq!(store.get(keys::HIGH_SCORE), None);
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json at all").unwrap();
        let store = FileStore::open(&path);
        assert_eq!(store.get(keys::HIGH_SCORE), None);
    }
}
