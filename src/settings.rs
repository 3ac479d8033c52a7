//! Game settings and preferences
//!
//! Read once at session start, written back on change. Stored as flat
//! scalars in the key-value store rather than one JSON blob, matching the
//! rest of the persistence layer.

use serde::{Deserialize, Serialize};

use crate::persistence::{KvStore, KvStoreExt, keys};
use crate::sim::SessionConfig;

/// User preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Hold-to-fire is implied; fire continuously while aiming
    pub auto_fire: bool,
    /// Pin the virtual joysticks to fixed screen positions
    pub fixed_joysticks: bool,
    /// Background music
    pub music: bool,
    /// Sound effects
    pub sound: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_fire: false,
            fixed_joysticks: false,
            music: true,
            sound: true,
        }
    }
}

impl Settings {
    /// Load settings from the store, defaulting any absent key
    pub fn load(store: &dyn KvStore) -> Self {
        let defaults = Self::default();
        Self {
            auto_fire: store.get_parsed(keys::AUTO_FIRE).unwrap_or(defaults.auto_fire),
            fixed_joysticks: store
                .get_parsed(keys::FIXED_JOYSTICKS)
                .unwrap_or(defaults.fixed_joysticks),
            music: store.get_parsed(keys::MUSIC).unwrap_or(defaults.music),
            sound: store.get_parsed(keys::SOUND).unwrap_or(defaults.sound),
        }
    }

    /// Write settings back to the store
    pub fn save(&self, store: &mut dyn KvStore) {
        store.set_value(keys::AUTO_FIRE, self.auto_fire);
        store.set_value(keys::FIXED_JOYSTICKS, self.fixed_joysticks);
        store.set_value(keys::MUSIC, self.music);
        store.set_value(keys::SOUND, self.sound);
    }

    /// The slice of settings the simulation core needs at construction
    pub fn session_config(&self, high_score: u64) -> SessionConfig {
        SessionConfig {
            auto_fire: self.auto_fire,
            high_score,
        }
    }
}
