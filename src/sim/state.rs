//! Game state and core simulation types
//!
//! Everything that must be persisted for checkpoint/determinism lives here.
//! The host never mutates state directly; it submits [`Command`]s and contact
//! events through [`TickInput`] and reads back [`GameEvent`]s.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::{Category, Contact, ContactBody};
use super::entity::{Bird, Bullet, Hazard, Pickup, Poo};
use super::powerup::PowerupState;
use super::spawn::SpawnScheduler;
use super::upgrade::{UpgradeEconomy, UpgradeTrack};

/// Top-level finite state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first input; nothing spawns or moves
    Inactive,
    /// Normal play
    Active,
    /// User-toggled freeze; only a pause toggle resumes
    Paused,
    /// Score crossed an upgrade threshold; waiting on a track choice
    Upgrading,
    /// Terminal; health reached 0
    GameOver,
}

/// Discrete inputs from the host UI, applied at the top of a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// First touch; leaves `Inactive`
    Start,
    /// Pause toggle
    TogglePause,
    /// Track selection on the upgrade screen
    ChooseUpgrade(UpgradeTrack),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Move joystick, -1 (left) to 1 (right)
    pub move_axis: f32,
    /// Aim joystick, -1 to 1, mapped to the gun angle
    pub aim_axis: f32,
    /// Fire button / right-touch held
    pub firing: bool,
    /// Discrete UI commands
    pub commands: Vec<Command>,
    /// Contact events reported by the host's overlap detection
    pub contacts: Vec<Contact>,
}

/// Session-wide configuration captured once at construction
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Fire continuously without the fire flag
    pub auto_fire: bool,
    /// Best score loaded from the settings store
    pub high_score: u64,
}

/// One-shot notifications for the render/audio/persistence layers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Shot,
    BirdDied {
        species: super::entity::Species,
        pos: Vec2,
        points: u64,
    },
    /// Floating score text at the kill position
    FloatingScore { pos: Vec2, points: u64 },
    /// Feather burst cosmetic at the kill position
    FeatherBurst { pos: Vec2 },
    /// A dropping splatted (ground or player)
    Splat { pos: Vec2 },
    PlayerHurt { health: i32 },
    HazardSpawned { x: f32 },
    HazardExpired { id: u32 },
    PowerupDropped {
        kind: super::powerup::PowerupKind,
        pos: Vec2,
    },
    PowerupCollected { kind: super::powerup::PowerupKind },
    PowerupExpired { kind: super::powerup::PowerupKind },
    /// An uncollected pickup timed out on the ground
    PickupExpired { kind: super::powerup::PowerupKind },
    UpgradeAvailable { score: u64 },
    UpgradeApplied { track: UpgradeTrack },
    NewHighScore { score: u64 },
    GameOver { score: u64 },
}

/// The hero on the lane
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    pub vx: f32,
    /// Gun angle in [-pi/2, pi/2]; 0 is straight up
    pub gun_angle: f32,
    pub health: i32,
    pub invincibility_ticks: u32,
}

impl Player {
    #[inline]
    pub fn invincible(&self) -> bool {
        self.invincibility_ticks > 0
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, crate::consts::HERO_Y)
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Seeded RNG stream; all randomness flows through here
    pub rng: Pcg32,
    pub config: SessionConfig,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub tick_count: u64,
    pub score: u64,
    pub high_score: u64,
    /// Set on the first bird kill of the session (music switch)
    pub first_kill: bool,
    pub player: Player,
    pub birds: Vec<Bird>,
    pub bullets: Vec<Bullet>,
    pub poops: Vec<Poo>,
    pub hazards: Vec<Hazard>,
    pub pickups: Vec<Pickup>,
    pub scheduler: SpawnScheduler,
    pub upgrades: UpgradeEconomy,
    pub buff: PowerupState,
    /// Zoom-out factor applied to sizes, speeds, and positions
    pub world_scale: f32,
    /// Ticks accumulated toward the next shot
    pub shot_timer: u32,
    /// One-shot notifications, drained by the host each tick
    #[serde(skip)]
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh session
    pub fn new(seed: u64, config: SessionConfig) -> Self {
        let upgrades = UpgradeEconomy::new();
        let world_scale = upgrades.world_scale();
        let shot_timer = upgrades.shot_period();
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            config,
            phase: GamePhase::Inactive,
            tick_count: 0,
            score: 0,
            high_score: config.high_score,
            first_kill: false,
            player: Player {
                x: 0.0,
                vx: 0.0,
                gun_angle: 0.0,
                health: upgrades.max_health(),
                invincibility_ticks: 0,
            },
            birds: Vec::new(),
            bullets: Vec::new(),
            poops: Vec::new(),
            hazards: Vec::new(),
            pickups: Vec::new(),
            scheduler: SpawnScheduler::new(),
            upgrades,
            buff: PowerupState::new(),
            world_scale,
            shot_timer,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity id; ids are never reused within a session
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn bird(&self, id: u32) -> Option<&Bird> {
        self.birds.iter().find(|b| b.id == id)
    }

    pub fn bird_mut(&mut self, id: u32) -> Option<&mut Bird> {
        self.birds.iter_mut().find(|b| b.id == id)
    }

    pub fn poo(&self, id: u32) -> Option<&Poo> {
        self.poops.iter().find(|p| p.id == id)
    }

    pub fn pickup(&self, id: u32) -> Option<&Pickup> {
        self.pickups.iter().find(|p| p.id == id)
    }

    pub fn pickup_mut(&mut self, id: u32) -> Option<&mut Pickup> {
        self.pickups.iter_mut().find(|p| p.id == id)
    }

    /// Whether a contact body still refers to a live entity.
    /// The player and the ground are always live.
    pub fn body_alive(&self, body: &ContactBody) -> bool {
        match body.category {
            Category::Player | Category::Ground => true,
            Category::Bird => self.bird(body.id).is_some(),
            Category::Bullet => self.bullets.iter().any(|b| b.id == body.id),
            Category::Poo => self.poo(body.id).is_some(),
            Category::Hazard => self.hazards.iter().any(|h| h.id == body.id),
            Category::Powerup => self.pickup(body.id).is_some(),
        }
    }

    /// Restore a checkpointed session: score, health, and track levels.
    /// The entity field starts empty, exactly like a fresh run.
    pub fn restore_session(&mut self, score: u64, health: i32, levels: [u32; 4]) {
        self.upgrades.restore_levels(levels, score);
        self.score = score;
        self.player.health = health.clamp(0, self.upgrades.max_health());
        self.world_scale = self.upgrades.world_scale();
        self.shot_timer = self.upgrades.shot_period();
        self.scheduler.refresh_enabled(self.upgrades.total());
        log::info!(
            "restored session: score={score} health={} total_level={}",
            self.player.health,
            self.upgrades.total()
        );
    }

    /// Ensure collections are sorted by id for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.birds.sort_by_key(|b| b.id);
        self.bullets.sort_by_key(|b| b.id);
        self.poops.sort_by_key(|p| p.id);
        self.hazards.sort_by_key(|h| h.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_inactive_and_healthy() {
        let state = GameState::new(7, SessionConfig::default());
        assert_eq!(state.phase, GamePhase::Inactive);
        assert_eq!(state.player.health, 6);
        assert_eq!(state.score, 0);
        assert!(state.birds.is_empty());
    }

    #[test]
    fn entity_ids_are_unique_and_monotonic() {
        let mut state = GameState::new(7, SessionConfig::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn restore_clamps_health_to_cap() {
        let mut state = GameState::new(7, SessionConfig::default());
        state.restore_session(500, 99, [2, 1, 1, 1]);
        assert_eq!(state.player.health, state.upgrades.max_health());
        assert_eq!(state.score, 500);
    }

    #[test]
    fn same_seed_same_rng_stream() {
        use rand::Rng;
        let mut a = GameState::new(42, SessionConfig::default());
        let mut b = GameState::new(42, SessionConfig::default());
        let xa: u64 = a.rng.random();
        let xb: u64 = b.rng.random();
        assert_eq!(xa, xb);
    }
}
