//! Bird Slayer - a lane-shooter arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, upgrades, game state)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Flat key-value save store
//! - `audio`: Event-to-cue mapping for the host audio layer
//!
//! The simulation never talks to an engine directly. The host feeds it
//! `TickInput` (joystick axes, fire flag, commands, contact events) and drains
//! `GameEvent`s for rendering, audio, and persistence.

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matching the frame-count timers)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Half width of the hero lane; birds cross the sky band above it
    pub const FIELD_HALF_WIDTH: f32 = 284.0;
    /// Birds enter just outside the visible field
    pub const SPAWN_X: f32 = 300.0;
    /// Entities past this x are culled
    pub const CULL_X: f32 = 350.0;
    /// Top of the bird band
    pub const SKY_TOP: f32 = 160.0;
    /// Lowest bird spawn height
    pub const SKY_BOTTOM: f32 = 20.0;
    /// Ground line (poo splats, pickups land, hazards sit here)
    pub const GROUND_Y: f32 = -160.0;
    /// Bullets past this y are culled
    pub const BULLET_CULL_Y: f32 = 200.0;

    /// Hero sprite center height and half extents
    pub const HERO_Y: f32 = -140.0;
    pub const HERO_HALF_W: f32 = 25.0;
    pub const HERO_HALF_H: f32 = 20.0;
    /// Gun barrel length (bullet muzzle offset from hero center)
    pub const GUN_LENGTH: f32 = 30.0;

    /// Baseline bird cruise speed, scaled per species
    pub const BASE_BIRD_SPEED: f32 = 100.0;
    /// Poo fall speed
    pub const POO_SPEED: f32 = 150.0;
    /// Heavy poo falls slower
    pub const HEAVY_POO_FALL_FACTOR: f32 = 0.75;
    /// Mean ticks between droppings for randomized species
    pub const POO_MEAN_INTERVAL: u32 = 2 * 60;
    /// Fixed dropping interval for rapid birds
    pub const RAPID_POO_INTERVAL: u32 = 30;

    /// Ticks of post-hit (and post-upgrade) invincibility
    pub const INVINCIBILITY_TICKS: u32 = 3 * 60;
}

/// Clamp `value` into `[lower, upper]`
#[inline]
pub fn clamp<T: PartialOrd>(value: T, lower: T, upper: T) -> T {
    if value < lower {
        lower
    } else if value > upper {
        upper
    } else {
        value
    }
}

/// Map an aim axis in [-1, 1] to a gun angle in [-pi/2, pi/2].
/// 0 is straight up; a positive axis tilts the barrel toward +x.
#[inline]
pub fn aim_to_angle(axis: f32) -> f32 {
    clamp(axis, -1.0, 1.0) * std::f32::consts::FRAC_PI_2
}
