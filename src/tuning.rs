//! Data-driven game balance
//!
//! Every knob the simulation reads lives in one typed table, built once at
//! session start. Nothing in `sim` reaches for a magic number that belongs
//! here, and nothing is looked up by string name at runtime.

use crate::consts::*;
use crate::sim::entity::Species;
use crate::sim::powerup::PowerupKind;

/// Per-species balance row
#[derive(Debug, Clone, Copy)]
pub struct SpeciesSpec {
    pub species: Species,
    /// Hits to kill
    pub health: i32,
    /// Score credited on kill
    pub points: u64,
    /// Multiplier on [`BASE_BIRD_SPEED`]
    pub speed_factor: f32,
    /// Sprite scale multiplier (big birds are double size)
    pub scale: f32,
    /// Relative spawn ratio; the common bird is the 100 baseline
    pub weight: u32,
    /// Upgrade levels above the starting total before this species appears
    pub unlock_after: u32,
    /// Mean ticks between droppings; `None` means the species never poos
    pub poo_interval: Option<u32>,
}

/// Fixed species table. Order matches [`Species::ALL`].
pub const SPECIES_TABLE: [SpeciesSpec; 6] = [
    SpeciesSpec {
        species: Species::Normal,
        health: 1,
        points: 10,
        speed_factor: 1.0,
        scale: 1.0,
        weight: 100,
        unlock_after: 0,
        poo_interval: Some(POO_MEAN_INTERVAL),
    },
    SpeciesSpec {
        species: Species::Smart,
        health: 2,
        points: 30,
        speed_factor: 1.0,
        scale: 1.0,
        weight: 50,
        unlock_after: 2,
        poo_interval: Some(POO_MEAN_INTERVAL),
    },
    SpeciesSpec {
        species: Species::Toxic,
        health: 2,
        points: 30,
        speed_factor: 1.0,
        scale: 1.0,
        weight: 40,
        unlock_after: 3,
        poo_interval: Some(POO_MEAN_INTERVAL),
    },
    SpeciesSpec {
        species: Species::Big,
        health: 5,
        points: 80,
        speed_factor: 2.0 / 3.0,
        scale: 2.0,
        weight: 25,
        unlock_after: 4,
        poo_interval: Some(POO_MEAN_INTERVAL),
    },
    SpeciesSpec {
        species: Species::Rapid,
        health: 3,
        points: 50,
        speed_factor: 2.0 / 3.0,
        scale: 1.0,
        weight: 20,
        unlock_after: 6,
        poo_interval: Some(RAPID_POO_INTERVAL),
    },
    SpeciesSpec {
        species: Species::Rare,
        health: 1,
        points: 200,
        speed_factor: 1.5,
        scale: 0.75,
        weight: 8,
        unlock_after: 8,
        poo_interval: None,
    },
];

/// Look up the balance row for a species
#[inline]
pub fn species_spec(species: Species) -> &'static SpeciesSpec {
    &SPECIES_TABLE[species.index()]
}

/// Number of upgrade tracks
pub const UPGRADE_TYPES: u32 = 4;
/// Upgrade steps per track (levels run 1..=UPGRADE_STEPS + 1)
pub const UPGRADE_STEPS: u32 = 3;

/// Scores that trigger the upgrade screen, ascending
pub const UPGRADE_SCORES: [u64; 12] = [
    50, 150, 300, 500, 750, 1050, 1400, 1800, 2250, 2750, 3300, 3900,
];

/// Linear stat ranges (magnitudes): (at level 1, at top level)
pub const MAX_HEALTH_RANGE: (i32, i32) = (6, 12);
pub const HERO_SPEED_RANGE: (f32, f32) = (150.0, 300.0);
pub const BULLET_SPEED_RANGE: (f32, f32) = (200.0, 500.0);

/// Geometric stat ranges (rates, in ticks): (at level 1, at top level)
pub const SHOT_PERIOD_RANGE: (f32, f32) = (60.0, 30.0);
/// Mean ticks between spawns across all species, from fresh run to max total
pub const SPAWN_FREQUENCY_RANGE: (f32, f32) = (300.0, 85.0);

/// Smallest the zoomed-out world gets
pub const MIN_WORLD_SCALE: f32 = 0.6;

/// Power-up balance
pub mod powerups {
    use super::PowerupKind;

    /// Weighted pick table for dropped pickups
    pub const DROP_WEIGHTS: [(PowerupKind, u32); 3] = [
        (PowerupKind::Health, 40),
        (PowerupKind::Shield, 35),
        (PowerupKind::SpreadShot, 25),
    ];

    /// Ticks a collected buff stays active
    pub const ACTIVE_TICKS: u32 = 10 * 60;
    /// Tail of the active window reported as `Expiring`
    pub const EXPIRING_TICKS: u32 = 2 * 60;
    /// Ticks an uncollected pickup survives on the ground
    pub const PICKUP_IDLE_TICKS: u32 = 5 * 60;
    /// Quiet ticks (no buff, no pickup) before the next kill drops one
    pub const NEXT_POWERUP_TICKS: u32 = 15 * 60;
    /// Pickup fall speed
    pub const FALL_SPEED: f32 = 100.0;
    /// Gun-angle offset of the outer spread-shot bullets (radians)
    pub const SPREAD_OFFSET: f32 = 0.3;
}

/// Hazard balance
pub mod hazards {
    /// Ticks a toxic patch persists
    pub const LIFETIME_TICKS: u32 = 5 * 60;
    /// Patch half extents
    pub const HALF_W: f32 = 30.0;
    pub const HALF_H: f32 = 8.0;
}
