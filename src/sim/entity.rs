//! Transient entity types and their lifecycle data
//!
//! Every entity carries a unique `u32` id drawn from the game state's
//! monotonic counter; ids are never reused, so a stale handle can only miss,
//! never alias. Collections are swept with `retain` after each tick - the
//! mutate-while-iterating index dance is designed out.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::powerup::PowerupKind;
use crate::tuning;

/// Bird variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Species {
    Normal,
    Smart,
    Toxic,
    Big,
    Rapid,
    Rare,
}

impl Species {
    /// All species, in unlock order
    pub const ALL: [Species; 6] = [
        Species::Normal,
        Species::Smart,
        Species::Toxic,
        Species::Big,
        Species::Rapid,
        Species::Rare,
    ];

    /// Stable index into per-species arrays and the tuning table
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Species::Normal => 0,
            Species::Smart => 1,
            Species::Toxic => 2,
            Species::Big => 3,
            Species::Rapid => 4,
            Species::Rare => 5,
        }
    }
}

/// Which edge of the field a bird entered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

/// A bird crossing the sky band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bird {
    pub id: u32,
    pub species: Species,
    pub pos: Vec2,
    pub vel: Vec2,
    pub health: i32,
    pub points: u64,
    pub direction: Side,
    /// Ticks until the next dropping
    pub poo_timer: u32,
    /// First timer lapse arms the bird instead of firing, so a fresh spawn
    /// never poos instantly
    pub started: bool,
}

impl Bird {
    /// Half extents at the given world scale
    pub fn half_extents(&self, world_scale: f32) -> Vec2 {
        let s = tuning::species_spec(self.species).scale * world_scale;
        Vec2::new(20.0 * s, 12.0 * s)
    }
}

/// A bullet fired by the hero's gun
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Bullet {
    pub fn half_extents(world_scale: f32) -> Vec2 {
        Vec2::new(3.0, 6.0) * world_scale
    }
}

/// Dropping flavor, fixed at creation from the parent species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PooStyle {
    /// Straight down
    Plain,
    /// One-shot intercept toward the player at creation time
    Aimed,
    /// Double size, double damage, survives bullets, falls slower
    Heavy,
    /// Leaves a ground hazard where it lands
    Toxic,
}

/// A falling dropping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poo {
    pub id: u32,
    pub style: PooStyle,
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Poo {
    /// Heavy poo shrugs off bullets
    #[inline]
    pub fn survives_bullet(&self) -> bool {
        self.style == PooStyle::Heavy
    }

    pub fn half_extents(&self, world_scale: f32) -> Vec2 {
        let s = if self.style == PooStyle::Heavy { 2.0 } else { 1.0 };
        Vec2::splat(6.0 * s * world_scale)
    }
}

/// A toxic patch on the ground
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub x: f32,
    /// Ticks since creation; removed at the tuned lifetime
    pub age: u32,
}

impl Hazard {
    pub fn half_extents(world_scale: f32) -> Vec2 {
        Vec2::new(tuning::hazards::HALF_W, tuning::hazards::HALF_H) * world_scale
    }

    pub fn pos(&self, world_scale: f32) -> Vec2 {
        Vec2::new(self.x, GROUND_Y + tuning::hazards::HALF_H * world_scale)
    }
}

/// A falling power-up pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PowerupKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// `Some(remaining)` once landed; the pickup expires uncollected at 0
    pub idle_ticks: Option<u32>,
}

impl Pickup {
    #[inline]
    pub fn landed(&self) -> bool {
        self.idle_ticks.is_some()
    }

    pub fn half_extents(world_scale: f32) -> Vec2 {
        Vec2::splat(12.0 * world_scale)
    }
}
