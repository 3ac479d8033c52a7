//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity id)
//! - No rendering, physics-engine, or platform dependencies
//!
//! Overlap detection stays with the host; the tick consumes reported
//! [`collision::Contact`]s and emits [`state::GameEvent`]s.

pub mod collision;
pub mod entity;
pub mod powerup;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod upgrade;

pub use collision::{Category, Contact, ContactBody, Effect, resolve};
pub use entity::{Bird, Bullet, Hazard, Pickup, Poo, PooStyle, Side, Species};
pub use powerup::{BuffPhase, BuffTransition, PowerupKind, PowerupState};
pub use spawn::SpawnScheduler;
pub use state::{Command, GameEvent, GamePhase, GameState, Player, SessionConfig, TickInput};
pub use tick::tick;
pub use upgrade::{UpgradeEconomy, UpgradeTrack, geometric_stat, linear_stat};
