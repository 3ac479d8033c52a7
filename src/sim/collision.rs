//! Collision outcome resolution
//!
//! Overlap detection belongs to the host physics layer; this module only
//! decides what a reported contact means. [`resolve`] is a pure function of
//! the contact pair and the current state - it mutates nothing and returns
//! the effects for the tick to apply. Rules are symmetric in argument order.

use serde::{Deserialize, Serialize};

use super::state::GameState;

/// Singleton bodies (player, ground) use id 0
pub const SINGLETON_ID: u32 = 0;

/// Physics category of a contact body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Player,
    Bird,
    Bullet,
    Poo,
    Ground,
    Hazard,
    Powerup,
}

impl Category {
    /// Canonical ordering rank, so rule matching is order-independent
    fn rank(self) -> u8 {
        match self {
            Category::Player => 0,
            Category::Bird => 1,
            Category::Bullet => 2,
            Category::Poo => 3,
            Category::Ground => 4,
            Category::Hazard => 5,
            Category::Powerup => 6,
        }
    }
}

/// One side of a reported contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBody {
    pub category: Category,
    pub id: u32,
}

impl ContactBody {
    pub fn player() -> Self {
        Self {
            category: Category::Player,
            id: SINGLETON_ID,
        }
    }

    pub fn ground() -> Self {
        Self {
            category: Category::Ground,
            id: SINGLETON_ID,
        }
    }

    pub fn bird(id: u32) -> Self {
        Self {
            category: Category::Bird,
            id,
        }
    }

    pub fn bullet(id: u32) -> Self {
        Self {
            category: Category::Bullet,
            id,
        }
    }

    pub fn poo(id: u32) -> Self {
        Self {
            category: Category::Poo,
            id,
        }
    }

    pub fn hazard(id: u32) -> Self {
        Self {
            category: Category::Hazard,
            id,
        }
    }

    pub fn pickup(id: u32) -> Self {
        Self {
            category: Category::Powerup,
            id,
        }
    }
}

/// A contact reported by the host (or synthesized by the ground sweep)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub a: ContactBody,
    pub b: ContactBody,
}

impl Contact {
    pub fn new(a: ContactBody, b: ContactBody) -> Self {
        Self { a, b }
    }

    /// The pair with categories in canonical rank order
    fn ordered(&self) -> (ContactBody, ContactBody) {
        if self.a.category.rank() <= self.b.category.rank() {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }
}

/// State changes a contact demands; applied by the tick function
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    DamageBird { id: u32 },
    DestroyBullet { id: u32 },
    DestroyPoo { id: u32 },
    HurtPlayer { damage: i32 },
    SpawnHazard { x: f32 },
    DestroyHazard { id: u32 },
    /// Pickup touched down: zero vertical velocity, start idle expiry
    LandPickup { id: u32 },
    CollectPickup { id: u32 },
}

/// Whether the player can take damage right now
fn player_vulnerable(state: &GameState) -> bool {
    !state.player.invincible() && !state.buff.shield_active()
}

/// Resolve a contact into effects. Pure; unknown pairings resolve to nothing.
pub fn resolve(state: &GameState, contact: &Contact) -> Vec<Effect> {
    use Category::*;

    let (first, second) = contact.ordered();
    match (first.category, second.category) {
        (Bird, Bullet) => vec![
            Effect::DamageBird { id: first.id },
            Effect::DestroyBullet { id: second.id },
        ],

        (Bullet, Poo) => {
            let mut effects = vec![Effect::DestroyBullet { id: first.id }];
            let survives = state.poo(second.id).is_some_and(|p| p.survives_bullet());
            if !survives {
                effects.push(Effect::DestroyPoo { id: second.id });
            }
            effects
        }

        (Player, Poo) => {
            // Poo splats on the hero no matter what; damage only if vulnerable
            let mut effects = Vec::new();
            if player_vulnerable(state) {
                let heavy = state
                    .poo(second.id)
                    .is_some_and(|p| p.style == super::entity::PooStyle::Heavy);
                // Heavy poo deals a second point unless that would overshoot 0
                let damage = if heavy && state.player.health > 1 { 2 } else { 1 };
                effects.push(Effect::HurtPlayer { damage });
            }
            effects.push(Effect::DestroyPoo { id: second.id });
            effects
        }

        (Poo, Ground) => {
            let mut effects = Vec::new();
            if let Some(poo) = state.poo(first.id) {
                if poo.style == super::entity::PooStyle::Toxic {
                    effects.push(Effect::SpawnHazard { x: poo.pos.x });
                }
            }
            effects.push(Effect::DestroyPoo { id: first.id });
            effects
        }

        (Player, Hazard) => {
            let mut effects = Vec::new();
            if player_vulnerable(state) {
                effects.push(Effect::HurtPlayer { damage: 1 });
            }
            effects.push(Effect::DestroyHazard { id: second.id });
            effects
        }

        (Ground, Powerup) => {
            let falling = state.pickup(second.id).is_some_and(|p| !p.landed());
            if falling {
                vec![Effect::LandPickup { id: second.id }]
            } else {
                Vec::new()
            }
        }

        (Player, Powerup) => vec![Effect::CollectPickup { id: second.id }],

        _ => Vec::new(),
    }
}
