//! Spawn scheduling
//!
//! Per-species countdown timers decide when birds appear; each live bird
//! runs its own dropping timer; a global quiet-period countdown arms
//! power-up drops. All intervals re-roll from the seeded RNG stream as
//! `rate/2 + uniform(0, rate)`, so the mean interval tracks the tuned rate
//! while staying unpredictable.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::{self, SPECIES_TABLE, UPGRADE_TYPES, powerups};

use super::entity::{Bird, Pickup, Poo, PooStyle, Side, Species};
use super::powerup::PowerupKind;
use super::state::{GameEvent, GameState};

/// Downward aim lead of smart droppings (world units at scale 1)
const AIMED_POO_LEAD: f32 = 100.0;
/// Droppings leave the bird slightly below its center
const POO_DROP_OFFSET: f32 = 10.0;

/// Re-roll an interval around `rate`: uniform in [rate/2, 3*rate/2)
fn roll_interval(rng: &mut Pcg32, rate: u32) -> u32 {
    let rate = rate.max(1);
    rate / 2 + rng.random_range(0..rate)
}

/// Per-species spawn timers plus the power-up drop countdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// Ticks elapsed since the species last spawned
    spawn_timer: [u32; 6],
    /// Ticks until the next spawn; 0 means not yet rolled
    spawn_time: [u32; 6],
    /// Species become enabled as the upgrade total climbs, never re-disabled
    enabled: [bool; 6],
    /// Quiet ticks counted toward the next power-up drop
    powerup_idle: u32,
    /// A lapsed quiet period arms the next kill to drop a pickup
    drop_armed: bool,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    pub fn new() -> Self {
        let mut enabled = [false; 6];
        enabled[Species::Normal.index()] = true;
        Self {
            spawn_timer: [0; 6],
            spawn_time: [0; 6],
            enabled,
            powerup_idle: 0,
            drop_armed: false,
        }
    }

    #[inline]
    pub fn species_enabled(&self, species: Species) -> bool {
        self.enabled[species.index()]
    }

    /// Enable species whose unlock threshold the upgrade total has reached
    pub fn refresh_enabled(&mut self, total_level: u32) {
        for spec in &SPECIES_TABLE {
            let slot = &mut self.enabled[spec.species.index()];
            if !*slot && total_level >= UPGRADE_TYPES + spec.unlock_after {
                *slot = true;
                log::info!("species unlocked: {:?}", spec.species);
            }
        }
    }

    /// Sum of weights of all currently-enabled species
    fn ratio_total(&self) -> u32 {
        SPECIES_TABLE
            .iter()
            .filter(|s| self.enabled[s.species.index()])
            .map(|s| s.weight)
            .sum()
    }

    /// Advance every enabled species' timer by one tick; returns the species
    /// due to spawn. `frequency` is the economy's current mean spawn interval.
    pub fn advance(&mut self, frequency: u32, rng: &mut Pcg32) -> Vec<Species> {
        let ratio_total = self.ratio_total();
        let mut due = Vec::new();
        for spec in &SPECIES_TABLE {
            let i = spec.species.index();
            if !self.enabled[i] {
                continue;
            }
            let rate = (frequency * ratio_total / spec.weight).max(1);
            if self.spawn_time[i] == 0 {
                // First activation: full rate before the first roll
                self.spawn_time[i] = rate;
            }
            self.spawn_timer[i] += 1;
            if self.spawn_timer[i] >= self.spawn_time[i] {
                due.push(spec.species);
                self.spawn_timer[i] = 0;
                self.spawn_time[i] = roll_interval(rng, rate);
            }
        }
        due
    }

    /// Count quiet time toward the next drop. Quiet means no buff running
    /// and no pickup already on the field.
    pub fn tick_powerup_idle(&mut self, buff_idle: bool, pickup_on_field: bool) {
        if self.drop_armed || !buff_idle || pickup_on_field {
            return;
        }
        self.powerup_idle += 1;
        if self.powerup_idle >= powerups::NEXT_POWERUP_TICKS {
            self.powerup_idle = 0;
            self.drop_armed = true;
        }
    }

    #[inline]
    pub fn drop_armed(&self) -> bool {
        self.drop_armed
    }

    /// Consume the armed drop, if any
    pub fn take_drop(&mut self) -> bool {
        std::mem::take(&mut self.drop_armed)
    }

    /// Restart the quiet-period countdown (on collection or expiry)
    pub fn reset_powerup_idle(&mut self) {
        self.powerup_idle = 0;
        self.drop_armed = false;
    }
}

/// Spawn a bird of the given species at a random side and height
pub fn spawn_bird(state: &mut GameState, species: Species) {
    let spec = tuning::species_spec(species);
    let scale = spec.scale * state.world_scale;

    let side = if state.rng.random_range(0..2u32) == 0 {
        Side::Right
    } else {
        Side::Left
    };
    let full_height = 24.0 * scale;
    let y = state.rng.random_range(SKY_BOTTOM..(SKY_TOP - full_height));

    let speed = spec.speed_factor * BASE_BIRD_SPEED * state.world_scale;
    let (x, vx) = match side {
        // Direction names the side the bird travels toward
        Side::Left => (SPAWN_X, -speed),
        Side::Right => (-SPAWN_X, speed),
    };

    let id = state.next_entity_id();
    state.birds.push(Bird {
        id,
        species,
        pos: Vec2::new(x, y),
        vel: Vec2::new(vx, 0.0),
        health: spec.health,
        points: spec.points,
        direction: side,
        poo_timer: 0,
        started: false,
    });
}

/// Dropping flavor for a species
fn poo_style(species: Species) -> PooStyle {
    match species {
        Species::Smart => PooStyle::Aimed,
        Species::Big => PooStyle::Heavy,
        Species::Toxic => PooStyle::Toxic,
        _ => PooStyle::Plain,
    }
}

/// Fire a dropping from the bird. Aimed droppings take a one-shot intercept
/// toward the player's position at creation time, with the horizontal lead
/// clamped to the vertical distance so the arc stays within ~45 degrees.
pub fn spawn_poo(state: &mut GameState, bird_id: u32) {
    let Some(bird) = state.bird(bird_id) else {
        return;
    };
    let style = poo_style(bird.species);
    let pos = bird.pos - Vec2::new(0.0, POO_DROP_OFFSET * state.world_scale);
    let speed = POO_SPEED * state.world_scale;

    let vel = match style {
        PooStyle::Aimed => {
            let target = state.player.pos() - Vec2::new(0.0, AIMED_POO_LEAD * state.world_scale);
            let dy = target.y - pos.y;
            // Clamp before normalizing; also covers the directly-overhead case
            let dx = crate::clamp(target.x - pos.x, -dy.abs(), dy.abs());
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < 1e-3 {
                Vec2::new(0.0, -speed)
            } else {
                Vec2::new(dx, dy) / dist * speed
            }
        }
        PooStyle::Heavy => Vec2::new(0.0, -HEAVY_POO_FALL_FACTOR * speed),
        PooStyle::Plain | PooStyle::Toxic => Vec2::new(0.0, -speed),
    };

    let id = state.next_entity_id();
    state.poops.push(Poo {
        id,
        style,
        pos,
        vel,
    });
}

/// Weighted pick among the power-up kinds
pub fn pick_powerup_kind(rng: &mut Pcg32) -> PowerupKind {
    let total: u32 = powerups::DROP_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for &(kind, weight) in &powerups::DROP_WEIGHTS {
        if roll < weight {
            return kind;
        }
        roll -= weight;
    }
    powerups::DROP_WEIGHTS[0].0
}

/// Drop a pickup at a kill position
pub fn spawn_pickup(state: &mut GameState, pos: Vec2) {
    let kind = pick_powerup_kind(&mut state.rng);
    let id = state.next_entity_id();
    state.pickups.push(Pickup {
        id,
        kind,
        pos,
        vel: Vec2::new(0.0, -powerups::FALL_SPEED * state.world_scale),
        idle_ticks: None,
    });
    state.push_event(GameEvent::PowerupDropped { kind, pos });
}

/// Re-roll a bird's dropping timer. Rapid birds use their fixed interval.
pub fn reroll_poo_timer(rng: &mut Pcg32, species: Species) -> Option<u32> {
    let interval = tuning::species_spec(species).poo_interval?;
    Some(if species == Species::Rapid {
        interval
    } else {
        roll_interval(rng, interval)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SessionConfig;
    use rand::SeedableRng;

    #[test]
    fn only_normal_enabled_at_start() {
        let sched = SpawnScheduler::new();
        assert!(sched.species_enabled(Species::Normal));
        for s in &Species::ALL[1..] {
            assert!(!sched.species_enabled(*s));
        }
    }

    #[test]
    fn unlocks_follow_total_level_and_stick() {
        let mut sched = SpawnScheduler::new();
        sched.refresh_enabled(UPGRADE_TYPES + 2);
        assert!(sched.species_enabled(Species::Smart));
        assert!(!sched.species_enabled(Species::Big));
        // Lower total later must not re-disable
        sched.refresh_enabled(UPGRADE_TYPES);
        assert!(sched.species_enabled(Species::Smart));
    }

    #[test]
    fn intervals_resample_within_bounds() {
        let mut rng = Pcg32::seed_from_u64(99);
        let rate = 300;
        for _ in 0..1000 {
            let t = roll_interval(&mut rng, rate);
            assert!(t >= rate / 2);
            assert!(t < rate + rate / 2);
        }
    }

    #[test]
    fn interval_mean_tracks_rate() {
        let mut rng = Pcg32::seed_from_u64(7);
        let rate = 300u32;
        let n = 4000;
        let sum: u64 = (0..n).map(|_| roll_interval(&mut rng, rate) as u64).sum();
        let mean = sum as f64 / n as f64;
        // Mean of [rate/2, 3*rate/2) is ~rate
        assert!((mean - rate as f64).abs() < rate as f64 * 0.05);
    }

    #[test]
    fn advance_spawns_after_full_interval() {
        let mut sched = SpawnScheduler::new();
        let mut rng = Pcg32::seed_from_u64(5);
        // One enabled species, 300-tick rate: nothing for 299 ticks,
        // then the first spawn lands exactly on tick 300
        for _ in 0..299 {
            assert!(sched.advance(300, &mut rng).is_empty());
        }
        assert_eq!(sched.advance(300, &mut rng), vec![Species::Normal]);
    }

    #[test]
    fn powerup_idle_arms_once_then_consumes() {
        let mut sched = SpawnScheduler::new();
        for _ in 0..powerups::NEXT_POWERUP_TICKS {
            sched.tick_powerup_idle(true, false);
        }
        assert!(sched.drop_armed());
        // Armed countdown stops accumulating
        sched.tick_powerup_idle(true, false);
        assert!(sched.take_drop());
        assert!(!sched.drop_armed());
        assert!(!sched.take_drop());
    }

    #[test]
    fn powerup_idle_frozen_while_buff_active_or_pickup_out() {
        let mut sched = SpawnScheduler::new();
        for _ in 0..powerups::NEXT_POWERUP_TICKS * 2 {
            sched.tick_powerup_idle(false, false);
            sched.tick_powerup_idle(true, true);
        }
        assert!(!sched.drop_armed());
    }

    #[test]
    fn aimed_poo_clamps_horizontal_lead() {
        let mut state = GameState::new(3, SessionConfig::default());
        spawn_bird(&mut state, Species::Smart);
        // Park the bird far to one side so the raw intercept would exceed 45°
        let id = state.birds[0].id;
        state.birds[0].pos = Vec2::new(250.0, 150.0);
        state.player.x = -250.0;
        spawn_poo(&mut state, id);
        let poo = &state.poops[0];
        assert_eq!(poo.style, PooStyle::Aimed);
        assert!(poo.vel.x.abs() <= poo.vel.y.abs() + 1e-3);
        assert!(poo.vel.y < 0.0);
    }

    #[test]
    fn aimed_poo_straight_down_when_overhead() {
        let mut state = GameState::new(3, SessionConfig::default());
        spawn_bird(&mut state, Species::Smart);
        let id = state.birds[0].id;
        state.birds[0].pos = Vec2::new(0.0, 100.0);
        state.player.x = 0.0;
        spawn_poo(&mut state, id);
        let poo = &state.poops[0];
        assert!(poo.vel.x.abs() < 1e-3);
        assert!(poo.vel.y < 0.0);
    }

    #[test]
    fn heavy_poo_falls_slower() {
        let mut state = GameState::new(3, SessionConfig::default());
        spawn_bird(&mut state, Species::Big);
        let id = state.birds[0].id;
        spawn_poo(&mut state, id);
        let expected = -HEAVY_POO_FALL_FACTOR * POO_SPEED * state.world_scale;
        assert!((state.poops[0].vel.y - expected).abs() < 1e-3);
    }

    #[test]
    fn rapid_poo_interval_is_fixed() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..10 {
            assert_eq!(
                reroll_poo_timer(&mut rng, Species::Rapid),
                Some(RAPID_POO_INTERVAL)
            );
        }
        assert_eq!(reroll_poo_timer(&mut rng, Species::Rare), None);
    }

    #[test]
    fn weighted_kind_pick_covers_all_kinds() {
        let mut rng = Pcg32::seed_from_u64(123);
        let mut seen = [false; 3];
        for _ in 0..500 {
            match pick_powerup_kind(&mut rng) {
                PowerupKind::Health => seen[0] = true,
                PowerupKind::Shield => seen[1] = true,
                PowerupKind::SpreadShot => seen[2] = true,
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn spawned_bird_heads_for_the_far_side() {
        let mut state = GameState::new(21, SessionConfig::default());
        for _ in 0..20 {
            spawn_bird(&mut state, Species::Normal);
        }
        for bird in &state.birds {
            match bird.direction {
                Side::Left => {
                    assert!(bird.pos.x > 0.0);
                    assert!(bird.vel.x < 0.0);
                }
                Side::Right => {
                    assert!(bird.pos.x < 0.0);
                    assert!(bird.vel.x > 0.0);
                }
            }
            assert!(bird.pos.y >= SKY_BOTTOM && bird.pos.y <= SKY_TOP);
            assert!(!bird.started);
        }
    }
}
