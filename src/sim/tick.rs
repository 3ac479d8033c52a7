//! Fixed timestep simulation tick
//!
//! One call advances the whole game by a single 60 Hz step:
//! commands -> spawning -> motion -> contact resolution -> buffs ->
//! upgrade economy -> health/score bookkeeping. Nothing here touches an
//! engine; contacts come in through [`TickInput`], cosmetics go out as
//! [`GameEvent`]s.

use glam::Vec2;

use crate::aim_to_angle;
use crate::clamp;
use crate::consts::*;
use crate::tuning::{self, hazards, powerups};

use super::collision::{self, Contact, ContactBody, Effect};
use super::entity::{Bullet, Hazard, Pickup};
use super::powerup::BuffTransition;
use super::spawn;
use super::state::{Command, GameEvent, GamePhase, GameState, TickInput};
use super::upgrade::{UpgradeEconomy, UpgradeTrack};

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    apply_commands(state, &input.commands);

    // Paused, inactive, upgrading, and game-over states freeze the world:
    // no timers advance, no motion, no buff burn.
    if state.phase != GamePhase::Active {
        return;
    }

    state.tick_count += 1;
    if state.player.invincibility_ticks > 0 {
        state.player.invincibility_ticks -= 1;
    }

    steer_player(state, input, dt);
    run_gun(state, input);

    // Spawn scheduling
    state.scheduler.refresh_enabled(state.upgrades.total());
    let frequency = state.upgrades.spawn_frequency();
    let due = state.scheduler.advance(frequency, &mut state.rng);
    for species in due {
        spawn::spawn_bird(state, species);
    }
    run_poo_timers(state);
    state
        .scheduler
        .tick_powerup_idle(state.buff.is_idle(), !state.pickups.is_empty());

    integrate_motion(state, dt);

    // Host-reported contacts plus the ground contacts the sweep synthesizes
    let mut contacts = input.contacts.clone();
    sweep_bounds(state);
    collect_ground_contacts(state, &mut contacts);
    for contact in &contacts {
        // A body consumed earlier this tick invalidates its later contacts
        if !state.body_alive(&contact.a) || !state.body_alive(&contact.b) {
            continue;
        }
        for effect in collision::resolve(state, contact) {
            apply_effect(state, effect);
        }
    }

    run_buff(state);
    run_economy(state);
    finish_tick(state);

    // Deterministic iteration order for the next tick
    state.normalize_order();
}

/// Strict transition table; anything not listed is ignored
fn apply_commands(state: &mut GameState, commands: &[Command]) {
    for command in commands {
        match (state.phase, command) {
            (GamePhase::Inactive, Command::Start) => {
                state.phase = GamePhase::Active;
            }
            (GamePhase::Active, Command::TogglePause) => {
                state.phase = GamePhase::Paused;
            }
            (GamePhase::Paused, Command::TogglePause) => {
                state.phase = GamePhase::Active;
            }
            (GamePhase::Upgrading, Command::ChooseUpgrade(track)) => {
                if state.upgrades.choose(*track) {
                    state.push_event(GameEvent::UpgradeApplied { track: *track });
                    // Grace period while the player reorients
                    state.player.invincibility_ticks = INVINCIBILITY_TICKS;
                    state.phase = GamePhase::Active;
                } else {
                    log::warn!("ignored upgrade choice for maxed track {track:?}");
                }
            }
            _ => {}
        }
    }
}

fn steer_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let speed = state.upgrades.hero_speed() * state.world_scale;
    state.player.vx = clamp(input.move_axis, -1.0, 1.0) * speed;
    state.player.x += state.player.vx * dt;

    let half_w = HERO_HALF_W * state.world_scale;
    let limit = FIELD_HALF_WIDTH - half_w;
    state.player.x = clamp(state.player.x, -limit, limit);
    state.player.gun_angle = aim_to_angle(input.aim_axis);
}

fn run_gun(state: &mut GameState, input: &TickInput) {
    let period = state.upgrades.shot_period();
    if state.shot_timer < period {
        state.shot_timer += 1;
    }
    let firing = input.firing || state.config.auto_fire;
    if firing && state.shot_timer >= period {
        state.shot_timer = 0;
        fire_volley(state);
    }
}

/// Fire one bullet, or a three-bullet fan under spread shot
fn fire_volley(state: &mut GameState) {
    let speed = state.upgrades.bullet_speed() * state.world_scale;
    let barrel = GUN_LENGTH * state.world_scale;
    let origin = state.player.pos();

    let offsets: &[f32] = if state.buff.spread_active() {
        &[-powerups::SPREAD_OFFSET, 0.0, powerups::SPREAD_OFFSET]
    } else {
        &[0.0]
    };
    for &offset in offsets {
        let theta = state.player.gun_angle + offset;
        let dir = Vec2::new(-theta.sin(), theta.cos());
        let id = state.next_entity_id();
        state.bullets.push(Bullet {
            id,
            pos: origin + dir * barrel,
            vel: dir * speed,
        });
    }
    state.push_event(GameEvent::Shot);
}

/// Each live bird counts down its own dropping timer. The first lapse after
/// spawn only arms the bird, so nothing poos the instant it appears.
fn run_poo_timers(state: &mut GameState) {
    let mut due = Vec::new();
    for bird in &mut state.birds {
        if tuning::species_spec(bird.species).poo_interval.is_none() {
            continue;
        }
        if bird.poo_timer > 0 {
            bird.poo_timer -= 1;
            continue;
        }
        if !bird.started {
            bird.started = true;
        } else {
            due.push(bird.id);
        }
        if let Some(next) = spawn::reroll_poo_timer(&mut state.rng, bird.species) {
            bird.poo_timer = next;
        }
    }
    for id in due {
        spawn::spawn_poo(state, id);
    }
}

fn integrate_motion(state: &mut GameState, dt: f32) {
    for bird in &mut state.birds {
        bird.pos += bird.vel * dt;
    }
    for bullet in &mut state.bullets {
        bullet.pos += bullet.vel * dt;
    }
    for poo in &mut state.poops {
        poo.pos += poo.vel * dt;
    }
    for pickup in &mut state.pickups {
        if !pickup.landed() {
            pickup.pos += pickup.vel * dt;
        }
    }
    for hazard in &mut state.hazards {
        hazard.age += 1;
    }
}

/// Remove entities past the field bounds or out of lifetime
fn sweep_bounds(state: &mut GameState) {
    state.birds.retain(|b| b.pos.x.abs() <= CULL_X);
    state
        .bullets
        .retain(|b| b.pos.y <= BULLET_CULL_Y && b.pos.x.abs() <= CULL_X);
    state.poops.retain(|p| p.pos.x.abs() <= CULL_X);

    let mut expired_hazards = Vec::new();
    state.hazards.retain(|h| {
        if h.age >= hazards::LIFETIME_TICKS {
            expired_hazards.push(h.id);
            false
        } else {
            true
        }
    });
    for id in expired_hazards {
        state.push_event(GameEvent::HazardExpired { id });
    }

    // Landed pickups burn their idle timer and expire uncollected
    for pickup in &mut state.pickups {
        if let Some(remaining) = &mut pickup.idle_ticks {
            *remaining = remaining.saturating_sub(1);
        }
    }
    let mut expired_pickups = Vec::new();
    state.pickups.retain(|p| {
        if p.idle_ticks == Some(0) {
            expired_pickups.push(p.kind);
            false
        } else {
            true
        }
    });
    for kind in expired_pickups {
        state.push_event(GameEvent::PickupExpired { kind });
        state.scheduler.reset_powerup_idle();
    }
}

/// The ground is not a host body; landings are synthesized here and routed
/// through the same resolver as every other contact.
fn collect_ground_contacts(state: &GameState, contacts: &mut Vec<Contact>) {
    for poo in &state.poops {
        if poo.pos.y <= GROUND_Y {
            contacts.push(Contact::new(ContactBody::poo(poo.id), ContactBody::ground()));
        }
    }
    let half_h = Pickup::half_extents(state.world_scale).y;
    for pickup in &state.pickups {
        if !pickup.landed() && pickup.pos.y - half_h <= GROUND_Y {
            contacts.push(Contact::new(
                ContactBody::pickup(pickup.id),
                ContactBody::ground(),
            ));
        }
    }
}

fn apply_effect(state: &mut GameState, effect: Effect) {
    match effect {
        Effect::DamageBird { id } => damage_bird(state, id),
        Effect::DestroyBullet { id } => {
            state.bullets.retain(|b| b.id != id);
        }
        Effect::DestroyPoo { id } => {
            if let Some(poo) = state.poo(id) {
                let pos = poo.pos;
                state.push_event(GameEvent::Splat { pos });
            }
            state.poops.retain(|p| p.id != id);
        }
        Effect::HurtPlayer { damage } => {
            state.player.health = (state.player.health - damage).max(0);
            state.player.invincibility_ticks = INVINCIBILITY_TICKS;
            state.push_event(GameEvent::PlayerHurt {
                health: state.player.health,
            });
        }
        Effect::SpawnHazard { x } => {
            let id = state.next_entity_id();
            state.hazards.push(Hazard { id, x, age: 0 });
            state.push_event(GameEvent::HazardSpawned { x });
        }
        Effect::DestroyHazard { id } => {
            state.hazards.retain(|h| h.id != id);
        }
        Effect::LandPickup { id } => {
            let half_h = Pickup::half_extents(state.world_scale).y;
            if let Some(pickup) = state.pickup_mut(id) {
                pickup.vel = Vec2::ZERO;
                pickup.pos.y = GROUND_Y + half_h;
                pickup.idle_ticks = Some(powerups::PICKUP_IDLE_TICKS);
            }
        }
        Effect::CollectPickup { id } => {
            let Some(kind) = state.pickup(id).map(|p| p.kind) else {
                return;
            };
            state.pickups.retain(|p| p.id != id);
            state.buff.activate(kind);
            state.scheduler.reset_powerup_idle();
            state.push_event(GameEvent::PowerupCollected { kind });
        }
    }
}

/// Decrement a bird's health; on the killing hit, credit the score exactly
/// once, emit the cosmetics, and maybe drop an armed power-up.
fn damage_bird(state: &mut GameState, id: u32) {
    let Some(bird) = state.bird_mut(id) else {
        return;
    };
    if bird.health <= 0 {
        return;
    }
    bird.health -= 1;
    if bird.health > 0 {
        return;
    }

    let (species, pos, points) = (bird.species, bird.pos, bird.points);
    state.birds.retain(|b| b.id != id);
    state.score += points;
    state.first_kill = true;
    state.push_event(GameEvent::BirdDied {
        species,
        pos,
        points,
    });
    state.push_event(GameEvent::FloatingScore { pos, points });
    state.push_event(GameEvent::FeatherBurst { pos });

    if state.scheduler.take_drop() {
        spawn::spawn_pickup(state, pos);
    }
}

fn run_buff(state: &mut GameState) {
    match state.buff.advance() {
        BuffTransition::Expired(kind) => {
            state.scheduler.reset_powerup_idle();
            state.push_event(GameEvent::PowerupExpired { kind });
        }
        BuffTransition::StartedExpiring(_) | BuffTransition::None => {}
    }
    if state.buff.healing_active() {
        let cap = state.upgrades.max_health();
        if state.player.health < cap {
            state.player.health += 1;
        }
    }
}

fn run_economy(state: &mut GameState) {
    // Exactly one trigger per tick; a big score jump queues the rest
    if state.upgrades.take_trigger(state.score) {
        state.phase = GamePhase::Upgrading;
        state.push_event(GameEvent::UpgradeAvailable { score: state.score });
    }

    // Per-tick overshoot guard; a confirmed choice was already corrected
    state.upgrades.enforce_fairness(None);

    // A health upgrade also grants the new points immediately
    if state.upgrades.leveled_up(UpgradeTrack::Health) {
        let cap = state.upgrades.max_health();
        state.player.health = (state.player.health + UpgradeEconomy::health_step()).min(cap);
    }

    let new_scale = state.upgrades.world_scale();
    if (new_scale - state.world_scale).abs() > 1e-6 {
        rescale_world(state, new_scale);
    }

    state.upgrades.finish_tick();
}

/// Zoom the field out: every live entity shrinks, slows, and slides toward
/// the center by the same ratio. Grounded entities snap back to the ground
/// line afterwards.
fn rescale_world(state: &mut GameState, new_scale: f32) {
    let ratio = new_scale / state.world_scale;
    state.player.x *= ratio;
    for bird in &mut state.birds {
        bird.pos *= ratio;
        bird.vel *= ratio;
    }
    for bullet in &mut state.bullets {
        bullet.pos *= ratio;
        bullet.vel *= ratio;
    }
    for poo in &mut state.poops {
        poo.pos *= ratio;
        poo.vel *= ratio;
    }
    for hazard in &mut state.hazards {
        hazard.x *= ratio;
    }
    for pickup in &mut state.pickups {
        pickup.pos *= ratio;
        pickup.vel *= ratio;
        if pickup.landed() {
            pickup.pos.y = GROUND_Y + Pickup::half_extents(new_scale).y;
        }
    }
    log::debug!(
        "world rescaled {:.3} -> {:.3} (total level {})",
        state.world_scale,
        new_scale,
        state.upgrades.total()
    );
    state.world_scale = new_scale;
}

/// Health/score bookkeeping; the only place the game-over transition fires
fn finish_tick(state: &mut GameState) {
    if state.score > state.high_score {
        state.high_score = state.score;
    }

    if state.player.health <= 0 && state.phase != GamePhase::GameOver {
        state.player.health = 0;
        state.player.vx = 0.0;
        state.player.gun_angle = 0.0;
        state.bullets.clear();
        state.phase = GamePhase::GameOver;
        if state.score > state.config.high_score {
            state.push_event(GameEvent::NewHighScore { score: state.score });
        }
        state.push_event(GameEvent::GameOver { score: state.score });
        log::info!("game over at score {}", state.score);
    }
}
