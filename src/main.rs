//! Bird Slayer entry point
//!
//! Headless demo host: owns everything the simulation core treats as
//! external - overlap detection, the save store, audio cue dispatch (logged
//! here), and the leaderboard - and drives the core with a simple autopilot
//! so a run can be watched through the log.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::Vec2;

use bird_slayer::audio::AudioDirector;
use bird_slayer::consts::*;
use bird_slayer::highscores::HighScores;
use bird_slayer::persistence::{Checkpoint, FileStore, KvStore, load_high_score, save_high_score};
use bird_slayer::settings::Settings;
use bird_slayer::sim::{
    Bullet, Command, Contact, ContactBody, GameEvent, GamePhase, GameState, Hazard, Pickup,
    TickInput, tick,
};

/// AABB overlap test
fn overlaps(pos_a: Vec2, half_a: Vec2, pos_b: Vec2, half_b: Vec2) -> bool {
    (pos_a.x - pos_b.x).abs() <= half_a.x + half_b.x
        && (pos_a.y - pos_b.y).abs() <= half_a.y + half_b.y
}

/// The host-side physics stand-in: report every overlapping pair the
/// resolver has a rule for. Ground contacts are synthesized by the core.
fn detect_contacts(state: &GameState) -> Vec<Contact> {
    let scale = state.world_scale;
    let mut contacts = Vec::new();

    let player_pos = state.player.pos();
    let player_half = Vec2::new(HERO_HALF_W, HERO_HALF_H) * scale;
    let bullet_half = Bullet::half_extents(scale);
    let pickup_half = Pickup::half_extents(scale);
    let hazard_half = Hazard::half_extents(scale);

    for bird in &state.birds {
        let half = bird.half_extents(scale);
        for bullet in &state.bullets {
            if overlaps(bird.pos, half, bullet.pos, bullet_half) {
                contacts.push(Contact::new(
                    ContactBody::bird(bird.id),
                    ContactBody::bullet(bullet.id),
                ));
            }
        }
    }
    for poo in &state.poops {
        let half = poo.half_extents(scale);
        if overlaps(player_pos, player_half, poo.pos, half) {
            contacts.push(Contact::new(
                ContactBody::player(),
                ContactBody::poo(poo.id),
            ));
        }
        for bullet in &state.bullets {
            if overlaps(poo.pos, half, bullet.pos, bullet_half) {
                contacts.push(Contact::new(
                    ContactBody::bullet(bullet.id),
                    ContactBody::poo(poo.id),
                ));
            }
        }
    }
    for hazard in &state.hazards {
        if overlaps(player_pos, player_half, hazard.pos(scale), hazard_half) {
            contacts.push(Contact::new(
                ContactBody::player(),
                ContactBody::hazard(hazard.id),
            ));
        }
    }
    for pickup in &state.pickups {
        if overlaps(player_pos, player_half, pickup.pos, pickup_half) {
            contacts.push(Contact::new(
                ContactBody::player(),
                ContactBody::pickup(pickup.id),
            ));
        }
    }
    contacts
}

/// Demo autopilot: aim at the nearest bird, sidestep incoming droppings,
/// stroll toward landed pickups otherwise.
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.pos();

    // Dropping closing in on the lane takes priority
    let threat = state
        .poops
        .iter()
        .filter(|p| (p.pos.x - player.x).abs() < 60.0 && p.pos.y < 0.0)
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));
    let move_axis = if let Some(poo) = threat {
        if poo.pos.x >= player.x { -1.0 } else { 1.0 }
    } else if let Some(pickup) = state.pickups.iter().find(|p| p.landed()) {
        (pickup.pos.x - player.x).clamp(-1.0, 1.0)
    } else {
        0.0
    };

    // Aim so the barrel points at the nearest bird
    let target = state.birds.iter().min_by(|a, b| {
        (a.pos - player)
            .length_squared()
            .total_cmp(&(b.pos - player).length_squared())
    });
    let aim_axis = match target {
        Some(bird) => {
            let to_bird = bird.pos - player;
            // Barrel direction is (-sin, cos): angle that points at the bird
            let angle = (-to_bird.x).atan2(to_bird.y);
            (angle / std::f32::consts::FRAC_PI_2).clamp(-1.0, 1.0)
        }
        None => 0.0,
    };

    TickInput {
        move_axis,
        aim_axis,
        firing: true,
        ..Default::default()
    }
}

fn unix_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

fn main() {
    env_logger::init();

    let save_path = std::env::temp_dir().join("bird-slayer-save.json");
    let mut store = FileStore::open(&save_path);
    let settings = Settings::load(&store);
    let mut highscores = HighScores::load(&store);
    let high_score = load_high_score(&store);

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or_else(|| unix_millis() as u64);
    log::info!("starting session, seed={seed} high_score={high_score}");

    let mut state = GameState::new(seed, settings.session_config(high_score));
    if let Some(checkpoint) = Checkpoint::load(&store) {
        checkpoint.restore(&mut state);
    }

    let mut director = AudioDirector::new(settings.sound, settings.music);
    let mut current_track = None;

    // First touch
    let start = TickInput {
        commands: vec![Command::Start],
        ..Default::default()
    };
    tick(&mut state, &start, SIM_DT);

    // Ten minutes of play, tops
    for _ in 0..10 * 60 * 60 {
        let mut input = autopilot(&state);
        input.contacts = detect_contacts(&state);

        // The autopilot always picks the first track on the upgrade screen
        if state.phase == GamePhase::Upgrading {
            input
                .commands
                .push(Command::ChooseUpgrade(first_open_track(&state)));
        }

        tick(&mut state, &input, SIM_DT);

        let events = state.drain_events();
        for event in &events {
            match event {
                GameEvent::BirdDied { species, points, .. } => {
                    log::info!("killed {species:?} (+{points}), score={}", state.score);
                }
                GameEvent::UpgradeApplied { track } => {
                    log::info!("upgraded {track:?}, total={}", state.upgrades.total());
                }
                GameEvent::PowerupCollected { kind } => {
                    log::info!("collected {kind:?}");
                }
                _ => {}
            }
        }
        for cue in director.cues_for(&events) {
            log::debug!("cue: {}", cue.name());
        }
        let track = director.music();
        if track != current_track {
            if let Some(track) = track {
                log::info!("music: {}", track.name());
            }
            current_track = track;
        }

        // Save-on-tick checkpoint while playing
        if state.phase == GamePhase::Active {
            Checkpoint::capture(&state).save(&mut store);
            save_high_score(&mut store, state.high_score);
        }

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    if state.phase == GamePhase::GameOver {
        Checkpoint::clear(&mut store);
        save_high_score(&mut store, state.score);
        if let Some(rank) = highscores.add_score(state.score, state.upgrades.total(), unix_millis())
        {
            log::info!("leaderboard rank {rank}");
        }
        highscores.save(&mut store);
    }
    if let Err(err) = store.flush() {
        log::warn!("failed to write save file: {err}");
    }

    println!(
        "final score {} (best {}), total upgrade level {}",
        state.score,
        state.high_score.max(state.score),
        state.upgrades.total()
    );
}

/// First track with room to grow; falls back to Health
fn first_open_track(state: &GameState) -> bird_slayer::sim::UpgradeTrack {
    use bird_slayer::sim::UpgradeTrack;
    UpgradeTrack::ALL
        .into_iter()
        .find(|t| state.upgrades.can_upgrade(*t))
        .unwrap_or(UpgradeTrack::Health)
}
