//! Upgrade economy
//!
//! Four stat tracks level up independently through player choices at score
//! thresholds. Every difficulty constant in the game derives from the track
//! levels: rates interpolate geometrically, magnitudes linearly, and the
//! world zoom-out scale follows the combined total.

use serde::{Deserialize, Serialize};

use crate::tuning::{
    BULLET_SPEED_RANGE, HERO_SPEED_RANGE, MAX_HEALTH_RANGE, MIN_WORLD_SCALE, SHOT_PERIOD_RANGE,
    SPAWN_FREQUENCY_RANGE, UPGRADE_SCORES, UPGRADE_STEPS, UPGRADE_TYPES,
};

/// One of the four player stat tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeTrack {
    Health,
    Speed,
    FireRate,
    BulletSpeed,
}

impl UpgradeTrack {
    pub const ALL: [UpgradeTrack; 4] = [
        UpgradeTrack::Health,
        UpgradeTrack::Speed,
        UpgradeTrack::FireRate,
        UpgradeTrack::BulletSpeed,
    ];

    /// Rollback order for the fairness correction, most expendable first
    const ROLLBACK_ORDER: [UpgradeTrack; 4] = [
        UpgradeTrack::BulletSpeed,
        UpgradeTrack::FireRate,
        UpgradeTrack::Speed,
        UpgradeTrack::Health,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            UpgradeTrack::Health => 0,
            UpgradeTrack::Speed => 1,
            UpgradeTrack::FireRate => 2,
            UpgradeTrack::BulletSpeed => 3,
        }
    }
}

/// Linear interpolation for magnitude-type stats.
/// Levels run 1..=steps+1; level 1 yields `min`, the top level yields `max`.
#[inline]
pub fn linear_stat(min: f32, max: f32, level: u32, steps: u32) -> f32 {
    min + (max - min) * (level - 1) as f32 / steps as f32
}

/// Geometric interpolation for rate-type stats (periods and frequencies).
#[inline]
pub fn geometric_stat(min: f32, max: f32, level: u32, steps: u32) -> f32 {
    min * (max / min).powf((level - 1) as f32 / steps as f32)
}

/// The four-track upgrade state plus its previous-tick snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeEconomy {
    levels: [u32; 4],
    old_levels: [u32; 4],
    /// Trigger scores not yet crossed, ascending
    pending_scores: Vec<u64>,
}

impl Default for UpgradeEconomy {
    fn default() -> Self {
        Self::new()
    }
}

impl UpgradeEconomy {
    pub fn new() -> Self {
        Self {
            levels: [1; 4],
            old_levels: [1; 4],
            pending_scores: UPGRADE_SCORES.to_vec(),
        }
    }

    /// Highest level a track can reach
    #[inline]
    pub fn max_level() -> u32 {
        UPGRADE_STEPS + 1
    }

    #[inline]
    pub fn level(&self, track: UpgradeTrack) -> u32 {
        self.levels[track.index()]
    }

    /// Sum of current track levels; the game's difficulty scalar
    pub fn total(&self) -> u32 {
        self.levels.iter().sum()
    }

    pub fn old_total(&self) -> u32 {
        self.old_levels.iter().sum()
    }

    /// Starting total (all tracks at level 1)
    #[inline]
    pub fn base_total() -> u32 {
        UPGRADE_TYPES
    }

    /// Total with every track maxed
    #[inline]
    pub fn max_total() -> u32 {
        UPGRADE_TYPES * Self::max_level()
    }

    pub fn can_upgrade(&self, track: UpgradeTrack) -> bool {
        self.level(track) < Self::max_level()
    }

    /// Apply a player's track choice. Returns false if the track is maxed.
    pub fn choose(&mut self, track: UpgradeTrack) -> bool {
        if !self.can_upgrade(track) {
            return false;
        }
        self.levels[track.index()] += 1;
        self.enforce_fairness(Some(track));
        true
    }

    /// The next trigger score, if any upgrades remain
    pub fn next_trigger(&self) -> Option<u64> {
        self.pending_scores.first().copied()
    }

    /// Consume at most one trigger the score has crossed
    pub fn take_trigger(&mut self, score: u64) -> bool {
        match self.pending_scores.first() {
            Some(&threshold) if score >= threshold => {
                self.pending_scores.remove(0);
                true
            }
            _ => false,
        }
    }

    /// Roll levels back until at most one net level was gained this tick.
    ///
    /// Walks the fixed rollback order, never below the previous-tick
    /// snapshot, and never touches the track the player just confirmed.
    pub fn enforce_fairness(&mut self, confirmed: Option<UpgradeTrack>) {
        let mut index = 0;
        while self.total() - self.old_total() > 1 && index < 4 * UpgradeTrack::ROLLBACK_ORDER.len()
        {
            let track = UpgradeTrack::ROLLBACK_ORDER[index % UpgradeTrack::ROLLBACK_ORDER.len()];
            index += 1;
            if Some(track) == confirmed {
                continue;
            }
            let i = track.index();
            let floor = self.old_levels[i];
            if self.levels[i] > floor {
                self.levels[i] -= 1;
                log::warn!("upgrade overshoot: rolled back {track:?} to {}", self.levels[i]);
            }
        }
    }

    /// Whether the track gained a level since the last snapshot
    pub fn leveled_up(&self, track: UpgradeTrack) -> bool {
        self.levels[track.index()] == self.old_levels[track.index()] + 1
    }

    /// End-of-tick snapshot; after this, `total() == old_total()`
    pub fn finish_tick(&mut self) {
        self.old_levels = self.levels;
    }

    /// Restore track levels from a saved session
    pub fn restore_levels(&mut self, levels: [u32; 4], score: u64) {
        for (slot, level) in self.levels.iter_mut().zip(levels) {
            *slot = level.clamp(1, Self::max_level());
        }
        self.old_levels = self.levels;
        self.pending_scores.retain(|&s| s > score);
    }

    // --- Derived stats -----------------------------------------------------

    pub fn max_health(&self) -> i32 {
        linear_stat(
            MAX_HEALTH_RANGE.0 as f32,
            MAX_HEALTH_RANGE.1 as f32,
            self.level(UpgradeTrack::Health),
            UPGRADE_STEPS,
        )
        .round() as i32
    }

    /// Health points granted alongside a health upgrade
    pub fn health_step() -> i32 {
        (MAX_HEALTH_RANGE.1 - MAX_HEALTH_RANGE.0) / UPGRADE_STEPS as i32
    }

    pub fn hero_speed(&self) -> f32 {
        linear_stat(
            HERO_SPEED_RANGE.0,
            HERO_SPEED_RANGE.1,
            self.level(UpgradeTrack::Speed),
            UPGRADE_STEPS,
        )
    }

    pub fn bullet_speed(&self) -> f32 {
        linear_stat(
            BULLET_SPEED_RANGE.0,
            BULLET_SPEED_RANGE.1,
            self.level(UpgradeTrack::BulletSpeed),
            UPGRADE_STEPS,
        )
    }

    /// Ticks between shots while the trigger is held
    pub fn shot_period(&self) -> u32 {
        geometric_stat(
            SHOT_PERIOD_RANGE.0,
            SHOT_PERIOD_RANGE.1,
            self.level(UpgradeTrack::FireRate),
            UPGRADE_STEPS,
        )
        .round() as u32
    }

    /// Mean ticks between bird spawns across all enabled species.
    /// Falls geometrically as the combined upgrade total climbs.
    pub fn spawn_frequency(&self) -> u32 {
        let steps = Self::max_total() - Self::base_total();
        geometric_stat(
            SPAWN_FREQUENCY_RANGE.0,
            SPAWN_FREQUENCY_RANGE.1,
            self.total() - Self::base_total() + 1,
            steps,
        )
        .round() as u32
    }

    /// World zoom-out factor in (0, 1]; shrinks geometrically with the total
    pub fn world_scale(&self) -> f32 {
        let steps = Self::max_total() - Self::base_total();
        geometric_stat(
            1.0,
            MIN_WORLD_SCALE,
            self.total() - Self::base_total() + 1,
            steps,
        )
        .max(MIN_WORLD_SCALE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fresh_economy_is_level_one_everywhere() {
        let eco = UpgradeEconomy::new();
        assert_eq!(eco.total(), 4);
        assert_eq!(eco.old_total(), 4);
        assert_eq!(eco.max_health(), 6);
        assert_eq!(eco.hero_speed(), 150.0);
        assert_eq!(eco.bullet_speed(), 200.0);
        assert_eq!(eco.shot_period(), 60);
    }

    #[test]
    fn maxed_tracks_hit_the_tuned_caps() {
        let mut eco = UpgradeEconomy::new();
        for track in UpgradeTrack::ALL {
            while eco.can_upgrade(track) {
                assert!(eco.choose(track));
                eco.finish_tick();
            }
        }
        assert_eq!(eco.total(), UpgradeEconomy::max_total());
        assert_eq!(eco.max_health(), 12);
        assert_eq!(eco.hero_speed(), 300.0);
        assert_eq!(eco.bullet_speed(), 500.0);
        assert_eq!(eco.shot_period(), 30);
        assert!((eco.world_scale() - MIN_WORLD_SCALE).abs() < 1e-3);
    }

    #[test]
    fn choose_rejects_maxed_track() {
        let mut eco = UpgradeEconomy::new();
        for _ in 0..UPGRADE_STEPS {
            assert!(eco.choose(UpgradeTrack::Speed));
            eco.finish_tick();
        }
        assert!(!eco.choose(UpgradeTrack::Speed));
    }

    #[test]
    fn fairness_rolls_back_double_gain() {
        let mut eco = UpgradeEconomy::new();
        // Two choices landing in the same tick: the second survives, the
        // first is rolled back by the correction loop.
        assert!(eco.choose(UpgradeTrack::Health));
        assert!(eco.choose(UpgradeTrack::Speed));
        assert!(eco.total() - eco.old_total() <= 1);
        assert_eq!(eco.level(UpgradeTrack::Speed), 2);
        assert_eq!(eco.level(UpgradeTrack::Health), 1);
    }

    #[test]
    fn fairness_never_rolls_below_snapshot() {
        let mut eco = UpgradeEconomy::new();
        assert!(eco.choose(UpgradeTrack::BulletSpeed));
        eco.finish_tick();
        assert!(eco.choose(UpgradeTrack::BulletSpeed));
        assert_eq!(eco.level(UpgradeTrack::BulletSpeed), 3);
        assert!(eco.total() - eco.old_total() <= 1);
    }

    #[test]
    fn triggers_pop_one_at_a_time() {
        let mut eco = UpgradeEconomy::new();
        assert_eq!(eco.next_trigger(), Some(50));
        // Score jumps past two thresholds at once; only one pops per call
        assert!(eco.take_trigger(200));
        assert_eq!(eco.next_trigger(), Some(150));
        assert!(eco.take_trigger(200));
        assert!(!eco.take_trigger(200));
        assert_eq!(eco.next_trigger(), Some(300));
    }

    #[test]
    fn derivation_is_idempotent() {
        let mut eco = UpgradeEconomy::new();
        assert!(eco.choose(UpgradeTrack::FireRate));
        eco.finish_tick();
        assert_eq!(eco.shot_period(), eco.shot_period());
        assert_eq!(eco.spawn_frequency(), eco.spawn_frequency());
        assert_eq!(eco.world_scale(), eco.world_scale());
    }

    #[test]
    fn geometric_stat_endpoints() {
        assert!((geometric_stat(60.0, 30.0, 1, 3) - 60.0).abs() < 1e-4);
        assert!((geometric_stat(60.0, 30.0, 4, 3) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn linear_stat_endpoints() {
        assert!((linear_stat(150.0, 300.0, 1, 3) - 150.0).abs() < 1e-4);
        assert!((linear_stat(150.0, 300.0, 4, 3) - 300.0).abs() < 1e-4);
    }

    #[test]
    fn restore_drops_crossed_triggers() {
        let mut eco = UpgradeEconomy::new();
        eco.restore_levels([2, 1, 2, 1], 320);
        assert_eq!(eco.total(), 6);
        assert_eq!(eco.old_total(), 6);
        assert_eq!(eco.next_trigger(), Some(500));
    }

    proptest! {
        #[test]
        fn fairness_bounds_any_level_jump(
            jumps in proptest::collection::vec(0u32..=3, 4),
            confirmed in 0usize..4,
        ) {
            let mut eco = UpgradeEconomy::new();
            for (track, jump) in UpgradeTrack::ALL.iter().zip(&jumps) {
                for _ in 0..*jump {
                    if eco.can_upgrade(*track) {
                        eco.levels[track.index()] += 1;
                    }
                }
            }
            eco.enforce_fairness(Some(UpgradeTrack::ALL[confirmed]));
            prop_assert!(eco.total() - eco.old_total() <= 1);
            for track in UpgradeTrack::ALL {
                prop_assert!(eco.level(track) >= 1);
                prop_assert!(eco.level(track) <= UpgradeEconomy::max_level());
            }
        }
    }
}
