//! Active power-up buff state machine
//!
//! Idle -> Active -> Expiring -> Idle. The countdown only burns while the
//! game itself is running; pauses and the upgrade screen do not eat buff
//! time. Pickups waiting on the ground track their own idle expiry in
//! [`crate::sim::entity::Pickup`] - this machine owns only the collected
//! buff.

use serde::{Deserialize, Serialize};

use crate::tuning::powerups;

/// Collectible buff kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    /// Regenerates 1 health per tick up to the cap
    Health,
    /// Suppresses all player damage
    Shield,
    /// The gun fires a three-bullet fan
    SpreadShot,
}

/// Phase of the collected buff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuffPhase {
    /// No buff held
    Idle,
    /// Buff running
    Active { kind: PowerupKind, remaining: u32 },
    /// Final stretch of the active window (hosts typically blink the icon)
    Expiring { kind: PowerupKind, remaining: u32 },
}

/// What `advance` observed this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffTransition {
    None,
    StartedExpiring(PowerupKind),
    Expired(PowerupKind),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PowerupState {
    phase: BuffPhase,
}

impl Default for BuffPhase {
    fn default() -> Self {
        BuffPhase::Idle
    }
}

impl PowerupState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> BuffPhase {
        self.phase
    }

    /// Currently held buff kind, in either active stretch
    pub fn active_kind(&self) -> Option<PowerupKind> {
        match self.phase {
            BuffPhase::Idle => None,
            BuffPhase::Active { kind, .. } | BuffPhase::Expiring { kind, .. } => Some(kind),
        }
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, BuffPhase::Idle)
    }

    #[inline]
    pub fn shield_active(&self) -> bool {
        self.active_kind() == Some(PowerupKind::Shield)
    }

    #[inline]
    pub fn spread_active(&self) -> bool {
        self.active_kind() == Some(PowerupKind::SpreadShot)
    }

    #[inline]
    pub fn healing_active(&self) -> bool {
        self.active_kind() == Some(PowerupKind::Health)
    }

    /// Collecting a pickup replaces whatever buff was running
    pub fn activate(&mut self, kind: PowerupKind) {
        self.phase = BuffPhase::Active {
            kind,
            remaining: powerups::ACTIVE_TICKS,
        };
    }

    /// Burn one tick of buff time. Call only while the game phase is active.
    pub fn advance(&mut self) -> BuffTransition {
        match self.phase {
            BuffPhase::Idle => BuffTransition::None,
            BuffPhase::Active { kind, remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining <= powerups::EXPIRING_TICKS {
                    self.phase = BuffPhase::Expiring { kind, remaining };
                    BuffTransition::StartedExpiring(kind)
                } else {
                    self.phase = BuffPhase::Active { kind, remaining };
                    BuffTransition::None
                }
            }
            BuffPhase::Expiring { kind, remaining } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.phase = BuffPhase::Idle;
                    BuffTransition::Expired(kind)
                } else {
                    self.phase = BuffPhase::Expiring { kind, remaining };
                    BuffTransition::None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_idle_active_expiring_idle() {
        let mut buff = PowerupState::new();
        assert!(buff.is_idle());

        buff.activate(PowerupKind::Shield);
        assert!(buff.shield_active());

        let mut saw_expiring = false;
        let mut expired_at = None;
        for tick in 0..powerups::ACTIVE_TICKS + 10 {
            match buff.advance() {
                BuffTransition::StartedExpiring(kind) => {
                    assert_eq!(kind, PowerupKind::Shield);
                    saw_expiring = true;
                }
                BuffTransition::Expired(kind) => {
                    assert_eq!(kind, PowerupKind::Shield);
                    expired_at = Some(tick);
                    break;
                }
                BuffTransition::None => {}
            }
        }
        assert!(saw_expiring);
        assert_eq!(expired_at, Some(powerups::ACTIVE_TICKS - 1));
        assert!(buff.is_idle());
    }

    #[test]
    fn shield_still_counts_while_expiring() {
        let mut buff = PowerupState::new();
        buff.activate(PowerupKind::Shield);
        for _ in 0..powerups::ACTIVE_TICKS - powerups::EXPIRING_TICKS {
            buff.advance();
        }
        assert!(matches!(buff.phase(), BuffPhase::Expiring { .. }));
        assert!(buff.shield_active());
    }

    #[test]
    fn collecting_replaces_running_buff() {
        let mut buff = PowerupState::new();
        buff.activate(PowerupKind::Health);
        for _ in 0..100 {
            buff.advance();
        }
        buff.activate(PowerupKind::SpreadShot);
        assert!(buff.spread_active());
        assert!(matches!(
            buff.phase(),
            BuffPhase::Active {
                remaining: powerups::ACTIVE_TICKS,
                ..
            }
        ));
    }

    #[test]
    fn idle_advance_is_a_noop() {
        let mut buff = PowerupState::new();
        assert_eq!(buff.advance(), BuffTransition::None);
        assert!(buff.is_idle());
    }
}
