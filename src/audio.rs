//! Audio direction
//!
//! The simulation knows nothing about sound; it emits [`GameEvent`]s and
//! this module turns them into fire-and-forget cue names plus a looping
//! music track selection. The host's mixer does the actual playback.

use crate::sim::GameEvent;

/// Fire-and-forget sound cues, keyed by name for the host mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Gun fired
    Shot,
    /// Bird killed
    BirdDeath,
    /// Dropping splatted (ground or hero)
    Splat,
    /// Hero took damage
    Ugh,
}

impl Cue {
    pub fn name(self) -> &'static str {
        match self {
            Cue::Shot => "shot",
            Cue::BirdDeath => "birdDeath",
            Cue::Splat => "splat",
            Cue::Ugh => "ugh",
        }
    }
}

/// Looping background tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    /// Calm loop until the first kill of the session
    Ambience,
    /// Main theme afterwards
    Theme,
}

impl MusicTrack {
    pub fn name(self) -> &'static str {
        match self {
            MusicTrack::Ambience => "ambience",
            MusicTrack::Theme => "theme",
        }
    }
}

/// Maps simulation events to cues and picks the background track
#[derive(Debug, Clone)]
pub struct AudioDirector {
    sound_enabled: bool,
    music_enabled: bool,
    heard_first_kill: bool,
}

impl AudioDirector {
    pub fn new(sound_enabled: bool, music_enabled: bool) -> Self {
        Self {
            sound_enabled,
            music_enabled,
            heard_first_kill: false,
        }
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    pub fn set_music_enabled(&mut self, enabled: bool) {
        self.music_enabled = enabled;
    }

    /// Translate one tick's events into cues to play now.
    /// Also tracks the first kill for the music switch.
    pub fn cues_for(&mut self, events: &[GameEvent]) -> Vec<Cue> {
        let mut cues = Vec::new();
        for event in events {
            let cue = match event {
                GameEvent::Shot => Some(Cue::Shot),
                GameEvent::BirdDied { .. } => {
                    self.heard_first_kill = true;
                    Some(Cue::BirdDeath)
                }
                GameEvent::Splat { .. } => Some(Cue::Splat),
                GameEvent::PlayerHurt { .. } => Some(Cue::Ugh),
                _ => None,
            };
            if self.sound_enabled {
                cues.extend(cue);
            }
        }
        cues
    }

    /// The track that should be looping right now, if music is on
    pub fn music(&self) -> Option<MusicTrack> {
        if !self.music_enabled {
            return None;
        }
        Some(if self.heard_first_kill {
            MusicTrack::Theme
        } else {
            MusicTrack::Ambience
        })
    }
}
