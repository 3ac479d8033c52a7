//! High score leaderboard
//!
//! Local top-10 table, serialized as one JSON value in the key-value store.
//! The simulation core only pushes a score in at game over; display and
//! ranking are host concerns.

use serde::{Deserialize, Serialize};

use crate::persistence::{KvStore, keys};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Final score of the run
    pub score: u64,
    /// Combined upgrade level reached
    pub total_level: u32,
    /// Unix timestamp (ms) when achieved, supplied by the host
    pub timestamp: f64,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a new score to the leaderboard (if it qualifies).
    /// Returns the rank achieved (1-indexed) or None if it didn't qualify.
    pub fn add_score(&mut self, score: u64, total_level: u32, timestamp: f64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            total_level,
            timestamp,
        };

        // Insertion point, sorted descending by score
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load the table from the store
    pub fn load(store: &dyn KvStore) -> Self {
        match store.get(keys::HIGH_SCORE_TABLE) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(scores) => scores,
                Err(err) => {
                    log::warn!("corrupt high score table: {err}");
                    Self::new()
                }
            },
            None => Self::new(),
        }
    }

    /// Save the table to the store
    pub fn save(&self, store: &mut dyn KvStore) {
        match serde_json::to_string(self) {
            Ok(json) => store.set(keys::HIGH_SCORE_TABLE, &json),
            Err(err) => log::warn!("failed to serialize high scores: {err}"),
        }
    }
}
