//! Component definitions for NPCs.

use serde::{Deserialize, Serialize};

use crate::mechanics::{Outcome, StatDelta};

/// The two numbers a persuasion attempt moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersuasionStats {
    /// Lower is easier to convince. Never below the configured floor.
    pub resistance: i32,
    /// Higher is friendlier. Unbounded.
    pub relationship: i32,
}

impl Default for PersuasionStats {
    fn default() -> Self {
        Self {
            resistance: 5,
            relationship: 0,
        }
    }
}

impl PersuasionStats {
    pub fn new(resistance: i32, relationship: i32) -> Self {
        Self {
            resistance,
            relationship,
        }
    }

    /// Stats after applying an already-normalized delta.
    pub fn with_delta(&self, delta: StatDelta) -> Self {
        Self {
            resistance: self.resistance.saturating_add(delta.resistance),
            relationship: self.relationship.saturating_add(delta.relationship),
        }
    }
}

/// Signed run length of same-polarity outcomes against one NPC.
///
/// Positive counts consecutive successes, negative counts consecutive
/// failures, zero means the last outcome was a partial one (or none yet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Streak(i32);

impl Streak {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    /// Streak after one more outcome.
    pub fn after(self, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success if self.0 >= 0 => Self(self.0.saturating_add(1)),
            Outcome::Success => Self(1),
            Outcome::Failure if self.0 <= 0 => Self(self.0.saturating_sub(1)),
            Outcome::Failure => Self(-1),
            Outcome::Partial => Self(0),
        }
    }

    /// Outcome polarity of the current run, if any.
    pub fn polarity(&self) -> Option<Outcome> {
        match self.0.signum() {
            1 => Some(Outcome::Success),
            -1 => Some(Outcome::Failure),
            _ => None,
        }
    }

    /// Length of the current run regardless of sign.
    pub fn run_length(&self) -> u32 {
        self.0.unsigned_abs()
    }
}
