//! Turn records - the append-only history of a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Branch;
use crate::entities::NpcId;
use crate::mechanics::{Outcome, RawDelta, StatDelta};

/// One resolved turn. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnRecord {
    /// 1-based, strictly increasing.
    pub turn: u32,
    pub npc_id: NpcId,
    pub npc_name: String,
    /// The dilemma in force when the turn was played.
    pub dilemma: String,
    pub player_message: String,
    pub outcome: Outcome,
    pub outcome_summary: String,
    /// What the NPC said or did in response.
    pub narrative: String,
    /// Deltas actually applied, after normalization.
    pub delta: StatDelta,
    /// Suggestions produced by this turn.
    pub branches: Vec<Branch>,
    pub recorded_at: DateTime<Utc>,
}

impl TurnRecord {
    pub fn resistance_delta(&self) -> i32 {
        self.delta.resistance
    }

    pub fn relationship_delta(&self) -> i32 {
        self.delta.relationship
    }

    /// One-line condensed form used when older turns are summarized.
    ///
    /// `max_chars` limits the outcome summary, counted in characters.
    pub fn snippet(&self, max_chars: usize) -> String {
        let summary: String = self.outcome_summary.chars().take(max_chars).collect();
        format!(
            "Turn {}: {} -> {}; {}",
            self.turn, self.npc_name, self.outcome, summary
        )
    }
}

/// Everything the resolver decided for one turn, ready to commit.
#[derive(Debug, Clone)]
pub struct TurnCommit {
    pub npc_id: NpcId,
    pub player_message: String,
    pub outcome: Outcome,
    pub outcome_summary: String,
    pub narrative: String,
    /// Proposed change. Normalized on commit; the record keeps what was applied.
    pub delta: RawDelta,
    pub branches: Vec<Branch>,
    /// Replaces the current dilemma when present.
    pub next_dilemma: Option<String>,
    /// Concludes the story when present.
    pub ending: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(summary: &str) -> TurnRecord {
        TurnRecord {
            turn: 4,
            npc_id: NpcId::from_name("Kai"),
            npc_name: "Kai".to_string(),
            dilemma: "Open the gate".to_string(),
            player_message: "Please".to_string(),
            outcome: Outcome::Failure,
            outcome_summary: summary.to_string(),
            narrative: "Kai refuses.".to_string(),
            delta: StatDelta::new(1, -1),
            branches: Vec::new(),
            recorded_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_snippet_format() {
        let snippet = record("Kai will not budge").snippet(80);
        assert_eq!(snippet, "Turn 4: Kai -> Failure; Kai will not budge");
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let snippet = record("héllo wörld").snippet(4);
        assert!(snippet.ends_with("; héll"));
    }

    #[test]
    fn test_delta_accessors() {
        let record = record("x");
        assert_eq!(record.resistance_delta(), 1);
        assert_eq!(record.relationship_delta(), -1);
    }
}
