//! Narrative generator port - the one external call a turn makes.
//!
//! The transport (HTTP, retries, auth) is an adapter concern. This module
//! only fixes what goes in and what must come back, as closed types.

pub mod parse;

use async_trait::async_trait;
use parley_rules::{Branch, Npc, NpcId, Outcome, RawDelta};
use serde::Serialize;
use std::collections::HashSet;

use crate::context_summarizer::ContextPayload;
use crate::error::GenerationError;

/// Everything the generator sees when judging a turn.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    pub setting: String,
    pub opening_scene: String,
    pub dilemma: String,
    /// Roster snapshot in display order.
    pub roster: Vec<Npc>,
    pub context: ContextPayload,
    /// Hints shown to the player. The player is free to ignore them.
    pub available_branches: Vec<Branch>,
    pub player_input: String,
}

/// A generated starting point for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioProposal {
    pub opening_scene: String,
    pub dilemma: String,
    pub npcs: Vec<Npc>,
}

/// The generator's verdict for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnProposal {
    pub target: NpcId,
    pub outcome: Outcome,
    /// Uncorrected; the resolver normalizes it.
    pub raw_delta: RawDelta,
    pub narrative: String,
    pub summary: String,
    pub branches: Vec<Branch>,
    pub next_dilemma: Option<String>,
    /// Present when the story concludes with this turn.
    pub ending: Option<String>,
}

impl TurnProposal {
    pub fn new(target: NpcId, outcome: Outcome) -> Self {
        Self {
            target,
            outcome,
            raw_delta: RawDelta::default(),
            narrative: String::new(),
            summary: String::new(),
            branches: Vec::new(),
            next_dilemma: None,
            ending: None,
        }
    }

    pub fn with_delta(mut self, resistance: i32, relationship: i32) -> Self {
        self.raw_delta = RawDelta::new(resistance, relationship);
        self
    }

    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = narrative.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_branches(mut self, branches: Vec<Branch>) -> Self {
        self.branches = branches;
        self
    }

    pub fn with_next_dilemma(mut self, dilemma: impl Into<String>) -> Self {
        self.next_dilemma = Some(dilemma.into());
        self
    }

    pub fn with_ending(mut self, ending: impl Into<String>) -> Self {
        self.ending = Some(ending.into());
        self
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Build a scenario for the setting the player asked for.
    async fn generate_scenario(&self, setting: &str) -> Result<ScenarioProposal, GenerationError>;

    /// Judge one persuasion attempt.
    async fn propose_turn(&self, request: GenerationRequest) -> Result<TurnProposal, GenerationError>;
}

/// Drop untitled and duplicate suggestions (titles compared case-insensitively), keep at most `max`.
pub fn sanitize_branches(branches: Vec<Branch>, max: usize) -> Vec<Branch> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(branches.len().min(max));
    for branch in branches {
        let key = branch.title.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key) {
            tracing::warn!(title = %branch.title, "dropping empty or duplicate branch");
            continue;
        }
        if kept.len() == max {
            break;
        }
        kept.push(branch);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_dedups_and_caps() {
        let branches = vec![
            Branch::new("One", ""),
            Branch::new("Two", ""),
            Branch::new("two ", "Duplicate"),
            Branch::new("Three", ""),
            Branch::new("Four", ""),
        ];
        let kept = sanitize_branches(branches, 3);
        let titles: Vec<_> = kept.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_sanitize_drops_untitled() {
        let kept = sanitize_branches(vec![Branch::new("  ", "ghost"), Branch::new("Real", "")], 3);
        assert_eq!(kept, vec![Branch::new("Real", "")]);
    }

    #[test]
    fn test_sanitize_empty_stays_empty() {
        assert!(sanitize_branches(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_proposal_builder() {
        let proposal = TurnProposal::new(NpcId::from_name("Kai"), Outcome::Failure)
            .with_delta(1, -1)
            .with_narrative("No.")
            .with_ending("Fin.");
        assert_eq!(proposal.raw_delta, RawDelta::new(1, -1));
        assert_eq!(proposal.ending.as_deref(), Some("Fin."));
        assert!(proposal.next_dilemma.is_none());
    }
}
