//! Outcome Resolver - orchestrates one turn from player input to committed record.
//!
//! Each turn walks `AwaitingInput -> GeneratingOutcome -> Normalizing ->
//! Committed`. The session is only written in the last step, in one
//! [`SessionState::commit_turn`] call that also normalizes the proposed
//! deltas, so a turn either lands whole or not at all. The generator call is
//! the only await point.

use parley_rules::{Branch, Npc, RulesError, SessionState, TurnCommit, TurnRecord};
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::context_summarizer::ContextSummarizer;
use crate::error::{ResolverError, ResolverResult};
use crate::generator::{sanitize_branches, GenerationRequest, NarrativeGenerator, TurnProposal};
use crate::ports::{Clock, SystemClock};

/// Where the resolver is within the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingInput,
    GeneratingOutcome,
    Normalizing,
    Committed,
}

/// What a committed turn hands back for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnResolution {
    pub record: TurnRecord,
    /// The acting NPC after the turn was applied.
    pub npc: Npc,
    /// Suggestions now in force.
    pub branches: Vec<Branch>,
    pub ending: Option<String>,
}

impl TurnResolution {
    pub fn is_game_over(&self) -> bool {
        self.ending.is_some()
    }
}

pub struct OutcomeResolver {
    generator: Arc<dyn NarrativeGenerator>,
    clock: Arc<dyn Clock>,
    summarizer: ContextSummarizer,
    max_branches: usize,
    phase: TurnPhase,
}

impl OutcomeResolver {
    pub fn new(generator: Arc<dyn NarrativeGenerator>, config: EngineConfig) -> Self {
        Self {
            generator,
            clock: Arc::new(SystemClock),
            max_branches: config.context.max_branches,
            summarizer: ContextSummarizer::new(config.context),
            phase: TurnPhase::AwaitingInput,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Assemble what the generator sees for `player_input`.
    pub fn build_request(&self, session: &SessionState, player_input: &str) -> GenerationRequest {
        GenerationRequest {
            setting: session.setting().to_string(),
            opening_scene: session.opening_scene().to_string(),
            dilemma: session.dilemma().to_string(),
            roster: session.npcs().to_vec(),
            context: self.summarizer.summarize(session),
            available_branches: session.branches().to_vec(),
            player_input: player_input.to_string(),
        }
    }

    /// Resolve one turn. On any error the session is left untouched.
    ///
    /// Any non-empty text is accepted; branch suggestions never restrict it.
    pub async fn resolve_turn(
        &mut self,
        session: &mut SessionState,
        player_input: &str,
    ) -> ResolverResult<TurnResolution> {
        self.phase = TurnPhase::AwaitingInput;
        let result = self.run_turn(session, player_input).await;
        if result.is_err() {
            self.transition(TurnPhase::AwaitingInput);
        }
        result
    }

    async fn run_turn(
        &mut self,
        session: &mut SessionState,
        player_input: &str,
    ) -> ResolverResult<TurnResolution> {
        let input = player_input.trim();
        if input.is_empty() {
            return Err(ResolverError::InvalidInput("player input is empty".to_string()));
        }
        if session.is_concluded() {
            return Err(ResolverError::SessionConcluded);
        }

        let request = self.build_request(session, input);

        self.transition(TurnPhase::GeneratingOutcome);
        let proposal = self.generator.propose_turn(request).await.map_err(|err| {
            tracing::warn!(session = %session.id(), error = %err, "outcome generation failed");
            err
        })?;

        self.transition(TurnPhase::Normalizing);
        let commit = self.prepare_commit(input, proposal);

        let record = session.commit_turn(commit)?;
        let npc = session
            .npc(&record.npc_id)
            .cloned()
            .ok_or_else(|| RulesError::UnknownNpc(record.npc_id.clone()))?;
        self.transition(TurnPhase::Committed);

        tracing::info!(
            session = %session.id(),
            turn = record.turn,
            npc = %record.npc_id,
            outcome = %record.outcome,
            resistance = npc.resistance(),
            relationship = npc.relationship(),
            streak = npc.streak.value(),
            "turn committed"
        );

        Ok(TurnResolution {
            record,
            npc,
            branches: session.branches().to_vec(),
            ending: session.ending().map(str::to_string),
        })
    }

    /// Turn a proposal into a commit. Deltas stay raw; the session normalizes them.
    fn prepare_commit(&self, input: &str, proposal: TurnProposal) -> TurnCommit {
        TurnCommit {
            npc_id: proposal.target,
            player_message: input.to_string(),
            outcome: proposal.outcome,
            outcome_summary: proposal.summary,
            narrative: proposal.narrative,
            delta: proposal.raw_delta,
            branches: sanitize_branches(proposal.branches, self.max_branches),
            next_dilemma: proposal.next_dilemma,
            ending: proposal.ending,
            recorded_at: self.clock.now(),
        }
    }

    fn transition(&mut self, next: TurnPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "turn phase");
        self.phase = next;
    }
}
