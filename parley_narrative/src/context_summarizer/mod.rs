//! Context Summarizer - compacts session history into a bounded payload.
//!
//! The payload has a fixed shape no matter how long the session runs:
//! 1. **Recent**: the last `recent_window` turns, verbatim
//! 2. **Summary**: one condensed line per older turn, up to
//!    `max_summarized_turns`, with a count of anything earlier
//! 3. **Streaks**: where each NPC seen so far stands
//! 4. **Focus**: which NPC the latest turns kept returning to
//!
//! Selection is deterministic: the same history always yields the same payload.

mod digest;

pub use digest::*;

use parley_rules::{FocusStreak, SessionState, TurnRecord};
use serde::{Deserialize, Serialize};

use crate::config::ContextConfig;

/// Separator between condensed older turns.
const SNIPPET_SEPARATOR: &str = " | ";

/// Builds the context payload for each generator call.
#[derive(Debug, Clone)]
pub struct ContextSummarizer {
    config: ContextConfig,
}

impl ContextSummarizer {
    pub fn new(config: ContextConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ContextConfig::default())
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Build the payload for the current session.
    pub fn summarize(&self, session: &SessionState) -> ContextPayload {
        let history = session.history();
        let split = history.len().saturating_sub(self.config.recent_window);
        let (older, recent) = history.split_at(split);

        ContextPayload {
            recent_turns: recent.to_vec(),
            history_summary: self.condense(older),
            streaks: streak_digests(session),
            focus: session.focus_streak(),
            total_successes: session.total_successes(),
            total_failures: session.total_failures(),
        }
    }

    /// One snippet per turn, oldest first. Empty when there is nothing to condense.
    fn condense(&self, older: &[TurnRecord]) -> String {
        let omitted = older.len().saturating_sub(self.config.max_summarized_turns);
        let kept = &older[omitted..];

        let mut parts = Vec::with_capacity(kept.len() + 1);
        if omitted > 0 {
            parts.push(format!("{omitted} earlier turn(s) omitted"));
        }
        parts.extend(kept.iter().map(|record| record.snippet(self.config.snippet_chars)));
        parts.join(SNIPPET_SEPARATOR)
    }
}

impl Default for ContextSummarizer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// The bounded context handed to the narrative generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPayload {
    /// At most `recent_window` turns, oldest first.
    pub recent_turns: Vec<TurnRecord>,

    /// Condensed turns older than the recent window.
    pub history_summary: String,

    pub streaks: Vec<StreakDigest>,

    pub focus: Option<FocusStreak>,

    pub total_successes: u32,
    pub total_failures: u32,
}

impl ContextPayload {
    /// Format the payload as a prompt section.
    pub fn to_prompt_string(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "## Progress\nSuccesses: {}, Failures: {}\n\n",
            self.total_successes, self.total_failures
        ));

        if !self.history_summary.is_empty() {
            prompt.push_str("## Earlier Turns\n");
            prompt.push_str(&self.history_summary);
            prompt.push_str("\n\n");
        }

        if !self.recent_turns.is_empty() {
            prompt.push_str("## Recent Turns\n");
            for record in &self.recent_turns {
                prompt.push_str(&format!(
                    "- Turn {} with {} ({}): player said \"{}\"; {} (resistance {:+}, relationship {:+})\n",
                    record.turn,
                    record.npc_name,
                    record.outcome,
                    record.player_message,
                    record.outcome_summary,
                    record.delta.resistance,
                    record.delta.relationship,
                ));
            }
            prompt.push('\n');
        }

        if !self.streaks.is_empty() {
            prompt.push_str("## NPC Streaks\n");
            for digest in &self.streaks {
                prompt.push_str(&format!("- {}\n", digest.describe()));
            }
            prompt.push('\n');
        }

        if let Some(focus) = &self.focus {
            prompt.push_str(&format!(
                "## Focus\n{} featured in the last {} turn(s)\n\n",
                focus.npc_name, focus.consecutive_turns
            ));
        }

        prompt
    }
}
