//! Session state - the single structure holding everything one game knows.

mod turn;

pub use turn::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RulesConfig;
use crate::entities::{Npc, NpcId};
use crate::error::{RulesError, RulesResult};
use crate::mechanics::{normalize_deltas, Outcome};

/// Unique identifier for a game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A suggested next move. A hint only; player input is never checked against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Branch {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// How many of the latest turns in a row featured the same NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStreak {
    pub npc_id: NpcId,
    pub npc_name: String,
    pub consecutive_turns: u32,
}

/// The complete state of one game session.
///
/// Only [`SessionState::commit_turn`] mutates it after creation, and it either
/// applies a whole turn or nothing. There is no load path: a session only
/// comes from [`SessionState::new`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    id: SessionId,

    /// Bounds every committed delta is normalized against.
    rules: RulesConfig,

    /// The world or setting the player asked for.
    setting: String,
    opening_scene: String,
    /// The central conflict the player is currently arguing.
    dilemma: String,

    /// Roster in display order. Ids are unique.
    npcs: Vec<Npc>,

    history: Vec<TurnRecord>,
    branches: Vec<Branch>,

    turn_counter: u32,
    total_successes: u32,
    total_failures: u32,

    /// Set once the story has concluded.
    ending: Option<String>,
}

impl SessionState {
    /// Create a session from a generated scenario.
    ///
    /// Starting resistance is clamped into the configured range.
    pub fn new(
        setting: impl Into<String>,
        opening_scene: impl Into<String>,
        dilemma: impl Into<String>,
        npcs: Vec<Npc>,
        config: &RulesConfig,
    ) -> RulesResult<Self> {
        if npcs.is_empty() {
            return Err(RulesError::EmptyRoster);
        }

        let mut roster: Vec<Npc> = Vec::with_capacity(npcs.len());
        for mut npc in npcs {
            if npc.id.is_empty() {
                return Err(RulesError::UnnamedNpc(npc.name));
            }
            if roster.iter().any(|existing| existing.id == npc.id) {
                return Err(RulesError::DuplicateNpc(npc.id));
            }
            npc.stats.resistance = config.clamp_resistance(npc.stats.resistance);
            roster.push(npc);
        }

        Ok(Self {
            id: SessionId::new(),
            rules: config.clone(),
            setting: setting.into(),
            opening_scene: opening_scene.into(),
            dilemma: dilemma.into(),
            npcs: roster,
            history: Vec::new(),
            branches: Vec::new(),
            turn_counter: 0,
            total_successes: 0,
            total_failures: 0,
            ending: None,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn setting(&self) -> &str {
        &self.setting
    }

    pub fn opening_scene(&self) -> &str {
        &self.opening_scene
    }

    pub fn dilemma(&self) -> &str {
        &self.dilemma
    }

    /// NPCs in roster order.
    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn npc(&self, id: &NpcId) -> Option<&Npc> {
        self.npcs.iter().find(|npc| &npc.id == id)
    }

    /// Look an NPC up by display name, using the same normalization as ids.
    pub fn npc_by_name(&self, name: &str) -> Option<&Npc> {
        self.npc(&NpcId::from_name(name))
    }

    pub fn history(&self) -> &[TurnRecord] {
        &self.history
    }

    pub fn last_turn(&self) -> Option<&TurnRecord> {
        self.history.last()
    }

    /// Current branch suggestions, from the latest committed turn.
    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn turn_counter(&self) -> u32 {
        self.turn_counter
    }

    pub fn total_successes(&self) -> u32 {
        self.total_successes
    }

    pub fn total_failures(&self) -> u32 {
        self.total_failures
    }

    pub fn ending(&self) -> Option<&str> {
        self.ending.as_deref()
    }

    pub fn is_concluded(&self) -> bool {
        self.ending.is_some()
    }

    /// The NPC featured in the latest turn, with how many turns in a row it has been featured.
    pub fn focus_streak(&self) -> Option<FocusStreak> {
        let last = self.history.last()?;
        let consecutive_turns = self
            .history
            .iter()
            .rev()
            .take_while(|record| record.npc_id == last.npc_id)
            .count() as u32;
        Some(FocusStreak {
            npc_id: last.npc_id.clone(),
            npc_name: last.npc_name.clone(),
            consecutive_turns,
        })
    }

    /// Apply one resolved turn.
    ///
    /// The proposed delta is normalized against the acting NPC's current
    /// stats and this session's rules, so polarity and resistance bounds hold
    /// whatever the caller passes. Validation happens before the first write,
    /// so an error leaves the session exactly as it was.
    pub fn commit_turn(&mut self, commit: TurnCommit) -> RulesResult<TurnRecord> {
        let index = self
            .npcs
            .iter()
            .position(|npc| npc.id == commit.npc_id)
            .ok_or_else(|| RulesError::UnknownNpc(commit.npc_id.clone()))?;

        let npc = &mut self.npcs[index];
        let delta = normalize_deltas(npc.stats, commit.outcome, commit.delta, &self.rules);
        npc.apply(commit.outcome, delta);

        let record = TurnRecord {
            turn: self.turn_counter + 1,
            npc_id: npc.id.clone(),
            npc_name: npc.name.clone(),
            dilemma: self.dilemma.clone(),
            player_message: commit.player_message,
            outcome: commit.outcome,
            outcome_summary: commit.outcome_summary,
            narrative: commit.narrative,
            delta,
            branches: commit.branches.clone(),
            recorded_at: commit.recorded_at,
        };

        self.history.push(record.clone());
        self.branches = commit.branches;
        self.turn_counter += 1;
        match commit.outcome {
            Outcome::Success => self.total_successes += 1,
            Outcome::Failure => self.total_failures += 1,
            Outcome::Partial => {}
        }
        if let Some(next) = commit.next_dilemma.filter(|d| !d.trim().is_empty()) {
            self.dilemma = next;
        }
        if let Some(ending) = commit.ending {
            self.ending = Some(ending);
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mechanics::{RawDelta, StatDelta};
    use chrono::{DateTime, Utc};

    fn build_session() -> SessionState {
        SessionState::new(
            "Test World",
            "Scene",
            "Initial problem",
            vec![
                Npc::new("Mayor Lily").with_stats(1, 5).with_personality("Stoic"),
                Npc::new("Kai").with_stats(4, 0),
            ],
            &RulesConfig::default(),
        )
        .unwrap()
    }

    fn commit(npc: &str, outcome: Outcome, delta: RawDelta, branches: Vec<Branch>) -> TurnCommit {
        TurnCommit {
            npc_id: NpcId::from_name(npc),
            player_message: "Hello".to_string(),
            outcome,
            outcome_summary: format!("{npc} listened"),
            narrative: "They consider it.".to_string(),
            delta,
            branches,
            next_dilemma: None,
            ending: None,
            recorded_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_new_session_keeps_roster_order() {
        let session = build_session();
        let names: Vec<_> = session.npcs().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Mayor Lily", "Kai"]);
        assert_eq!(session.turn_counter(), 0);
        assert!(session.branches().is_empty());
        assert!(!session.is_concluded());
    }

    #[test]
    fn test_new_session_rejects_bad_rosters() {
        let config = RulesConfig::default();
        assert!(matches!(
            SessionState::new("w", "s", "d", vec![], &config),
            Err(RulesError::EmptyRoster)
        ));
        assert!(matches!(
            SessionState::new("w", "s", "d", vec![Npc::new("Kai"), Npc::new("kai")], &config),
            Err(RulesError::DuplicateNpc(_))
        ));
        assert!(matches!(
            SessionState::new("w", "s", "d", vec![Npc::new("  ")], &config),
            Err(RulesError::UnnamedNpc(_))
        ));
    }

    #[test]
    fn test_new_session_clamps_starting_resistance() {
        let session = SessionState::new(
            "w",
            "s",
            "d",
            vec![Npc::new("Kai").with_stats(-3, 0), Npc::new("Ada").with_stats(99, 0)],
            &RulesConfig::default(),
        )
        .unwrap();
        assert_eq!(session.npc_by_name("Kai").unwrap().resistance(), 0);
        assert_eq!(session.npc_by_name("Ada").unwrap().resistance(), 10);
    }

    #[test]
    fn test_commit_turn_updates_state() {
        let mut session = build_session();
        let record = session
            .commit_turn(commit(
                "Mayor Lily",
                Outcome::Success,
                RawDelta::new(-1, 3),
                vec![Branch::new("A", ""), Branch::new("B", "")],
            ))
            .unwrap();

        assert_eq!(record.turn, 1);
        assert_eq!(record.dilemma, "Initial problem");
        let lily = session.npc_by_name("Mayor Lily").unwrap();
        assert_eq!(lily.resistance(), 0);
        assert_eq!(lily.relationship(), 8);
        assert_eq!(lily.streak.value(), 1);
        assert_eq!(session.turn_counter(), 1);
        assert_eq!(session.total_successes(), 1);
        assert_eq!(session.branches().len(), 2);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_commit_turn_replaces_branches() {
        let mut session = build_session();
        session
            .commit_turn(commit("Kai", Outcome::Partial, RawDelta::default(), vec![Branch::new("Old", "")]))
            .unwrap();
        session
            .commit_turn(commit("Kai", Outcome::Partial, RawDelta::default(), vec![]))
            .unwrap();
        assert!(session.branches().is_empty());
    }

    #[test]
    fn test_commit_unknown_npc_leaves_state_untouched() {
        let mut session = build_session();
        let before = session.npcs().to_vec();

        let result = session.commit_turn(commit("Nobody", Outcome::Success, RawDelta::new(-1, 1), vec![]));

        assert!(matches!(result, Err(RulesError::UnknownNpc(_))));
        assert_eq!(session.npcs(), before.as_slice());
        assert!(session.history().is_empty());
        assert_eq!(session.turn_counter(), 0);
    }

    #[test]
    fn test_commit_replaces_dilemma_and_concludes() {
        let mut session = build_session();
        let mut first = commit("Kai", Outcome::Failure, RawDelta::new(1, -1), vec![]);
        first.next_dilemma = Some("The gate is sealed".to_string());
        session.commit_turn(first).unwrap();
        assert_eq!(session.dilemma(), "The gate is sealed");
        assert_eq!(session.total_failures(), 1);

        let mut blank = commit("Kai", Outcome::Partial, RawDelta::default(), vec![]);
        blank.next_dilemma = Some("  ".to_string());
        blank.ending = Some("The town sleeps.".to_string());
        let record = session.commit_turn(blank).unwrap();
        assert_eq!(record.dilemma, "The gate is sealed");
        assert_eq!(session.dilemma(), "The gate is sealed");
        assert_eq!(session.ending(), Some("The town sleeps."));
    }

    #[test]
    fn test_focus_streak() {
        let mut session = build_session();
        assert!(session.focus_streak().is_none());

        session.commit_turn(commit("Kai", Outcome::Partial, RawDelta::default(), vec![])).unwrap();
        session.commit_turn(commit("Mayor Lily", Outcome::Partial, RawDelta::default(), vec![])).unwrap();
        session.commit_turn(commit("Mayor Lily", Outcome::Partial, RawDelta::default(), vec![])).unwrap();

        let focus = session.focus_streak().unwrap();
        assert_eq!(focus.npc_name, "Mayor Lily");
        assert_eq!(focus.consecutive_turns, 2);
    }

    #[test]
    fn test_commit_normalizes_unchecked_delta() {
        let mut session = build_session();
        let record = session
            .commit_turn(commit("Mayor Lily", Outcome::Success, RawDelta::new(-5, -3), vec![]))
            .unwrap();

        let lily = session.npc_by_name("Mayor Lily").unwrap();
        assert_eq!(lily.resistance(), 0);
        assert_eq!(lily.relationship(), 5);
        assert_eq!(record.delta, StatDelta::new(-1, 0));
    }

    #[test]
    fn test_commit_uses_session_rules() {
        let rules = RulesConfig {
            resistance_ceiling: 6,
            full_swing: 1,
            partial_swing: 0,
            ..RulesConfig::default()
        };
        let mut session = SessionState::new("w", "s", "d", vec![Npc::new("Kai").with_stats(5, 0)], &rules).unwrap();
        assert_eq!(session.rules(), &rules);

        let record = session
            .commit_turn(commit("Kai", Outcome::Failure, RawDelta::new(4, -4), vec![]))
            .unwrap();
        assert_eq!(record.delta, StatDelta::new(1, -1));

        let record = session
            .commit_turn(commit("Kai", Outcome::Failure, RawDelta::new(4, -4), vec![]))
            .unwrap();
        assert_eq!(record.delta, StatDelta::new(0, -1));
        assert_eq!(session.npc_by_name("Kai").unwrap().resistance(), 6);

        let record = session
            .commit_turn(commit("Kai", Outcome::Partial, RawDelta::new(-3, 3), vec![]))
            .unwrap();
        assert!(record.delta.is_zero());
    }
}
