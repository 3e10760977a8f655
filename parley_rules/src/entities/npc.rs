//! NPC definitions.

use serde::{Deserialize, Serialize};

use super::{NpcId, PersuasionStats, Streak};
use crate::mechanics::{Outcome, StatDelta};

/// A non-player character the player tries to persuade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    pub id: NpcId,
    pub name: String,
    pub description: String,
    /// Fixed for the whole session.
    pub personality: String,

    pub stats: PersuasionStats,
    pub streak: Streak,
}

impl Npc {
    /// Create an NPC with default stats.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: NpcId::from_name(&name),
            name,
            description: String::new(),
            personality: String::new(),
            stats: PersuasionStats::default(),
            streak: Streak::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = personality.into();
        self
    }

    pub fn with_stats(mut self, resistance: i32, relationship: i32) -> Self {
        self.stats = PersuasionStats::new(resistance, relationship);
        self
    }

    pub fn resistance(&self) -> i32 {
        self.stats.resistance
    }

    pub fn relationship(&self) -> i32 {
        self.stats.relationship
    }

    /// Apply a normalized delta and advance the streak for `outcome`.
    pub(crate) fn apply(&mut self, outcome: Outcome, delta: StatDelta) {
        self.stats = self.stats.with_delta(delta);
        self.streak = self.streak.after(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_npc() {
        let npc = Npc::new("Mayor Lily").with_personality("Cautious");
        assert_eq!(npc.id, NpcId::from_name("mayor lily"));
        assert_eq!(npc.personality, "Cautious");
        assert_eq!(npc.resistance(), 5);
        assert_eq!(npc.streak.value(), 0);
    }

    #[test]
    fn test_apply_moves_stats_and_streak() {
        let mut npc = Npc::new("Kai").with_stats(3, 0);
        npc.apply(Outcome::Success, StatDelta::new(-1, 2));
        assert_eq!(npc.resistance(), 2);
        assert_eq!(npc.relationship(), 2);
        assert_eq!(npc.streak.value(), 1);
    }
}
