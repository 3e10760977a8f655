//! Per-NPC streak digest for the generator context.

use parley_rules::{Npc, NpcId, Outcome, SessionState};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where one NPC's run of outcomes currently stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakDigest {
    pub npc_id: NpcId,
    pub npc_name: String,
    /// Signed: positive successes, negative failures.
    pub streak: i32,
    /// `None` after a partial outcome.
    pub polarity: Option<Outcome>,
}

impl StreakDigest {
    fn from_npc(npc: &Npc) -> Self {
        Self {
            npc_id: npc.id.clone(),
            npc_name: npc.name.clone(),
            streak: npc.streak.value(),
            polarity: npc.streak.polarity(),
        }
    }

    /// Short human-readable form, e.g. `Kai: 2 successes in a row`.
    pub fn describe(&self) -> String {
        let run = self.streak.unsigned_abs();
        match self.polarity {
            Some(Outcome::Success) => format!("{}: {} success(es) in a row", self.npc_name, run),
            Some(Outcome::Failure) => format!("{}: {} failure(s) in a row", self.npc_name, run),
            _ => format!("{}: no streak", self.npc_name),
        }
    }
}

/// Digest every NPC that has appeared in the history, in roster order.
pub fn streak_digests(session: &SessionState) -> Vec<StreakDigest> {
    let appeared: HashSet<&NpcId> = session.history().iter().map(|r| &r.npc_id).collect();
    session
        .npcs()
        .iter()
        .filter(|npc| appeared.contains(&npc.id))
        .map(StreakDigest::from_npc)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        let digest = StreakDigest {
            npc_id: NpcId::from_name("Kai"),
            npc_name: "Kai".to_string(),
            streak: -2,
            polarity: Some(Outcome::Failure),
        };
        assert_eq!(digest.describe(), "Kai: 2 failure(s) in a row");

        let neutral = StreakDigest {
            streak: 0,
            polarity: None,
            ..digest
        };
        assert_eq!(neutral.describe(), "Kai: no streak");
    }
}
