//! Entity definitions for the persuasion game.

mod components;
mod npc;

pub use components::*;
pub use npc::*;

use serde::{Deserialize, Serialize};

/// Stable identifier for an NPC, derived from its display name.
///
/// The generator refers to NPCs by name, so the id is a normalized form of
/// that name: trimmed, lowercased, words joined with `-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(String);

impl NpcId {
    /// Derive the id for a display name.
    pub fn from_name(name: &str) -> Self {
        let slug = name
            .split_whitespace()
            .map(|word| word.to_lowercase())
            .collect::<Vec<_>>()
            .join("-");
        Self(slug)
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name normalized to nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for NpcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_name() {
        assert_eq!(NpcId::from_name("Mayor Lily").as_str(), "mayor-lily");
        assert_eq!(NpcId::from_name("  mayor   LILY ").as_str(), "mayor-lily");
    }

    #[test]
    fn test_empty_name() {
        assert!(NpcId::from_name("   ").is_empty());
        assert!(!NpcId::from_name("Kai").is_empty());
    }
}
