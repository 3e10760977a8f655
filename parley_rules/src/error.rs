//! Error types for rule and session-state operations.

use thiserror::Error;

use crate::entities::NpcId;

pub type RulesResult<T> = Result<T, RulesError>;

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unknown NPC '{0}'")]
    UnknownNpc(NpcId),

    #[error("duplicate NPC '{0}' in roster")]
    DuplicateNpc(NpcId),

    #[error("NPC name '{0}' is empty")]
    UnnamedNpc(String),

    #[error("scenario has no NPCs")]
    EmptyRoster,

    #[error("invalid rules config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
