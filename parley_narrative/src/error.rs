//! Error types for turn resolution and the game loop.

use parley_rules::RulesError;
use thiserror::Error;

/// The narrative generator could not produce a usable answer.
///
/// Always transient from the engine's point of view: the turn can be retried.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("generator transport failed: {0}")]
    Transport(String),

    #[error("generator timed out")]
    Timeout,

    #[error("generator returned malformed output: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ResolverError {
    /// Empty or unusable player text. Re-prompt.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Session untouched; the same input may be retried.
    #[error("outcome generation failed: {0}")]
    GenerationFailure(#[from] GenerationError),

    /// An internal invariant broke. Session left at the last good commit.
    #[error("state corruption: {0}")]
    StateCorruption(#[from] RulesError),

    #[error("the story has already concluded")]
    SessionConcluded,
}

impl ResolverError {
    /// Whether the same input may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolverError::GenerationFailure(_))
    }
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("failed to generate scenario: {0}")]
    ScenarioGeneration(#[from] GenerationError),

    #[error("failed to set up session: {0}")]
    Setup(#[from] RulesError),

    #[error(transparent)]
    Turn(#[from] ResolverError),

    #[error("failed to export journal: {0}")]
    Export(#[from] std::io::Error),
}

pub type ResolverResult<T> = Result<T, ResolverError>;
pub type GameResult<T> = Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;
    use parley_rules::NpcId;

    #[test]
    fn test_only_generation_failures_are_retryable() {
        assert!(ResolverError::from(GenerationError::Timeout).is_retryable());
        assert!(!ResolverError::InvalidInput("empty".into()).is_retryable());
        assert!(!ResolverError::from(RulesError::UnknownNpc(NpcId::from_name("x"))).is_retryable());
        assert!(!ResolverError::SessionConcluded.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = ResolverError::from(GenerationError::Malformed("no json".into()));
        assert_eq!(
            err.to_string(),
            "outcome generation failed: generator returned malformed output: no json"
        );
    }
}
