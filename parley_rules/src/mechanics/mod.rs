//! Game mechanics: outcome classes, stat deltas, and delta normalization.

mod normalizer;

pub use normalizer::*;

use serde::{Deserialize, Serialize};

/// How a persuasion attempt landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure,
    /// Compromise or alternative result. Moves the needle less.
    Partial,
}

impl Outcome {
    /// Parse a classification label from generator output.
    ///
    /// Accepts the synonyms generators tend to produce. Case-insensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "success" => Some(Outcome::Success),
            "failure" | "fail" => Some(Outcome::Failure),
            "partial" | "compromise" | "alternative" => Some(Outcome::Partial),
            _ => None,
        }
    }

    /// Like [`Outcome::from_label`], but unknown labels degrade to `Partial`.
    pub fn from_label_lenient(label: &str) -> Self {
        Self::from_label(label).unwrap_or_else(|| {
            tracing::warn!(label, "unknown outcome label, treating as partial");
            Outcome::Partial
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "Success",
            Outcome::Failure => "Failure",
            Outcome::Partial => "Partial",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stat changes as proposed by the generator, before any correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawDelta {
    pub resistance: i32,
    pub relationship: i32,
}

impl RawDelta {
    pub fn new(resistance: i32, relationship: i32) -> Self {
        Self {
            resistance,
            relationship,
        }
    }
}

/// Stat changes that are safe to apply: polarity-correct and in bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatDelta {
    pub resistance: i32,
    pub relationship: i32,
}

impl StatDelta {
    pub fn new(resistance: i32, relationship: i32) -> Self {
        Self {
            resistance,
            relationship,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.resistance == 0 && self.relationship == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::from_label("Success"), Some(Outcome::Success));
        assert_eq!(Outcome::from_label(" FAILURE "), Some(Outcome::Failure));
        assert_eq!(Outcome::from_label("Alternative"), Some(Outcome::Partial));
        assert_eq!(Outcome::from_label("compromise"), Some(Outcome::Partial));
        assert_eq!(Outcome::from_label("triumph"), None);
    }

    #[test]
    fn test_lenient_label_falls_back_to_partial() {
        assert_eq!(Outcome::from_label_lenient("triumph"), Outcome::Partial);
        assert_eq!(Outcome::from_label_lenient("success"), Outcome::Success);
    }

    #[test]
    fn test_outcome_serializes_as_name() {
        let json = serde_json::to_string(&Outcome::Partial).unwrap();
        assert_eq!(json, "\"Partial\"");
        assert_eq!(Outcome::Failure.to_string(), "Failure");
    }

    #[test]
    fn test_raw_delta_defaults_missing_fields() {
        let delta: RawDelta = serde_json::from_str(r#"{"resistance": -2}"#).unwrap();
        assert_eq!(delta, RawDelta::new(-2, 0));
    }
}
