//! Engine configuration: rule bounds plus context sizing, loadable from TOML.

use parley_rules::{RulesConfig, RulesError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing of the context sent to the generator each turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Number of latest turns passed verbatim.
    pub recent_window: usize,
    /// Character limit for each condensed older-turn summary.
    pub snippet_chars: usize,
    /// Branch suggestions kept per turn.
    pub max_branches: usize,
    /// Older turns condensed into the summary. Anything earlier is only counted.
    pub max_summarized_turns: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            recent_window: 3,
            snippet_chars: 80,
            max_branches: 3,
            max_summarized_turns: 20,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub rules: RulesConfig,
    pub context: ContextConfig,
}

impl EngineConfig {
    /// Parse from TOML text with `[rules]` and `[context]` tables.
    pub fn from_toml_str(text: &str) -> Result<Self, RulesError> {
        let config: Self = toml::from_str(text)?;
        config.rules.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
