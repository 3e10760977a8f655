//! Tunable rule constants, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RulesError, RulesResult};

/// Bounds used when turning generator proposals into stat changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Lowest resistance an NPC can reach.
    pub resistance_floor: i32,
    /// Highest resistance an NPC can reach.
    pub resistance_ceiling: i32,
    /// Largest per-turn change of either stat on a clean success or failure.
    pub full_swing: i32,
    /// Largest per-turn change of either stat on a partial outcome.
    /// Strictly below `full_swing`.
    pub partial_swing: i32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            resistance_floor: 0,
            resistance_ceiling: 10,
            full_swing: 4,
            partial_swing: 2,
        }
    }
}

impl RulesConfig {
    /// Parse a `RulesConfig` from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> RulesResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> RulesResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject inverted resistance bounds, negative swings, and a partial
    /// swing that is not smaller than the full one.
    pub fn validate(&self) -> RulesResult<()> {
        if self.resistance_floor > self.resistance_ceiling {
            return Err(RulesError::InvalidConfig(format!(
                "resistance_floor ({}) exceeds resistance_ceiling ({})",
                self.resistance_floor, self.resistance_ceiling
            )));
        }
        if self.full_swing < 0 || self.partial_swing < 0 {
            return Err(RulesError::InvalidConfig(
                "swing bounds must be non-negative".to_string(),
            ));
        }
        if self.partial_swing >= self.full_swing {
            return Err(RulesError::InvalidConfig(format!(
                "partial_swing ({}) must be below full_swing ({})",
                self.partial_swing, self.full_swing
            )));
        }
        Ok(())
    }

    /// Clamp a starting resistance into the configured range.
    pub fn clamp_resistance(&self, resistance: i32) -> i32 {
        resistance.clamp(self.resistance_floor, self.resistance_ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RulesConfig::default();
        assert_eq!(config.resistance_floor, 0);
        assert_eq!(config.partial_swing * 2, config.full_swing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RulesConfig::from_toml_str("full_swing = 6\n").unwrap();
        assert_eq!(config.full_swing, 6);
        assert_eq!(config.partial_swing, 2);
        assert_eq!(config.resistance_ceiling, 10);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let result = RulesConfig::from_toml_str("resistance_floor = 5\nresistance_ceiling = 2\n");
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));

        let result = RulesConfig::from_toml_str("full_swing = 1\npartial_swing = 3\n");
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_partial_swing_equal_to_full() {
        let result = RulesConfig::from_toml_str("full_swing = 3\npartial_swing = 3\n");
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));

        let result = RulesConfig::from_toml_str("full_swing = 0\npartial_swing = 0\n");
        assert!(matches!(result, Err(RulesError::InvalidConfig(_))));

        let config = RulesConfig::from_toml_str("full_swing = 3\npartial_swing = 2\n").unwrap();
        assert!(config.partial_swing < config.full_swing);
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let result = RulesConfig::from_toml_str("full_swing = \"lots\"");
        assert!(matches!(result, Err(RulesError::ConfigParse(_))));
    }

    #[test]
    fn test_clamp_resistance() {
        let config = RulesConfig::default();
        assert_eq!(config.clamp_resistance(-3), 0);
        assert_eq!(config.clamp_resistance(42), 10);
        assert_eq!(config.clamp_resistance(7), 7);
    }
}
