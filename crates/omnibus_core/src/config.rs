//! Simulation configuration.
//!
//! Loaded once at startup from TOML; never reloaded mid-run.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunables for bundle behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Client-only: keep the light-opacity override in sync with the
    /// facade render state, so a hidden facade stops blocking light.
    pub update_lighting_when_hiding_facades: bool,

    /// Pre-allocated capacity of the shared geometry cache.
    pub geometry_cache_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            update_lighting_when_hiding_facades: false,
            geometry_cache_capacity: 256,
        }
    }
}

impl SimConfig {
    /// Parses a config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert!(!config.update_lighting_when_hiding_facades);
        assert_eq!(config.geometry_cache_capacity, 256);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config =
            SimConfig::from_toml_str("update_lighting_when_hiding_facades = true").expect("parses");
        assert!(config.update_lighting_when_hiding_facades);
        assert_eq!(config.geometry_cache_capacity, 256);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(SimConfig::from_toml_str("geometry_cache_capacity = \"lots\"").is_err());
    }
}
