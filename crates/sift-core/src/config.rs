//! Engine configuration
//!
//! Settings can be parsed from a TOML document and overridden from environment
//! variables. Reading the document from disk is left to the embedding application.
//!
//! ```toml
//! default_strategy = "all_matches"
//! default_namespace = "routing"
//! rng_seed = 42
//! ```

use crate::constants::rules::DEFAULT_NAMESPACE;
use crate::error::{SiftError, SiftResult};
use crate::strategy::SelectionStrategy;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const ENV_STRATEGY: &str = "SIFT_STRATEGY";
pub const ENV_DEFAULT_NAMESPACE: &str = "SIFT_DEFAULT_NAMESPACE";
pub const ENV_RNG_SEED: &str = "SIFT_RNG_SEED";

/// Rule base configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Strategy used by `RuleBase::select_default`
    pub default_strategy: SelectionStrategy,
    /// Namespace given to rules added through `RuleBase::add_new` without one
    pub default_namespace: String,
    /// Seed for tie-breaking randomness; entropy-seeded when absent
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_strategy: SelectionStrategy::default(),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(document: &str) -> SiftResult<Self> {
        let config: Self = toml::from_str(document)
            .map_err(|err| SiftError::configuration("toml", err.to_string()))?;
        info!(strategy = %config.default_strategy, "Loaded engine configuration");
        Ok(config)
    }

    /// Defaults overridden by the `SIFT_*` environment variables
    pub fn from_environment() -> SiftResult<Self> {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`, keyed by the `SIFT_*` variable names
    pub fn with_overrides<F>(mut self, lookup: F) -> SiftResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(strategy) = lookup(ENV_STRATEGY) {
            self.default_strategy = strategy.parse()?;
        }
        if let Some(namespace) = lookup(ENV_DEFAULT_NAMESPACE) {
            self.default_namespace = namespace;
        }
        if let Some(seed) = lookup(ENV_RNG_SEED) {
            let seed = seed.trim().parse::<u64>().map_err(|err| {
                SiftError::configuration(ENV_RNG_SEED, format!("invalid seed '{seed}': {err}"))
            })?;
            self.rng_seed = Some(seed);
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn parses_toml_with_defaults() {
        let config = EngineConfig::from_toml_str("default_strategy = \"all_matches\"").unwrap();
        assert_eq!(config.default_strategy, SelectionStrategy::AllMatches);
        assert_eq!(config.default_namespace, "_");
        assert_eq!(config.rng_seed, None);

        let config =
            EngineConfig::from_toml_str("default_namespace = \"routing\"\nrng_seed = 7").unwrap();
        assert_eq!(config.default_namespace, "routing");
        assert_eq!(config.rng_seed, Some(7));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = EngineConfig::from_toml_str("default_strategy = \"sometimes\"").unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn environment_overrides() {
        let vars = HashMap::from([
            (ENV_STRATEGY, "first_match"),
            (ENV_DEFAULT_NAMESPACE, "level-1"),
            (ENV_RNG_SEED, "99"),
        ]);
        let config = EngineConfig::default()
            .with_overrides(|name| vars.get(name).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.default_strategy, SelectionStrategy::FirstMatch);
        assert_eq!(config.default_namespace, "level-1");
        assert_eq!(config.rng_seed, Some(99));
    }

    #[test]
    fn invalid_seed_is_reported() {
        let err = EngineConfig::default()
            .with_overrides(|name| (name == ENV_RNG_SEED).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_RNG_SEED));
    }
}
