//! Engine configuration loaded from TOML.
//!
//! Default values are embedded via `include_str!("default_config.toml")`.
//! The scoring constants are preserved from the tuned reference values;
//! they are exposed as configuration so hosts can experiment, but the
//! defaults are the supported scale.

use serde::Deserialize;

use crate::error::EngineError;

pub const DEFAULT_CONFIG_TOML: &str = include_str!("default_config.toml");

/// Additive base scores and multipliers for the five pipeline signals.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Base score for an exact dictionary match (frequency is added on top).
    pub exact_base: f32,
    /// Base score for a personal-store hit.
    pub personal_base: f32,
    /// Base score for a prefix completion.
    pub prefix_base: f32,
    /// Score per unit of remaining edit-distance budget for fuzzy matches.
    pub edit_multiplier: f32,
    /// Weight applied to dictionary frequency for prefix and fuzzy scores.
    pub frequency_weight: f32,
    /// Multiplier stretching normalized bigram scores into the lexical range.
    pub bigram_multiplier: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            exact_base: 100.0,
            personal_base: 80.0,
            prefix_base: 70.0,
            edit_multiplier: 10.0,
            frequency_weight: 0.001,
            bigram_multiplier: 30.0,
        }
    }
}

/// Result-set sizes and scheduling knobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Upper bound on the returned suggestion list.
    pub max_results: usize,
    /// Completions fetched from the trie before filtering out the word itself.
    pub prefix_fetch: usize,
    /// Completions kept after filtering.
    pub prefix_keep: usize,
    /// Fuzzy corrections kept after ranking.
    pub fuzzy_keep: usize,
    /// Quiet period before a queued suggestion request executes.
    pub debounce_ms: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_results: 3,
            prefix_fetch: 5,
            prefix_keep: 3,
            fuzzy_keep: 3,
            debounce_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringWeights,
    pub limits: Limits,
}

impl EngineConfig {
    /// Parse a config from TOML; absent fields take their defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Parse(e.to_string()))
    }
}
