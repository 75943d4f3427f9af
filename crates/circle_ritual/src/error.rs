//! # Ritual Error Types
//!
//! Errors the ritual engine can surface to its caller.
//!
//! Only configuration problems and malformed profiles are errors. Every
//! condition that can happen while evaluating a ritual (missing prices, no
//! matching threshold, preset-less weapons, rewards that do not fit) is
//! handled locally and reported through `tracing`.

use thiserror::Error;

/// Errors that can occur in the ritual engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RitualError {
    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(String),

    /// Two direct reward rules require the same sacrificed item set.
    #[error("duplicate direct reward for sacrificed item set {key}")]
    DuplicateDirectReward {
        /// Content key of the shared required item set.
        key: String,
    },

    /// The profile has no circle stash to receive rewards.
    #[error("profile {profile_id} has no circle stash")]
    MissingCircleStash {
        /// The profile that was submitted.
        profile_id: String,
    },
}

impl From<toml::de::Error> for RitualError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

impl From<std::io::Error> for RitualError {
    fn from(err: std::io::Error) -> Self {
        Self::ConfigIo(err.to_string())
    }
}

/// Result type for ritual operations.
pub type RitualResult<T> = Result<T, RitualError>;
