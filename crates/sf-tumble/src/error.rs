//! Error types

use thiserror::Error;

use crate::credits::Credits;

/// A player action refused by the session rules
///
/// A declined action leaves the session exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declined {
    /// Balance does not cover the bet or buy-feature price
    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: Credits, available: Credits },

    /// A round is already being resolved
    #[error("A round is already in progress")]
    RoundInProgress,

    /// `advance_pass` was called with no round running
    #[error("No round in progress")]
    NoRoundInProgress,

    /// The action is not allowed while free spins are active
    #[error("Not available during free spins")]
    FeatureActive,
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
