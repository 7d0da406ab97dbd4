//! # Generation Error Types
//!
//! Noise evaluation and world synthesis are total functions and never fail.
//! Errors only exist at the configuration boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring world generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProceduralError {
    /// A noise channel has out-of-range parameters.
    #[error("invalid noise config for channel '{channel}': {reason}")]
    InvalidNoiseConfig {
        /// Channel name (height, moisture, temperature).
        channel: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// A generator setting is out of range.
    #[error("invalid generator config: {0}")]
    InvalidConfig(String),

    /// Config file is not valid TOML or does not match the schema.
    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    /// Config file could not be read.
    #[error("failed to read config '{path}': {message}")]
    ConfigRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        message: String,
    },
}

/// Result type for generation setup.
pub type ProceduralResult<T> = Result<T, ProceduralError>;
