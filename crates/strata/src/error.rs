//! # Engine Error Types
//!
//! Wraps the generation and world errors so hosts deal with one type.

use std::path::PathBuf;

use strata_procedural::ProceduralError;
use strata_world::WorldError;
use thiserror::Error;

/// Errors surfaced by the engine crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Generator setup failed.
    #[error(transparent)]
    Procedural(#[from] ProceduralError),

    /// Streaming, storage or registry failure.
    #[error(transparent)]
    World(#[from] WorldError),

    /// Engine settings disagree with each other.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),

    /// Config file is not valid TOML or does not match the schema.
    #[error("failed to parse engine config: {0}")]
    ConfigParse(String),

    /// Config file could not be read.
    #[error("failed to read engine config '{path}': {message}")]
    ConfigRead {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        message: String,
    },

    /// A generation worker thread could not be started.
    #[error("failed to spawn generation worker: {0}")]
    WorkerSpawn(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
