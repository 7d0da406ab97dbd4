//! # World Error Types
//!
//! Lookups never fail (absence is `None`). Errors only come from
//! configuration, serialized data and the filesystem.

use std::path::PathBuf;

use strata_shared::RegionCoord;
use thiserror::Error;

/// Errors that can occur in the world layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Streaming parameters violate an invariant.
    #[error("invalid streaming config: {0}")]
    InvalidStreamingConfig(String),

    /// Serialized region was written by an unknown schema version.
    #[error("unsupported region format version {found} (supported: {supported})")]
    UnsupportedVersion {
        /// Version found in the data.
        found: u32,
        /// Version this build reads.
        supported: u32,
    },

    /// Region id is not `"x,y"`.
    #[error("malformed region id: '{0}'")]
    MalformedRegionId(String),

    /// Tile key is not `"localX,localY,layer"`.
    #[error("malformed tile key: '{0}'")]
    MalformedTileKey(String),

    /// Region id and position fields disagree.
    #[error("region id {id} does not match position {position}")]
    RegionMismatch {
        /// Coordinate parsed from the id.
        id: RegionCoord,
        /// Coordinate from the position field.
        position: RegionCoord,
    },

    /// Filesystem operation failed.
    #[error("I/O error on '{path}': {message}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        message: String,
    },

    /// Region could not be encoded.
    #[error("failed to encode region: {0}")]
    Encode(String),

    /// Region bytes could not be decoded.
    #[error("failed to decode region: {0}")]
    Decode(String),

    /// Tile-type registry file is invalid.
    #[error("invalid tile registry: {0}")]
    Registry(String),
}

impl WorldError {
    /// Wraps an I/O error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
