//! Tile identity and map layers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tile type ID, as assigned by the host's tile type registry.
pub type TileId = u32;

/// Map layer a tile lives on.
///
/// Layers stack bottom to top; each world position holds at most one tile
/// per layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Layer {
    /// Terrain surface (grass, sand, water).
    Ground = 0,
    /// Decorations and resources placed on the ground.
    Objects = 1,
    /// Player-built or scripted overlays.
    Overlay = 2,
}

impl Layer {
    /// All layers, bottom to top.
    pub const ALL: [Self; 3] = [Self::Ground, Self::Objects, Self::Overlay];

    /// Lower-case name used in serialized keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Objects => "objects",
            Self::Overlay => "overlay",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a layer name is not recognized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown layer: {0}")]
pub struct ParseLayerError(pub String);

impl FromStr for Layer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ground" => Ok(Self::Ground),
            "objects" => Ok(Self::Objects),
            "overlay" => Ok(Self::Overlay),
            other => Err(ParseLayerError(other.to_string())),
        }
    }
}
