//! Tile-type registry.
//!
//! Loaded from TOML:
//!
//! ```toml
//! [[tile]]
//! id = 2
//! name = "water"
//! autotile_group = "water"
//! mode = "four_bit"
//!
//! [[tile]]
//! id = 103
//! name = "oak_tree"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_shared::TileId;

use crate::autotile::{AutotileMode, AutotileRule, TileTypes};
use crate::error::{WorldError, WorldResult};

/// One tile type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileType {
    /// Type ID.
    pub id: TileId,
    /// Display name.
    pub name: String,
    /// Autotile connectivity group; `None` disables autotiling.
    #[serde(default)]
    pub autotile_group: Option<String>,
    /// Autotile mask.
    #[serde(default)]
    pub mode: AutotileMode,
}

impl TileType {
    /// A type without autotiling.
    #[must_use]
    pub fn plain(id: TileId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            autotile_group: None,
            mode: AutotileMode::FourBit,
        }
    }

    /// An autotiled type.
    #[must_use]
    pub fn autotiled(
        id: TileId,
        name: impl Into<String>,
        group: impl Into<String>,
        mode: AutotileMode,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            autotile_group: Some(group.into()),
            mode,
        }
    }
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "tile")]
    tiles: Vec<TileType>,
}

/// Tile types by ID.
#[derive(Clone, Debug, Default)]
pub struct TileTypeRegistry {
    types: HashMap<TileId, TileType>,
}

impl TileTypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, returning the one it replaced.
    pub fn register(&mut self, tile_type: TileType) -> Option<TileType> {
        self.types.insert(tile_type.id, tile_type)
    }

    /// Looks up a type.
    #[must_use]
    pub fn get(&self, id: TileId) -> Option<&TileType> {
        self.types.get(&id)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Parses a `[[tile]]` list.
    ///
    /// # Errors
    ///
    /// Returns `Registry` for malformed TOML or a duplicated ID.
    pub fn from_toml_str(source: &str) -> WorldResult<Self> {
        let file: RegistryFile =
            toml::from_str(source).map_err(|e| WorldError::Registry(e.to_string()))?;

        let mut registry = Self::new();
        for tile_type in file.tiles {
            let id = tile_type.id;
            if registry.register(tile_type).is_some() {
                return Err(WorldError::Registry(format!("duplicate tile id {id}")));
            }
        }
        tracing::debug!(types = registry.len(), "tile registry parsed");
        Ok(registry)
    }

    /// Reads and parses a registry file.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> WorldResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| WorldError::io(path, &e))?;
        Self::from_toml_str(&source)
    }
}

impl TileTypes for TileTypeRegistry {
    fn autotile(&self, type_id: TileId) -> Option<AutotileRule<'_>> {
        let tile_type = self.types.get(&type_id)?;
        tile_type.autotile_group.as_deref().map(|group| AutotileRule {
            group,
            mode: tile_type.mode,
        })
    }
}
