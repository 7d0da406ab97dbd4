//! # Regions
//!
//! A region is a `region_size x region_size` square of the world holding
//! sparse per-tile data (player edits, placed objects) keyed by local
//! position and layer.
//!
//! Regions are created lazily the first time anything references them.
//! Being *known* (present in the manager) and being *loaded* (within the
//! streaming radius) are separate lifecycles: a region can hold data while
//! unloaded and toggle loaded any number of times.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strata_shared::{Layer, RegionCoord, TileId};

use crate::error::WorldError;

/// Position of a tile inside its region, plus its layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Row within the region.
    pub local_y: u32,
    /// Column within the region.
    pub local_x: u32,
    /// Layer.
    pub layer: Layer,
}

impl TileKey {
    /// Creates a tile key.
    #[must_use]
    pub const fn new(local_x: u32, local_y: u32, layer: Layer) -> Self {
        Self {
            local_y,
            local_x,
            layer,
        }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.local_x, self.local_y, self.layer)
    }
}

impl FromStr for TileKey {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || WorldError::MalformedTileKey(s.to_string());
        let mut parts = s.split(',');
        let (Some(x), Some(y), Some(layer), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let local_x = x.trim().parse().map_err(|_| malformed())?;
        let local_y = y.trim().parse().map_err(|_| malformed())?;
        let layer = layer.trim().parse().map_err(|_| malformed())?;
        Ok(Self::new(local_x, local_y, layer))
    }
}

/// Default per-tile payload: a tile type and its sprite variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRecord {
    /// Tile type.
    pub tile_id: TileId,
    /// Autotile variant (0 when not autotiled).
    #[serde(default)]
    pub variant: u8,
}

impl TileRecord {
    /// Creates a record with variant 0.
    #[must_use]
    pub const fn new(tile_id: TileId) -> Self {
        Self {
            tile_id,
            variant: 0,
        }
    }
}

/// One region's sparse tile data and load state.
#[derive(Clone, Debug)]
pub struct Region<T = TileRecord> {
    coord: RegionCoord,
    tiles: HashMap<TileKey, T>,
    loaded: bool,
}

impl<T> Region<T> {
    /// Creates an empty, unloaded region.
    #[must_use]
    pub fn new(coord: RegionCoord) -> Self {
        Self {
            coord,
            tiles: HashMap::new(),
            loaded: false,
        }
    }

    /// Region coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> RegionCoord {
        self.coord
    }

    /// Whether the region is currently within the streaming radius.
    #[inline]
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Returns the data stored under `key`.
    #[must_use]
    pub fn get(&self, key: &TileKey) -> Option<&T> {
        self.tiles.get(key)
    }

    /// Stores data under `key`, returning the previous value.
    pub fn insert(&mut self, key: TileKey, data: T) -> Option<T> {
        self.tiles.insert(key, data)
    }

    /// Removes the data under `key`.
    pub fn remove(&mut self, key: &TileKey) -> Option<T> {
        self.tiles.remove(key)
    }

    /// Iterates stored tiles in arbitrary order.
    pub fn tiles(&self) -> impl Iterator<Item = (&TileKey, &T)> {
        self.tiles.iter()
    }

    /// Stored tiles sorted by key (row-major, then layer).
    #[must_use]
    pub fn sorted_tiles(&self) -> Vec<(&TileKey, &T)> {
        let mut tiles: Vec<_> = self.tiles.iter().collect();
        tiles.sort_unstable_by_key(|(key, _)| **key);
        tiles
    }

    /// Number of stored tiles.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the region holds no tile data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Replaces all tile data.
    pub(crate) fn replace_tiles(&mut self, tiles: HashMap<TileKey, T>) {
        self.tiles = tiles;
    }

    /// Sets the load flag, returning whether it changed.
    pub(crate) fn set_loaded(&mut self, loaded: bool) -> bool {
        if self.loaded == loaded {
            return false;
        }
        self.loaded = loaded;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_key_text_form() {
        let key = TileKey::new(3, 17, Layer::Objects);
        assert_eq!(key.to_string(), "3,17,objects");
        assert_eq!("3,17,objects".parse::<TileKey>(), Ok(key));
    }

    #[test]
    fn test_malformed_tile_keys() {
        for bad in ["", "1,2", "1,2,ground,4", "a,2,ground", "1,-2,ground", "1,2,Ground"] {
            assert_eq!(
                bad.parse::<TileKey>(),
                Err(WorldError::MalformedTileKey(bad.to_string())),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_region_starts_unloaded_and_empty() {
        let region: Region = Region::new(RegionCoord::new(2, -1));
        assert!(!region.is_loaded());
        assert!(region.is_empty());
        assert_eq!(region.coord(), RegionCoord::new(2, -1));
    }

    #[test]
    fn test_load_flag_transitions_once() {
        let mut region: Region = Region::new(RegionCoord::new(0, 0));
        assert!(region.set_loaded(true));
        assert!(!region.set_loaded(true));
        assert!(region.set_loaded(false));
        assert!(!region.set_loaded(false));
    }

    #[test]
    fn test_sorted_tiles_row_major() {
        let mut region = Region::new(RegionCoord::new(0, 0));
        region.insert(TileKey::new(5, 1, Layer::Ground), TileRecord::new(1));
        region.insert(TileKey::new(0, 2, Layer::Ground), TileRecord::new(2));
        region.insert(TileKey::new(1, 1, Layer::Objects), TileRecord::new(3));
        region.insert(TileKey::new(1, 1, Layer::Ground), TileRecord::new(4));

        let order: Vec<TileId> = region.sorted_tiles().iter().map(|(_, t)| t.tile_id).collect();
        assert_eq!(order, vec![4, 3, 1, 2]);
    }
}
