//! # Region Persistence
//!
//! Serialized region layout and a directory-backed store.
//!
//! ## Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "id": "-2,5",
//!   "position": { "x": -2, "y": 5 },
//!   "tiles": [ { "key": "3,17,objects", "tile": { "tile_id": 103, "variant": 0 } } ]
//! }
//! ```
//!
//! The load flag is never written; it belongs to the running session.
//!
//! ## Storage
//!
//! Regions are saved as LZ4-compressed JSON, one file per region
//! (`region_{x}_{y}.lz4`). Compression ratio is typically 5:1 or better.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strata_shared::{RegionCoord, REGION_FORMAT_VERSION};

use crate::error::{WorldError, WorldResult};
use crate::region::{Region, TileKey, TileRecord};

/// Region position as written to disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPosition {
    /// Region X.
    pub x: i32,
    /// Region Y.
    pub y: i32,
}

/// One stored tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedTile<T = TileRecord> {
    /// `"localX,localY,layer"`.
    pub key: String,
    /// Tile payload.
    pub tile: T,
}

/// Serialized form of a region.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedRegion<T = TileRecord> {
    /// Schema version.
    pub version: u32,
    /// `"x,y"`.
    pub id: String,
    /// Region coordinate.
    pub position: RegionPosition,
    /// Sparse tiles, sorted by key.
    pub tiles: Vec<SerializedTile<T>>,
}

impl<T: Clone> SerializedRegion<T> {
    /// Captures a region's identity and tiles.
    #[must_use]
    pub fn from_region(region: &Region<T>) -> Self {
        let coord = region.coord();
        Self {
            version: REGION_FORMAT_VERSION,
            id: coord.to_string(),
            position: RegionPosition {
                x: coord.x,
                y: coord.y,
            },
            tiles: region
                .sorted_tiles()
                .into_iter()
                .map(|(key, tile)| SerializedTile {
                    key: key.to_string(),
                    tile: tile.clone(),
                })
                .collect(),
        }
    }
}

impl<T> SerializedRegion<T> {
    /// Validates the header and returns the region coordinate.
    ///
    /// # Errors
    ///
    /// Unknown version, malformed id, or id/position disagreement.
    pub fn coord(&self) -> WorldResult<RegionCoord> {
        if self.version != REGION_FORMAT_VERSION {
            return Err(WorldError::UnsupportedVersion {
                found: self.version,
                supported: REGION_FORMAT_VERSION,
            });
        }
        let id = parse_region_id(&self.id)?;
        let position = RegionCoord::new(self.position.x, self.position.y);
        if id != position {
            return Err(WorldError::RegionMismatch { id, position });
        }
        Ok(id)
    }

    /// Validates the data and rebuilds the tile map.
    ///
    /// # Errors
    ///
    /// Everything [`Self::coord`] rejects, plus malformed tile keys.
    pub fn into_tiles(self) -> WorldResult<(RegionCoord, HashMap<TileKey, T>)> {
        let coord = self.coord()?;
        let tiles = self
            .tiles
            .into_iter()
            .map(|entry| -> WorldResult<(TileKey, T)> { Ok((entry.key.parse()?, entry.tile)) })
            .collect::<WorldResult<HashMap<_, _>>>()?;
        Ok((coord, tiles))
    }
}

/// Parses a `"x,y"` region id.
///
/// # Errors
///
/// Returns `MalformedRegionId` for anything else.
pub fn parse_region_id(id: &str) -> WorldResult<RegionCoord> {
    let malformed = || WorldError::MalformedRegionId(id.to_string());
    let (x, y) = id.split_once(',').ok_or_else(malformed)?;
    let x = x.trim().parse().map_err(|_| malformed())?;
    let y = y.trim().parse().map_err(|_| malformed())?;
    Ok(RegionCoord::new(x, y))
}

/// Encodes a region as LZ4-compressed JSON.
///
/// # Errors
///
/// Returns `Encode` if the payload cannot be serialized.
pub fn encode_region<T: Serialize>(region: &SerializedRegion<T>) -> WorldResult<Vec<u8>> {
    let json = serde_json::to_vec(region).map_err(|e| WorldError::Encode(e.to_string()))?;
    Ok(compress_prepend_size(&json))
}

/// Decodes LZ4-compressed JSON written by [`encode_region`].
///
/// # Errors
///
/// Returns `Decode` for corrupt bytes or mismatched JSON.
pub fn decode_region<T: DeserializeOwned>(bytes: &[u8]) -> WorldResult<SerializedRegion<T>> {
    let json = decompress_size_prepended(bytes).map_err(|e| WorldError::Decode(e.to_string()))?;
    serde_json::from_slice(&json).map_err(|e| WorldError::Decode(e.to_string()))
}

/// Directory-backed region store.
#[derive(Clone, Debug)]
pub struct RegionStore {
    root: PathBuf,
}

impl RegionStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> WorldResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| WorldError::io(&root, &e))?;
        tracing::debug!(path = %root.display(), "region store opened");
        Ok(Self { root })
    }

    /// Store directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a region is stored in.
    #[must_use]
    pub fn path_for(&self, coord: RegionCoord) -> PathBuf {
        self.root.join(format!("region_{}_{}.lz4", coord.x, coord.y))
    }

    /// Writes a region, replacing any previous snapshot.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Invalid header, encode failure or I/O failure.
    pub fn save<T: Serialize>(&self, region: &SerializedRegion<T>) -> WorldResult<usize> {
        let coord = region.coord()?;
        let bytes = encode_region(region)?;
        let path = self.path_for(coord);
        std::fs::write(&path, &bytes).map_err(|e| WorldError::io(&path, &e))?;
        tracing::debug!(region = %coord, bytes = bytes.len(), "region saved");
        Ok(bytes.len())
    }

    /// Reads a region snapshot; `Ok(None)` if none was saved.
    ///
    /// # Errors
    ///
    /// I/O failure, decode failure, or a snapshot stored under the wrong
    /// file name.
    pub fn load<T: DeserializeOwned>(
        &self,
        coord: RegionCoord,
    ) -> WorldResult<Option<SerializedRegion<T>>> {
        let path = self.path_for(coord);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WorldError::io(&path, &e)),
        };

        let region: SerializedRegion<T> = decode_region(&bytes)?;
        let stored = region.coord()?;
        if stored != coord {
            return Err(WorldError::RegionMismatch {
                id: stored,
                position: coord,
            });
        }
        tracing::debug!(region = %coord, bytes = bytes.len(), "region loaded from store");
        Ok(Some(region))
    }

    /// Whether a snapshot exists for `coord`.
    #[must_use]
    pub fn exists(&self, coord: RegionCoord) -> bool {
        self.path_for(coord).is_file()
    }

    /// Deletes a snapshot; returns whether one existed.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file exists but cannot be removed.
    pub fn remove(&self, coord: RegionCoord) -> WorldResult<bool> {
        let path = self.path_for(coord);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(WorldError::io(&path, &e)),
        }
    }
}
