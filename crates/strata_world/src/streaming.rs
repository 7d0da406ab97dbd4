//! # Region Streaming
//!
//! Keeps the regions around a tracked position loaded.
//!
//! ## Hysteresis
//!
//! ```text
//!   ┌───────────────────────────┐
//!   │ unload_distance           │   regions beyond this unload
//!   │   ┌───────────────────┐   │
//!   │   │ load_distance     │   │   regions inside this load
//!   │   │        (P)        │   │
//!   │   └───────────────────┘   │
//!   │     hysteresis band       │   regions here keep their state
//!   └───────────────────────────┘
//! ```
//!
//! A player pacing across a region border never thrashes the regions
//! behind them: those sit in the band and stay loaded.
//!
//! Recomputation is edge-triggered. Nothing happens until the tracked
//! position enters a different region.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use strata_shared::{
    EventSender, Layer, RegionCoord, TilePos, Vec2, WorldEvent, DEFAULT_LOAD_DISTANCE,
    DEFAULT_REGION_SIZE, DEFAULT_UNLOAD_DISTANCE,
};

use crate::error::{WorldError, WorldResult};
use crate::persistence::SerializedRegion;
use crate::region::{Region, TileKey, TileRecord};

/// Streaming parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Region edge length in tiles (> 0).
    pub region_size: u32,
    /// Chebyshev radius (in regions) that gets loaded.
    pub load_distance: u32,
    /// Chebyshev radius beyond which regions unload (> `load_distance`).
    pub unload_distance: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
            load_distance: DEFAULT_LOAD_DISTANCE,
            unload_distance: DEFAULT_UNLOAD_DISTANCE,
        }
    }
}

impl StreamingConfig {
    /// Largest accepted distance; keeps the load square addressable.
    pub const MAX_DISTANCE: u32 = 1024;

    /// Checks the invariants.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStreamingConfig` for a zero region size, a missing
    /// hysteresis band, or an oversized radius.
    pub fn validate(&self) -> WorldResult<()> {
        if self.region_size == 0 || self.region_size > i32::MAX.unsigned_abs() {
            return Err(WorldError::InvalidStreamingConfig(format!(
                "region_size must be in 1..={}, got {}",
                i32::MAX,
                self.region_size
            )));
        }
        if self.unload_distance <= self.load_distance {
            return Err(WorldError::InvalidStreamingConfig(format!(
                "unload_distance ({}) must be greater than load_distance ({})",
                self.unload_distance, self.load_distance
            )));
        }
        if self.unload_distance > Self::MAX_DISTANCE {
            return Err(WorldError::InvalidStreamingConfig(format!(
                "unload_distance must be at most {}, got {}",
                Self::MAX_DISTANCE,
                self.unload_distance
            )));
        }
        Ok(())
    }
}

/// Transitions caused by one recomputation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingUpdate {
    /// Regions that became loaded, row-major around the new center.
    pub loaded: Vec<RegionCoord>,
    /// Regions that became unloaded, sorted.
    pub unloaded: Vec<RegionCoord>,
}

impl StreamingUpdate {
    /// Whether nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.unloaded.is_empty()
    }
}

/// Streaming statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Regions present in memory (loaded or not).
    pub known_regions: usize,
    /// Regions currently loaded.
    pub loaded_regions: usize,
    /// Load transitions since creation.
    pub total_loads: u64,
    /// Unload transitions since creation.
    pub total_unloads: u64,
    /// Recomputations since creation.
    pub recomputations: u64,
}

/// Owns every region and streams them around a tracked position.
#[derive(Debug)]
pub struct RegionManager<T = TileRecord> {
    config: StreamingConfig,
    regions: HashMap<RegionCoord, Region<T>>,
    current: Option<RegionCoord>,
    events: Option<EventSender>,
    stats: StreamingStats,
}

impl<T> RegionManager<T> {
    /// Creates a manager that emits no events.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(config: StreamingConfig) -> WorldResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            regions: HashMap::new(),
            current: None,
            events: None,
            stats: StreamingStats::default(),
        })
    }

    /// Creates a manager that announces load transitions on `events`.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_events(config: StreamingConfig, events: EventSender) -> WorldResult<Self> {
        let mut manager = Self::new(config)?;
        manager.events = Some(events);
        Ok(manager)
    }

    /// Streaming parameters.
    #[must_use]
    pub const fn config(&self) -> &StreamingConfig {
        &self.config
    }

    /// Region the last recomputation was centered on.
    #[must_use]
    pub const fn current_region(&self) -> Option<RegionCoord> {
        self.current
    }

    // =========================================================================
    // COORDINATES
    // =========================================================================

    /// Region owning a world tile.
    #[must_use]
    pub const fn world_to_region(&self, world_x: i32, world_y: i32) -> RegionCoord {
        RegionCoord::from_world(world_x, world_y, self.config.region_size)
    }

    /// Top-left world tile of a region, clamped for regions beyond the
    /// `i32` tile range.
    #[must_use]
    pub const fn region_to_world(&self, coord: RegionCoord) -> TilePos {
        coord.origin(self.config.region_size)
    }

    /// Position of a world tile inside its region.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub const fn world_to_local(&self, world_x: i32, world_y: i32) -> (u32, u32) {
        let size = self.config.region_size as i32;
        (
            world_x.rem_euclid(size) as u32,
            world_y.rem_euclid(size) as u32,
        )
    }

    fn tile_key(&self, world_x: i32, world_y: i32, layer: Layer) -> (RegionCoord, TileKey) {
        let (local_x, local_y) = self.world_to_local(world_x, world_y);
        (
            self.world_to_region(world_x, world_y),
            TileKey::new(local_x, local_y, layer),
        )
    }

    // =========================================================================
    // REGIONS
    // =========================================================================

    /// Returns the region, creating it (unloaded) if it is unknown.
    pub fn get_or_create_region(&mut self, coord: RegionCoord) -> &mut Region<T> {
        self.regions
            .entry(coord)
            .or_insert_with(|| Region::new(coord))
    }

    /// Returns a known region.
    #[must_use]
    pub fn region(&self, coord: RegionCoord) -> Option<&Region<T>> {
        self.regions.get(&coord)
    }

    /// Returns a known region mutably.
    pub fn region_mut(&mut self, coord: RegionCoord) -> Option<&mut Region<T>> {
        self.regions.get_mut(&coord)
    }

    /// Loads a region; returns whether it transitioned.
    ///
    /// Emits `RegionLoaded` exactly once per transition.
    pub fn load_region(&mut self, coord: RegionCoord) -> bool {
        if !self.get_or_create_region(coord).set_loaded(true) {
            return false;
        }
        self.stats.total_loads += 1;
        self.emit(WorldEvent::RegionLoaded { coord });
        true
    }

    /// Unloads a region; returns whether it transitioned.
    ///
    /// Emits `RegionUnloaded` exactly once per transition. The region and
    /// its data stay in memory.
    pub fn unload_region(&mut self, coord: RegionCoord) -> bool {
        let Some(region) = self.regions.get_mut(&coord) else {
            return false;
        };
        if !region.set_loaded(false) {
            return false;
        }
        self.stats.total_unloads += 1;
        self.emit(WorldEvent::RegionUnloaded { coord });
        true
    }

    /// Whether a region is known and loaded.
    #[must_use]
    pub fn is_region_loaded(&self, coord: RegionCoord) -> bool {
        self.regions.get(&coord).is_some_and(Region::is_loaded)
    }

    /// Every loaded region, sorted.
    #[must_use]
    pub fn loaded_regions(&self) -> Vec<RegionCoord> {
        let mut loaded: Vec<_> = self
            .regions
            .values()
            .filter(|r| r.is_loaded())
            .map(Region::coord)
            .collect();
        loaded.sort_unstable();
        loaded
    }

    /// Every region in memory, loaded or not, sorted.
    #[must_use]
    pub fn known_regions(&self) -> Vec<RegionCoord> {
        let mut known: Vec<_> = self.regions.keys().copied().collect();
        known.sort_unstable();
        known
    }

    /// Number of known regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Current statistics.
    #[must_use]
    pub fn stats(&self) -> StreamingStats {
        StreamingStats {
            known_regions: self.regions.len(),
            loaded_regions: self.regions.values().filter(|r| r.is_loaded()).count(),
            ..self.stats
        }
    }

    /// Forgets every region and the tracked center. Emits nothing.
    pub fn clear(&mut self) {
        self.regions.clear();
        self.current = None;
    }

    // =========================================================================
    // TILES
    // =========================================================================

    /// Stores data for a world tile, creating its region if needed.
    ///
    /// The region is not loaded by this. Returns the previous data.
    pub fn set_region_tile(&mut self, world_x: i32, world_y: i32, layer: Layer, data: T) -> Option<T> {
        let (coord, key) = self.tile_key(world_x, world_y, layer);
        self.get_or_create_region(coord).insert(key, data)
    }

    /// Data of a world tile; `None` for unknown regions or tiles.
    #[must_use]
    pub fn get_region_tile(&self, world_x: i32, world_y: i32, layer: Layer) -> Option<&T> {
        let (coord, key) = self.tile_key(world_x, world_y, layer);
        self.regions.get(&coord)?.get(&key)
    }

    /// Removes the data of a world tile.
    pub fn remove_region_tile(&mut self, world_x: i32, world_y: i32, layer: Layer) -> Option<T> {
        let (coord, key) = self.tile_key(world_x, world_y, layer);
        self.regions.get_mut(&coord)?.remove(&key)
    }

    // =========================================================================
    // STREAMING
    // =========================================================================

    /// Follows a tracked position.
    ///
    /// Does nothing while the position stays in the same region. The first
    /// call always recomputes.
    pub fn update(&mut self, position: Vec2) -> StreamingUpdate {
        let tile = TilePos::from_vec2(position);
        let region = self.world_to_region(tile.x, tile.y);
        if self.current == Some(region) {
            return StreamingUpdate::default();
        }
        self.recompute(region)
    }

    /// Loads the square around `center` and unloads beyond the band.
    ///
    /// Regions with no world origin (beyond the `i32` tile range) are never
    /// loaded.
    #[allow(clippy::cast_possible_wrap)]
    pub fn recompute(&mut self, center: RegionCoord) -> StreamingUpdate {
        self.current = Some(center);
        self.stats.recomputations += 1;

        let mut update = StreamingUpdate::default();
        let radius = self.config.load_distance as i32;

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (Some(x), Some(y)) = (center.x.checked_add(dx), center.y.checked_add(dy)) else {
                    continue;
                };
                let coord = RegionCoord::new(x, y);
                // Past the edge of the world
                if coord.checked_origin(self.config.region_size).is_none() {
                    continue;
                }
                if self.load_region(coord) {
                    update.loaded.push(coord);
                }
            }
        }

        let unload_distance = self.config.unload_distance;
        let mut far: Vec<_> = self
            .regions
            .values()
            .filter(|r| r.is_loaded() && r.coord().chebyshev_distance(center) > unload_distance)
            .map(Region::coord)
            .collect();
        far.sort_unstable();

        for coord in far {
            if self.unload_region(coord) {
                update.unloaded.push(coord);
            }
        }

        tracing::debug!(
            center = %center,
            loaded = update.loaded.len(),
            unloaded = update.unloaded.len(),
            "streaming recomputed"
        );
        update
    }

    fn emit(&self, event: WorldEvent) {
        if let Some(events) = &self.events {
            events.send(event);
        }
    }
}

impl<T: Clone + Serialize> RegionManager<T> {
    /// Snapshot of a known region.
    #[must_use]
    pub fn serialize_region(&self, coord: RegionCoord) -> Option<SerializedRegion<T>> {
        self.regions.get(&coord).map(SerializedRegion::from_region)
    }
}

impl<T: DeserializeOwned> RegionManager<T> {
    /// Restores a region's tiles from a snapshot.
    ///
    /// The load flag is never taken from the data: a region created here
    /// starts unloaded, an existing region keeps its state and has its tiles
    /// replaced.
    ///
    /// # Errors
    ///
    /// Unknown version, malformed id or tile keys, a region beyond the
    /// world, or a tile key outside `region_size`. The manager is untouched
    /// on error.
    pub fn deserialize_region(&mut self, data: SerializedRegion<T>) -> WorldResult<RegionCoord> {
        let (coord, tiles) = data.into_tiles()?;
        let size = self.config.region_size;
        if coord.checked_origin(size).is_none() {
            return Err(WorldError::MalformedRegionId(coord.to_string()));
        }
        if let Some(key) = tiles.keys().find(|key| key.local_x >= size || key.local_y >= size) {
            return Err(WorldError::MalformedTileKey(key.to_string()));
        }
        self.get_or_create_region(coord).replace_tiles(tiles);
        Ok(coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_shared::EventBus;

    fn manager(size: u32, load: u32, unload: u32) -> RegionManager {
        RegionManager::new(StreamingConfig {
            region_size: size,
            load_distance: load,
            unload_distance: unload,
        })
        .expect("valid config")
    }

    #[test]
    fn test_config_validation() {
        assert!(StreamingConfig::default().validate().is_ok());
        for (size, load, unload) in [(0, 1, 2), (64, 2, 2), (64, 3, 2), (64, 1, 5000)] {
            let config = StreamingConfig {
                region_size: size,
                load_distance: load,
                unload_distance: unload,
            };
            assert!(
                matches!(config.validate(), Err(WorldError::InvalidStreamingConfig(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_coordinate_mapping() {
        let m = manager(64, 1, 2);
        assert_eq!(m.world_to_region(-1, 64), RegionCoord::new(-1, 1));
        assert_eq!(m.world_to_local(-1, 64), (63, 0));
        assert_eq!(m.region_to_world(RegionCoord::new(-2, 3)), TilePos::new(-128, 192));
    }

    #[test]
    fn test_load_unload_idempotent_with_single_events() {
        let bus = EventBus::unbounded();
        let mut m: RegionManager =
            RegionManager::with_events(StreamingConfig::default(), bus.sender()).expect("valid");
        let coord = RegionCoord::new(4, 4);

        assert!(!m.unload_region(coord));
        assert!(m.load_region(coord));
        assert!(!m.load_region(coord));
        assert!(m.unload_region(coord));
        assert!(!m.unload_region(coord));

        assert_eq!(
            bus.receiver().drain(),
            vec![
                WorldEvent::RegionLoaded { coord },
                WorldEvent::RegionUnloaded { coord }
            ]
        );
        // Unloading keeps the region known
        assert_eq!(m.known_regions(), vec![coord]);
    }

    #[test]
    fn test_tile_access_creates_unloaded_region() {
        let mut m = manager(16, 1, 2);
        assert_eq!(m.get_region_tile(20, -3, Layer::Ground), None);
        assert_eq!(m.region_count(), 0);

        assert_eq!(m.set_region_tile(20, -3, Layer::Ground, TileRecord::new(9)), None);
        let coord = RegionCoord::new(1, -1);
        assert_eq!(m.region_count(), 1);
        assert!(!m.is_region_loaded(coord));
        assert_eq!(
            m.region(coord).and_then(|r| r.get(&TileKey::new(4, 13, Layer::Ground))),
            Some(&TileRecord::new(9))
        );

        assert_eq!(m.remove_region_tile(20, -3, Layer::Ground), Some(TileRecord::new(9)));
        assert_eq!(m.get_region_tile(20, -3, Layer::Ground), None);
    }

    #[test]
    fn test_update_is_edge_triggered() {
        let mut m = manager(64, 1, 2);
        let first = m.update(Vec2::new(10.0, 10.0));
        assert_eq!(first.loaded.len(), 9);
        assert_eq!(first.loaded[0], RegionCoord::new(-1, -1));
        assert_eq!(first.loaded[8], RegionCoord::new(1, 1));

        // Same region: nothing to do
        assert!(m.update(Vec2::new(63.9, 0.0)).is_empty());
        assert_eq!(m.stats().recomputations, 1);
    }

    #[test]
    fn test_serialize_deserialize_round_trip() {
        let mut m = manager(64, 1, 2);
        m.set_region_tile(1, 2, Layer::Objects, TileRecord::new(103));
        m.set_region_tile(3, 4, Layer::Ground, TileRecord::new(4));
        m.load_region(RegionCoord::new(0, 0));

        let data = m.serialize_region(RegionCoord::new(0, 0)).expect("known region");
        assert_eq!(data.tiles.len(), 2);

        let mut restored = manager(64, 1, 2);
        assert_eq!(restored.deserialize_region(data), Ok(RegionCoord::new(0, 0)));
        assert!(!restored.is_region_loaded(RegionCoord::new(0, 0)));
        assert_eq!(
            restored.get_region_tile(1, 2, Layer::Objects),
            Some(&TileRecord::new(103))
        );
        assert_eq!(
            restored.get_region_tile(3, 4, Layer::Ground),
            Some(&TileRecord::new(4))
        );
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut m = manager(64, 1, 2);
        m.update(Vec2::ZERO);
        m.clear();
        assert_eq!(m.region_count(), 0);
        assert_eq!(m.current_region(), None);
        // Next update recomputes from scratch
        assert_eq!(m.update(Vec2::ZERO).loaded.len(), 9);
    }
}
