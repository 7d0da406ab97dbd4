//! # World Session
//!
//! Owns every runtime system of one world and runs them in order.
//!
//! ```text
//! tick(player):
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. STREAM    RegionManager::update(player)                          │
//! │ 2. EVICT     unloaded regions: persist edits, drop their tiles      │
//! │ 3. LOAD      loaded regions: restore edits, generate (or submit)    │
//! │ 4. COLLECT   background results for regions still loaded           │
//! │ 5. EVENTS    drain the bus into the autotiler                       │
//! │ 6. AUTOTILE  one batched variant pass                               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Generated terrain is never stored: it is a pure function of the seed.
//! Regions in the [`RegionManager`] hold only edits made through
//! [`WorldSession::set_tile`], and those are layered over the generated
//! tiles whenever a region is materialized.

use std::collections::HashSet;
use std::sync::Arc;

use strata_procedural::{RegionGeneration, WorldGenerator};
use strata_shared::{EventBus, EventReceiver, Layer, RegionCoord, TileId, TilePos, Vec2};
use strata_world::{
    AutotileSystem, RegionManager, RegionStore, TileMap, TileRecord, TileTypeRegistry,
};

use crate::background::BackgroundGenerator;
use crate::config::EngineConfig;
use crate::error::EngineResult;

/// What one [`WorldSession::tick`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Regions that entered the load radius.
    pub loaded: Vec<RegionCoord>,
    /// Regions that left the unload radius.
    pub unloaded: Vec<RegionCoord>,
    /// Region generations written into the tile map.
    pub generated: usize,
    /// Autotile variants recomputed.
    pub autotiled: usize,
}

/// A running world.
#[derive(Debug)]
pub struct WorldSession {
    generator: Arc<WorldGenerator>,
    regions: RegionManager<TileRecord>,
    tile_map: TileMap,
    registry: TileTypeRegistry,
    autotile: AutotileSystem,
    events: EventReceiver,
    store: Option<RegionStore>,
    /// Regions whose saved edits have been merged.
    restored: HashSet<RegionCoord>,
    background: Option<BackgroundGenerator>,
    spawn: TilePos,
}

impl WorldSession {
    /// Builds every system from `config`.
    ///
    /// Searches for the spawn point up front.
    ///
    /// # Errors
    ///
    /// Invalid config, an unusable save directory, or worker spawn failure.
    pub fn new(config: EngineConfig, registry: TileTypeRegistry) -> EngineResult<Self> {
        config.validate()?;

        let generator = Arc::new(WorldGenerator::new(config.seed, config.generator)?);
        let bus = EventBus::new(config.event_capacity);
        let regions = RegionManager::with_events(config.streaming, bus.sender())?;
        let tile_map = TileMap::with_events(bus.sender());
        let events = bus.receiver();

        let store = config.save_dir.map(RegionStore::open).transpose()?;
        let background = match config.background_workers {
            0 => None,
            workers => Some(BackgroundGenerator::new(Arc::clone(&generator), workers)?),
        };
        let spawn = generator.find_spawn_point();

        tracing::info!(
            seed = generator.seed().value(),
            region_size = config.streaming.region_size,
            persistent = store.is_some(),
            workers = config.background_workers,
            "world session created"
        );

        Ok(Self {
            generator,
            regions,
            tile_map,
            registry,
            autotile: AutotileSystem::new(),
            events,
            store,
            restored: HashSet::new(),
            background,
            spawn,
        })
    }

    /// Shared generator.
    #[must_use]
    pub fn generator(&self) -> &Arc<WorldGenerator> {
        &self.generator
    }

    /// Region edits and load state.
    #[must_use]
    pub const fn regions(&self) -> &RegionManager<TileRecord> {
        &self.regions
    }

    /// Resident tiles.
    #[must_use]
    pub const fn tile_map(&self) -> &TileMap {
        &self.tile_map
    }

    /// Tile types used for autotiling.
    #[must_use]
    pub const fn registry(&self) -> &TileTypeRegistry {
        &self.registry
    }

    /// Spawn point found at construction.
    #[must_use]
    pub const fn spawn_point(&self) -> TilePos {
        self.spawn
    }

    /// Regions waiting on background workers.
    #[must_use]
    pub fn pending_generations(&self) -> usize {
        self.background.as_ref().map_or(0, BackgroundGenerator::in_flight)
    }

    /// Advances streaming, generation and autotiling by one step.
    ///
    /// Storage failures are logged and skipped; they never stop the tick.
    pub fn tick(&mut self, player: Vec2) -> TickReport {
        let update = self.regions.update(player);
        let mut report = TickReport {
            loaded: update.loaded,
            unloaded: update.unloaded,
            ..TickReport::default()
        };

        for &coord in &report.unloaded {
            self.evict(coord);
        }

        for &coord in &report.loaded {
            if let Err(e) = self.restore(coord) {
                tracing::warn!(region = %coord, error = %e, "failed to restore region edits");
            }
            if let Some(background) = &self.background {
                background.submit(coord);
                continue;
            }
            let generation = self.generator.generate_region(coord);
            self.apply_generation(&generation);
            report.generated += 1;
        }

        let completed = self
            .background
            .as_ref()
            .map(BackgroundGenerator::drain_completed)
            .unwrap_or_default();
        for generation in completed {
            // Regions that left while their job was running are dropped
            if self.regions.is_region_loaded(generation.coord) {
                self.apply_generation(&generation);
                report.generated += 1;
            }
        }

        for event in self.events.drain() {
            if !self.autotile.handle_event(&event) {
                tracing::trace!(?event, "region event");
            }
        }
        report.autotiled = self.autotile.tick(&mut self.tile_map, &self.registry);

        tracing::trace!(
            loaded = report.loaded.len(),
            unloaded = report.unloaded.len(),
            generated = report.generated,
            autotiled = report.autotiled,
            "session tick"
        );
        report
    }

    /// Places a tile and records it as an edit of its region.
    ///
    /// The tile map only holds resident regions, so an edit to a region that
    /// is not loaded is recorded and shows up once the region loads.
    ///
    /// # Errors
    ///
    /// Returns an error if earlier edits of the region exist on disk but
    /// cannot be read; nothing is written in that case.
    pub fn set_tile(&mut self, x: i32, y: i32, layer: Layer, type_id: TileId) -> EngineResult<()> {
        let coord = self.regions.world_to_region(x, y);
        self.restore(coord)?;

        self.regions
            .set_region_tile(x, y, layer, TileRecord::new(type_id));
        if self.regions.is_region_loaded(coord) {
            self.tile_map.set_tile(x, y, layer, type_id);
        }
        Ok(())
    }

    /// Writes every region with edits to the store.
    ///
    /// Returns the number of regions written; 0 without a store.
    ///
    /// # Errors
    ///
    /// Stops at the first region that cannot be written.
    pub fn save_all(&self) -> EngineResult<usize> {
        let Some(store) = &self.store else {
            return Ok(0);
        };

        let mut saved = 0;
        for coord in self.regions.known_regions() {
            if let Some(snapshot) = self.regions.serialize_region(coord) {
                if !snapshot.tiles.is_empty() {
                    store.save(&snapshot)?;
                    saved += 1;
                }
            }
        }
        tracing::info!(regions = saved, "world saved");
        Ok(saved)
    }

    /// Merges edits saved by an earlier session, once per region.
    fn restore(&mut self, coord: RegionCoord) -> EngineResult<()> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        if self.restored.contains(&coord) {
            return Ok(());
        }

        if let Some(snapshot) = store.load::<TileRecord>(coord)? {
            let edits = snapshot.tiles.len();
            self.regions.deserialize_region(snapshot)?;
            tracing::debug!(region = %coord, edits, "region edits restored");
        }
        self.restored.insert(coord);
        Ok(())
    }

    /// Persists a region's edits and drops its tiles from the map.
    fn evict(&mut self, coord: RegionCoord) {
        if let Some(store) = &self.store {
            let snapshot = self
                .regions
                .serialize_region(coord)
                .filter(|snapshot| !snapshot.tiles.is_empty());
            if let Some(snapshot) = snapshot {
                if let Err(e) = store.save(&snapshot) {
                    tracing::warn!(region = %coord, error = %e, "failed to persist region edits");
                }
            }
        }

        let origin = self.regions.region_to_world(coord);
        let size = self.regions.config().region_size;
        let removed = self.tile_map.clear_area(origin.x, origin.y, size, size);
        self.queue_border(origin, size);
        tracing::debug!(region = %coord, tiles = removed, "region evicted");
    }

    /// Writes generated tiles, then the region's edits over them.
    fn apply_generation(&mut self, generation: &RegionGeneration) {
        let coord = generation.coord;
        for tile in &generation.tiles {
            self.tile_map
                .place_silent(tile.world_x, tile.world_y, tile.layer, tile.tile_id, 0);
        }

        let origin = self.regions.region_to_world(coord);
        let mut edits = 0;
        if let Some(region) = self.regions.region(coord) {
            for (key, record) in region.tiles() {
                let (Some(x), Some(y)) = (
                    origin.x.checked_add_unsigned(key.local_x),
                    origin.y.checked_add_unsigned(key.local_y),
                ) else {
                    continue;
                };
                self.tile_map
                    .place_silent(x, y, key.layer, record.tile_id, record.variant);
                edits += 1;
            }
        }

        let size = self.regions.config().region_size;
        for layer in Layer::ALL {
            self.autotile
                .update_region(origin.x, origin.y, size, size, layer);
        }
        tracing::debug!(
            region = %coord,
            tiles = generation.tiles.len(),
            edits,
            elapsed_us = u64::try_from(generation.generation_time.as_micros()).unwrap_or(u64::MAX),
            "region materialized"
        );
    }

    /// Queues the one-tile ring around a square so neighbours lose their
    /// edges toward it.
    fn queue_border(&mut self, origin: TilePos, size: u32) {
        let far = origin.x.saturating_add_unsigned(size);
        let far_y = origin.y.saturating_add_unsigned(size);
        let near = origin.x.saturating_sub(1);
        let near_y = origin.y.saturating_sub(1);
        for layer in Layer::ALL {
            for x in near..=far {
                self.autotile.queue_update(x, near_y, layer);
                self.autotile.queue_update(x, far_y, layer);
            }
            for y in origin.y..far_y {
                self.autotile.queue_update(near, y, layer);
                self.autotile.queue_update(far, y, layer);
            }
        }
    }
}
