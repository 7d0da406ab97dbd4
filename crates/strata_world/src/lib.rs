//! # STRATA World
//!
//! Runtime world state: which regions are resident, what is stored in them,
//! and how tiles look on screen.
//!
//! ## Core Components
//!
//! - `RegionManager`: hysteresis streaming around a tracked position
//! - `RegionStore`: LZ4-compressed JSON region snapshots on disk
//! - `TileMap` / `TileTypeRegistry`: sparse layered tiles and their types
//! - `AutotileSystem`: batched 4-bit / 8-bit variant selection
//!
//! ## Data Flow
//!
//! ```text
//! position ──► RegionManager ──► RegionLoaded / RegionUnloaded ──► EventBus
//!                                                                    │
//! TileMap::set_tile ──► TileChanged ─────────────────────────────────┤
//!                                                                    ▼
//!                                           AutotileSystem::tick(TileMap)
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod autotile;
pub mod error;
pub mod persistence;
pub mod region;
pub mod registry;
pub mod streaming;
pub mod tilemap;

pub use autotile::{
    calculate_variant, calculate_variant_8bit, reduce_8bit_mask, variant_4bit, variant_8bit,
    AutotileMode, AutotileRule, AutotileSystem, TileGrid, TileTypes, CANONICAL_MASKS_8BIT,
    VARIANTS_4BIT,
};
pub use error::{WorldError, WorldResult};
pub use persistence::{
    decode_region, encode_region, parse_region_id, RegionPosition, RegionStore, SerializedRegion,
    SerializedTile,
};
pub use region::{Region, TileKey, TileRecord};
pub use registry::{TileType, TileTypeRegistry};
pub use streaming::{RegionManager, StreamingConfig, StreamingStats, StreamingUpdate};
pub use tilemap::{PlacedTile, TileMap};
