//! # STRATA Shared
//!
//! Common types used by every STRATA crate.
//!
//! ## CRITICAL RULE
//!
//! This crate holds plain data and the event bus only. It must NEVER depend
//! on the generation or streaming crates: they depend on it.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod events;
pub mod math;
pub mod tile;

pub use constants::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_LOAD_DISTANCE, DEFAULT_REGION_SIZE, DEFAULT_SEA_LEVEL,
    DEFAULT_UNLOAD_DISTANCE, REGION_FORMAT_VERSION,
};
pub use events::{EventBus, EventReceiver, EventSender, WorldEvent};
pub use math::{RegionCoord, TilePos, Vec2};
pub use tile::{Layer, ParseLayerError, TileId};
