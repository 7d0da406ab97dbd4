//! # World Constants
//!
//! Documented defaults for generation and streaming.
//!
//! Every value here can be overridden through configuration; these are only
//! the values used when a config file leaves a field out.

// =============================================================================
// STREAMING
// =============================================================================

/// Region edge length in tiles.
pub const DEFAULT_REGION_SIZE: u32 = 64;

/// Regions within this Chebyshev distance of the player are loaded.
pub const DEFAULT_LOAD_DISTANCE: u32 = 2;

/// Regions beyond this Chebyshev distance of the player are unloaded.
///
/// Must stay greater than [`DEFAULT_LOAD_DISTANCE`].
pub const DEFAULT_UNLOAD_DISTANCE: u32 = 3;

// =============================================================================
// GENERATION
// =============================================================================

/// Normalized height below which terrain is water.
pub const DEFAULT_SEA_LEVEL: f64 = 0.35;

// =============================================================================
// PERSISTENCE / EVENTS
// =============================================================================

/// Schema version written into every serialized region.
pub const REGION_FORMAT_VERSION: u32 = 1;

/// Capacity of the session event bus.
///
/// Large enough to absorb a full region of tile edits in one tick.
pub const DEFAULT_EVENT_CAPACITY: usize = 65_536;
