//! # STRATA
//!
//! Procedural tile-world engine: deterministic terrain, region streaming with
//! hysteresis, persistence of edits, and autotiling.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                           WorldSession                            │
//! │                                                                   │
//! │  ┌────────────────────┐   coords    ┌──────────────────────────┐  │
//! │  │ strata_world       │────────────>│ strata_procedural        │  │
//! │  │  • RegionManager   │             │  • NoiseGenerator        │  │
//! │  │  • RegionStore     │<────────────│  • WorldGenerator        │  │
//! │  │  • TileMap         │  tiles      │  • BiomeClassifier       │  │
//! │  │  • AutotileSystem  │             └──────────────────────────┘  │
//! │  └─────────┬──────────┘                         ▲                 │
//! │            │ events                             │ Arc             │
//! │            ▼                                    │                 │
//! │  ┌────────────────────┐             ┌──────────────────────────┐  │
//! │  │ EventBus           │             │ BackgroundGenerator      │  │
//! │  └────────────────────┘             └──────────────────────────┘  │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: `EngineConfig` and the bundled tile types
//! - `session`: per-frame orchestration
//! - `background`: worker threads for region synthesis
//! - `logging`: subscriber setup for binaries

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod background;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;

// Re-export the layers
pub use strata_procedural as procedural;
pub use strata_shared as shared;
pub use strata_world as world;

pub use background::BackgroundGenerator;
pub use config::{builtin_tile_types, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use logging::init_logging;
pub use session::{TickReport, WorldSession};
