//! # Engine Configuration
//!
//! One TOML file drives a whole session:
//!
//! ```toml
//! seed = 12345
//! save_dir = "saves/world1"
//! background_workers = 2
//! log_level = "info,strata_world=debug"
//!
//! [generator]
//! sea_level = 0.35
//!
//! [generator.height]
//! octaves = 5
//! scale = 0.01
//! persistence = 0.5
//! lacunarity = 2.0
//!
//! [streaming]
//! load_distance = 2
//! unload_distance = 3
//! ```
//!
//! Every section is optional and missing keys take their defaults. A noise
//! channel, once given, must be given in full.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_procedural::{GeneratorConfig, WorldSeed};
use strata_shared::DEFAULT_EVENT_CAPACITY;
use strata_world::{StreamingConfig, TileTypeRegistry};

use crate::error::{EngineError, EngineResult};

/// Tile types shipped with the engine; IDs match `strata_procedural::tiles`.
const BUILTIN_TILE_TYPES: &str = include_str!("../assets/tile_types.toml");

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World seed.
    pub seed: WorldSeed,
    /// Noise channels, biome thresholds and spawn search.
    pub generator: GeneratorConfig,
    /// Region size and streaming radii.
    pub streaming: StreamingConfig,
    /// Event bus capacity.
    pub event_capacity: usize,
    /// Where edited regions are persisted; `None` keeps edits in memory.
    pub save_dir: Option<PathBuf>,
    /// Generation threads; 0 generates on the calling thread.
    pub background_workers: usize,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: WorldSeed::default(),
            generator: GeneratorConfig::default(),
            streaming: StreamingConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            save_dir: None,
            background_workers: 0,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Upper bound on worker threads.
    pub const MAX_WORKERS: usize = 64;

    /// Checks every section and their agreement.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> EngineResult<()> {
        self.generator.validate()?;
        self.streaming.validate()?;

        if self.streaming.region_size != self.generator.region_size {
            return Err(EngineError::InvalidConfig(format!(
                "streaming.region_size ({}) must equal generator.region_size ({})",
                self.streaming.region_size, self.generator.region_size
            )));
        }
        if self.event_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "event_capacity must be positive".to_string(),
            ));
        }
        if self.background_workers > Self::MAX_WORKERS {
            return Err(EngineError::InvalidConfig(format!(
                "background_workers must be at most {}, got {}",
                Self::MAX_WORKERS,
                self.background_workers
            )));
        }
        Ok(())
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigParse` for malformed TOML, otherwise whatever
    /// [`Self::validate`] reports.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `ConfigRead` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), seed = config.seed.value(), "engine config loaded");
        Ok(config)
    }
}

/// Parses the tile types bundled with the engine.
///
/// # Errors
///
/// Only if the bundled file is broken.
pub fn builtin_tile_types() -> EngineResult<TileTypeRegistry> {
    Ok(TileTypeRegistry::from_toml_str(BUILTIN_TILE_TYPES)?)
}
