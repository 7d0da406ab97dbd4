//! Generator configuration.
//!
//! Every section deserializes with `#[serde(default)]`, so a TOML file only
//! needs the keys it wants to change:
//!
//! ```toml
//! sea_level = 0.4
//!
//! [height]
//! octaves = 5
//! scale = 0.008
//! persistence = 0.5
//! lacunarity = 2.0
//!
//! [spawn]
//! preferred_biomes = ["plains"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_shared::{DEFAULT_REGION_SIZE, DEFAULT_SEA_LEVEL};

use crate::biome::Biome;
use crate::error::{ProceduralError, ProceduralResult};
use crate::noise::NoiseConfig;

/// Spawn point search parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSearchConfig {
    /// Largest ring radius searched, in tiles.
    pub max_radius: u32,
    /// Radius increment between rings (>= 1).
    pub radius_step: u32,
    /// Candidates sampled per ring (>= 1).
    pub samples_per_ring: u32,
    /// Candidates above this hostile spawn rate are rejected.
    pub max_hostile_spawn_rate: f64,
    /// Biomes a spawn may land in.
    pub preferred_biomes: Vec<Biome>,
}

impl Default for SpawnSearchConfig {
    fn default() -> Self {
        Self {
            max_radius: 100,
            radius_step: 5,
            samples_per_ring: 16,
            max_hostile_spawn_rate: 0.5,
            preferred_biomes: vec![Biome::Plains, Biome::Forest],
        }
    }
}

impl SpawnSearchConfig {
    /// Checks parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for a zero step, zero samples or an empty
    /// preferred set.
    pub fn validate(&self) -> ProceduralResult<()> {
        if self.radius_step == 0 {
            return Err(ProceduralError::InvalidConfig(
                "spawn.radius_step must be at least 1".to_string(),
            ));
        }
        if self.samples_per_ring == 0 {
            return Err(ProceduralError::InvalidConfig(
                "spawn.samples_per_ring must be at least 1".to_string(),
            ));
        }
        if self.preferred_biomes.is_empty() {
            return Err(ProceduralError::InvalidConfig(
                "spawn.preferred_biomes must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the world generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Region edge length in tiles.
    pub region_size: u32,
    /// Normalized height below which terrain is water.
    pub sea_level: f64,
    /// How fast temperature falls off with distance from `y = 0`.
    pub temperature_latitude_scale: f64,
    /// Voronoi scale of macro regions.
    pub macro_region_scale: f64,
    /// Height channel.
    pub height: NoiseConfig,
    /// Moisture channel.
    pub moisture: NoiseConfig,
    /// Temperature channel.
    pub temperature: NoiseConfig,
    /// Spawn point search.
    pub spawn: SpawnSearchConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            region_size: DEFAULT_REGION_SIZE,
            sea_level: DEFAULT_SEA_LEVEL,
            temperature_latitude_scale: 0.0005,
            macro_region_scale: 0.004,
            height: NoiseConfig::HEIGHT,
            moisture: NoiseConfig::MOISTURE,
            temperature: NoiseConfig::TEMPERATURE,
            spawn: SpawnSearchConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Largest region edge; a region is materialized in one pass.
    pub const MAX_REGION_SIZE: u32 = 4096;

    /// Checks every channel and range.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> ProceduralResult<()> {
        self.height.validate("height")?;
        self.moisture.validate("moisture")?;
        self.temperature.validate("temperature")?;

        if self.region_size == 0 || self.region_size > Self::MAX_REGION_SIZE {
            return Err(ProceduralError::InvalidConfig(format!(
                "region_size must be in 1..={}, got {}",
                Self::MAX_REGION_SIZE,
                self.region_size
            )));
        }
        if !(0.0..=1.0).contains(&self.sea_level) {
            return Err(ProceduralError::InvalidConfig(format!(
                "sea_level must be in [0, 1], got {}",
                self.sea_level
            )));
        }
        if !self.temperature_latitude_scale.is_finite() || self.temperature_latitude_scale < 0.0 {
            return Err(ProceduralError::InvalidConfig(format!(
                "temperature_latitude_scale must be non-negative, got {}",
                self.temperature_latitude_scale
            )));
        }
        if !self.macro_region_scale.is_finite() || self.macro_region_scale <= 0.0 {
            return Err(ProceduralError::InvalidConfig(format!(
                "macro_region_scale must be positive, got {}",
                self.macro_region_scale
            )));
        }
        self.spawn.validate()
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// `ConfigParse` for malformed TOML, otherwise whatever
    /// [`Self::validate`] reports.
    pub fn from_toml_str(source: &str) -> ProceduralResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ProceduralError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// `ConfigRead` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ProceduralResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ProceduralError::ConfigRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            sea_level = 0.4

            [height]
            octaves = 5
            scale = 0.008
            persistence = 0.5
            lacunarity = 2.0

            [spawn]
            preferred_biomes = ["plains"]
            "#,
        )
        .expect("valid config");

        assert!((config.sea_level - 0.4).abs() < f64::EPSILON);
        assert_eq!(config.height.octaves, 5);
        assert_eq!(config.moisture, NoiseConfig::MOISTURE);
        assert_eq!(config.spawn.preferred_biomes, vec![Biome::Plains]);
        assert_eq!(config.spawn.max_radius, 100);
        assert_eq!(config.region_size, DEFAULT_REGION_SIZE);
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let result = GeneratorConfig::from_toml_str(
            r"
            [moisture]
            octaves = 0
            scale = 0.01
            persistence = 0.5
            lacunarity = 2.0
            ",
        );
        assert!(matches!(
            result,
            Err(ProceduralError::InvalidNoiseConfig { channel: "moisture", .. })
        ));
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(matches!(
            GeneratorConfig::from_toml_str("sea_level = ["),
            Err(ProceduralError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file_reported() {
        let result = GeneratorConfig::load("/definitely/not/here/strata.toml");
        assert!(matches!(result, Err(ProceduralError::ConfigRead { .. })));
    }

    #[test]
    fn test_region_size_bounds() {
        for size in [0, GeneratorConfig::MAX_REGION_SIZE + 1] {
            let config = GeneratorConfig {
                region_size: size,
                ..GeneratorConfig::default()
            };
            assert!(matches!(config.validate(), Err(ProceduralError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_zero_spawn_step_rejected() {
        let mut config = GeneratorConfig::default();
        config.spawn.radius_step = 0;
        assert!(config.validate().is_err());
    }
}
