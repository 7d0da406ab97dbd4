//! # World Synthesis
//!
//! Turns noise into tile records.
//!
//! ## Per-tile pipeline
//!
//! ```text
//! (x, y) ─┬─ perlin_fbm  ──> height ──────┐
//!         ├─ simplex_fbm ──> moisture ────┼─> classifier ─> biome ─> Ground tile
//!         └─ simplex_fbm ──> temperature ─┘                     └──> Objects tile?
//! ```
//!
//! The pipeline is a pure function of `(seed, config, x, y)`. Regions can be
//! generated in any order, on any thread, and always agree at their borders.

use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use strata_shared::{Layer, RegionCoord, TileId, TilePos};

use crate::biome::{Biome, BiomeClassifier, ThresholdBiomeClassifier};
use crate::config::GeneratorConfig;
use crate::error::ProceduralResult;
use crate::noise::{NoiseGenerator, WorldSeed};

/// One tile record produced by generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratedTile {
    /// World X coordinate.
    pub world_x: i32,
    /// World Y coordinate.
    pub world_y: i32,
    /// Layer the tile goes on.
    pub layer: Layer,
    /// Tile type.
    pub tile_id: TileId,
    /// Biome of the coordinate.
    pub biome: Biome,
}

/// Climate sample at one coordinate; every channel in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Climate {
    /// Normalized elevation.
    pub height: f64,
    /// Normalized moisture.
    pub moisture: f64,
    /// Normalized temperature.
    pub temperature: f64,
}

/// Result of generating a whole region.
#[derive(Clone, Debug)]
pub struct RegionGeneration {
    /// Region that was generated.
    pub coord: RegionCoord,
    /// Tiles in row-major order, ground before objects at each coordinate.
    pub tiles: Vec<GeneratedTile>,
    /// Ground tiles per biome.
    pub biome_distribution: BTreeMap<Biome, usize>,
    /// Macro region id at the region's center.
    pub macro_region: u32,
    /// Wall-clock generation time.
    pub generation_time: Duration,
}

impl RegionGeneration {
    /// Biome covering the most ground tiles (ties go to the lower biome).
    #[must_use]
    pub fn dominant_biome(&self) -> Option<Biome> {
        self.biome_distribution
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
            .map(|(biome, _)| *biome)
    }

    /// Number of objects-layer tiles.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.layer == Layer::Objects).count()
    }
}

/// World generator using procedural noise.
///
/// Read-only after construction, so one instance can be shared between
/// threads behind an `Arc`.
#[derive(Debug)]
pub struct WorldGenerator<C = ThresholdBiomeClassifier> {
    /// Noise source for every channel.
    noise: NoiseGenerator,
    /// Climate model.
    classifier: C,
    /// Channel and search parameters.
    config: GeneratorConfig,
}

impl WorldGenerator<ThresholdBiomeClassifier> {
    /// Creates a generator with the stock threshold classifier.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(seed: WorldSeed, config: GeneratorConfig) -> ProceduralResult<Self> {
        let classifier = ThresholdBiomeClassifier::new(config.sea_level);
        Self::with_classifier(seed, config, classifier)
    }
}

impl<C: BiomeClassifier> WorldGenerator<C> {
    /// White noise channel of the decoration roll.
    const DECORATION_CHANNEL: u32 = 1000;
    /// White noise channel of the resource roll.
    const RESOURCE_CHANNEL: u32 = 2000;
    /// Temperature channel is sampled away from the height channel.
    const TEMPERATURE_OFFSET: f64 = 5000.0;

    /// Creates a generator with a custom classifier.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn with_classifier(
        seed: WorldSeed,
        config: GeneratorConfig,
        classifier: C,
    ) -> ProceduralResult<Self> {
        config.validate()?;
        tracing::debug!(
            seed = seed.value(),
            region_size = config.region_size,
            sea_level = config.sea_level,
            "world generator created"
        );
        Ok(Self {
            noise: NoiseGenerator::new(seed),
            classifier,
            config,
        })
    }

    /// Returns the world seed.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.noise.seed()
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Returns the noise source.
    #[must_use]
    pub const fn noise(&self) -> &NoiseGenerator {
        &self.noise
    }

    /// Returns the climate model.
    #[must_use]
    pub const fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Samples all three climate channels.
    #[must_use]
    pub fn climate_at(&self, x: i32, y: i32) -> Climate {
        let (fx, fy) = (f64::from(x), f64::from(y));
        let height = self.noise.perlin_fbm(fx, fy, &self.config.height);
        let moisture = self.noise.simplex_fbm(fx, fy, &self.config.moisture);
        let temperature = self.temperature_with_height(fx, fy, height);
        Climate {
            height,
            moisture,
            temperature,
        }
    }

    /// Normalized elevation in [0, 1].
    #[must_use]
    pub fn height_at(&self, x: i32, y: i32) -> f64 {
        self.noise
            .perlin_fbm(f64::from(x), f64::from(y), &self.config.height)
    }

    /// Normalized moisture in [0, 1].
    #[must_use]
    pub fn moisture_at(&self, x: i32, y: i32) -> f64 {
        self.noise
            .simplex_fbm(f64::from(x), f64::from(y), &self.config.moisture)
    }

    /// Normalized temperature in [0, 1].
    ///
    /// Blends a noise channel, a latitude falloff from `y = 0` and a cooling
    /// term for high ground.
    #[must_use]
    pub fn temperature_at(&self, x: i32, y: i32) -> f64 {
        let height = self.height_at(x, y);
        self.temperature_with_height(f64::from(x), f64::from(y), height)
    }

    fn temperature_with_height(&self, x: f64, y: f64, height: f64) -> f64 {
        let base = self.noise.simplex_fbm(
            x + Self::TEMPERATURE_OFFSET,
            y + Self::TEMPERATURE_OFFSET,
            &self.config.temperature,
        );
        let latitude = 1.0 - (y * self.config.temperature_latitude_scale).abs();
        let altitude = 1.0 - ((height - 0.5) * 0.5).max(0.0);
        (0.5 * base + 0.3 * latitude + 0.2 * altitude).clamp(0.0, 1.0)
    }

    /// Biome at a coordinate.
    #[must_use]
    pub fn biome_at(&self, x: i32, y: i32) -> Biome {
        let climate = self.climate_at(x, y);
        self.classify(&climate)
    }

    /// Whether the coordinate is above sea level.
    #[must_use]
    pub fn is_land(&self, x: i32, y: i32) -> bool {
        self.height_at(x, y) >= self.config.sea_level
    }

    /// Stable identity of the large-scale area containing the coordinate.
    #[must_use]
    pub fn macro_region_at(&self, x: i32, y: i32) -> u32 {
        self.noise.voronoi_cell_id(
            f64::from(x),
            f64::from(y),
            self.config.macro_region_scale,
        )
    }

    /// Generates the tiles at one coordinate.
    ///
    /// Always one ground tile, plus at most one objects tile (a decoration,
    /// or a resource where no decoration was placed).
    #[must_use]
    pub fn generate_tile(&self, x: i32, y: i32) -> Vec<GeneratedTile> {
        let mut tiles = Vec::with_capacity(2);
        self.generate_tile_into(x, y, &mut tiles);
        tiles
    }

    /// Generates a whole region in row-major order.
    #[must_use]
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub fn generate_region(&self, coord: RegionCoord) -> RegionGeneration {
        let start = Instant::now();
        let size = self.config.region_size as i32;
        let origin = coord.origin(self.config.region_size);

        let mut tiles = Vec::with_capacity((size * size) as usize * 2);
        let mut biome_distribution = BTreeMap::new();

        for local_y in 0..size {
            for local_x in 0..size {
                // The region at the positive edge of the world is partial
                let (Some(x), Some(y)) = (origin.x.checked_add(local_x), origin.y.checked_add(local_y))
                else {
                    continue;
                };
                let biome = self.generate_tile_into(x, y, &mut tiles);
                *biome_distribution.entry(biome).or_insert(0) += 1;
            }
        }

        let center = origin.offset(size / 2, size / 2);
        let macro_region = self.macro_region_at(center.x, center.y);
        let generation_time = start.elapsed();

        tracing::debug!(
            region = %coord,
            tiles = tiles.len(),
            elapsed_ms = generation_time.as_secs_f64() * 1000.0,
            "region generated"
        );

        RegionGeneration {
            coord,
            tiles,
            biome_distribution,
            macro_region,
            generation_time,
        }
    }

    /// Searches rings around the origin for a safe, buildable spawn.
    ///
    /// Falls back to the origin when no ring sample qualifies.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn find_spawn_point(&self) -> TilePos {
        let search = &self.config.spawn;
        let step = search.radius_step.max(1) as usize;
        let samples = search.samples_per_ring.max(1);

        for radius in (0..=search.max_radius).step_by(step) {
            let r = f64::from(radius);
            for i in 0..samples {
                let angle = TAU * f64::from(i) / f64::from(samples);
                let x = (angle.cos() * r).round() as i32;
                let y = (angle.sin() * r).round() as i32;

                if self.is_spawnable(x, y) {
                    tracing::info!(x, y, radius, "spawn point found");
                    return TilePos::new(x, y);
                }
            }
        }

        tracing::warn!(
            max_radius = search.max_radius,
            "no spawn point found, using origin"
        );
        TilePos::ORIGIN
    }

    fn is_spawnable(&self, x: i32, y: i32) -> bool {
        let biome = self.biome_at(x, y);
        let definition = self.classifier.definition(biome);
        definition.walkable
            && definition.buildable
            && definition.hostile_spawn_rate <= self.config.spawn.max_hostile_spawn_rate
            && self.config.spawn.preferred_biomes.contains(&biome)
    }

    fn classify(&self, climate: &Climate) -> Biome {
        self.classifier
            .determine_biome(climate.height, climate.moisture, climate.temperature)
    }

    /// Appends the tiles of one coordinate and returns its biome.
    fn generate_tile_into(&self, x: i32, y: i32, out: &mut Vec<GeneratedTile>) -> Biome {
        let climate = self.climate_at(x, y);
        let biome = self.classify(&climate);
        let definition = self.classifier.definition(biome);

        out.push(GeneratedTile {
            world_x: x,
            world_y: y,
            layer: Layer::Ground,
            tile_id: definition.ground_tile,
            biome,
        });

        // Uniform rolls, so biome densities are per-tile probabilities
        let object = self
            .classifier
            .random_decoration(biome, self.noise.white_2d(x, y, Self::DECORATION_CHANNEL))
            .or_else(|| {
                let resource_roll = self.noise.white_2d(x, y, Self::RESOURCE_CHANNEL);
                self.classifier.random_resource(biome, resource_roll)
            });

        if let Some(tile_id) = object {
            out.push(GeneratedTile {
                world_x: x,
                world_y: y,
                layer: Layer::Objects,
                tile_id,
                biome,
            });
        }

        biome
    }
}
