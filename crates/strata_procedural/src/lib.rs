//! # STRATA Procedural Generation
//!
//! Deterministic world generation for infinite, reproducible tile worlds.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Stateless**: Every tile is a pure function of its coordinates
//! 3. **Streamable**: Regions can be generated/discarded independently
//! 4. **Pluggable**: The climate model sits behind a trait
//!
//! ## Core Components
//!
//! - `NoiseGenerator`: Perlin, Simplex, Voronoi and FBM
//! - `BiomeClassifier`: Determines terrain types from climate values
//! - `WorldGenerator`: Produces tile records per coordinate and per region
//! - `GeneratorConfig`: Channel parameters, loadable from TOML
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_procedural::{GeneratorConfig, WorldGenerator, WorldSeed};
//! use strata_shared::RegionCoord;
//!
//! let world = WorldGenerator::new(WorldSeed::new(12345), GeneratorConfig::default())?;
//!
//! let spawn = world.find_spawn_point();
//! let region = world.generate_region(RegionCoord::from_world(spawn.x, spawn.y, 64));
//! println!("{:?}", region.dominant_biome());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod config;
pub mod error;
pub mod noise;
pub mod tiles;
pub mod world;

pub use biome::{Biome, BiomeClassifier, BiomeDefinition, ThresholdBiomeClassifier};
pub use config::{GeneratorConfig, SpawnSearchConfig};
pub use error::{ProceduralError, ProceduralResult};
pub use noise::{NoiseConfig, NoiseGenerator, WorldSeed};
pub use world::{Climate, GeneratedTile, RegionGeneration, WorldGenerator};
