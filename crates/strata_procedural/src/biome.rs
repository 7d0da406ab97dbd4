//! # Biome Classification
//!
//! Determines terrain type from climate values.
//!
//! The world generator only talks to the [`BiomeClassifier`] trait. It never
//! looks at thresholds itself, so a host can swap the climate model without
//! touching generation.
//!
//! [`ThresholdBiomeClassifier`] is the stock model:
//! - Elevation decides water, coast and highlands
//! - Temperature splits cold, temperate and hot bands
//! - Moisture picks the biome inside a band

use std::fmt;

use serde::{Deserialize, Serialize};
use strata_shared::{TileId, DEFAULT_SEA_LEVEL};

use crate::tiles;

/// Biome types in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Biome {
    /// Deep ocean
    DeepOcean = 0,
    /// Shallow ocean
    Ocean = 1,
    /// Beach/coastline
    Beach = 2,
    /// Plains/grassland
    Plains = 3,
    /// Forest
    Forest = 4,
    /// Dense jungle
    Jungle = 5,
    /// Arid desert
    Desert = 6,
    /// Savanna grassland
    Savanna = 7,
    /// Cold tundra
    Tundra = 8,
    /// Snowy taiga forest
    Taiga = 9,
    /// High mountains
    Mountains = 10,
    /// Snowy peaks
    SnowyPeaks = 11,
    /// Swamp/wetland
    Swamp = 12,
}

impl Biome {
    /// Every biome, in discriminant order.
    pub const ALL: [Self; 13] = [
        Self::DeepOcean,
        Self::Ocean,
        Self::Beach,
        Self::Plains,
        Self::Forest,
        Self::Jungle,
        Self::Desert,
        Self::Savanna,
        Self::Tundra,
        Self::Taiga,
        Self::Mountains,
        Self::SnowyPeaks,
        Self::Swamp,
    ];

    /// Returns whether this biome is open water.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::DeepOcean | Self::Ocean)
    }

    /// Entry for this biome in the stock biome table.
    #[must_use]
    pub fn reference_definition(self) -> &'static BiomeDefinition {
        &BIOME_DEFINITIONS[self as usize]
    }

    /// Single character used by text previews.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::DeepOcean => '~',
            Self::Ocean => '-',
            Self::Beach => '.',
            Self::Plains => ',',
            Self::Forest => 'T',
            Self::Jungle => '%',
            Self::Desert => ':',
            Self::Savanna => ';',
            Self::Tundra => '_',
            Self::Taiga => 'A',
            Self::Mountains => '^',
            Self::SnowyPeaks => '*',
            Self::Swamp => '&',
        }
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reference_definition().name)
    }
}

/// Static description of one biome.
///
/// Densities are per-tile probabilities in [0, 1] for a uniform roll; the
/// tile lists are sampled uniformly when the roll succeeds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeDefinition {
    /// Human readable name.
    pub name: &'static str,
    /// Tile placed on the ground layer.
    pub ground_tile: TileId,
    /// Whether units can walk here.
    pub walkable: bool,
    /// Whether structures can be placed here.
    pub buildable: bool,
    /// Relative hostile spawn pressure in [0, 1].
    pub hostile_spawn_rate: f64,
    /// Chance of a decoration per tile.
    pub decoration_density: f64,
    /// Decoration tiles.
    pub decorations: &'static [TileId],
    /// Chance of a resource per tile (only where no decoration was placed).
    pub resource_density: f64,
    /// Resource tiles.
    pub resources: &'static [TileId],
}

impl BiomeDefinition {
    /// Picks a decoration for a uniform roll `rand` in [0, 1].
    #[must_use]
    pub fn pick_decoration(&self, rand: f64) -> Option<TileId> {
        pick_weighted(self.decoration_density, self.decorations, rand)
    }

    /// Picks a resource for a uniform roll `rand` in [0, 1].
    #[must_use]
    pub fn pick_resource(&self, rand: f64) -> Option<TileId> {
        pick_weighted(self.resource_density, self.resources, rand)
    }
}

/// `tiles[floor(rand / density * len)]` when `rand < density`.
///
/// Rescaling the successful part of the roll keeps one roll enough for both
/// the "anything?" and "which one?" decisions.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn pick_weighted(density: f64, tiles: &[TileId], rand: f64) -> Option<TileId> {
    if tiles.is_empty() || density <= 0.0 || rand.is_nan() || rand >= density {
        return None;
    }
    let index = (rand.max(0.0) / density * tiles.len() as f64) as usize;
    tiles.get(index.min(tiles.len() - 1)).copied()
}

/// Climate model contract consumed by the world generator.
pub trait BiomeClassifier: Send + Sync {
    /// Classifies normalized climate values, each in [0, 1].
    fn determine_biome(&self, height: f64, moisture: f64, temperature: f64) -> Biome;

    /// Returns the static definition of a biome.
    fn definition(&self, biome: Biome) -> &BiomeDefinition;

    /// Picks a decoration tile for `biome`, if the roll places one.
    fn random_decoration(&self, biome: Biome, rand: f64) -> Option<TileId> {
        self.definition(biome).pick_decoration(rand)
    }

    /// Picks a resource tile for `biome`, if the roll places one.
    fn random_resource(&self, biome: Biome, rand: f64) -> Option<TileId> {
        self.definition(biome).pick_resource(rand)
    }
}

/// Threshold-based classifier with a fixed biome table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdBiomeClassifier {
    sea_level: f64,
}

impl ThresholdBiomeClassifier {
    /// Depth below sea level where the ocean turns deep.
    const DEEP_OCEAN_DEPTH: f64 = 0.15;
    /// Height of the beach strip above sea level.
    const BEACH_HEIGHT: f64 = 0.03;
    /// Swamps only form this close to sea level.
    const SWAMP_HEIGHT: f64 = 0.1;

    /// Creates a classifier for the given sea level.
    #[must_use]
    pub const fn new(sea_level: f64) -> Self {
        Self { sea_level }
    }

    /// Sea level this classifier splits land from water at.
    #[must_use]
    pub const fn sea_level(&self) -> f64 {
        self.sea_level
    }
}

impl Default for ThresholdBiomeClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SEA_LEVEL)
    }
}

impl BiomeClassifier for ThresholdBiomeClassifier {
    fn determine_biome(&self, height: f64, moisture: f64, temperature: f64) -> Biome {
        let sea = self.sea_level;

        // Water and coast
        if height < sea - Self::DEEP_OCEAN_DEPTH {
            return Biome::DeepOcean;
        }
        if height < sea {
            return Biome::Ocean;
        }
        if height < sea + Self::BEACH_HEIGHT {
            return Biome::Beach;
        }

        // Highlands
        if height > 0.8 {
            return if temperature < 0.35 {
                Biome::SnowyPeaks
            } else {
                Biome::Mountains
            };
        }
        if height > 0.7 {
            return Biome::Mountains;
        }

        // Cold band
        if temperature < 0.25 {
            return if moisture > 0.5 {
                Biome::Taiga
            } else {
                Biome::Tundra
            };
        }

        // Hot band
        if temperature > 0.7 {
            return if moisture < 0.3 {
                Biome::Desert
            } else if moisture > 0.6 {
                Biome::Jungle
            } else {
                Biome::Savanna
            };
        }

        // Temperate
        if moisture > 0.7 && height < sea + Self::SWAMP_HEIGHT {
            Biome::Swamp
        } else if moisture > 0.5 {
            Biome::Forest
        } else {
            Biome::Plains
        }
    }

    fn definition(&self, biome: Biome) -> &BiomeDefinition {
        biome.reference_definition()
    }
}

/// Biome table, indexed by discriminant.
static BIOME_DEFINITIONS: [BiomeDefinition; 13] = [
    BiomeDefinition {
        name: "Deep Ocean",
        ground_tile: tiles::DEEP_WATER,
        walkable: false,
        buildable: false,
        hostile_spawn_rate: 0.0,
        decoration_density: 0.0,
        decorations: &[],
        resource_density: 0.0,
        resources: &[],
    },
    BiomeDefinition {
        name: "Ocean",
        ground_tile: tiles::WATER,
        walkable: false,
        buildable: false,
        hostile_spawn_rate: 0.0,
        decoration_density: 0.04,
        decorations: &[tiles::SEAWEED],
        resource_density: 0.0,
        resources: &[],
    },
    BiomeDefinition {
        name: "Beach",
        ground_tile: tiles::SAND,
        walkable: true,
        buildable: true,
        hostile_spawn_rate: 0.1,
        decoration_density: 0.05,
        decorations: &[tiles::SHELLS, tiles::PALM_TREE],
        resource_density: 0.02,
        resources: &[tiles::CLAY_DEPOSIT],
    },
    BiomeDefinition {
        name: "Plains",
        ground_tile: tiles::GRASS,
        walkable: true,
        buildable: true,
        hostile_spawn_rate: 0.2,
        decoration_density: 0.1,
        decorations: &[tiles::FLOWERS, tiles::TALL_GRASS, tiles::BUSH],
        resource_density: 0.03,
        resources: &[tiles::STONE_NODE, tiles::BERRY_BUSH],
    },
    BiomeDefinition {
        name: "Forest",
        ground_tile: tiles::FOREST_FLOOR,
        walkable: true,
        buildable: true,
        hostile_spawn_rate: 0.4,
        decoration_density: 0.35,
        decorations: &[tiles::OAK_TREE, tiles::OAK_TREE, tiles::BUSH, tiles::FERN],
        resource_density: 0.04,
        resources: &[tiles::BERRY_BUSH, tiles::STONE_NODE],
    },
    BiomeDefinition {
        name: "Jungle",
        ground_tile: tiles::JUNGLE_GRASS,
        walkable: true,
        buildable: false,
        hostile_spawn_rate: 0.7,
        decoration_density: 0.5,
        decorations: &[tiles::PALM_TREE, tiles::FERN, tiles::BUSH],
        resource_density: 0.03,
        resources: &[tiles::BERRY_BUSH],
    },
    BiomeDefinition {
        name: "Desert",
        ground_tile: tiles::DESERT_SAND,
        walkable: true,
        buildable: true,
        hostile_spawn_rate: 0.6,
        decoration_density: 0.03,
        decorations: &[tiles::CACTUS, tiles::DEAD_BUSH],
        resource_density: 0.02,
        resources: &[tiles::GOLD_ORE, tiles::STONE_NODE],
    },
    BiomeDefinition {
        name: "Savanna",
        ground_tile: tiles::DRY_GRASS,
        walkable: true,
        buildable: true,
        hostile_spawn_rate: 0.3,
        decoration_density: 0.06,
        decorations: &[tiles::ACACIA_TREE, tiles::TALL_GRASS],
        resource_density: 0.02,
        resources: &[tiles::STONE_NODE],
    },
    BiomeDefinition {
        name: "Tundra",
        ground_tile: tiles::FROZEN_DIRT,
        walkable: true,
        buildable: true,
        hostile_spawn_rate: 0.3,
        decoration_density: 0.03,
        decorations: &[tiles::ICE_ROCK],
        resource_density: 0.02,
        resources: &[tiles::IRON_ORE],
    },
    BiomeDefinition {
        name: "Taiga",
        ground_tile: tiles::SNOW,
        walkable: true,
        buildable: true,
        hostile_spawn_rate: 0.4,
        decoration_density: 0.3,
        decorations: &[tiles::PINE_TREE],
        resource_density: 0.02,
        resources: &[tiles::IRON_ORE, tiles::STONE_NODE],
    },
    BiomeDefinition {
        name: "Mountains",
        ground_tile: tiles::STONE,
        walkable: true,
        buildable: false,
        hostile_spawn_rate: 0.6,
        decoration_density: 0.05,
        decorations: &[tiles::BOULDER],
        resource_density: 0.08,
        resources: &[tiles::IRON_ORE, tiles::COAL_ORE, tiles::GOLD_ORE],
    },
    BiomeDefinition {
        name: "Snowy Peaks",
        ground_tile: tiles::SNOW,
        walkable: false,
        buildable: false,
        hostile_spawn_rate: 0.5,
        decoration_density: 0.02,
        decorations: &[tiles::ICE_ROCK],
        resource_density: 0.04,
        resources: &[tiles::CRYSTAL],
    },
    BiomeDefinition {
        name: "Swamp",
        ground_tile: tiles::MUD,
        walkable: true,
        buildable: false,
        hostile_spawn_rate: 0.6,
        decoration_density: 0.2,
        decorations: &[tiles::REEDS, tiles::DEAD_TREE],
        resource_density: 0.03,
        resources: &[tiles::CLAY_DEPOSIT],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_discriminants() {
        let classifier = ThresholdBiomeClassifier::default();
        for biome in Biome::ALL {
            let definition = classifier.definition(biome);
            assert_eq!(definition.name, biome.to_string());
            assert_eq!(biome.is_water(), !definition.walkable && definition.hostile_spawn_rate == 0.0);
        }
    }

    #[test]
    fn test_ocean_at_low_elevation() {
        let classifier = ThresholdBiomeClassifier::new(0.35);
        assert_eq!(classifier.determine_biome(0.1, 0.5, 0.5), Biome::DeepOcean);
        assert_eq!(classifier.determine_biome(0.3, 0.5, 0.5), Biome::Ocean);
        assert_eq!(classifier.determine_biome(0.36, 0.5, 0.5), Biome::Beach);
    }

    #[test]
    fn test_highlands() {
        let classifier = ThresholdBiomeClassifier::default();
        assert_eq!(classifier.determine_biome(0.85, 0.5, 0.2), Biome::SnowyPeaks);
        assert_eq!(classifier.determine_biome(0.85, 0.5, 0.5), Biome::Mountains);
        assert_eq!(classifier.determine_biome(0.75, 0.5, 0.1), Biome::Mountains);
    }

    #[test]
    fn test_climate_bands() {
        let classifier = ThresholdBiomeClassifier::default();
        let h = 0.5;
        assert_eq!(classifier.determine_biome(h, 0.3, 0.1), Biome::Tundra);
        assert_eq!(classifier.determine_biome(h, 0.8, 0.1), Biome::Taiga);
        assert_eq!(classifier.determine_biome(h, 0.1, 0.9), Biome::Desert);
        assert_eq!(classifier.determine_biome(h, 0.9, 0.9), Biome::Jungle);
        assert_eq!(classifier.determine_biome(h, 0.45, 0.9), Biome::Savanna);
        assert_eq!(classifier.determine_biome(h, 0.6, 0.5), Biome::Forest);
        assert_eq!(classifier.determine_biome(h, 0.3, 0.5), Biome::Plains);
        // Wet lowland just above the beach
        assert_eq!(classifier.determine_biome(0.4, 0.8, 0.5), Biome::Swamp);
        // Same moisture, too high for a swamp
        assert_eq!(classifier.determine_biome(0.6, 0.8, 0.5), Biome::Forest);
    }

    #[test]
    fn test_decoration_roll() {
        let classifier = ThresholdBiomeClassifier::default();
        let plains = classifier.definition(Biome::Plains);

        // Above the density: nothing
        assert_eq!(classifier.random_decoration(Biome::Plains, 0.5), None);
        // Rescaled roll walks the list in order
        assert_eq!(classifier.random_decoration(Biome::Plains, 0.0), Some(tiles::FLOWERS));
        assert_eq!(
            classifier.random_decoration(Biome::Plains, plains.decoration_density * 0.5),
            Some(tiles::TALL_GRASS)
        );
        assert_eq!(
            classifier.random_decoration(Biome::Plains, plains.decoration_density * 0.99),
            Some(tiles::BUSH)
        );
        // Empty list never picks
        assert_eq!(classifier.random_resource(Biome::Ocean, 0.0), None);
    }
}
