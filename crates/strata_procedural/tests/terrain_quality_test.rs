//! # Terrain Quality Tests
//!
//! Verifies that generated worlds are varied, seamless and reproducible.

use std::collections::{HashMap, HashSet};

use strata_procedural::{
    Biome, BiomeClassifier, GeneratorConfig, WorldGenerator, WorldSeed,
};
use strata_shared::{Layer, RegionCoord};

fn world(seed: u32) -> WorldGenerator {
    WorldGenerator::new(WorldSeed::new(seed), GeneratorConfig::default())
        .expect("default config is valid")
}

/// Test: A large area mixes land, water and several biomes.
#[test]
fn test_terrain_is_varied() {
    let world = world(42);

    let mut biomes = HashSet::new();
    let mut land = 0u32;
    let mut total = 0u32;

    for y in (-1000..1000).step_by(10) {
        for x in (-1000..1000).step_by(10) {
            biomes.insert(world.biome_at(x, y));
            if world.is_land(x, y) {
                land += 1;
            }
            total += 1;
        }
    }

    let land_percentage = f64::from(land) / f64::from(total) * 100.0;
    println!("Land: {land_percentage:.1}%, biomes: {biomes:?}");

    assert!(land_percentage > 50.0, "Too much water: {land_percentage:.1}% land");
    assert!(biomes.len() >= 3, "Not enough variety: {biomes:?}");
}

/// Test: Neighbouring regions agree on their shared border.
#[test]
fn test_regions_are_seamless() {
    let mut config = GeneratorConfig::default();
    config.region_size = 32;
    let world = WorldGenerator::new(WorldSeed::new(9), config).expect("valid");

    let left = world.generate_region(RegionCoord::new(-1, 0));
    let right = world.generate_region(RegionCoord::new(0, 0));

    // Last column of the left region and first column of the right region
    // must match what per-tile generation says.
    for tile in left.tiles.iter().chain(&right.tiles) {
        if tile.layer != Layer::Ground || !(tile.world_x == -1 || tile.world_x == 0) {
            continue;
        }
        let fresh = world.generate_tile(tile.world_x, tile.world_y);
        assert_eq!(fresh[0], *tile);
    }
}

/// Test: Two generators with one seed produce identical regions.
#[test]
fn test_region_generation_reproducible() {
    let a = world(1234);
    let b = world(1234);

    for coord in [RegionCoord::new(0, 0), RegionCoord::new(-3, 7)] {
        let ra = a.generate_region(coord);
        let rb = b.generate_region(coord);
        assert_eq!(ra.tiles, rb.tiles);
        assert_eq!(ra.biome_distribution, rb.biome_distribution);
        assert_eq!(ra.macro_region, rb.macro_region);
    }
}

/// Test: Different seeds produce different worlds.
#[test]
fn test_seeds_change_the_world() {
    let a = world(1).generate_region(RegionCoord::new(0, 0));
    let b = world(2).generate_region(RegionCoord::new(0, 0));
    assert_ne!(a.tiles, b.tiles);
}

/// Test: The spawn search either lands on a qualifying tile or the origin.
#[test]
fn test_spawn_point_is_safe() {
    for seed in [1, 42, 777, 2024] {
        let world = world(seed);
        let spawn = world.find_spawn_point();
        let biome = world.biome_at(spawn.x, spawn.y);
        let definition = world.classifier().definition(biome);

        let qualifies = definition.walkable
            && definition.buildable
            && definition.hostile_spawn_rate <= 0.5
            && matches!(biome, Biome::Plains | Biome::Forest);

        assert!(
            qualifies || (spawn.x == 0 && spawn.y == 0),
            "seed {seed}: spawn {spawn} in {biome:?}"
        );
        assert!(spawn.x.abs() <= 100 && spawn.y.abs() <= 100);
    }
}

/// Test: Objects only sit on land and there are some of them.
#[test]
fn test_objects_placed_on_land() {
    let mut config = GeneratorConfig::default();
    config.region_size = 32;
    let world = WorldGenerator::new(WorldSeed::new(77), config).expect("valid");

    let mut objects = 0;
    for ry in -2..2 {
        for rx in -2..2 {
            let region = world.generate_region(RegionCoord::new(rx, ry));
            for tile in region.tiles.iter().filter(|t| t.layer == Layer::Objects) {
                objects += 1;
                assert_ne!(tile.biome, Biome::DeepOcean);
            }
        }
    }
    assert!(objects > 0, "No decorations or resources at all");
}

/// Test: Each biome's object rate matches its declared densities.
#[test]
#[allow(clippy::cast_precision_loss)]
fn test_object_rates_follow_densities() {
    let world = world(42);

    // biome -> (tiles, decorations, resources)
    let mut counts: HashMap<Biome, (usize, usize, usize)> = HashMap::new();
    for ry in -5..5 {
        for rx in -5..5 {
            let region = world.generate_region(RegionCoord::new(rx, ry));
            for tile in &region.tiles {
                let entry = counts.entry(tile.biome).or_default();
                if tile.layer == Layer::Ground {
                    entry.0 += 1;
                } else if world
                    .classifier()
                    .definition(tile.biome)
                    .decorations
                    .contains(&tile.tile_id)
                {
                    entry.1 += 1;
                } else {
                    entry.2 += 1;
                }
            }
        }
    }

    let mut checked = 0;
    for (biome, (tiles, decorations, resources)) in counts {
        if tiles < 5_000 {
            continue;
        }
        let definition = world.classifier().definition(biome);
        let n = tiles as f64;
        // Resources only roll where no decoration was placed
        let expected = [
            (definition.decoration_density, decorations),
            (
                (1.0 - definition.decoration_density) * definition.resource_density,
                resources,
            ),
        ];
        for (p, observed) in expected {
            let rate = observed as f64 / n;
            let tolerance = 5.0 * (p * (1.0 - p) / n).sqrt() + 0.002;
            println!("{biome}: observed {rate:.4}, declared {p:.4}");
            assert!(
                (rate - p).abs() <= tolerance,
                "{biome}: observed {rate:.4}, declared {p:.4} over {tiles} tiles"
            );
        }
        checked += 1;
    }
    assert!(checked >= 2, "Too few large biomes to measure");
}

/// Test: Macro regions split a large area into several stable cells.
#[test]
fn test_macro_regions() {
    let world = world(5);

    let ids: HashSet<u32> = (-1000..1000)
        .step_by(50)
        .flat_map(|x| (-1000..1000).step_by(50).map(move |y| (x, y)))
        .map(|(x, y)| world.macro_region_at(x, y))
        .collect();
    assert!(ids.len() > 1, "Whole area is one macro region");

    // Stable across generators
    assert_eq!(world.macro_region_at(321, -45), self::world(5).macro_region_at(321, -45));
}
