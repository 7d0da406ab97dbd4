//! Tile IDs emitted by the reference biome table.
//!
//! Hosts that replace the classifier bring their own IDs; these only need to
//! agree with whatever tile-type registry the host loads.

use strata_shared::TileId;

// =============================================================================
// GROUND (one per tile, always emitted)
// =============================================================================

/// Open ocean floor water.
pub const DEEP_WATER: TileId = 1;
/// Shallow water.
pub const WATER: TileId = 2;
/// Beach sand.
pub const SAND: TileId = 3;
/// Temperate grass.
pub const GRASS: TileId = 4;
/// Leaf litter under trees.
pub const FOREST_FLOOR: TileId = 5;
/// Dense tropical undergrowth.
pub const JUNGLE_GRASS: TileId = 6;
/// Dune sand.
pub const DESERT_SAND: TileId = 7;
/// Sun-bleached grass.
pub const DRY_GRASS: TileId = 8;
/// Snow cover.
pub const SNOW: TileId = 9;
/// Permafrost.
pub const FROZEN_DIRT: TileId = 10;
/// Bare rock.
pub const STONE: TileId = 11;
/// Wetland mud.
pub const MUD: TileId = 12;

// =============================================================================
// DECORATIONS (objects layer)
// =============================================================================

/// Wild flowers.
pub const FLOWERS: TileId = 100;
/// Tall grass tuft.
pub const TALL_GRASS: TileId = 101;
/// Shrub.
pub const BUSH: TileId = 102;
/// Broadleaf tree.
pub const OAK_TREE: TileId = 103;
/// Conifer.
pub const PINE_TREE: TileId = 104;
/// Palm.
pub const PALM_TREE: TileId = 105;
/// Cactus.
pub const CACTUS: TileId = 106;
/// Dry shrub.
pub const DEAD_BUSH: TileId = 107;
/// Flat-topped savanna tree.
pub const ACACIA_TREE: TileId = 108;
/// Large rock.
pub const BOULDER: TileId = 109;
/// Rock crusted with ice.
pub const ICE_ROCK: TileId = 110;
/// Reeds.
pub const REEDS: TileId = 111;
/// Leafless tree.
pub const DEAD_TREE: TileId = 112;
/// Seaweed.
pub const SEAWEED: TileId = 113;
/// Shells on sand.
pub const SHELLS: TileId = 114;
/// Fern.
pub const FERN: TileId = 115;

// =============================================================================
// RESOURCES (objects layer, only where no decoration was placed)
// =============================================================================

/// Loose stone.
pub const STONE_NODE: TileId = 200;
/// Harvestable berries.
pub const BERRY_BUSH: TileId = 201;
/// Clay deposit.
pub const CLAY_DEPOSIT: TileId = 202;
/// Iron ore.
pub const IRON_ORE: TileId = 203;
/// Coal ore.
pub const COAL_ORE: TileId = 204;
/// Gold ore.
pub const GOLD_ORE: TileId = 205;
/// Crystal cluster.
pub const CRYSTAL: TileId = 206;
