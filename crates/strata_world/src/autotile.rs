//! # Autotiling
//!
//! Picks sprite variants from neighbour connectivity so edges, corners and
//! interiors blend without hand placement.
//!
//! ## Masks
//!
//! ```text
//!  4-bit:           8-bit:
//!     N=1            NW=128  N=1   NE=2
//!  W=8   E=2          W=64    .    E=4
//!     S=4            SW=32  S=16  SE=8
//! ```
//!
//! `y` grows downward: north is `y - 1`.
//!
//! Two tiles connect when they belong to the same autotile *group*, so
//! different tile types (e.g. shallow and deep water) can blend into each
//! other.
//!
//! ## Batching
//!
//! Tile-change notifications only mark cells dirty. Variants are recomputed
//! once per [`AutotileSystem::tick`], however many edits landed in between.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strata_shared::{EventReceiver, Layer, TileId, WorldEvent};

/// Which mask a tile type uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutotileMode {
    /// Orthogonal neighbours only, 16 variants.
    #[default]
    FourBit,
    /// Orthogonal + diagonal neighbours, 47 variants.
    EightBit,
}

/// Autotile settings of one tile type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutotileRule<'a> {
    /// Connectivity group.
    pub group: &'a str,
    /// Mask to use.
    pub mode: AutotileMode,
}

/// Tile storage as seen by autotiling.
pub trait TileGrid {
    /// Type of the tile at a position, if any.
    fn tile_type(&self, x: i32, y: i32, layer: Layer) -> Option<TileId>;

    /// Stores a variant; returns `false` if there is no tile there.
    fn set_variant(&mut self, x: i32, y: i32, layer: Layer, variant: u8) -> bool;
}

/// Tile type registry as seen by autotiling.
pub trait TileTypes {
    /// Autotile settings of a type; `None` if unknown or not autotiled.
    fn autotile(&self, type_id: TileId) -> Option<AutotileRule<'_>>;
}

// =============================================================================
// MASK BITS
// =============================================================================

/// 4-bit north.
pub const N4: u8 = 1;
/// 4-bit east.
pub const E4: u8 = 2;
/// 4-bit south.
pub const S4: u8 = 4;
/// 4-bit west.
pub const W4: u8 = 8;

/// 8-bit north.
pub const N8: u8 = 1;
/// 8-bit north-east.
pub const NE8: u8 = 2;
/// 8-bit east.
pub const E8: u8 = 4;
/// 8-bit south-east.
pub const SE8: u8 = 8;
/// 8-bit south.
pub const S8: u8 = 16;
/// 8-bit south-west.
pub const SW8: u8 = 32;
/// 8-bit west.
pub const W8: u8 = 64;
/// 8-bit north-west.
pub const NW8: u8 = 128;

/// Neighbour offsets in 4-bit mask order.
const OFFSETS_4: [(i32, i32, u8); 4] = [(0, -1, N4), (1, 0, E4), (0, 1, S4), (-1, 0, W4)];

/// Neighbour offsets in 8-bit mask order.
const OFFSETS_8: [(i32, i32, u8); 8] = [
    (0, -1, N8),
    (1, -1, NE8),
    (1, 0, E8),
    (1, 1, SE8),
    (0, 1, S8),
    (-1, 1, SW8),
    (-1, 0, W8),
    (-1, -1, NW8),
];

// =============================================================================
// VARIANT TABLES
// =============================================================================

/// 4-bit mask -> variant on a 4x4 sheet (`row * 4 + col`).
///
/// Columns: none, E, E+W, W. Rows: none, S, N+S, N.
pub const VARIANTS_4BIT: [u8; 16] = [
    0,  // .
    12, // N
    1,  // E
    13, // N E
    4,  // S
    8,  // N S
    5,  // E S
    9,  // N E S
    3,  // W
    15, // N W
    2,  // E W
    14, // N E W
    7,  // S W
    11, // N S W
    6,  // E S W
    10, // N E S W
];

/// The 47 reachable 8-bit masks after corner suppression, ascending.
pub const CANONICAL_MASKS_8BIT: [u8; 47] = [
    0, 1, 4, 5, 7, 16, 17, 20, 21, 23, 28, 29, 31, 64, 65, 68, 69, 71, 80, 81, 84, 85, 87, 92, 93,
    95, 112, 113, 116, 117, 119, 124, 125, 127, 193, 197, 199, 209, 213, 215, 221, 223, 241, 245,
    247, 253, 255,
];

/// Raw 8-bit mask -> variant (index into [`CANONICAL_MASKS_8BIT`]).
const VARIANTS_8BIT: [u8; 256] = build_8bit_lookup();

#[allow(clippy::cast_possible_truncation)]
const fn build_8bit_lookup() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut mask = 0;
    while mask < 256 {
        let reduced = reduce_8bit_mask(mask as u8);
        let mut index = 0;
        while index < CANONICAL_MASKS_8BIT.len() {
            if CANONICAL_MASKS_8BIT[index] == reduced {
                table[mask] = index as u8;
                break;
            }
            index += 1;
        }
        mask += 1;
    }
    table
}

/// Clears every corner bit whose two adjacent edges are not both set.
#[must_use]
pub const fn reduce_8bit_mask(mask: u8) -> u8 {
    let mut reduced = mask & (N8 | E8 | S8 | W8);
    if mask & NE8 != 0 && mask & N8 != 0 && mask & E8 != 0 {
        reduced |= NE8;
    }
    if mask & SE8 != 0 && mask & S8 != 0 && mask & E8 != 0 {
        reduced |= SE8;
    }
    if mask & SW8 != 0 && mask & S8 != 0 && mask & W8 != 0 {
        reduced |= SW8;
    }
    if mask & NW8 != 0 && mask & N8 != 0 && mask & W8 != 0 {
        reduced |= NW8;
    }
    reduced
}

/// Variant for a 4-bit mask (higher bits ignored).
#[inline]
#[must_use]
pub const fn variant_4bit(mask: u8) -> u8 {
    VARIANTS_4BIT[(mask & 0x0F) as usize]
}

/// Variant for a raw 8-bit mask, in `0..47`.
#[inline]
#[must_use]
pub const fn variant_8bit(mask: u8) -> u8 {
    VARIANTS_8BIT[mask as usize]
}

/// Batches tile changes and recomputes variants once per tick.
#[derive(Debug, Default)]
pub struct AutotileSystem {
    /// Dirty cells, ordered by (layer, y, x).
    pending: BTreeSet<(Layer, i32, i32)>,
}

impl AutotileSystem {
    /// Creates an empty system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a changed tile and its eight neighbours dirty.
    pub fn on_tile_changed(&mut self, x: i32, y: i32, layer: Layer) {
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let (Some(cx), Some(cy)) = (x.checked_add(dx), y.checked_add(dy)) {
                    self.pending.insert((layer, cy, cx));
                }
            }
        }
    }

    /// Marks a single cell dirty.
    pub fn queue_update(&mut self, x: i32, y: i32, layer: Layer) {
        self.pending.insert((layer, y, x));
    }

    /// Marks a rectangle dirty, plus the one-tile ring around it so
    /// neighbours outside the rectangle pick up new edges.
    pub fn update_region(&mut self, x: i32, y: i32, width: u32, height: u32, layer: Layer) {
        let x_end = x.saturating_add_unsigned(width);
        let y_end = y.saturating_add_unsigned(height);
        for cy in y.saturating_sub(1)..=y_end {
            for cx in x.saturating_sub(1)..=x_end {
                self.pending.insert((layer, cy, cx));
            }
        }
    }

    /// Consumes one event; returns whether it was a tile change.
    pub fn handle_event(&mut self, event: &WorldEvent) -> bool {
        match *event {
            WorldEvent::TileChanged { position, layer } => {
                self.on_tile_changed(position.x, position.y, layer);
                true
            }
            WorldEvent::RegionLoaded { .. } | WorldEvent::RegionUnloaded { .. } => false,
        }
    }

    /// Drains every pending event from `receiver`.
    ///
    /// Returns the number of tile changes taken in. Region events are
    /// discarded, so give autotiling its own receiver if other systems need
    /// them.
    pub fn drain_events(&mut self, receiver: &EventReceiver) -> usize {
        receiver
            .drain()
            .iter()
            .filter(|event| self.handle_event(event))
            .count()
    }

    /// Number of dirty cells.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Recomputes every dirty cell and clears the set.
    ///
    /// Cells without a tile, with an unknown type or with no group are
    /// skipped. Returns the number of variants written.
    pub fn tick<G, R>(&mut self, grid: &mut G, types: &R) -> usize
    where
        G: TileGrid + ?Sized,
        R: TileTypes + ?Sized,
    {
        if self.pending.is_empty() {
            return 0;
        }

        let pending = std::mem::take(&mut self.pending);
        let mut updated = 0;

        for (layer, y, x) in pending {
            let Some(rule) = grid.tile_type(x, y, layer).and_then(|t| types.autotile(t)) else {
                continue;
            };
            let variant = match rule.mode {
                AutotileMode::FourBit => calculate_variant(grid, types, x, y, layer, rule.group),
                AutotileMode::EightBit => {
                    calculate_variant_8bit(grid, types, x, y, layer, rule.group)
                }
            };
            if grid.set_variant(x, y, layer, variant) {
                updated += 1;
            }
        }

        tracing::trace!(updated, "autotile tick");
        updated
    }
}

/// Whether the tile at a position belongs to `group`.
fn in_group<G, R>(grid: &G, types: &R, x: i32, y: i32, layer: Layer, group: &str) -> bool
where
    G: TileGrid + ?Sized,
    R: TileTypes + ?Sized,
{
    grid.tile_type(x, y, layer)
        .and_then(|t| types.autotile(t))
        .is_some_and(|rule| rule.group == group)
}

fn neighbour_mask<G, R>(
    grid: &G,
    types: &R,
    offsets: &[(i32, i32, u8)],
    (x, y, layer): (i32, i32, Layer),
    group: &str,
) -> u8
where
    G: TileGrid + ?Sized,
    R: TileTypes + ?Sized,
{
    offsets
        .iter()
        .filter(|(dx, dy, _)| match (x.checked_add(*dx), y.checked_add(*dy)) {
            (Some(nx), Some(ny)) => in_group(grid, types, nx, ny, layer, group),
            // Nothing exists past the edge of the world
            _ => false,
        })
        .fold(0, |mask, (_, _, bit)| mask | bit)
}

/// 4-bit variant of the cell at `(x, y)` for tiles of `group`.
#[must_use]
pub fn calculate_variant<G, R>(
    grid: &G,
    types: &R,
    x: i32,
    y: i32,
    layer: Layer,
    group: &str,
) -> u8
where
    G: TileGrid + ?Sized,
    R: TileTypes + ?Sized,
{
    variant_4bit(neighbour_mask(grid, types, &OFFSETS_4, (x, y, layer), group))
}

/// 8-bit variant (`0..47`) of the cell at `(x, y)` for tiles of `group`.
#[must_use]
pub fn calculate_variant_8bit<G, R>(
    grid: &G,
    types: &R,
    x: i32,
    y: i32,
    layer: Layer,
    group: &str,
) -> u8
where
    G: TileGrid + ?Sized,
    R: TileTypes + ?Sized,
{
    variant_8bit(neighbour_mask(grid, types, &OFFSETS_8, (x, y, layer), group))
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use super::*;

    /// Grid of one layer backed by a map.
    #[derive(Default)]
    struct MapGrid {
        tiles: HashMap<(i32, i32), (TileId, u8)>,
    }

    impl MapGrid {
        fn put(&mut self, x: i32, y: i32, id: TileId) {
            self.tiles.insert((x, y), (id, 0));
        }

        fn variant(&self, x: i32, y: i32) -> u8 {
            self.tiles[&(x, y)].1
        }
    }

    impl TileGrid for MapGrid {
        fn tile_type(&self, x: i32, y: i32, layer: Layer) -> Option<TileId> {
            (layer == Layer::Ground)
                .then(|| self.tiles.get(&(x, y)).map(|t| t.0))
                .flatten()
        }

        fn set_variant(&mut self, x: i32, y: i32, _layer: Layer, variant: u8) -> bool {
            self.tiles
                .get_mut(&(x, y))
                .map(|t| t.1 = variant)
                .is_some()
        }
    }

    /// 1 = water, 2 = deep water (same group), 3 = grass (8-bit), 9 = rock (no group).
    struct Types;

    impl TileTypes for Types {
        fn autotile(&self, type_id: TileId) -> Option<AutotileRule<'_>> {
            match type_id {
                1 | 2 => Some(AutotileRule {
                    group: "water",
                    mode: AutotileMode::FourBit,
                }),
                3 => Some(AutotileRule {
                    group: "grass",
                    mode: AutotileMode::EightBit,
                }),
                _ => None,
            }
        }
    }

    #[test]
    fn test_4bit_table_is_a_sheet() {
        let unique: HashSet<u8> = VARIANTS_4BIT.iter().copied().collect();
        assert_eq!(unique.len(), 16);

        // column from E/W, row from N/S
        assert_eq!(variant_4bit(E4), 1);
        assert_eq!(variant_4bit(E4 | W4), 2);
        assert_eq!(variant_4bit(W4), 3);
        assert_eq!(variant_4bit(S4), 4);
        assert_eq!(variant_4bit(N4 | S4), 8);
        assert_eq!(variant_4bit(N4), 12);
        assert_eq!(variant_4bit(N4 | E4 | S4 | W4), 10);
    }

    #[test]
    fn test_8bit_table_covers_all_masks() {
        let canonical: HashSet<u8> = CANONICAL_MASKS_8BIT.iter().copied().collect();
        assert_eq!(canonical.len(), 47);

        for mask in 0..=u8::MAX {
            assert!(variant_8bit(mask) < 47);
            assert!(canonical.contains(&reduce_8bit_mask(mask)));
        }
        for (index, &mask) in CANONICAL_MASKS_8BIT.iter().enumerate() {
            assert_eq!(reduce_8bit_mask(mask), mask);
            assert_eq!(usize::from(variant_8bit(mask)), index);
        }
        assert!(CANONICAL_MASKS_8BIT.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_2x2_block_each_tile_sees_its_interior() {
        let mut grid = MapGrid::default();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            grid.put(x, y, 1);
        }

        for (x, y, mask) in [
            (0, 0, E4 | S4),
            (1, 0, S4 | W4),
            (0, 1, N4 | E4),
            (1, 1, N4 | W4),
        ] {
            assert_eq!(
                calculate_variant(&grid, &Types, x, y, Layer::Ground, "water"),
                variant_4bit(mask),
                "({x}, {y})"
            );
        }
    }

    #[test]
    fn test_world_edge_has_no_neighbours() {
        let mut grid = MapGrid::default();
        grid.put(i32::MAX, i32::MIN, 1);
        grid.put(i32::MAX - 1, i32::MIN, 1);
        assert_eq!(
            calculate_variant(&grid, &Types, i32::MAX, i32::MIN, Layer::Ground, "water"),
            variant_4bit(W4)
        );

        let mut system = AutotileSystem::new();
        system.on_tile_changed(i32::MAX, i32::MAX, Layer::Ground);
        assert_eq!(system.pending_count(), 4);
        system.update_region(i32::MIN, i32::MIN, 2, 2, Layer::Overlay);
        assert_eq!(system.pending_count(), 4 + 9);
    }

    #[test]
    fn test_lone_corner_is_suppressed() {
        let mut grid = MapGrid::default();
        grid.put(0, 0, 3);
        let isolated = calculate_variant_8bit(&grid, &Types, 0, 0, Layer::Ground, "grass");

        grid.put(1, -1, 3); // NE only
        let with_corner = calculate_variant_8bit(&grid, &Types, 0, 0, Layer::Ground, "grass");

        assert_eq!(isolated, 0);
        assert_eq!(with_corner, isolated);
    }

    #[test]
    fn test_group_membership_drives_connectivity() {
        let mut grid = MapGrid::default();
        grid.put(0, 0, 1);
        grid.put(1, 0, 2); // deep water, same group
        grid.put(0, 1, 9); // rock, ungrouped
        grid.put(-1, 0, 3); // grass, other group

        assert_eq!(
            calculate_variant(&grid, &Types, 0, 0, Layer::Ground, "water"),
            variant_4bit(E4)
        );
    }

    #[test]
    fn test_tick_batches_and_skips_ungrouped() {
        let mut grid = MapGrid::default();
        for x in 0..3 {
            grid.put(x, 0, 1);
        }
        grid.put(0, 1, 9);

        let mut system = AutotileSystem::new();
        system.on_tile_changed(1, 0, Layer::Ground);
        system.on_tile_changed(1, 0, Layer::Ground);
        assert_eq!(system.pending_count(), 9);

        // (0,0), (1,0), (2,0) are water; (0,1) is rock and gets skipped.
        let updated = system.tick(&mut grid, &Types);
        assert_eq!(updated, 3);
        assert_eq!(system.pending_count(), 0);

        assert_eq!(grid.variant(0, 0), variant_4bit(E4));
        assert_eq!(grid.variant(1, 0), variant_4bit(E4 | W4));
        assert_eq!(grid.variant(2, 0), variant_4bit(W4));
        assert_eq!(grid.variant(0, 1), 0);
    }

    #[test]
    fn test_update_region_includes_ring() {
        let mut system = AutotileSystem::new();
        system.update_region(0, 0, 4, 2, Layer::Objects);
        assert_eq!(system.pending_count(), 6 * 4);
    }

    #[test]
    fn test_events_feed_pending_set() {
        use strata_shared::{EventBus, RegionCoord, TilePos};

        let bus = EventBus::unbounded();
        let sender = bus.sender();
        sender.send(WorldEvent::RegionLoaded {
            coord: RegionCoord::new(0, 0),
        });
        sender.send(WorldEvent::TileChanged {
            position: TilePos::new(5, 5),
            layer: Layer::Ground,
        });

        let mut system = AutotileSystem::new();
        assert_eq!(system.drain_events(&bus.receiver()), 1);
        assert_eq!(system.pending_count(), 9);
    }
}
