//! Coordinate types shared by generation, streaming and autotiling.
//!
//! World space is the `i32` tile grid. Regions tile it in
//! fixed-size squares; region coordinates come from floor division, so
//! negative world coordinates map to negative regions without a seam at 0.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 2D Vector - continuous positions (the tracked player).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);
}

/// Integer tile position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    /// X coordinate (tiles).
    pub x: i32,
    /// Y coordinate (tiles).
    pub y: i32,
}

impl TilePos {
    /// The world origin.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new tile position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the tile containing a continuous position.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_vec2(position: Vec2) -> Self {
        Self::new(position.x.floor() as i32, position.y.floor() as i32)
    }

    /// Returns this position shifted by `(dx, dy)`, clamped to the world.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Region coordinate (identifies a region in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionCoord {
    /// X coordinate (in regions, not tiles).
    pub x: i32,
    /// Y coordinate (in regions, not tiles).
    pub y: i32,
}

impl RegionCoord {
    /// Creates a new region coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts world tile coordinates to the owning region.
    ///
    /// Floor division: `-1` belongs to region `-1`, not region `0`.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn from_world(world_x: i32, world_y: i32, region_size: u32) -> Self {
        let size = region_size as i32;
        Self {
            x: world_x.div_euclid(size),
            y: world_y.div_euclid(size),
        }
    }

    /// Returns the world position of the region's top-left corner.
    ///
    /// Saturates at the `i32` bounds for regions that lie outside the
    /// addressable world; use [`Self::checked_origin`] to detect those.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn origin(self, region_size: u32) -> TilePos {
        let size = region_size as i32;
        TilePos::new(self.x.saturating_mul(size), self.y.saturating_mul(size))
    }

    /// Top-left corner, or `None` if it has no `i32` world coordinate.
    ///
    /// Every world tile belongs to a region this accepts, and for those
    /// `from_world(origin)` returns the region again. The region touching
    /// the positive edge may be partial.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn checked_origin(self, region_size: u32) -> Option<TilePos> {
        let size = region_size as i32;
        if size <= 0 {
            return None;
        }
        match (self.x.checked_mul(size), self.y.checked_mul(size)) {
            (Some(x), Some(y)) => Some(TilePos::new(x, y)),
            _ => None,
        }
    }

    /// Chebyshev distance (max of |dx|, |dy|) in region units.
    #[inline]
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy {
            dx
        } else {
            dy
        }
    }
}

impl fmt::Display for RegionCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_world() {
        assert_eq!(RegionCoord::from_world(0, 0, 64), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::from_world(63, 63, 64), RegionCoord::new(0, 0));
        assert_eq!(RegionCoord::from_world(64, 200, 64), RegionCoord::new(1, 3));
        assert_eq!(RegionCoord::from_world(-1, -1, 64), RegionCoord::new(-1, -1));
        assert_eq!(RegionCoord::from_world(-64, -65, 64), RegionCoord::new(-1, -2));
    }

    #[test]
    fn test_region_origin_round_trip() {
        for size in [1u32, 16, 64] {
            for x in -20..20 {
                for y in -20..20 {
                    let coord = RegionCoord::new(x, y);
                    let origin = coord.origin(size);
                    assert_eq!(RegionCoord::from_world(origin.x, origin.y, size), coord);
                }
            }
        }
    }

    #[test]
    fn test_origin_at_world_edge() {
        let last = RegionCoord::new(i32::MAX / 64, i32::MIN / 64);
        let origin = last.checked_origin(64).expect("inside the world");
        assert_eq!(origin, TilePos::new(i32::MAX - 63, i32::MIN));
        assert_eq!(RegionCoord::from_world(origin.x, origin.y, 64), last);
        assert_eq!(RegionCoord::from_world(i32::MAX, i32::MIN, 64), last);

        let beyond = RegionCoord::new(i32::MAX / 64 + 1, 0);
        assert_eq!(beyond.checked_origin(64), None);
        assert_eq!(RegionCoord::new(0, i32::MIN / 64 - 1).checked_origin(64), None);
        // No overflow panic, just clamped
        assert_eq!(beyond.origin(64), TilePos::new(i32::MAX, 0));
        assert_eq!(RegionCoord::new(i32::MIN, i32::MAX).origin(64), TilePos::new(i32::MIN, i32::MAX));
    }

    #[test]
    fn test_partial_edge_region() {
        // 3 does not divide the range: the last region is cut short
        let edge = RegionCoord::new(i32::MAX / 3, 0);
        assert_eq!(edge.checked_origin(3), Some(TilePos::new(i32::MAX - 1, 0)));
        assert_eq!(RegionCoord::from_world(i32::MAX, 0, 3), edge);
        assert_eq!(RegionCoord::new(i32::MAX / 3 + 1, 0).checked_origin(3), None);
        assert_eq!(edge.checked_origin(0), None);
    }

    #[test]
    fn test_chebyshev_distance() {
        let a = RegionCoord::new(0, 0);
        assert_eq!(a.chebyshev_distance(RegionCoord::new(3, 0)), 3);
        assert_eq!(a.chebyshev_distance(RegionCoord::new(-2, 5)), 5);
        assert_eq!(a.chebyshev_distance(a), 0);
    }

    #[test]
    fn test_tile_from_vec2_floors() {
        assert_eq!(TilePos::from_vec2(Vec2::new(1.9, -0.1)), TilePos::new(1, -1));
        assert_eq!(TilePos::from_vec2(Vec2::new(-64.5, 63.99)), TilePos::new(-65, 63));
    }

    #[test]
    fn test_region_display() {
        assert_eq!(RegionCoord::new(-3, 7).to_string(), "-3,7");
    }
}
