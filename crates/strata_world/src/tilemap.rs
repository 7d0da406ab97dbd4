//! Sparse, layered tile storage.
//!
//! Writes through [`TileMap::set_tile`] / [`TileMap::remove_tile`] announce
//! themselves on the event bus; bulk writes from generation use
//! [`TileMap::place_silent`] and let the caller queue autotiling for the
//! whole area at once.

use std::collections::HashMap;

use strata_shared::{EventSender, Layer, TileId, TilePos, WorldEvent};

use crate::autotile::TileGrid;

/// A tile as stored in the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacedTile {
    /// Tile type.
    pub type_id: TileId,
    /// Autotile variant.
    pub variant: u8,
}

/// Sparse tile map over the infinite grid.
#[derive(Debug, Default)]
pub struct TileMap {
    tiles: HashMap<(i32, i32, Layer), PlacedTile>,
    events: Option<EventSender>,
}

impl TileMap {
    /// Creates a map that emits no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a map that announces edits on `events`.
    #[must_use]
    pub fn with_events(events: EventSender) -> Self {
        Self {
            tiles: HashMap::new(),
            events: Some(events),
        }
    }

    /// Tile at a position.
    #[must_use]
    pub fn get(&self, x: i32, y: i32, layer: Layer) -> Option<PlacedTile> {
        self.tiles.get(&(x, y, layer)).copied()
    }

    /// Writes a tile (variant reset to 0) and emits `TileChanged`.
    pub fn set_tile(&mut self, x: i32, y: i32, layer: Layer, type_id: TileId) {
        self.place_silent(x, y, layer, type_id, 0);
        self.notify(x, y, layer);
    }

    /// Removes a tile; emits `TileChanged` only if one was there.
    pub fn remove_tile(&mut self, x: i32, y: i32, layer: Layer) -> Option<PlacedTile> {
        let removed = self.tiles.remove(&(x, y, layer));
        if removed.is_some() {
            self.notify(x, y, layer);
        }
        removed
    }

    /// Writes a tile without notification.
    pub fn place_silent(&mut self, x: i32, y: i32, layer: Layer, type_id: TileId, variant: u8) {
        self.tiles
            .insert((x, y, layer), PlacedTile { type_id, variant });
    }

    /// Silently removes every tile on every layer inside the rectangle.
    ///
    /// Returns the number of tiles removed.
    pub fn clear_area(&mut self, x: i32, y: i32, width: u32, height: u32) -> usize {
        let x_end = x.saturating_add_unsigned(width);
        let y_end = y.saturating_add_unsigned(height);
        let before = self.tiles.len();
        self.tiles
            .retain(|&(tx, ty, _), _| !(tx >= x && tx < x_end && ty >= y && ty < y_end));
        before - self.tiles.len()
    }

    /// Number of stored tiles across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    fn notify(&self, x: i32, y: i32, layer: Layer) {
        if let Some(events) = &self.events {
            events.send(WorldEvent::TileChanged {
                position: TilePos::new(x, y),
                layer,
            });
        }
    }
}

impl TileGrid for TileMap {
    fn tile_type(&self, x: i32, y: i32, layer: Layer) -> Option<TileId> {
        self.tiles.get(&(x, y, layer)).map(|t| t.type_id)
    }

    fn set_variant(&mut self, x: i32, y: i32, layer: Layer, variant: u8) -> bool {
        match self.tiles.get_mut(&(x, y, layer)) {
            Some(tile) => {
                tile.variant = variant;
                true
            }
            None => false,
        }
    }
}
