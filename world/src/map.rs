//! Spatial index resolving which tile, if any, occupies a cell.

use std::collections::BTreeMap;

use stackwalk_core::{
    CommandRejection, PlacementRejection, RelocationRejection, TileId, TileKind, Vector,
};
use tracing::debug;

use crate::tile::Tile;

/// Registry that stores tiles, allocates identifiers, and indexes tiles by cell.
///
/// The index guarantees that at most one tile occupies any cell. Tiles never
/// change position on their own; every relocation goes through
/// [`MapManager::try_move_tile`] so the index and the tile stay in step.
#[derive(Clone, Debug, Default)]
pub struct MapManager {
    tiles: BTreeMap<TileId, Tile>,
    index: BTreeMap<Vector, TileId>,
    next_tile_id: u32,
}

impl MapManager {
    /// Creates an empty map with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the tile occupying the provided cell, if any.
    ///
    /// An empty cell is an ordinary answer (open air, a pit), not a failure.
    #[must_use]
    pub fn tile_at(&self, position: Vector) -> Option<&Tile> {
        self.index
            .get(&position)
            .and_then(|tile| self.tiles.get(tile))
    }

    /// Returns the tile one `offset` away from `position`, if any.
    ///
    /// An offset that would leave the `i32` grid finds no tile.
    #[must_use]
    pub fn tile_toward(&self, position: Vector, offset: Vector) -> Option<&Tile> {
        position
            .checked_add(offset)
            .and_then(|cell| self.tile_at(cell))
    }

    /// Looks up a tile by identifier.
    #[must_use]
    pub fn tile(&self, tile: TileId) -> Option<&Tile> {
        self.tiles.get(&tile)
    }

    /// Places a new tile into an empty cell.
    pub fn insert(
        &mut self,
        kind: TileKind,
        position: Vector,
    ) -> Result<TileId, PlacementRejection> {
        if self.index.contains_key(&position) {
            return Err(PlacementRejection::Occupied);
        }

        let id = TileId::new(self.next_tile_id);
        self.next_tile_id = self.next_tile_id.saturating_add(1);
        let _ = self.index.insert(position, id);
        let _ = self.tiles.insert(id, Tile::new(id, kind, position));
        Ok(id)
    }

    /// Removes a tile from the map, returning it if it existed.
    pub fn remove(&mut self, tile: TileId) -> Option<Tile> {
        let removed = self.tiles.remove(&tile)?;
        let _ = self.index.remove(&removed.position());
        Some(removed)
    }

    /// Attempts to relocate a tile, reporting why the move was refused.
    pub fn try_move_tile(
        &mut self,
        tile: TileId,
        destination: Vector,
    ) -> Result<(), RelocationRejection> {
        let current = self
            .tiles
            .get(&tile)
            .ok_or(RelocationRejection::MissingTile)?;
        if let Err(reason) = current.check_move_to(self, destination) {
            debug!(tile = tile.get(), %destination, %reason, "relocation rejected");
            return Err(reason);
        }

        let origin = current.position();
        let _ = self.index.remove(&origin);
        let _ = self.index.insert(destination, tile);
        if let Some(entry) = self.tiles.get_mut(&tile) {
            entry.set_position(destination);
        }
        Ok(())
    }

    /// Attempts to relocate a tile. Returns `true` when the tile moved.
    pub fn move_tile(&mut self, tile: TileId, destination: Vector) -> bool {
        self.try_move_tile(tile, destination).is_ok()
    }

    /// Opens or closes a door tile.
    pub fn set_door(&mut self, tile: TileId, open: bool) -> Result<(), CommandRejection> {
        let entry = self
            .tiles
            .get_mut(&tile)
            .ok_or(CommandRejection::MissingTile)?;
        match entry.kind() {
            TileKind::Door { .. } => {
                entry.set_kind(TileKind::Door { open });
                Ok(())
            }
            _ => Err(CommandRejection::NotADoor),
        }
    }

    /// Iterator over every tile in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Number of tiles stored in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the map holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
