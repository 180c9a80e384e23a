//! Grid cells and the adjacency rules derived from their positions.

use stackwalk_core::{RelocationRejection, TileId, TileKind, Vector};
use tracing::trace;

use crate::{character::Character, map::MapManager};

/// A single cell of the layered grid.
///
/// The position of a tile is fixed at creation unless its kind is movable;
/// only the map may relocate it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    id: TileId,
    kind: TileKind,
    position: Vector,
}

impl Tile {
    pub(crate) const fn new(id: TileId, kind: TileKind, position: Vector) -> Self {
        Self { id, kind, position }
    }

    /// Identifier allocated by the map.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Kind of the tile, which decides its acceptance rules.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Cell occupied by the tile.
    #[must_use]
    pub const fn position(&self) -> Vector {
        self.position
    }

    pub(crate) fn set_position(&mut self, position: Vector) {
        self.position = position;
    }

    pub(crate) fn set_kind(&mut self, kind: TileKind) {
        self.kind = kind;
    }

    /// Reports whether the two tiles touch along a single axis, vertical included.
    #[must_use]
    pub fn is_next_to(&self, other: &Tile) -> bool {
        self.distance_from(other).length() == 1
    }

    /// Reports whether both tiles share a level.
    #[must_use]
    pub fn is_on_same_level(&self, other: &Tile) -> bool {
        self.position.z() == other.position.z()
    }

    /// Reports whether the tiles are exactly one level apart.
    #[must_use]
    pub fn is_on_neighboring_level(&self, other: &Tile) -> bool {
        self.position.z().abs_diff(other.position.z()) == 1
    }

    /// Per-axis step count between the two tiles.
    #[must_use]
    pub fn distance_from(&self, other: &Tile) -> Vector {
        self.position.distance_from(other.position)
    }

    /// Whether a character standing on `other` may move into this tile's cell.
    ///
    /// Useful for doors, pressure plates and other transparent objects. A tile
    /// never admits a character arriving from itself.
    #[must_use]
    pub fn accepts_character_from(&self, other: &Tile) -> bool {
        self.id != other.id && self.kind.accepts_character_from(other.kind)
    }

    /// Whether the character may be moved into this tile's cell.
    #[must_use]
    pub fn accepts_character(&self, character: &Character) -> bool {
        character.tile() != self.id && self.kind.accepts_character()
    }

    /// Whether a character could stand on this tile.
    ///
    /// True when the cell above is empty, or holds a tile that admits a
    /// character arriving from this one. A tile on the topmost level always
    /// has room.
    #[must_use]
    pub fn can_be_moved_on(&self, map: &MapManager) -> bool {
        match map.tile_toward(self.position, Vector::UP) {
            Some(above) => above.accepts_character_from(self),
            None => true,
        }
    }

    /// Existing tiles one horizontal step away, taken from level `z`.
    ///
    /// `z` does not have to be this tile's own level. Neighbours are listed
    /// east, north, west, then south; steps off the edge of the grid yield
    /// nothing.
    #[must_use]
    pub fn neighbours_in_level<'map>(&self, map: &'map MapManager, z: i32) -> Vec<&'map Tile> {
        let origin = Vector::new(self.position.x(), self.position.y(), z);
        Vector::HORIZONTAL_DIRECTIONS
            .iter()
            .filter_map(|direction| map.tile_toward(origin, *direction))
            .collect()
    }

    /// Tiles reachable by a single step, followed by this tile itself.
    ///
    /// Candidates are the four same-level neighbours and the four neighbours
    /// one level up, each level in [`Tile::neighbours_in_level`] order; only
    /// those a character could stand on are kept. Route planning breaks ties
    /// in this order.
    #[must_use]
    pub fn valid_neighbors<'map>(&'map self, map: &'map MapManager) -> Vec<&'map Tile> {
        let level = self.position.z();
        let mut tiles: Vec<&'map Tile> = std::iter::once(level)
            .chain(level.checked_add(1))
            .flat_map(|z| self.neighbours_in_level(map, z))
            .filter(|tile| tile.can_be_moved_on(map))
            .collect();
        trace!(
            tile = self.id.get(),
            count = tiles.len(),
            "collected valid neighbours"
        );
        tiles.push(self);
        tiles
    }

    /// Checks whether this tile may be relocated to `destination`.
    ///
    /// Only movable tiles qualify. The destination must be empty and rest on
    /// another tile.
    pub fn check_move_to(
        &self,
        map: &MapManager,
        destination: Vector,
    ) -> Result<(), RelocationRejection> {
        if !self.kind.is_movable() {
            return Err(RelocationRejection::NotMovable);
        }

        if map.tile_at(destination).is_some() {
            return Err(RelocationRejection::Occupied);
        }

        match map.tile_toward(destination, Vector::DOWN) {
            Some(support) if support.id != self.id => Ok(()),
            _ => Err(RelocationRejection::Unsupported),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(kind: TileKind, x: i32, y: i32, z: i32) -> Tile {
        Tile::new(TileId::new(0), kind, Vector::new(x, y, z))
    }

    #[test]
    fn next_to_covers_every_axis() {
        let origin = tile(TileKind::Floor, 0, 0, 0);
        assert!(origin.is_next_to(&tile(TileKind::Floor, 1, 0, 0)));
        assert!(origin.is_next_to(&tile(TileKind::Floor, 0, -1, 0)));
        assert!(origin.is_next_to(&tile(TileKind::Floor, 0, 0, 1)));
        assert!(!origin.is_next_to(&tile(TileKind::Floor, 1, 1, 0)));
        assert!(!origin.is_next_to(&tile(TileKind::Floor, 2, 0, 0)));
    }

    #[test]
    fn level_relations() {
        let low = tile(TileKind::Floor, 0, 0, 0);
        let same = tile(TileKind::Floor, 5, 5, 0);
        let up = tile(TileKind::Floor, 3, 0, 1);
        let far = tile(TileKind::Floor, 0, 0, 2);

        assert!(low.is_on_same_level(&same));
        assert!(!low.is_on_same_level(&up));
        assert!(low.is_on_neighboring_level(&up));
        assert!(up.is_on_neighboring_level(&low));
        assert!(!low.is_on_neighboring_level(&far));
        assert!(!low.is_on_neighboring_level(&same));
    }

    #[test]
    fn plain_tiles_refuse_characters() {
        let floor = tile(TileKind::Floor, 0, 0, 0);
        let other = Tile::new(TileId::new(1), TileKind::Floor, Vector::EAST);
        assert!(!floor.accepts_character_from(&other));
        assert!(!floor.accepts_character(&Character::new(TileId::new(1))));
    }

    #[test]
    fn transparent_tiles_accept_characters_from_other_tiles() {
        let plate = Tile::new(TileId::new(3), TileKind::PressurePlate, Vector::UP);
        let floor = Tile::new(TileId::new(4), TileKind::Floor, Vector::ZERO);
        assert!(plate.accepts_character_from(&floor));
        assert!(!plate.accepts_character_from(&plate));
        assert!(plate.accepts_character(&Character::new(floor.id())));
    }
}
