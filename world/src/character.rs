//! The controllable character and the two actions it can perform.

use stackwalk_core::{MoveRejection, PushRejection, TileId, Vector};
use tracing::{debug, info};

use crate::{clones::CloneManager, map::MapManager};

/// The single actor of the simulation.
///
/// A character has no position of its own: it always stands one level above
/// the tile it is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Character {
    tile: TileId,
}

impl Character {
    /// Creates a character standing on the provided tile.
    #[must_use]
    pub const fn new(tile: TileId) -> Self {
        Self { tile }
    }

    /// Tile the character stands on.
    #[must_use]
    pub const fn tile(&self) -> TileId {
        self.tile
    }

    /// Cell occupied by the character, derived from its tile.
    ///
    /// `None` when the tile is missing or sits on the topmost level.
    #[must_use]
    pub fn position(&self, map: &MapManager) -> Option<Vector> {
        map.tile(self.tile)
            .and_then(|tile| tile.position().checked_add(Vector::UP))
    }

    /// Tries to step onto `destination`, returning the tile that was left.
    ///
    /// Within a level the destination must be a direct neighbour; across one
    /// level it must be one horizontal plus one vertical step away. The cell
    /// above the destination must be empty or admit the character. Nothing
    /// changes when any rule fails.
    pub fn try_move_onto(
        &mut self,
        map: &MapManager,
        destination: TileId,
    ) -> Result<TileId, MoveRejection> {
        let current = map.tile(self.tile).ok_or(MoveRejection::MissingTile)?;
        let target = map.tile(destination).ok_or(MoveRejection::MissingTile)?;

        let verdict = if target.is_on_same_level(current) {
            if current.is_next_to(target) {
                Ok(())
            } else {
                Err(MoveRejection::NotAdjacent)
            }
        } else if target.is_on_neighboring_level(current) {
            if target.distance_from(current).length() == 2 {
                Ok(())
            } else {
                Err(MoveRejection::NotAStep)
            }
        } else {
            Err(MoveRejection::OutOfReach)
        };

        let above = map.tile_toward(target.position(), Vector::UP);
        let verdict = verdict.and_then(|()| match above {
            Some(above) if !above.accepts_character_from(current) => Err(MoveRejection::Blocked),
            _ => Ok(()),
        });

        if let Err(reason) = verdict {
            debug!(
                from = self.tile.get(),
                to = destination.get(),
                %reason,
                "move rejected"
            );
            return Err(reason);
        }

        let previous = self.tile;
        self.tile = destination;
        info!(
            from = previous.get(),
            to = destination.get(),
            "character moved"
        );
        Ok(previous)
    }

    /// Tries to step onto `destination`. Returns `true` when the character moved.
    pub fn move_onto(&mut self, map: &MapManager, destination: TileId) -> bool {
        self.try_move_onto(map, destination).is_ok()
    }

    /// Tries to push `movable` so that it comes to rest on `destination`,
    /// returning the cell the pushed tile now occupies.
    ///
    /// The tile must touch the character, and the landing cell (one level
    /// above `destination`) must lie two steps from the character along a
    /// single horizontal axis, straight through the pushed tile. The map then
    /// decides whether the tile accepts the move. The character never moves.
    pub fn try_push_onto(
        &self,
        map: &mut MapManager,
        movable: TileId,
        destination: TileId,
    ) -> Result<Vector, PushRejection> {
        let verdict = self.check_push(map, movable, destination);
        let landing = match verdict {
            Ok(landing) => landing,
            Err(reason) => {
                debug!(
                    tile = movable.get(),
                    destination = destination.get(),
                    %reason,
                    "push rejected"
                );
                return Err(reason);
            }
        };

        map.try_move_tile(movable, landing)?;
        info!(tile = movable.get(), %landing, "tile pushed");
        Ok(landing)
    }

    /// Tries to push `movable` onto `destination`. Returns `true` when the tile moved.
    pub fn push_onto(&self, map: &mut MapManager, movable: TileId, destination: TileId) -> bool {
        self.try_push_onto(map, movable, destination).is_ok()
    }

    fn check_push(
        &self,
        map: &MapManager,
        movable: TileId,
        destination: TileId,
    ) -> Result<Vector, PushRejection> {
        if movable == self.tile {
            return Err(PushRejection::OwnTile);
        }

        let position = map
            .tile(self.tile)
            .ok_or(PushRejection::MissingTile)?
            .position()
            .checked_add(Vector::UP)
            .ok_or(PushRejection::OutOfBounds)?;
        let pushed = map
            .tile(movable)
            .ok_or(PushRejection::MissingTile)?
            .position();
        let landing = map
            .tile(destination)
            .ok_or(PushRejection::MissingTile)?
            .position()
            .checked_add(Vector::UP)
            .ok_or(PushRejection::OutOfBounds)?;

        if position.distance_from(pushed).length() != 1 {
            return Err(PushRejection::NotTouching);
        }

        let span = position.distance_from(landing);
        if span.length() != 2 || !span.is_pure_directional() {
            return Err(PushRejection::NotStraight);
        }

        let direction = pushed - position;
        if direction.z() != 0 {
            return Err(PushRejection::Vertical);
        }

        if pushed.checked_add(direction) != Some(landing) {
            return Err(PushRejection::NotStraight);
        }

        Ok(landing)
    }

    /// Reports whether a clone occupies the character's cell.
    ///
    /// Purely observational: the character is never removed.
    #[must_use]
    pub fn should_be_dead(&self, map: &MapManager, clones: &CloneManager) -> bool {
        self.position(map)
            .is_some_and(|position| clones.get(position).is_some())
    }
}
