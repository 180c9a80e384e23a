#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Stackwalk.

mod character;
mod clones;
mod map;
mod tile;

use std::fmt;

use stackwalk_core::{Command, CommandRejection, Event, TileId, Vector};
use tracing::{debug, info, warn};

pub use character::Character;
pub use clones::CloneManager;
pub use map::MapManager;
pub use tile::Tile;

/// Callbacks a host may register to observe the character entering and
/// leaving tiles.
///
/// Both methods default to doing nothing. The same facts are broadcast as
/// [`Event::TileEntered`] and [`Event::TileExited`].
pub trait TileHooks: fmt::Debug {
    /// Called after the character arrived at `tile`.
    fn enter(&mut self, _tile: &Tile) {}

    /// Called after the character left `tile`.
    fn exit(&mut self, _tile: &Tile) {}
}

/// Represents the authoritative Stackwalk world state.
#[derive(Debug, Default)]
pub struct World {
    map: MapManager,
    clones: CloneManager,
    character: Option<Character>,
    hooks: Option<Box<dyn TileHooks>>,
}

impl World {
    /// Creates an empty world with no tiles, clones or character.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the hooks invoked when the character enters or leaves tiles,
    /// replacing any previously registered hooks.
    pub fn set_hooks(&mut self, hooks: Box<dyn TileHooks>) {
        self.hooks = Some(hooks);
    }

    /// Removes and returns the registered hooks.
    pub fn take_hooks(&mut self) -> Option<Box<dyn TileHooks>> {
        self.hooks.take()
    }

    fn report_hazard(&self, out_events: &mut Vec<Event>) {
        let Some(character) = self.character else {
            return;
        };
        if !character.should_be_dead(&self.map, &self.clones) {
            return;
        }
        if let Some(position) = character.position(&self.map) {
            warn!(%position, "character stands on a clone");
            out_events.push(Event::CharacterEndangered { position });
        }
    }

    fn visit(&mut self, tile: TileId, arriving: bool, out_events: &mut Vec<Event>) {
        let Some(floor) = self.map.tile(tile) else {
            return;
        };
        let occupant = self.map.tile_toward(floor.position(), Vector::UP);

        for visited in std::iter::once(floor).chain(occupant) {
            if arriving {
                out_events.push(Event::TileEntered { tile: visited.id() });
            } else {
                out_events.push(Event::TileExited { tile: visited.id() });
            }

            if let Some(hooks) = self.hooks.as_mut() {
                if arriving {
                    hooks.enter(visited);
                } else {
                    hooks.exit(visited);
                }
            }
        }
    }
}

fn reject(command: Command, reason: CommandRejection, out_events: &mut Vec<Event>) {
    debug!(?command, %reason, "command rejected");
    out_events.push(Event::CommandRejected { command, reason });
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Every command either takes full effect or leaves the world untouched; the
/// outcome is reported through `out_events`.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PlaceTile { kind, position } => match world.map.insert(kind, position) {
            Ok(tile) => {
                info!(tile = tile.get(), ?kind, %position, "tile placed");
                out_events.push(Event::TilePlaced {
                    tile,
                    kind,
                    position,
                });
            }
            Err(reason) => {
                debug!(?kind, %position, %reason, "tile placement rejected");
                out_events.push(Event::TilePlacementRejected {
                    kind,
                    position,
                    reason,
                });
            }
        },
        Command::RemoveTile { tile } => {
            if world.character.map(|character| character.tile()) == Some(tile) {
                reject(command, CommandRejection::TileInUse, out_events);
                return;
            }
            match world.map.remove(tile) {
                Some(removed) => {
                    info!(tile = tile.get(), "tile removed");
                    out_events.push(Event::TileRemoved {
                        tile,
                        position: removed.position(),
                    });
                }
                None => reject(command, CommandRejection::MissingTile, out_events),
            }
        }
        Command::SpawnCharacter { tile } => {
            if world.character.is_some() {
                reject(
                    command,
                    CommandRejection::CharacterAlreadySpawned,
                    out_events,
                );
                return;
            }
            let Some(floor) = world.map.tile(tile) else {
                reject(command, CommandRejection::MissingTile, out_events);
                return;
            };
            let Some(position) = floor.position().checked_add(Vector::UP) else {
                reject(command, CommandRejection::OutOfBounds, out_events);
                return;
            };

            world.character = Some(Character::new(tile));
            info!(tile = tile.get(), %position, "character spawned");
            out_events.push(Event::CharacterSpawned { tile, position });
            world.visit(tile, true, out_events);
            world.report_hazard(out_events);
        }
        Command::MoveCharacter { destination } => {
            let Some(character) = world.character.as_mut() else {
                reject(command, CommandRejection::NoCharacter, out_events);
                return;
            };

            match character.try_move_onto(&world.map, destination) {
                Ok(from) => {
                    world.visit(from, false, out_events);
                    out_events.push(Event::CharacterMoved {
                        from,
                        to: destination,
                    });
                    world.visit(destination, true, out_events);
                    world.report_hazard(out_events);
                }
                Err(reason) => out_events.push(Event::MoveRejected {
                    destination,
                    reason,
                }),
            }
        }
        Command::PushTile { tile, destination } => {
            let Some(character) = world.character else {
                reject(command, CommandRejection::NoCharacter, out_events);
                return;
            };
            let from = world.map.tile(tile).map(Tile::position);

            match character.try_push_onto(&mut world.map, tile, destination) {
                Ok(to) => out_events.push(Event::TilePushed {
                    tile,
                    from: from.unwrap_or(to),
                    to,
                }),
                Err(reason) => out_events.push(Event::PushRejected {
                    tile,
                    destination,
                    reason,
                }),
            }
        }
        Command::SetDoor { tile, open } => match world.map.set_door(tile, open) {
            Ok(()) => {
                info!(tile = tile.get(), open, "door changed");
                out_events.push(Event::DoorChanged { tile, open });
            }
            Err(reason) => reject(command, reason, out_events),
        },
        Command::SpawnClone { position } => match world.clones.spawn(position) {
            Ok(clone) => {
                info!(clone = clone.get(), %position, "clone spawned");
                out_events.push(Event::CloneSpawned { clone, position });
                world.report_hazard(out_events);
            }
            Err(reason) => reject(command, reason, out_events),
        },
        Command::DespawnClone { clone } => match world.clones.despawn(clone) {
            Some(position) => {
                info!(clone = clone.get(), %position, "clone despawned");
                out_events.push(Event::CloneDespawned { clone, position });
            }
            None => reject(command, CommandRejection::MissingClone, out_events),
        },
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use stackwalk_core::Vector;

    use super::{Character, CloneManager, MapManager, Tile, World};

    /// Provides read-only access to the spatial index.
    #[must_use]
    pub fn map(world: &World) -> &MapManager {
        &world.map
    }

    /// Provides read-only access to the hazard index.
    #[must_use]
    pub fn clones(world: &World) -> &CloneManager {
        &world.clones
    }

    /// Returns the character, if one has been spawned.
    #[must_use]
    pub fn character(world: &World) -> Option<Character> {
        world.character
    }

    /// Returns the cell occupied by the character, if one has been spawned.
    #[must_use]
    pub fn character_position(world: &World) -> Option<Vector> {
        world
            .character
            .and_then(|character| character.position(&world.map))
    }

    /// Returns the tile occupying the provided cell, if any.
    #[must_use]
    pub fn tile_at(world: &World, position: Vector) -> Option<&Tile> {
        world.map.tile_at(position)
    }

    /// Reports whether the character stands on a clone.
    #[must_use]
    pub fn should_be_dead(world: &World) -> bool {
        world
            .character
            .is_some_and(|character| character.should_be_dead(&world.map, &world.clones))
    }

    /// Tiles the character could step onto next, followed by its own tile.
    ///
    /// Empty when no character has been spawned.
    #[must_use]
    pub fn valid_neighbors_of_character(world: &World) -> Vec<&Tile> {
        world
            .character
            .and_then(|character| world.map.tile(character.tile()))
            .map(|tile| tile.valid_neighbors(&world.map))
            .unwrap_or_default()
    }
}
