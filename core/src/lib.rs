#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Stackwalk simulation.
//!
//! This crate defines the vocabulary that connects drivers, the authoritative
//! world, and pure systems. Drivers submit [`Command`] values describing
//! desired actions, the world validates and executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Rejected actions are ordinary outcomes and are reported through
//! events carrying one of the rejection enums below.

use std::{
    fmt,
    ops::{Add, Neg, Sub},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Integer coordinate in the layered 3D grid.
///
/// `z` is the vertical axis: tiles sharing a `z` value form one level.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Vector {
    x: i32,
    y: i32,
    z: i32,
}

impl Vector {
    /// The origin.
    pub const ZERO: Self = Self::new(0, 0, 0);
    /// One level up.
    pub const UP: Self = Self::new(0, 0, 1);
    /// One level down.
    pub const DOWN: Self = Self::new(0, 0, -1);
    /// One step toward increasing `x`.
    pub const EAST: Self = Self::new(1, 0, 0);
    /// One step toward decreasing `x`.
    pub const WEST: Self = Self::new(-1, 0, 0);
    /// One step toward increasing `y`.
    pub const NORTH: Self = Self::new(0, 1, 0);
    /// One step toward decreasing `y`.
    pub const SOUTH: Self = Self::new(0, -1, 0);

    /// The four single steps within a level, in neighbour query order.
    pub const HORIZONTAL_DIRECTIONS: [Self; 4] = [Self::EAST, Self::NORTH, Self::WEST, Self::SOUTH];

    /// Creates a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Component along the east-west axis.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Component along the north-south axis.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Vertical component; identifies the level.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Absolute per-axis difference between two coordinates.
    ///
    /// The result never carries a sign, so `a.distance_from(b)` equals
    /// `b.distance_from(a)`.
    #[must_use]
    pub fn distance_from(self, other: Vector) -> Vector {
        Vector::new(
            clamp_to_i32(self.x.abs_diff(other.x)),
            clamp_to_i32(self.y.abs_diff(other.y)),
            clamp_to_i32(self.z.abs_diff(other.z)),
        )
    }

    /// Sum of the absolute components.
    ///
    /// This is a step count on the grid, not a Euclidean length: `(1, 0, 1)`
    /// has length 2.
    #[must_use]
    pub fn length(self) -> u32 {
        self.x
            .unsigned_abs()
            .saturating_add(self.y.unsigned_abs())
            .saturating_add(self.z.unsigned_abs())
    }

    /// Component-wise sum, or `None` when any component leaves the `i32` range.
    ///
    /// Cell lookups use this so that a step off the edge of the grid never
    /// lands back on the cell it started from.
    #[must_use]
    pub fn checked_add(self, rhs: Vector) -> Option<Vector> {
        Some(Vector::new(
            self.x.checked_add(rhs.x)?,
            self.y.checked_add(rhs.y)?,
            self.z.checked_add(rhs.z)?,
        ))
    }

    /// Reports whether exactly one component is nonzero.
    #[must_use]
    pub fn is_pure_directional(self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .filter(|component| **component != 0)
            .count()
            == 1
    }
}

fn clamp_to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(
            self.x.saturating_add(rhs.x),
            self.y.saturating_add(rhs.y),
            self.z.saturating_add(rhs.z),
        )
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(
            self.x.saturating_sub(rhs.x),
            self.y.saturating_sub(rhs.y),
            self.z.saturating_sub(rhs.z),
        )
    }
}

impl Neg for Vector {
    type Output = Vector;

    fn neg(self) -> Vector {
        Vector::ZERO - self
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Unique identifier assigned to a tile by the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a clone by the hazard index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CloneId(u32);

impl CloneId {
    /// Creates a new clone identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of tiles that can occupy a cell.
///
/// Every acceptance rule defaults to refusal; a kind has to opt in explicitly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain block that can be stood upon.
    Floor,
    /// Block that a character can push along a level.
    Movable,
    /// Door occupying a standing cell; passable while open.
    Door {
        /// Whether the door currently lets characters through.
        open: bool,
    },
    /// Trigger occupying a standing cell; always passable.
    PressurePlate,
}

impl TileKind {
    /// Reports whether tiles of this kind may change position.
    #[must_use]
    pub const fn is_movable(self) -> bool {
        matches!(self, Self::Movable)
    }

    /// Reports whether a character may enter the cell this kind occupies.
    #[must_use]
    pub const fn accepts_character(self) -> bool {
        match self {
            Self::Door { open } => open,
            Self::PressurePlate => true,
            Self::Floor | Self::Movable => false,
        }
    }

    /// Reports whether a character standing on a tile of `from` kind may
    /// enter the cell this kind occupies.
    ///
    /// Doors and plates do not care where the character comes from; the move
    /// geometry is validated before this rule is consulted.
    #[must_use]
    pub const fn accepts_character_from(self, _from: TileKind) -> bool {
        self.accepts_character()
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Places a new tile into an empty cell.
    PlaceTile {
        /// Kind of tile to create.
        kind: TileKind,
        /// Cell the tile should occupy.
        position: Vector,
    },
    /// Removes an existing tile from the map.
    RemoveTile {
        /// Identifier of the tile targeted for removal.
        tile: TileId,
    },
    /// Creates the character standing on the provided tile.
    SpawnCharacter {
        /// Tile the character starts on.
        tile: TileId,
    },
    /// Requests that the character step onto the destination tile.
    MoveCharacter {
        /// Tile the character should end up standing on.
        destination: TileId,
    },
    /// Requests that the character push a movable tile onto a destination tile.
    PushTile {
        /// Movable tile being pushed.
        tile: TileId,
        /// Tile the pushed tile should come to rest on.
        destination: TileId,
    },
    /// Opens or closes a door.
    SetDoor {
        /// Door being toggled.
        tile: TileId,
        /// Desired state of the door.
        open: bool,
    },
    /// Registers a clone hazard at the provided cell.
    SpawnClone {
        /// Cell the clone occupies.
        position: Vector,
    },
    /// Removes a clone hazard.
    DespawnClone {
        /// Identifier of the clone to remove.
        clone: CloneId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a tile was placed into the map.
    TilePlaced {
        /// Identifier assigned to the tile by the map.
        tile: TileId,
        /// Kind of tile that was placed.
        kind: TileKind,
        /// Cell the tile occupies.
        position: Vector,
    },
    /// Reports that a tile placement request was rejected.
    TilePlacementRejected {
        /// Kind of tile requested for placement.
        kind: TileKind,
        /// Cell provided in the placement request.
        position: Vector,
        /// Specific reason the placement failed.
        reason: PlacementRejection,
    },
    /// Confirms that a tile was removed from the map.
    TileRemoved {
        /// Identifier of the removed tile.
        tile: TileId,
        /// Cell the tile occupied before removal.
        position: Vector,
    },
    /// Confirms that the character was created.
    CharacterSpawned {
        /// Tile the character stands on.
        tile: TileId,
        /// Cell the character occupies.
        position: Vector,
    },
    /// Confirms that the character stepped onto a new tile.
    CharacterMoved {
        /// Tile the character stood on before moving.
        from: TileId,
        /// Tile the character stands on after moving.
        to: TileId,
    },
    /// Reports that a move request was rejected.
    MoveRejected {
        /// Tile the character attempted to step onto.
        destination: TileId,
        /// Specific reason the move failed.
        reason: MoveRejection,
    },
    /// Confirms that a movable tile was pushed to a new cell.
    TilePushed {
        /// Identifier of the pushed tile.
        tile: TileId,
        /// Cell the tile occupied before the push.
        from: Vector,
        /// Cell the tile occupies after the push.
        to: Vector,
    },
    /// Reports that a push request was rejected.
    PushRejected {
        /// Tile the character attempted to push.
        tile: TileId,
        /// Tile the pushed tile should have landed on.
        destination: TileId,
        /// Specific reason the push failed.
        reason: PushRejection,
    },
    /// Confirms that a door changed state.
    DoorChanged {
        /// Identifier of the door.
        tile: TileId,
        /// State of the door after the change.
        open: bool,
    },
    /// Confirms that a clone hazard was registered.
    CloneSpawned {
        /// Identifier assigned to the clone.
        clone: CloneId,
        /// Cell the clone occupies.
        position: Vector,
    },
    /// Confirms that a clone hazard was removed.
    CloneDespawned {
        /// Identifier of the removed clone.
        clone: CloneId,
        /// Cell the clone occupied.
        position: Vector,
    },
    /// Announces that the character arrived at a tile.
    TileEntered {
        /// Tile that was entered.
        tile: TileId,
    },
    /// Announces that the character left a tile.
    TileExited {
        /// Tile that was left.
        tile: TileId,
    },
    /// Reports that the character stands on a hazard and should be dead.
    CharacterEndangered {
        /// Cell the character occupies.
        position: Vector,
    },
    /// Reports that a command could not be carried out at all.
    CommandRejected {
        /// Command that was refused.
        command: Command,
        /// Specific reason the command was refused.
        reason: CommandRejection,
    },
}

/// Reasons a character move may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveRejection {
    /// The destination is on the same level but not directly next to the current tile.
    #[error("destination is on the same level but not adjacent")]
    NotAdjacent,
    /// The destination is one level away but not one horizontal step away.
    #[error("destination is on a neighbouring level but not a single step away")]
    NotAStep,
    /// The destination is two or more levels away.
    #[error("destination is out of vertical reach")]
    OutOfReach,
    /// The cell above the destination is occupied by a tile that refuses the character.
    #[error("the cell above the destination is blocked")]
    Blocked,
    /// The current or destination tile does not exist in the map.
    #[error("tile does not exist")]
    MissingTile,
}

/// Reasons a tile relocation may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RelocationRejection {
    /// Only movable tiles can change position.
    #[error("tile is not movable")]
    NotMovable,
    /// The destination cell already holds a tile.
    #[error("destination cell is occupied")]
    Occupied,
    /// Nothing below the destination cell could hold the tile up.
    #[error("destination cell has no supporting tile")]
    Unsupported,
    /// The tile does not exist in the map.
    #[error("tile does not exist")]
    MissingTile,
}

/// Reasons a push may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PushRejection {
    /// The pushed tile is the one the character stands on.
    #[error("the character cannot push the tile it stands on")]
    OwnTile,
    /// The pushed tile is not a single step from the character.
    #[error("tile is not touching the character")]
    NotTouching,
    /// The landing cell does not continue the straight line from the character through the tile.
    #[error("push does not follow a straight line")]
    NotStraight,
    /// The push would move the tile between levels.
    #[error("tiles can only be pushed within a level")]
    Vertical,
    /// The character, pushed tile, or destination tile does not exist.
    #[error("tile does not exist")]
    MissingTile,
    /// The character's cell or the landing cell lies past the top of the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// The pushed tile refused to move to the landing cell.
    #[error("tile refused to move: {0}")]
    Relocation(#[from] RelocationRejection),
}

/// Reasons a tile placement may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementRejection {
    /// The requested cell already holds a tile.
    #[error("cell is occupied")]
    Occupied,
}

/// Reasons a command could not be carried out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum CommandRejection {
    /// The command needs a character but none has been spawned.
    #[error("no character has been spawned")]
    NoCharacter,
    /// A character already exists.
    #[error("a character has already been spawned")]
    CharacterAlreadySpawned,
    /// The referenced tile does not exist.
    #[error("tile does not exist")]
    MissingTile,
    /// The tile is still in use by the character.
    #[error("the character stands on the tile")]
    TileInUse,
    /// The referenced tile is not a door.
    #[error("tile is not a door")]
    NotADoor,
    /// The referenced clone does not exist.
    #[error("clone does not exist")]
    MissingClone,
    /// The cell already holds a clone.
    #[error("cell already holds a clone")]
    CloneOccupied,
    /// The character's cell would lie past the top of the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
}
