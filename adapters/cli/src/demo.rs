//! Demonstration level the binary plays on.

use anyhow::{bail, Context, Result};
use stackwalk_core::{Command, Event, TileKind, Vector};
use stackwalk_world::{self as world, query, World};

/// Width and depth of the ground slab.
pub(crate) const SIDE: i32 = 5;

/// Script run when neither `--script` nor `--random-steps` is supplied: walk
/// up to the block, push it aside, open the door and stroll into the clone.
pub(crate) const DEFAULT_SCRIPT: &str = "walk 2 1 0; push 2 2 1 2 3 0; door 1 3 1 open; walk 0 4 0";

/// Fills `world` with the demonstration level, recording the setup events.
///
/// The level is a ground slab with a raised platform along its eastern edge,
/// a movable block, a closed door, a pressure plate and a clone in the north
/// west corner. The character starts on the origin.
pub(crate) fn build(world: &mut World, out: &mut Vec<Event>) -> Result<()> {
    let mut commands = Vec::new();
    for x in 0..SIDE {
        for y in 0..SIDE {
            commands.push(place(TileKind::Floor, x, y, 0));
        }
    }
    for y in 0..SIDE {
        commands.push(place(TileKind::Floor, SIDE - 1, y, 1));
    }
    commands.extend([
        place(TileKind::Movable, 2, 2, 1),
        place(TileKind::Door { open: false }, 1, 3, 1),
        place(TileKind::PressurePlate, 3, 3, 1),
        Command::SpawnClone {
            position: Vector::new(0, 4, 1),
        },
    ]);

    for command in commands {
        submit(world, command, out)?;
    }

    let start = query::tile_at(world, Vector::ZERO)
        .context("demonstration level has no starting tile")?
        .id();
    submit(world, Command::SpawnCharacter { tile: start }, out)
}

fn place(kind: TileKind, x: i32, y: i32, z: i32) -> Command {
    Command::PlaceTile {
        kind,
        position: Vector::new(x, y, z),
    }
}

fn submit(world: &mut World, command: Command, out: &mut Vec<Event>) -> Result<()> {
    let emitted = out.len();
    world::apply(world, command, out);
    if out[emitted..].iter().any(is_refusal) {
        bail!("demonstration level refused {command:?}");
    }
    Ok(())
}

fn is_refusal(event: &Event) -> bool {
    matches!(
        event,
        Event::TilePlacementRejected { .. } | Event::CommandRejected { .. }
    )
}
