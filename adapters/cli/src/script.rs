//! Parser for the semicolon-separated action scripts accepted by `--script`.

use std::fmt;

use anyhow::{bail, Context, Result};
use stackwalk_core::Vector;

/// A single step of a script. Tiles are addressed by the cell they occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    /// Step onto the tile at the cell.
    Move(Vector),
    /// Push the tile at `tile` so it comes to rest on the tile at `destination`.
    Push { tile: Vector, destination: Vector },
    /// Open or close the door at the cell.
    Door { tile: Vector, open: bool },
    /// Spawn a clone into the cell.
    Clone(Vector),
    /// Walk to the tile at the cell along the shortest route.
    Walk(Vector),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(tile) => write!(f, "move onto {tile}"),
            Self::Push { tile, destination } => write!(f, "push {tile} onto {destination}"),
            Self::Door { tile, open: true } => write!(f, "open door {tile}"),
            Self::Door { tile, open: false } => write!(f, "close door {tile}"),
            Self::Clone(position) => write!(f, "spawn clone at {position}"),
            Self::Walk(tile) => write!(f, "walk to {tile}"),
        }
    }
}

/// Parses every non-empty step of the script.
pub(crate) fn parse(script: &str) -> Result<Vec<Action>> {
    script
        .split(';')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(|step| parse_action(step).with_context(|| format!("invalid step `{step}`")))
        .collect()
}

fn parse_action(step: &str) -> Result<Action> {
    let mut words = step.split_whitespace();
    let verb = words.next().context("missing action")?;
    let arguments: Vec<&str> = words.collect();

    let action = match verb {
        "move" => {
            arity(verb, &arguments, 3)?;
            Action::Move(vector(&arguments)?)
        }
        "push" => {
            arity(verb, &arguments, 6)?;
            Action::Push {
                tile: vector(&arguments[..3])?,
                destination: vector(&arguments[3..])?,
            }
        }
        "door" => {
            arity(verb, &arguments, 4)?;
            let open = match arguments[3] {
                "open" => true,
                "closed" | "close" => false,
                other => bail!("door state must be `open` or `closed`, got `{other}`"),
            };
            Action::Door {
                tile: vector(&arguments[..3])?,
                open,
            }
        }
        "clone" => {
            arity(verb, &arguments, 3)?;
            Action::Clone(vector(&arguments)?)
        }
        "walk" => {
            arity(verb, &arguments, 3)?;
            Action::Walk(vector(&arguments)?)
        }
        other => bail!("unknown action `{other}`"),
    };

    Ok(action)
}

fn arity(verb: &str, arguments: &[&str], expected: usize) -> Result<()> {
    if arguments.len() != expected {
        bail!(
            "`{verb}` takes {expected} arguments, got {}",
            arguments.len()
        );
    }
    Ok(())
}

fn vector(arguments: &[&str]) -> Result<Vector> {
    let [x, y, z] = arguments else {
        bail!("expected three coordinates");
    };
    Ok(Vector::new(coordinate(x)?, coordinate(y)?, coordinate(z)?))
}

fn coordinate(token: &str) -> Result<i32> {
    token
        .parse()
        .with_context(|| format!("`{token}` is not a coordinate"))
}
