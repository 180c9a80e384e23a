#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Stackwalk actions on a demonstration level.

mod demo;
mod script;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use stackwalk_core::{Command, Event, TileId, Vector};
use stackwalk_system_pathing::{steps, Pathing};
use stackwalk_world::{self as world, query, Tile, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::script::Action;

const DEFAULT_LOG_FILTER: &str = "stackwalk=info";
const MAX_WALK_ROUNDS: usize = 256;

/// Walks a character across a layered tile grid.
#[derive(Debug, Parser)]
#[command(name = "stackwalk", version)]
struct Cli {
    /// Semicolon-separated actions: `move X Y Z`, `push X Y Z X Y Z`,
    /// `door X Y Z open|closed`, `clone X Y Z`, `walk X Y Z`.
    #[arg(long, conflicts_with = "random_steps")]
    script: Option<String>,

    /// Take this many random steps instead of running a script.
    #[arg(long)]
    random_steps: Option<usize>,

    /// Seed for the random walk.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log filter directives; overrides `RUST_LOG`.
    #[arg(long)]
    log_level: Option<String>,
}

/// Entry point for the Stackwalk command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref())?;

    let mut world = World::new();
    let mut setup = Vec::new();
    demo::build(&mut world, &mut setup)?;
    info!(
        tiles = query::map(&world).len(),
        "demonstration level ready"
    );
    print_events("setup", &setup);

    if let Some(steps) = cli.random_steps {
        random_walk(&mut world, steps, cli.seed);
    } else {
        let source = cli.script.as_deref().unwrap_or(demo::DEFAULT_SCRIPT);
        for action in script::parse(source)? {
            let mut events = Vec::new();
            perform(&mut world, action, &mut events)?;
            print_events(&action.to_string(), &events);
        }
    }

    match query::character_position(&world) {
        Some(position) => println!("character at {position}"),
        None => println!("character missing"),
    }
    println!("should_be_dead: {}", query::should_be_dead(&world));
    Ok(())
}

fn init_tracing(directives: Option<&str>) -> Result<()> {
    let filter = match directives {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

fn print_events(heading: &str, events: &[Event]) {
    println!("> {heading}");
    for event in events {
        println!("  {event:?}");
    }
}

fn tile_id(world: &World, position: Vector) -> Result<TileId> {
    query::tile_at(world, position)
        .map(Tile::id)
        .with_context(|| format!("no tile at {position}"))
}

fn perform(world: &mut World, action: Action, out: &mut Vec<Event>) -> Result<()> {
    let command = match action {
        Action::Move(tile) => Command::MoveCharacter {
            destination: tile_id(world, tile)?,
        },
        Action::Push { tile, destination } => Command::PushTile {
            tile: tile_id(world, tile)?,
            destination: tile_id(world, destination)?,
        },
        Action::Door { tile, open } => Command::SetDoor {
            tile: tile_id(world, tile)?,
            open,
        },
        Action::Clone(position) => Command::SpawnClone { position },
        Action::Walk(tile) => {
            let goal = tile_id(world, tile)?;
            walk(world, goal, out);
            return Ok(());
        }
    };

    world::apply(world, command, out);
    Ok(())
}

fn walk(world: &mut World, goal: TileId, out: &mut Vec<Event>) {
    let mut pathing = Pathing::new(goal);
    let mut commands = Vec::new();
    pathing.step(query::map(world), query::character(world), &mut commands);

    for _ in 0..MAX_WALK_ROUNDS {
        if commands.is_empty() {
            break;
        }

        let mut events = Vec::new();
        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }
        pathing.handle(
            &events,
            query::map(world),
            query::character(world),
            &mut commands,
        );
        out.extend(events);
    }
}

fn random_walk(world: &mut World, count: usize, seed: u64) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    for step in 1..=count {
        let map = query::map(world);
        let Some(character) = query::character(world) else {
            break;
        };
        let Some(current) = map.tile(character.tile()) else {
            break;
        };
        let candidates: Vec<TileId> = steps(current, map).into_iter().map(Tile::id).collect();
        let Some(&destination) = candidates.choose(&mut rng) else {
            info!(step, "character is boxed in");
            break;
        };

        let mut events = Vec::new();
        world::apply(world, Command::MoveCharacter { destination }, &mut events);
        print_events(&format!("random step {step}"), &events);
    }
}
