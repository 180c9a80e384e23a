#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic pathing system that walks the character toward a goal tile.

use std::collections::{BTreeMap, VecDeque};

use stackwalk_core::{Command, Event, TileId};
use stackwalk_world::{Character, MapManager, Tile};
use tracing::{debug, info, warn};

/// Tiles a character standing on `tile` may step onto next, excluding `tile`.
///
/// Climbs and same-level steps come from [`Tile::valid_neighbors`]; descents
/// are the mirrored one-level-down neighbours that have room on top.
#[must_use]
pub fn steps<'map>(tile: &'map Tile, map: &'map MapManager) -> Vec<&'map Tile> {
    let descents = tile
        .position()
        .z()
        .checked_sub(1)
        .map(|below| tile.neighbours_in_level(map, below))
        .unwrap_or_default();

    tile.valid_neighbors(map)
        .into_iter()
        .filter(|candidate| candidate.id() != tile.id())
        .chain(
            descents
                .into_iter()
                .filter(|candidate| candidate.can_be_moved_on(map)),
        )
        .collect()
}

/// Finds the shortest sequence of steps leading from `from` to `to`.
///
/// The returned route excludes `from` and ends with `to`; it is empty when
/// both are the same tile. Returns `None` when either tile is missing or the
/// goal cannot be reached. Ties are broken by neighbour order, so the same map
/// always yields the same route.
#[must_use]
pub fn route(map: &MapManager, from: TileId, to: TileId) -> Option<Vec<TileId>> {
    let _ = map.tile(from)?;
    let _ = map.tile(to)?;
    if from == to {
        return Some(Vec::new());
    }

    let mut parents: BTreeMap<TileId, TileId> = BTreeMap::new();
    let mut queue = VecDeque::new();
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let Some(tile) = map.tile(current) else {
            continue;
        };

        for next in steps(tile, map) {
            let next = next.id();
            if next == from || parents.contains_key(&next) {
                continue;
            }
            let _ = parents.insert(next, current);
            if next == to {
                return Some(unwind(&parents, from, to));
            }
            queue.push_back(next);
        }
    }

    None
}

fn unwind(parents: &BTreeMap<TileId, TileId>, from: TileId, to: TileId) -> Vec<TileId> {
    let mut path = vec![to];
    let mut cursor = to;
    while let Some(&parent) = parents.get(&cursor) {
        if parent == from {
            break;
        }
        path.push(parent);
        cursor = parent;
    }
    path.reverse();
    path
}

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug, Default)]
pub struct Pathing {
    goal: Option<TileId>,
    route: VecDeque<TileId>,
}

impl Pathing {
    /// Creates a system heading for `goal`.
    #[must_use]
    pub fn new(goal: TileId) -> Self {
        Self {
            goal: Some(goal),
            route: VecDeque::new(),
        }
    }

    /// Tile the system is currently walking toward.
    #[must_use]
    pub fn goal(&self) -> Option<TileId> {
        self.goal
    }

    /// Replaces the goal, discarding the cached route.
    pub fn set_goal(&mut self, goal: Option<TileId>) {
        self.goal = goal;
        self.route.clear();
    }

    /// Consumes world events and the current map to emit the next step.
    ///
    /// A step is only proposed in reaction to events, so feeding the system
    /// its own outcome drives the character one tile per round.
    pub fn handle(
        &mut self,
        events: &[Event],
        map: &MapManager,
        character: Option<Character>,
        out: &mut Vec<Command>,
    ) {
        if events.is_empty() {
            return;
        }

        for event in events {
            match event {
                Event::CharacterMoved { to, .. } => {
                    if self.route.front() == Some(to) {
                        let _ = self.route.pop_front();
                    } else {
                        self.route.clear();
                    }
                }
                Event::MoveRejected {
                    destination,
                    reason,
                } => {
                    warn!(
                        destination = destination.get(),
                        %reason,
                        "step refused, abandoning goal"
                    );
                    self.set_goal(None);
                }
                Event::TilePlaced { .. }
                | Event::TileRemoved { .. }
                | Event::TilePushed { .. }
                | Event::DoorChanged { .. } => self.route.clear(),
                _ => {}
            }
        }

        self.step(map, character, out);
    }

    /// Emits the next step toward the goal without waiting for events,
    /// planning a fresh route when none is cached.
    pub fn step(
        &mut self,
        map: &MapManager,
        character: Option<Character>,
        out: &mut Vec<Command>,
    ) {
        let (Some(goal), Some(character)) = (self.goal, character) else {
            return;
        };

        if character.tile() == goal {
            info!(goal = goal.get(), "goal reached");
            self.set_goal(None);
            return;
        }

        if self.route.is_empty() {
            match route(map, character.tile(), goal) {
                Some(path) => {
                    debug!(goal = goal.get(), steps = path.len(), "route planned");
                    self.route.extend(path);
                }
                None => {
                    warn!(goal = goal.get(), "goal unreachable");
                    self.set_goal(None);
                    return;
                }
            }
        }

        if let Some(&destination) = self.route.front() {
            out.push(Command::MoveCharacter { destination });
        }
    }
}
