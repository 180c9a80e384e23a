use stackwalk_core::{Command, Event, TileId, TileKind, Vector};
use stackwalk_system_pathing::{route, steps, Pathing};
use stackwalk_world::{self as world, query, MapManager, World};

fn slab(map: &mut MapManager, width: i32, depth: i32) {
    for x in 0..width {
        for y in 0..depth {
            let _ = map
                .insert(TileKind::Floor, Vector::new(x, y, 0))
                .expect("floor");
        }
    }
}

fn id_at(map: &MapManager, x: i32, y: i32, z: i32) -> TileId {
    map.tile_at(Vector::new(x, y, z)).expect("tile").id()
}

fn positions(map: &MapManager, path: &[TileId]) -> Vec<Vector> {
    path.iter()
        .map(|tile| map.tile(*tile).expect("tile on route").position())
        .collect()
}

#[test]
fn open_ground_route_is_as_long_as_the_manhattan_distance() {
    let mut map = MapManager::new();
    slab(&mut map, 4, 3);

    let path = route(&map, id_at(&map, 0, 0, 0), id_at(&map, 3, 2, 0)).expect("route");
    assert_eq!(path.len(), 5);
    assert_eq!(path.last(), Some(&id_at(&map, 3, 2, 0)));
}

#[test]
fn route_to_the_starting_tile_is_empty() {
    let mut map = MapManager::new();
    slab(&mut map, 1, 1);
    let start = id_at(&map, 0, 0, 0);

    assert_eq!(route(&map, start, start), Some(Vec::new()));
    assert_eq!(route(&map, start, TileId::new(42)), None);
}

#[test]
fn separated_islands_are_unreachable() {
    let mut map = MapManager::new();
    let left = map.insert(TileKind::Floor, Vector::ZERO).expect("left");
    let right = map
        .insert(TileKind::Floor, Vector::new(2, 0, 0))
        .expect("right");

    assert_eq!(route(&map, left, right), None);
}

#[test]
fn route_climbs_over_a_low_wall() {
    let mut map = MapManager::new();
    slab(&mut map, 5, 1);
    let wall = map
        .insert(TileKind::Floor, Vector::new(2, 0, 1))
        .expect("wall");

    let path = route(&map, id_at(&map, 0, 0, 0), id_at(&map, 4, 0, 0)).expect("route");
    assert_eq!(
        positions(&map, &path),
        vec![
            Vector::new(1, 0, 0),
            Vector::new(2, 0, 1),
            Vector::new(3, 0, 0),
            Vector::new(4, 0, 0),
        ]
    );
    assert_eq!(path[1], wall);
}

#[test]
fn open_door_is_walked_through_and_closed_door_is_climbed() {
    let mut map = MapManager::new();
    slab(&mut map, 3, 1);
    let door = map
        .insert(TileKind::Door { open: true }, Vector::new(1, 0, 1))
        .expect("door");
    let start = id_at(&map, 0, 0, 0);
    let goal = id_at(&map, 2, 0, 0);

    assert_eq!(
        route(&map, start, goal),
        Some(vec![id_at(&map, 1, 0, 0), goal])
    );

    map.set_door(door, false).expect("door");
    assert_eq!(route(&map, start, goal), Some(vec![door, goal]));
}

fn place(world: &mut World, kind: TileKind, position: Vector) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::PlaceTile { kind, position }, &mut events);
    events
}

fn level(width: i32, depth: i32) -> World {
    let mut world = World::new();
    for x in 0..width {
        for y in 0..depth {
            let _ = place(&mut world, TileKind::Floor, Vector::new(x, y, 0));
        }
    }
    world
}

fn spawn(world: &mut World, position: Vector) -> Vec<Event> {
    let tile = query::tile_at(world, position).expect("spawn tile").id();
    let mut events = Vec::new();
    world::apply(world, Command::SpawnCharacter { tile }, &mut events);
    events
}

fn drive(world: &mut World, pathing: &mut Pathing, pending: Vec<Event>) -> Vec<Event> {
    let mut log = Vec::new();
    let mut events = pending;

    for _ in 0..64 {
        let mut commands = Vec::new();
        pathing.handle(
            &events,
            query::map(world),
            query::character(world),
            &mut commands,
        );
        if commands.is_empty() {
            break;
        }

        events.clear();
        for command in commands {
            world::apply(world, command, &mut events);
        }
        log.extend(events.iter().copied());
    }

    log
}

#[test]
fn system_walks_the_character_to_its_goal() {
    let mut world = level(4, 3);
    let goal = query::tile_at(&world, Vector::new(3, 2, 0))
        .expect("goal")
        .id();
    let spawned = spawn(&mut world, Vector::ZERO);

    let mut pathing = Pathing::new(goal);
    let log = drive(&mut world, &mut pathing, spawned);

    let moves = log
        .iter()
        .filter(|event| matches!(event, Event::CharacterMoved { .. }))
        .count();
    assert_eq!(moves, 5);
    assert_eq!(query::character(&world).map(|c| c.tile()), Some(goal));
    assert_eq!(pathing.goal(), None);
}

#[test]
fn system_replans_when_the_map_changes() {
    let mut world = level(5, 3);
    let goal = query::tile_at(&world, Vector::new(4, 1, 0))
        .expect("goal")
        .id();
    let spawned = spawn(&mut world, Vector::new(0, 1, 0));

    let mut pathing = Pathing::new(goal);
    let mut commands = Vec::new();
    pathing.handle(
        &spawned,
        query::map(&world),
        query::character(&world),
        &mut commands,
    );
    let first_step = query::tile_at(&world, Vector::new(1, 1, 0))
        .expect("step")
        .id();
    assert_eq!(
        commands,
        vec![Command::MoveCharacter {
            destination: first_step,
        }]
    );

    let mut events = Vec::new();
    world::apply(&mut world, commands[0], &mut events);
    events.extend(place(&mut world, TileKind::Floor, Vector::new(2, 1, 1)));

    let log = drive(&mut world, &mut pathing, events);

    assert!(!log
        .iter()
        .any(|event| matches!(event, Event::MoveRejected { .. })));
    assert!(log.contains(&Event::CharacterMoved {
        from: first_step,
        to: query::tile_at(&world, Vector::new(2, 1, 1))
            .expect("wall")
            .id(),
    }));
    assert_eq!(query::character(&world).map(|c| c.tile()), Some(goal));
}

#[test]
fn unreachable_goal_is_abandoned() {
    let mut world = level(2, 1);
    let _ = place(&mut world, TileKind::Floor, Vector::new(5, 0, 0));
    let island = query::tile_at(&world, Vector::new(5, 0, 0))
        .expect("island")
        .id();
    let spawned = spawn(&mut world, Vector::ZERO);

    let mut pathing = Pathing::new(island);
    let log = drive(&mut world, &mut pathing, spawned);

    assert!(log.is_empty());
    assert_eq!(pathing.goal(), None);
}

#[test]
fn no_events_means_no_step() {
    let mut world = level(2, 1);
    let goal = query::tile_at(&world, Vector::EAST).expect("goal").id();
    let _ = spawn(&mut world, Vector::ZERO);

    let mut pathing = Pathing::new(goal);
    let mut commands = Vec::new();
    pathing.handle(
        &[],
        query::map(&world),
        query::character(&world),
        &mut commands,
    );
    assert!(commands.is_empty());
    assert_eq!(pathing.goal(), Some(goal));
}

#[test]
fn step_plans_without_waiting_for_events() {
    let mut world = level(3, 1);
    let goal = query::tile_at(&world, Vector::new(2, 0, 0))
        .expect("goal")
        .id();
    let _ = spawn(&mut world, Vector::ZERO);
    let next = query::tile_at(&world, Vector::EAST).expect("next").id();

    let mut pathing = Pathing::new(goal);
    let mut commands = Vec::new();
    pathing.step(query::map(&world), query::character(&world), &mut commands);
    assert_eq!(commands, vec![Command::MoveCharacter { destination: next }]);

    pathing.set_goal(None);
    commands.clear();
    pathing.step(query::map(&world), query::character(&world), &mut commands);
    assert!(commands.is_empty());
}

#[test]
fn steps_include_descents_but_not_the_origin() {
    let mut map = MapManager::new();
    slab(&mut map, 3, 1);
    let ledge = map
        .insert(TileKind::Floor, Vector::new(1, 0, 1))
        .expect("ledge");
    let tile = map.tile(ledge).expect("ledge tile");

    let listed: Vec<Vector> = steps(tile, &map).iter().map(|t| t.position()).collect();
    assert_eq!(listed, vec![Vector::new(2, 0, 0), Vector::new(0, 0, 0)]);
}

#[test]
fn bottom_level_has_no_descents() {
    let mut map = MapManager::new();
    let floor = map
        .insert(TileKind::Floor, Vector::new(0, 0, i32::MIN))
        .expect("floor");
    let _ = map
        .insert(TileKind::Floor, Vector::new(1, 0, i32::MIN))
        .expect("neighbour");
    let tile = map.tile(floor).expect("floor tile");

    let listed: Vec<Vector> = steps(tile, &map).iter().map(|t| t.position()).collect();
    assert_eq!(listed, vec![Vector::new(1, 0, i32::MIN)]);
}
