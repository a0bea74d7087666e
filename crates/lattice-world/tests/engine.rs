//! End-to-end behaviour of the engine through its public surface only.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::Arc;

use lattice_core::{Orientation, Piece, Position, Size, StateArg, Topology, Transform, UpdateOrder, WorldArgs};
use lattice_world::{CharMap, Grid, Perspective, StateCallback, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn on(layer: &str, sprite: &str, groups: &[&str]) -> StateArg {
    StateArg {
        layer: Some(layer.into()),
        sprite: Some(sprite.into()),
        groups: groups.iter().map(|g| g.to_string()).collect(),
        contact: None,
    }
}

fn world() -> Arc<World> {
    let mut args = WorldArgs::default();
    args.render_order = vec!["floor".into(), "solid".into()];
    args.update_order = vec![UpdateOrder::implicit("step")];
    args.states.insert("Block".into(), on("solid", "Block", &["blocks"]));
    args.states.insert("Wall".into(), on("solid", "Wall", &[]));
    args.states.insert("Ghost".into(), on("floor", "Ghost", &["ghosts"]));
    Arc::new(World::new(&args))
}

fn at(x: i32, y: i32) -> Transform {
    Transform::new(Position::new(x, y), Orientation::North)
}

type Blocked = Rc<RefCell<Vec<(Piece, Piece)>>>;

struct BlockLog(Blocked);

impl StateCallback for BlockLog {
    fn on_blocked(&mut self, _grid: &mut Grid, piece: Piece, blocker: Piece) {
        self.0.borrow_mut().push((piece, blocker));
    }
}

#[test]
fn test_create_on_occupied_cell_returns_empty() {
    let world = world();
    let block = world.states().to_handle("Block");
    let ghost = world.states().to_handle("Ghost");
    let mut grid = Grid::new(world, Size::new(2, 2), Topology::Bounded).unwrap();
    assert!(!grid.create_instance(block, at(1, 1)).is_empty());
    assert!(grid.create_instance(block, at(1, 1)).is_empty());
    // Another layer of the same cell is free.
    assert!(!grid.create_instance(ghost, at(1, 1)).is_empty());
    assert_eq!(grid.piece_count(), 2);
}

#[test]
fn test_blocked_state_change_completes_after_release() {
    let world = world();
    let block = world.states().to_handle("Block");
    let ghost = world.states().to_handle("Ghost");
    let mut grid = Grid::new(world, Size::new(1, 1), Topology::Bounded).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let spirit = grid.create_instance(ghost, at(0, 0));
    let obstacle = grid.create_instance(block, at(0, 0));

    grid.set_state(spirit, block);
    grid.do_update(&mut rng, 128);
    grid.do_update(&mut rng, 128);
    assert_eq!(grid.get_state(spirit), ghost);
    assert_eq!(grid.queued_actions().count(), 1);

    grid.release_instance(obstacle);
    grid.do_update(&mut rng, 128);
    assert_eq!(grid.get_state(spirit), block);
    assert_eq!(grid.queued_actions().count(), 0);
    assert_eq!(grid.to_string(), "B\n");
}

#[test]
fn test_connected_block_moves_as_one_and_stops_at_wall() {
    let world = world();
    let block = world.states().to_handle("Block");
    let wall = world.states().to_handle("Wall");
    let mut grid = Grid::new(world, Size::new(6, 3), Topology::Bounded).unwrap();
    let blocked: Blocked = Rc::new(RefCell::new(Vec::new()));
    grid.set_callback(block, Box::new(BlockLog(Rc::clone(&blocked))));

    let mut pieces = Vec::new();
    for y in 0..3 {
        for x in 0..3 {
            pieces.push(grid.create_instance(block, at(x, y)));
        }
    }
    let centre = pieces[4];
    for &piece in &pieces {
        grid.connect(centre, piece);
    }
    let stop = grid.create_instance(wall, at(4, 1));
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    grid.push_piece(centre, Orientation::East, Perspective::Grid);
    grid.do_update(&mut rng, 128);
    assert_eq!(grid.connected_pieces(centre).len(), 9);
    for (i, &piece) in pieces.iter().enumerate() {
        let expected = Position::new(i as i32 % 3 + 1, i as i32 / 3);
        assert_eq!(grid.get_piece_transform(piece).position, expected);
    }
    assert!(blocked.borrow().is_empty());

    grid.push_piece(centre, Orientation::East, Perspective::Grid);
    grid.do_update(&mut rng, 128);
    assert_eq!(*blocked.borrow(), vec![(centre, stop)]);
    assert_eq!(grid.to_string(), " BBB  \n BBBW \n BBB  \n");
}

#[test]
fn test_ray_cast_reports_last_cell_before_edge() {
    let world = world();
    let solid = world.layers().to_handle("solid");
    let grid = Grid::new(world, Size::new(10, 10), Topology::Bounded).unwrap();
    let hit = grid
        .ray_cast(solid, Position::new(0, 5), Position::new(11, 5))
        .unwrap();
    assert_eq!(hit.position, Position::new(9, 5));
    assert!(hit.piece.is_empty());
}

#[test]
fn test_layout_round_trip() {
    let world = world();
    let mut names = BTreeMap::new();
    names.insert("B".to_string(), "Block".to_string());
    names.insert("W".to_string(), "Wall".to_string());
    names.insert("G".to_string(), "Ghost".to_string());
    let char_map = CharMap::from_names(&world, &names).unwrap();
    let layout = "\nWWWWW\nWB GW\nWWWWW\n";
    let mut grid = Grid::new(world, lattice_world::text::size_of_text(layout), Topology::Bounded).unwrap();
    grid.create_layout(&char_map, layout, Position::new(0, 0), Orientation::North);
    assert_eq!(grid.to_string(), "WWWWW\nWB GW\nWWWWW\n");
}

struct Drift;

impl StateCallback for Drift {
    fn on_update(&mut self, grid: &mut Grid, _update: lattice_core::Update, piece: Piece, _num_frames: i64) {
        grid.push_piece(piece, Orientation::East, Perspective::Piece);
        grid.rotate_piece(piece, lattice_core::Rotate::R90);
    }
}

#[test]
fn test_same_seed_gives_same_run() {
    let run = |seed: u64| {
        let world = world();
        let ghost = world.states().to_handle("Ghost");
        let ghosts = world.groups().to_handle("ghosts");
        let step = world.updates().to_handle("step");
        let mut grid = Grid::new(world, Size::new(5, 5), Topology::Torus).unwrap();
        grid.set_callback(ghost, Box::new(Drift));
        grid.set_update_info(step, ghosts, 0.5, 0);
        for x in 0..5 {
            grid.create_instance(ghost, at(x, x));
        }
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut frames = Vec::new();
        for _ in 0..30 {
            grid.do_update(&mut rng, 128);
            frames.push(grid.to_string());
        }
        frames
    };
    assert_eq!(run(3), run(3));
}
