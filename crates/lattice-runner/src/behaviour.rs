//! State callbacks the runner can attach by name.

use lattice_core::{Contact, Orientation, Piece, Update};
use lattice_world::{Grid, Perspective, StateCallback};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::scenario::Behaviour;

/// Pushes its piece one cell in a random grid direction per update.
pub struct Wander {
    rng: ChaCha8Rng,
}

impl Wander {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl StateCallback for Wander {
    fn on_update(&mut self, grid: &mut Grid, _update: Update, piece: Piece, _num_frames: i64) {
        let direction = Orientation::from_index(self.rng.gen_range(0..4));
        grid.push_piece(piece, direction, Perspective::Grid);
    }

    fn on_blocked(&mut self, grid: &mut Grid, piece: Piece, blocker: Piece) {
        trace!(
            %piece,
            %blocker,
            position = ?grid.get_piece_transform(piece).position,
            "Wanderer blocked"
        );
    }
}

/// Removes its piece when anything enters the cell.
pub struct Consumable;

impl StateCallback for Consumable {
    fn on_enter(&mut self, grid: &mut Grid, _contact: Contact, piece: Piece, instigator: Piece) {
        trace!(%piece, %instigator, "Consumed");
        grid.release_instance(piece);
    }
}

impl Behaviour {
    /// Builds the callback; `seed` feeds behaviours that draw random numbers.
    pub fn callback(self, seed: u64) -> Box<dyn StateCallback> {
        match self {
            Behaviour::Wander => Box::new(Wander::new(seed)),
            Behaviour::Consumable => Box::new(Consumable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_core::{Position, Size, StateArg, Topology, Transform, WorldArgs};
    use lattice_world::World;
    use std::sync::Arc;

    fn world() -> Arc<World> {
        let mut args = WorldArgs::default();
        args.render_order = vec!["ground".into(), "top".into()];
        args.update_order = vec![lattice_core::UpdateOrder::implicit("move")];
        args.states.insert(
            "Mover".into(),
            StateArg {
                layer: Some("top".into()),
                sprite: Some("Mover".into()),
                groups: vec!["movers".into()],
                contact: Some("mover".into()),
            },
        );
        args.states.insert(
            "Crumb".into(),
            StateArg {
                layer: Some("ground".into()),
                sprite: Some("Crumb".into()),
                groups: vec!["crumbs".into()],
                contact: None,
            },
        );
        Arc::new(World::new(&args))
    }

    #[test]
    fn test_consumable_is_released_on_enter() {
        let world = world();
        let mover = world.states().to_handle("Mover");
        let crumb = world.states().to_handle("Crumb");
        let crumbs = world.groups().to_handle("crumbs");
        let mut grid = Grid::new(world, Size::new(2, 1), Topology::Bounded).unwrap();
        grid.set_callback(crumb, Behaviour::Consumable.callback(0));
        grid.create_instance(crumb, Transform::new(Position::new(1, 0), Orientation::North));
        let piece = grid.create_instance(mover, Transform::new(Position::new(0, 0), Orientation::North));

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        grid.push_piece(piece, Orientation::East, Perspective::Grid);
        grid.do_update(&mut rng, 128);
        assert_eq!(grid.piece_count_by_group(crumbs), 0);
        assert_eq!(grid.to_string(), " M\n");
    }

    #[test]
    fn test_wander_stays_on_grid_and_is_deterministic() {
        let run = |seed| {
            let world = world();
            let mover = world.states().to_handle("Mover");
            let movers = world.groups().to_handle("movers");
            let update = world.updates().to_handle("move");
            let mut grid = Grid::new(world, Size::new(4, 4), Topology::Bounded).unwrap();
            grid.set_callback(mover, Behaviour::Wander.callback(seed));
            grid.set_update_info(update, movers, 1.0, 0);
            let piece = grid.create_instance(mover, Transform::new(Position::new(1, 1), Orientation::North));
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let mut path = Vec::new();
            for _ in 0..20 {
                grid.do_update(&mut rng, 128);
                path.push(grid.get_piece_transform(piece).position);
            }
            path
        };
        let path = run(7);
        assert!(path.iter().all(|p| (0..4).contains(&p.x) && (0..4).contains(&p.y)));
        assert!(path.iter().any(|p| *p != Position::new(1, 1)));
        assert_eq!(path, run(7));
    }
}
