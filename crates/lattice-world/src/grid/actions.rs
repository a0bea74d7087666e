//! Deferred actions and the tick loop.

use lattice_core::{Group, Hit, Orientation, Piece, Position, Rotate, State, Update};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use super::lifecycle::{swap_back, swap_forward};
use super::{CallbackEvent, Grid};

/// Frame of reference for a push direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    /// North is up the grid.
    #[default]
    Grid,
    /// North is the piece's facing.
    Piece,
}

/// Orientation a teleported piece ends up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeleportOrientation {
    /// Take the orientation of the destination transform or group member.
    MatchTarget,
    #[default]
    KeepOriginal,
    PickRandom,
}

/// A queued mutation, applied during [`Grid::do_update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Rotate(Rotate),
    SetOrientation(Orientation),
    Push {
        direction: Orientation,
        perspective: Perspective,
    },
    Teleport {
        position: Position,
        orientation: TeleportOrientation,
    },
    SetState(State),
    TeleportToGroup {
        group: Group,
        state: State,
        orientation: TeleportOrientation,
    },
    HitBeam {
        hit: Hit,
        length: i32,
        radius: i32,
    },
    Connect(Piece),
    Disconnect,
    DisconnectAll,
}

impl Grid {
    fn queue(&mut self, piece: Piece, action: Action) {
        if piece.is_empty() {
            return;
        }
        self.action_queue.push((piece, action));
    }

    pub fn rotate_piece(&mut self, piece: Piece, rotate: Rotate) {
        self.queue(piece, Action::Rotate(rotate));
    }

    pub fn set_piece_orientation(&mut self, piece: Piece, orientation: Orientation) {
        self.queue(piece, Action::SetOrientation(orientation));
    }

    pub fn push_piece(&mut self, piece: Piece, direction: Orientation, perspective: Perspective) {
        self.queue(
            piece,
            Action::Push {
                direction,
                perspective,
            },
        );
    }

    pub fn teleport_piece(&mut self, piece: Piece, position: Position, orientation: TeleportOrientation) {
        self.queue(
            piece,
            Action::Teleport {
                position,
                orientation,
            },
        );
    }

    /// Stays queued while the destination cell is occupied.
    pub fn set_state(&mut self, piece: Piece, state: State) {
        self.queue(piece, Action::SetState(state));
    }

    /// Moves `piece` onto a random member of `group` whose cell on the new
    /// state's layer is free, switching it to `state`. Stays queued while no
    /// such member exists.
    pub fn teleport_to_group(
        &mut self,
        piece: Piece,
        group: Group,
        state: State,
        orientation: TeleportOrientation,
    ) {
        self.queue(
            piece,
            Action::TeleportToGroup {
                group,
                state,
                orientation,
            },
        );
    }

    pub fn hit_beam(&mut self, piece: Piece, hit: Hit, length: i32, radius: i32) {
        self.queue(piece, Action::HitBeam { hit, length, radius });
    }

    pub fn connect(&mut self, piece: Piece, other: Piece) {
        self.queue(piece, Action::Connect(other));
    }

    pub fn disconnect(&mut self, piece: Piece) {
        self.queue(piece, Action::Disconnect);
    }

    pub fn disconnect_all(&mut self, piece: Piece) {
        self.queue(piece, Action::DisconnectAll);
    }

    /// Actions waiting for the next tick, oldest first.
    pub fn queued_actions(&self) -> impl Iterator<Item = &(Piece, Action)> + '_ {
        self.action_queue.iter()
    }

    /// Advances the simulation by one tick.
    ///
    /// Restores sprites under the previous tick's overlays, runs the update
    /// passes, then resolves the action queue up to `flush_count + 1` times
    /// so actions queued by callbacks can complete in the same tick.
    #[instrument(level = "debug", skip(self, rng), fields(frame = self.frame))]
    pub fn do_update<R: Rng + ?Sized>(&mut self, rng: &mut R, flush_count: usize) {
        self.in_update = true;
        swap_back(&mut self.render_cells, &mut self.temp_sprites_immediate);
        self.temp_sprites_immediate.clear();
        swap_back(&mut self.render_cells, &mut self.temp_sprites);
        self.temp_sprites.clear();
        for action in self.set_sprite_queue.drain(..) {
            self.render_cells[action.cell] = action.instance;
        }

        self.run_updaters(rng);
        self.frame += 1;

        let pieces_before = self.pieces.len();
        let mut processed = 0;
        let mut passes = 0;
        while passes <= flush_count && !self.action_queue.is_empty() {
            processed += self.action_queue.len();
            self.process_queue(rng);
            self.release_deferred();
            passes += 1;
        }
        if !self.action_queue.is_empty() {
            debug!(
                pending = self.action_queue.len(),
                passes, "Flush limit reached, actions carried to next tick"
            );
        }
        self.release_deferred();

        swap_forward(&mut self.render_cells, &mut self.temp_sprites);
        swap_forward(&mut self.render_cells, &mut self.temp_sprites_immediate);
        self.in_update = false;
        trace!(
            frame = self.frame,
            processed,
            retried = self.action_queue.len(),
            destroyed = pieces_before.saturating_sub(self.pieces.len()),
            pieces = self.pieces.len(),
            "Tick complete"
        );
    }

    fn run_updaters<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let infos: Vec<(Update, _)> = self
            .update_infos
            .iter()
            .map(|(update, info)| (update, *info))
            .collect();
        for (update, info) in infos {
            if info.group.is_empty() {
                continue;
            }
            let members = self.pieces_by_group_shuffled_with_probability(info.group, info.probability, rng);
            for piece in members {
                let Some(data) = self.piece_data(piece) else {
                    continue;
                };
                let num_frames = self.frame - data.frame_created;
                if num_frames >= info.start_frame {
                    let state = data.state;
                    self.fire(state, CallbackEvent::Update(update, piece, num_frames));
                }
            }
        }
    }

    /// Applies every queued action once. Incomplete actions keep their
    /// order and are followed by anything queued while processing.
    fn process_queue<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let processing = std::mem::take(&mut self.action_queue);
        let mut retained = Vec::new();
        for (piece, action) in processing {
            if !self.process_action(rng, piece, action) {
                retained.push((piece, action));
            }
        }
        retained.append(&mut self.action_queue);
        self.action_queue = retained;
    }

    /// Returns whether the action is finished.
    fn process_action<R: Rng + ?Sized>(&mut self, rng: &mut R, piece: Piece, action: Action) -> bool {
        if !self.is_live(piece) {
            return true;
        }
        match action {
            Action::Rotate(rotate) => self.rotate_piece_actual(piece, rotate),
            Action::SetOrientation(orientation) => self.set_piece_orientation_actual(piece, orientation),
            Action::Push {
                direction,
                perspective,
            } => self.push_piece_actual(piece, direction, perspective),
            Action::Teleport {
                position,
                orientation,
            } => self.teleport_piece_actual(rng, piece, position, orientation),
            Action::SetState(state) => return self.set_state_actual(piece, state),
            Action::TeleportToGroup {
                group,
                state,
                orientation,
            } => return self.teleport_to_group_actual(rng, piece, group, state, orientation),
            Action::HitBeam { hit, length, radius } => self.hit_beam_actual(piece, hit, length, radius),
            Action::Connect(other) => self.connect_actual(piece, other),
            Action::Disconnect => self.disconnect_actual(piece),
            Action::DisconnectAll => self.disconnect_all_actual(piece),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{at, test_world, Event, Recorder};
    use super::*;
    use lattice_core::{Size, Topology};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_actions_apply_on_update() {
        let world = test_world();
        let player = world.states().to_handle("Player");
        let mut grid = Grid::new(world, Size::new(3, 3), Topology::Bounded).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let piece = grid.create_instance(player, at(1, 1));

        grid.push_piece(piece, Orientation::East, Perspective::Grid);
        grid.rotate_piece(piece, Rotate::R90);
        assert_eq!(grid.queued_actions().count(), 2);
        assert_eq!(grid.get_piece_transform(piece), at(1, 1));

        grid.do_update(&mut rng, 128);
        let transform = grid.get_piece_transform(piece);
        assert_eq!(transform.position, Position::new(2, 1));
        assert_eq!(transform.orientation, Orientation::East);
        assert_eq!(grid.queued_actions().count(), 0);
        assert_eq!(grid.frame(), 1);
    }

    #[test]
    fn test_modes_use_snake_case_names() {
        assert_eq!(serde_json::to_string(&Perspective::Piece).unwrap(), "\"piece\"");
        let mode: TeleportOrientation = serde_json::from_str("\"pick_random\"").unwrap();
        assert_eq!(mode, TeleportOrientation::PickRandom);
    }

    #[test]
    fn test_empty_piece_is_not_queued() {
        let mut grid = Grid::new(test_world(), Size::new(3, 3), Topology::Bounded).unwrap();
        grid.rotate_piece(Piece::EMPTY, Rotate::R90);
        grid.disconnect(Piece::EMPTY);
        assert_eq!(grid.queued_actions().count(), 0);
    }

    #[test]
    fn test_release_drops_pending_actions() {
        let world = test_world();
        let player = world.states().to_handle("Player");
        let mut grid = Grid::new(world, Size::new(3, 3), Topology::Bounded).unwrap();
        let a = grid.create_instance(player, at(0, 0));
        let b = grid.create_instance(player, at(1, 0));
        grid.push_piece(a, Orientation::South, Perspective::Grid);
        grid.connect(b, a);
        grid.rotate_piece(b, Rotate::R180);
        grid.release_instance(a);
        let pending: Vec<_> = grid.queued_actions().copied().collect();
        assert_eq!(pending, vec![(b, Action::Rotate(Rotate::R180))]);
    }

    #[test]
    fn test_updaters_respect_start_frame() {
        let mut args = lattice_core::WorldArgs::default();
        args.render_order = vec!["pieces".into()];
        args.states.insert(
            "Player".into(),
            lattice_core::StateArg {
                groups: vec!["players".into()],
                ..super::super::tests::state_arg("pieces", "Player")
            },
        );
        args.update_order = vec![lattice_core::UpdateOrder::implicit("tick")];
        let world = std::sync::Arc::new(crate::World::new(&args));
        let player = world.states().to_handle("Player");
        let tick = world.updates().to_handle("tick");
        let players = world.groups().to_handle("players");

        let mut grid = Grid::new(world, Size::new(2, 1), Topology::Bounded).unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        grid.set_callback(player, Recorder::boxed(&log));
        grid.set_update_info(tick, players, 1.0, 1);
        let piece = grid.create_instance(player, at(0, 0));
        log.borrow_mut().clear();

        let mut rng = ChaCha8Rng::seed_from_u64(42);
        grid.do_update(&mut rng, 128);
        assert!(log.borrow().is_empty());
        grid.do_update(&mut rng, 128);
        assert_eq!(*log.borrow(), vec![Event::Update(tick, piece, 1)]);
    }

    #[test]
    fn test_release_during_update_is_deferred() {
        let world = test_world();
        let player = world.states().to_handle("Player");
        let mut grid = Grid::new(world, Size::new(2, 1), Topology::Bounded).unwrap();
        let piece = grid.create_instance(player, at(0, 0));
        grid.in_update = true;
        grid.release_instance(piece);
        assert!(grid.is_live(piece));
        grid.release_deferred();
        grid.in_update = false;
        assert!(!grid.is_live(piece));
    }
}
