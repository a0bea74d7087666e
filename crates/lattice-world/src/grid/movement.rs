//! State changes and rigid-body movement of connected pieces.

use std::sync::Arc;

use lattice_core::{Group, Layer, Orientation, Piece, Position, Rotate, Sprite, State, Transform, Vector};
use rand::Rng;
use tracing::trace;

use super::{CallbackEvent, Grid, Perspective, TeleportOrientation};
use crate::grid_view::SpriteInstance;

fn pick_orientation<R: Rng + ?Sized>(
    mode: TeleportOrientation,
    original: Orientation,
    target: Orientation,
    rng: &mut R,
) -> Orientation {
    match mode {
        TeleportOrientation::MatchTarget => target,
        TeleportOrientation::KeepOriginal => original,
        TeleportOrientation::PickRandom => Orientation::from_index(rng.gen_range(0..4)),
    }
}

impl Grid {
    fn update_render_orientation(&mut self, piece: Piece) {
        let data = &self.pieces[piece];
        let cell = self.shape.try_to_cell_index(data.transform.position, data.layer);
        if !cell.is_empty() {
            self.render_cells[cell].orientation = data.transform.orientation;
        }
    }

    pub(super) fn rotate_piece_actual(&mut self, piece: Piece, rotate: Rotate) {
        let data = &mut self.pieces[piece];
        data.transform.orientation = data.transform.orientation + rotate;
        self.update_render_orientation(piece);
    }

    pub(super) fn set_piece_orientation_actual(&mut self, piece: Piece, orientation: Orientation) {
        self.pieces[piece].transform.orientation = orientation;
        self.update_render_orientation(piece);
    }

    fn notify_blocked(&mut self, piece: Piece, blocker: Piece) {
        trace!(piece = %piece, blocker = %blocker, "Move blocked");
        let state = self.get_state(piece);
        self.fire(state, CallbackEvent::Blocked(piece, blocker));
    }

    /// Returns `false` while the cell on the new state's layer is taken.
    pub(super) fn set_state_actual(&mut self, piece: Piece, target_state: State) -> bool {
        if target_state.is_empty() {
            return true;
        }
        let world = Arc::clone(&self.world);
        let data = &self.pieces[piece];
        let (source_state, transform, current_layer) = (data.state, data.transform, data.layer);
        let source_data = world.state_data(source_state);
        let target_data = world.state_data(target_state);

        let target_cell = self.shape.try_to_cell_index(transform.position, target_data.layer);
        if target_data.layer != current_layer {
            let current_cell = self.shape.try_to_cell_index(transform.position, current_layer);
            if target_cell.is_empty() {
                // No cell on the new layer: the piece leaves the grid.
                self.trigger_on_leave(piece, transform.position);
                if !current_cell.is_empty() {
                    self.cells[current_cell] = Piece::EMPTY;
                    self.render_cells[current_cell].handle = Sprite::EMPTY;
                }
            } else if !self.cells[target_cell].is_empty() {
                trace!(
                    piece = %piece,
                    blocker = %self.cells[target_cell],
                    "State change waiting on occupied cell"
                );
                return false;
            } else if !current_cell.is_empty() {
                self.trigger_on_leave(piece, transform.position);
                self.cells[target_cell] = piece;
                self.cells[current_cell] = Piece::EMPTY;
                self.render_cells[current_cell] = self.render_cells[target_cell];
            } else {
                self.cells[target_cell] = piece;
            }
        }

        if !target_cell.is_empty() {
            self.render_cells[target_cell] = SpriteInstance::new(target_data.sprite, transform.orientation);
        }
        self.fire(source_state, CallbackEvent::Remove(piece));
        self.membership
            .change_membership(piece, &source_data.groups, &target_data.groups);
        let frame = self.frame;
        let data = &mut self.pieces[piece];
        data.frame_created = frame;
        data.state = target_state;
        data.layer = target_data.layer;
        self.fire(target_state, CallbackEvent::Add(piece));
        if !target_cell.is_empty() {
            self.trigger_on_enter(piece, transform.position);
        }
        true
    }

    pub(super) fn push_piece_actual(&mut self, piece: Piece, direction: Orientation, perspective: Perspective) {
        let data = &self.pieces[piece];
        let mut offset = Vector::NORTH * (direction - Orientation::North);
        if perspective == Perspective::Piece {
            offset *= data.transform.orientation - Orientation::North;
        }
        let layer = data.layer;
        if layer.is_empty() {
            let moved = data.transform.position + offset;
            if self.shape.in_bounds(moved) {
                self.pieces[piece].transform.position = self.shape.normalised(moved);
            } else {
                self.notify_blocked(piece, Piece::EMPTY);
            }
            return;
        }

        self.lift(piece);
        let (can_move, blocker) = self.can_place(piece, offset, layer);
        if !can_move {
            offset = Vector::ZERO;
        }
        self.place(piece, offset, layer);
        if !can_move {
            self.notify_blocked(piece, blocker);
        }
    }

    pub(super) fn teleport_piece_actual<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        piece: Piece,
        position: Position,
        mode: TeleportOrientation,
    ) {
        let position = self.shape.normalised(position);
        let data = &self.pieces[piece];
        let (current, layer) = (data.transform, data.layer);
        let mut orientation = pick_orientation(mode, current.orientation, current.orientation, rng);
        if layer.is_empty() {
            if self.shape.in_bounds(position) {
                self.pieces[piece].transform = Transform::new(position, orientation);
            }
            return;
        }

        self.lift(piece);
        let mut offset = position - current.position;
        let (can_move, blocker) = self.can_place(piece, offset, layer);
        if !can_move {
            offset = Vector::ZERO;
            orientation = current.orientation;
        }
        self.pieces[piece].transform.orientation = orientation;
        self.place(piece, offset, layer);
        if !can_move {
            self.notify_blocked(piece, blocker);
        }
    }

    /// Returns `false` while no member of `group` has a free cell on the
    /// target layer.
    pub(super) fn teleport_to_group_actual<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        piece: Piece,
        group: Group,
        target_state: State,
        mode: TeleportOrientation,
    ) -> bool {
        if group.is_empty() {
            return true;
        }
        let world = Arc::clone(&self.world);
        let data = &self.pieces[piece];
        let (source_state, source_transform, source_layer) = (data.state, data.transform, data.layer);
        let target_state = if target_state.is_empty() {
            source_state
        } else {
            target_state
        };
        let target_data = world.state_data(target_state);
        let target_layer = target_data.layer;
        let current_cell = self.shape.try_to_cell_index(source_transform.position, source_layer);

        let Some(members) = self.membership.group(group) else {
            return true;
        };
        let found = members.shuffled_elements_find(rng, |member| {
            if target_layer.is_empty() {
                return true;
            }
            let position = self.get_piece_transform(member).position;
            let cell = self.shape.try_to_cell_index(position, target_layer);
            !cell.is_empty() && (self.cells[cell].is_empty() || cell == current_cell)
        });
        let Some(member) = found else {
            return false;
        };

        let mut target_transform = self.get_piece_transform(member);
        target_transform.orientation = pick_orientation(
            mode,
            source_transform.orientation,
            target_transform.orientation,
            rng,
        );
        let target_cell = self.shape.try_to_cell_index(target_transform.position, target_layer);
        if current_cell != target_cell {
            if current_cell.is_empty() {
                self.cells[target_cell] = piece;
            } else {
                self.cells[current_cell] = Piece::EMPTY;
                if target_cell.is_empty() {
                    self.render_cells[current_cell].handle = Sprite::EMPTY;
                } else {
                    self.cells[target_cell] = piece;
                    self.render_cells[current_cell] = self.render_cells[target_cell];
                }
            }
        }
        if !target_cell.is_empty() {
            self.render_cells[target_cell] = SpriteInstance::new(target_data.sprite, target_transform.orientation);
        }
        if !current_cell.is_empty() {
            self.trigger_on_leave(piece, source_transform.position);
        }

        if source_state != target_state {
            self.fire(source_state, CallbackEvent::Remove(piece));
            self.membership.change_membership(
                piece,
                &world.state_data(source_state).groups,
                &target_data.groups,
            );
            let frame = self.frame;
            let data = &mut self.pieces[piece];
            data.transform = target_transform;
            data.state = target_state;
            data.frame_created = frame;
            data.layer = target_layer;
            self.fire(target_state, CallbackEvent::Add(piece));
        } else {
            self.pieces[piece].transform = target_transform;
        }
        if !target_cell.is_empty() {
            self.trigger_on_enter(piece, target_transform.position);
        }
        trace!(piece = %piece, member = %member, "Teleported to group member");
        true
    }

    /// Takes every piece connected to `piece` off the occupancy grid.
    fn lift(&mut self, piece: Piece) {
        for handle in self.connected_pieces(piece) {
            let Some(data) = self.piece_data(handle) else {
                continue;
            };
            let (position, layer) = (data.transform.position, data.layer);
            self.trigger_on_leave(handle, position);
            let cell = self.shape.try_to_cell_index(position, layer);
            if !cell.is_empty() {
                self.cells[cell] = Piece::EMPTY;
                self.render_cells[cell].handle = Sprite::EMPTY;
            }
        }
    }

    /// Whether every connected piece can move by `offset`, and the piece in
    /// the way if one was found. `layer` overrides the layer of `piece` only.
    fn can_place(&self, piece: Piece, offset: Vector, layer: Layer) -> (bool, Piece) {
        for handle in self.connected_pieces(piece) {
            let Some(data) = self.piece_data(handle) else {
                continue;
            };
            let handle_layer = if handle == piece { layer } else { data.layer };
            let position = data.transform.position;
            if self.shape.try_to_cell_index(position, handle_layer).is_empty() {
                return (false, Piece::EMPTY);
            }
            let target = position + offset;
            if !self.shape.in_bounds(target) {
                return (false, Piece::EMPTY);
            }
            let occupant = self.cells[self.shape.to_cell_index(target, handle_layer)];
            if !occupant.is_empty() {
                return (false, occupant);
            }
        }
        (true, Piece::EMPTY)
    }

    fn place(&mut self, piece: Piece, offset: Vector, layer: Layer) {
        let world = Arc::clone(&self.world);
        for handle in self.connected_pieces(piece) {
            if !self.is_live(handle) {
                continue;
            }
            let shape = self.shape;
            let data = &mut self.pieces[handle];
            data.transform.position = shape.normalised(data.transform.position + offset);
            if handle == piece {
                data.layer = layer;
            }
            let (transform, handle_layer, state) = (data.transform, data.layer, data.state);
            let cell = shape.try_to_cell_index(transform.position, handle_layer);
            if !cell.is_empty() {
                self.cells[cell] = handle;
                self.render_cells[cell] = SpriteInstance::new(world.state_data(state).sprite, transform.orientation);
                self.trigger_on_enter(handle, transform.position);
            }
        }
    }
}
