//! Piece creation and release, and render-grid bookkeeping.

use std::sync::Arc;

use lattice_core::collections::FixedHandleMap;
use lattice_core::{CellIndex, Layer, Orientation, Piece, Sprite, State, Transform};
use tracing::trace;

use super::{Action, CallbackEvent, Grid, PieceData, SpriteAction};
use crate::grid_view::SpriteInstance;

/// Swaps every recorded sprite with the one currently painted, last first.
pub(super) fn swap_back(render: &mut FixedHandleMap<CellIndex, SpriteInstance>, actions: &mut [SpriteAction]) {
    for action in actions.iter_mut().rev() {
        std::mem::swap(&mut render[action.cell], &mut action.instance);
    }
}

/// Swaps every recorded sprite with the one currently painted, first first.
pub(super) fn swap_forward(render: &mut FixedHandleMap<CellIndex, SpriteInstance>, actions: &mut [SpriteAction]) {
    for action in actions.iter_mut() {
        std::mem::swap(&mut render[action.cell], &mut action.instance);
    }
}

impl Grid {
    /// Creates a piece in `state` at `transform`.
    ///
    /// Returns the empty piece, without side effects, for the empty state or
    /// when the target cell is already occupied.
    pub fn create_instance(&mut self, state: State, mut transform: Transform) -> Piece {
        if state.is_empty() || state.index() >= self.world.states().len() {
            return Piece::EMPTY;
        }
        let world = Arc::clone(&self.world);
        let state_data = world.state_data(state);
        transform.position = self.shape.normalised(transform.position);
        let cell = self.shape.try_to_cell_index(transform.position, state_data.layer);
        if !cell.is_empty() && !self.cells[cell].is_empty() {
            return Piece::EMPTY;
        }

        let piece = self.pieces.create(PieceData {
            state,
            layer: state_data.layer,
            transform,
            frame_created: self.frame,
            ..Default::default()
        });
        self.membership.change_membership(piece, &[], &state_data.groups);
        if !cell.is_empty() {
            self.cells[cell] = piece;
            self.set_sprite(cell, SpriteInstance::new(state_data.sprite, transform.orientation));
        }
        self.fire(state, CallbackEvent::Add(piece));
        if !cell.is_empty() {
            self.trigger_on_enter(piece, transform.position);
        }
        piece
    }

    /// Destroys `piece`. During a tick the release is deferred to the end of
    /// the current action pass.
    pub fn release_instance(&mut self, piece: Piece) {
        if !self.is_live(piece) {
            return;
        }
        if self.in_update {
            self.to_remove.push(piece);
        } else {
            self.release_actual(piece);
        }
    }

    pub(super) fn release_actual(&mut self, piece: Piece) {
        if !self.is_live(piece) {
            return;
        }
        self.action_queue.retain(|(owner, action)| {
            *owner != piece && !matches!(action, Action::Connect(other) if *other == piece)
        });

        let position = self.pieces[piece].transform.position;
        self.trigger_on_leave(piece, position);
        let state = self.get_state(piece);
        self.fire(state, CallbackEvent::Remove(piece));

        // The hooks may have released or re-stated the piece.
        let Some(data) = self.piece_data(piece) else {
            return;
        };
        let (state, position, layer) = (data.state, data.transform.position, data.layer);
        let world = Arc::clone(&self.world);
        self.membership
            .change_membership(piece, &world.state_data(state).groups, &[]);
        let cell = self.shape.try_to_cell_index(position, layer);
        if !cell.is_empty() {
            self.cells[cell] = Piece::EMPTY;
            self.set_sprite(cell, SpriteInstance::new(Sprite::EMPTY, Orientation::North));
        }
        self.disconnect_actual(piece);
        self.pieces.release(piece);
        trace!(piece = %piece, frame = self.frame, "Piece released");
    }

    /// Releases everything deferred during the current pass, including
    /// pieces released by the remove hooks themselves.
    pub(super) fn release_deferred(&mut self) {
        while !self.to_remove.is_empty() {
            for piece in std::mem::take(&mut self.to_remove) {
                self.release_actual(piece);
            }
        }
    }

    /// Permanent render write. Outside a tick the write is queued until the
    /// next tick or render.
    pub(super) fn set_sprite(&mut self, cell: CellIndex, instance: SpriteInstance) {
        if self.in_update {
            self.render_cells[cell] = instance;
        } else {
            self.set_sprite_queue.push(SpriteAction { cell, instance });
        }
    }

    fn set_sprite_until_next_update(&mut self, cell: CellIndex, instance: SpriteInstance) {
        if self.in_update {
            // Painted when the tick finishes.
            self.temp_sprites_immediate.push(SpriteAction { cell, instance });
        } else {
            self.temp_sprites_immediate.push(SpriteAction {
                cell,
                instance: self.render_cells[cell],
            });
            self.render_cells[cell] = instance;
        }
    }

    /// Paints `sprite` at the transform's cell on `layer` until the next
    /// call to [`Grid::do_update`].
    pub fn set_sprite_immediate(&mut self, transform: Transform, layer: Layer, sprite: Sprite) {
        let cell = self.shape.try_to_cell_index(transform.position, layer);
        if !cell.is_empty() {
            self.set_sprite_until_next_update(cell, SpriteInstance::new(sprite, transform.orientation));
        }
    }

    /// Applies queued permanent writes underneath any live overlays.
    pub(super) fn repaint(&mut self) {
        if self.set_sprite_queue.is_empty() {
            return;
        }
        swap_back(&mut self.render_cells, &mut self.temp_sprites_immediate);
        swap_back(&mut self.render_cells, &mut self.temp_sprites);
        for action in self.set_sprite_queue.drain(..) {
            self.render_cells[action.cell] = action.instance;
        }
        swap_forward(&mut self.render_cells, &mut self.temp_sprites);
        swap_forward(&mut self.render_cells, &mut self.temp_sprites_immediate);
    }
}
