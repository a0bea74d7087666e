//! Contact events between co-located pieces and hit beams.

use std::sync::Arc;

use lattice_core::{Hit, Orientation, Piece, Position, Transform, Vector};

use super::{CallbackEvent, Grid, HitResponse, SpriteAction};
use crate::grid_view::SpriteInstance;
use crate::world::HitData;

#[derive(Clone, Copy)]
enum ContactEvent {
    Enter,
    Leave,
}

impl Grid {
    pub(super) fn trigger_on_enter(&mut self, piece: Piece, position: Position) {
        self.trigger_contact(ContactEvent::Enter, piece, position);
    }

    pub(super) fn trigger_on_leave(&mut self, piece: Piece, position: Position) {
        self.trigger_contact(ContactEvent::Leave, piece, position);
    }

    /// Notifies `piece` and every other piece sharing its cell. Each side is
    /// told about the other's contact when it has one.
    fn trigger_contact(&mut self, event: ContactEvent, piece: Piece, position: Position) {
        if !self.shape.in_bounds(position) {
            return;
        }
        let world = Arc::clone(&self.world);
        let occupants = self.all_piece_handles(position).to_vec();
        for target in occupants {
            if target.is_empty() || target == piece {
                continue;
            }
            // Earlier callbacks may have changed either piece.
            let (source_state, target_state) = (self.get_state(piece), self.get_state(target));
            if source_state.is_empty() || target_state.is_empty() {
                continue;
            }
            let source_contact = world.state_data(source_state).contact;
            let target_contact = world.state_data(target_state).contact;
            if !source_contact.is_empty() {
                let delivered = match event {
                    ContactEvent::Enter => CallbackEvent::Enter(source_contact, target, piece),
                    ContactEvent::Leave => CallbackEvent::Leave(source_contact, target, piece),
                };
                self.fire(target_state, delivered);
            }
            if !target_contact.is_empty() {
                let delivered = match event {
                    ContactEvent::Enter => CallbackEvent::Enter(target_contact, piece, target),
                    ContactEvent::Leave => CallbackEvent::Leave(target_contact, piece, target),
                };
                self.fire(source_state, delivered);
            }
        }
    }

    fn do_hit(&mut self, instigator: Piece, hit: Hit, transform: Transform, hit_data: HitData) -> HitResponse {
        if !self.shape.in_bounds(transform.position) {
            return HitResponse::Blocked;
        }
        let mut blocked = false;
        for target in self.all_piece_handles(transform.position).to_vec() {
            let state = self.get_state(target);
            if state.is_empty() {
                continue;
            }
            let response = self.with_callback(state, |callback, grid| callback.on_hit(grid, hit, target, instigator));
            blocked |= response == Some(HitResponse::Blocked);
        }
        if blocked {
            return HitResponse::Blocked;
        }
        if !hit_data.layer.is_empty() && !hit_data.sprite.is_empty() {
            let cell = self.shape.to_cell_index(transform.position, hit_data.layer);
            self.temp_sprites.push(SpriteAction {
                cell,
                instance: SpriteInstance::new(hit_data.sprite, transform.orientation),
            });
        }
        HitResponse::Continue
    }

    /// Walks `length` cells from `transform` along its facing. Only a block
    /// on the first cell is reported; later blocks just end the segment.
    fn check_hit_line(
        &mut self,
        instigator: Piece,
        hit: Hit,
        hit_data: HitData,
        mut transform: Transform,
        length: i32,
    ) -> HitResponse {
        let step = Vector::from_orientation(transform.orientation);
        for i in 0..length {
            if self.do_hit(instigator, hit, transform, hit_data) == HitResponse::Blocked {
                return if i == 0 {
                    HitResponse::Blocked
                } else {
                    HitResponse::Continue
                };
            }
            transform.position += step;
        }
        HitResponse::Continue
    }

    /// Fires a beam `length` cells ahead of `instigator`, widened by `radius`
    /// cells to each side. Side rays shorten by one per step outward and
    /// stop spreading when their first cell is blocked.
    pub(super) fn hit_beam_actual(&mut self, instigator: Piece, hit: Hit, length: i32, radius: i32) {
        let data = &self.pieces[instigator];
        let mut start = data.transform;
        if self.shape.try_to_cell_index(start.position, data.layer).is_empty() {
            return;
        }
        let hit_data = self.world.hit_data(hit);
        let north_to_forward = start.orientation - Orientation::North;
        let forward = Vector::NORTH * north_to_forward;

        for side in [Vector::WEST, Vector::EAST] {
            let sideways = side * north_to_forward;
            for r in 1..=radius {
                let mut transform = start;
                transform.position += r * sideways;
                if self.check_hit_line(instigator, hit, hit_data, transform, length - r + 1) == HitResponse::Blocked {
                    break;
                }
            }
        }
        start.position += forward;
        self.check_hit_line(instigator, hit, hit_data, start, length);
    }
}
