//! Per-state event hooks.

use lattice_core::{Contact, Hit, Piece, Update};

use super::Grid;

/// Whether a hit beam continues past a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HitResponse {
    #[default]
    Continue,
    Blocked,
}

/// Events delivered to the pieces of one state.
///
/// Every method receives the grid and may call any public grid operation.
/// Events raised for a state whose callback is already running are queued
/// and delivered, in order, as soon as that call returns. A nested `on_hit`
/// cannot wait for its answer and is treated as `Continue`.
pub trait StateCallback {
    /// A piece entered this state, either by creation or state change.
    fn on_add(&mut self, _grid: &mut Grid, _piece: Piece) {}

    /// A piece is leaving this state, either by release or state change.
    fn on_remove(&mut self, _grid: &mut Grid, _piece: Piece) {}

    /// Called by an update pass bound with `Grid::set_update_info`.
    /// `num_frames` is the number of frames the piece has been in this state.
    fn on_update(&mut self, _grid: &mut Grid, _update: Update, _piece: Piece, _num_frames: i64) {}

    /// A push or teleport of `piece` was cancelled. `blocker` is empty when
    /// the edge of the grid was in the way.
    fn on_blocked(&mut self, _grid: &mut Grid, _piece: Piece, _blocker: Piece) {}

    /// `instigator`, carrying `contact`, now shares a cell with `piece`.
    fn on_enter(&mut self, _grid: &mut Grid, _contact: Contact, _piece: Piece, _instigator: Piece) {}

    fn on_leave(&mut self, _grid: &mut Grid, _contact: Contact, _piece: Piece, _instigator: Piece) {}

    fn on_hit(&mut self, _grid: &mut Grid, _hit: Hit, _piece: Piece, _instigator: Piece) -> HitResponse {
        HitResponse::Continue
    }
}

/// An event held back until its state's callback is free again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallbackEvent {
    Add(Piece),
    Remove(Piece),
    Update(Update, Piece, i64),
    Blocked(Piece, Piece),
    Enter(Contact, Piece, Piece),
    Leave(Contact, Piece, Piece),
}

impl CallbackEvent {
    pub(crate) fn deliver(self, callback: &mut dyn StateCallback, grid: &mut Grid) {
        match self {
            CallbackEvent::Add(piece) => callback.on_add(grid, piece),
            CallbackEvent::Remove(piece) => callback.on_remove(grid, piece),
            CallbackEvent::Update(update, piece, num_frames) => callback.on_update(grid, update, piece, num_frames),
            CallbackEvent::Blocked(piece, blocker) => callback.on_blocked(grid, piece, blocker),
            CallbackEvent::Enter(contact, piece, instigator) => callback.on_enter(grid, contact, piece, instigator),
            CallbackEvent::Leave(contact, piece, instigator) => callback.on_leave(grid, contact, piece, instigator),
        }
    }
}
