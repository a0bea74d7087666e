//! The simulation engine.
//!
//! A `Grid` owns every piece, the occupancy and render grids, group
//! membership and the deferred action queue. Mutations other than create and
//! release are queued and resolved by [`Grid::do_update`], one tick at a time.

mod actions;
mod callback;
mod connect;
mod contact;
mod lifecycle;
mod movement;
mod query;
mod render;

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use lattice_core::collections::{FixedHandleMap, ObjectPool, ShuffledMembership};
use lattice_core::{
    CellIndex, Error, Group, GridConfig, Layer, Piece, Position, Result, Size, State, Topology,
    Transform, Update,
};

use crate::grid_shape::GridShape;
use crate::grid_view::SpriteInstance;
use crate::world::World;
use tracing::trace;

pub use actions::{Action, Perspective, TeleportOrientation};
use callback::CallbackEvent;
pub use callback::{HitResponse, StateCallback};
pub use query::FindPieceResult;

#[derive(Default)]
struct PieceData {
    state: State,
    layer: Layer,
    transform: Transform,
    frame_created: i64,
    // Circular doubly linked list of rigidly connected pieces.
    connect_prev: Piece,
    connect_next: Piece,
    user_state: Option<Box<dyn Any>>,
}

/// Render-grid write recorded for later application or undo.
#[derive(Debug, Clone, Copy)]
struct SpriteAction {
    cell: CellIndex,
    instance: SpriteInstance,
}

#[derive(Debug, Clone, Copy, Default)]
struct UpdateInfo {
    group: Group,
    probability: f64,
    start_frame: i64,
}

pub struct Grid {
    world: Arc<World>,
    shape: GridShape,
    pieces: ObjectPool<Piece, PieceData>,
    cells: FixedHandleMap<CellIndex, Piece>,
    render_cells: FixedHandleMap<CellIndex, SpriteInstance>,
    membership: ShuffledMembership<Group, Piece>,
    callbacks: FixedHandleMap<State, Option<Box<dyn StateCallback>>>,
    update_infos: FixedHandleMap<Update, UpdateInfo>,
    action_queue: Vec<(Piece, Action)>,
    to_remove: Vec<Piece>,
    // Permanent sprite writes made outside a tick.
    set_sprite_queue: Vec<SpriteAction>,
    // One-shot overlays. Each entry holds the sprite to swap back in.
    temp_sprites: Vec<SpriteAction>,
    temp_sprites_immediate: Vec<SpriteAction>,
    frame: i64,
    in_update: bool,
    // States whose callback is currently on the call stack, innermost last.
    running_callbacks: Vec<State>,
    pending_events: VecDeque<(State, CallbackEvent)>,
}

impl Grid {
    pub fn new(world: Arc<World>, size: Size, topology: Topology) -> Result<Self> {
        if size.width <= 0 || size.height <= 0 {
            return Err(Error::Validation(format!(
                "grid size must be positive, got {}x{}",
                size.width, size.height
            )));
        }
        let shape = GridShape::new(size, world.layers().len(), topology);
        Ok(Self {
            shape,
            pieces: ObjectPool::new(),
            cells: FixedHandleMap::filled(shape.cell_count(), Piece::EMPTY),
            render_cells: FixedHandleMap::filled(shape.cell_count(), SpriteInstance::default()),
            membership: ShuffledMembership::new(world.groups().len()),
            callbacks: FixedHandleMap::with_len(world.states().len()),
            update_infos: FixedHandleMap::with_len(world.updates().len()),
            action_queue: Vec::new(),
            to_remove: Vec::new(),
            set_sprite_queue: Vec::new(),
            temp_sprites: Vec::new(),
            temp_sprites_immediate: Vec::new(),
            frame: 0,
            in_update: false,
            running_callbacks: Vec::new(),
            pending_events: VecDeque::new(),
            world,
        })
    }

    pub fn from_config(world: Arc<World>, config: &GridConfig) -> Result<Self> {
        config.validate()?;
        Self::new(world, Size::new(config.width, config.height), config.topology)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn shape(&self) -> &GridShape {
        &self.shape
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> i64 {
        self.frame
    }

    /// Number of live pieces.
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// Installs the event hooks for `state`, replacing any previous ones.
    pub fn set_callback(&mut self, state: State, callback: Box<dyn StateCallback>) {
        if let Some(slot) = self.callbacks.get_mut(state) {
            *slot = Some(callback);
        }
    }

    /// Binds `update` to run `on_update` for members of `group`, each sampled
    /// with `probability`, once they have existed in their state for
    /// `start_frame` ticks. An empty group disables the update.
    pub fn set_update_info(&mut self, update: Update, group: Group, probability: f64, start_frame: i64) {
        if let Some(info) = self.update_infos.get_mut(update) {
            *info = UpdateInfo {
                group,
                probability,
                start_frame,
            };
        }
    }

    fn piece_data(&self, piece: Piece) -> Option<&PieceData> {
        self.pieces.get(piece).filter(|data| !data.state.is_empty())
    }

    pub(crate) fn is_live(&self, piece: Piece) -> bool {
        self.piece_data(piece).is_some()
    }

    /// `{(-1, -1), North}` for the empty piece.
    pub fn get_piece_transform(&self, piece: Piece) -> Transform {
        self.piece_data(piece)
            .map_or(Transform::new(Position::new(-1, -1), Default::default()), |d| d.transform)
    }

    pub fn get_state(&self, piece: Piece) -> State {
        self.piece_data(piece).map_or(State::EMPTY, |d| d.state)
    }

    pub fn get_layer(&self, piece: Piece) -> Layer {
        self.piece_data(piece).map_or(Layer::EMPTY, |d| d.layer)
    }

    /// Ticks since the piece entered its current state, or -1.
    pub fn get_piece_frames(&self, piece: Piece) -> i64 {
        self.piece_data(piece)
            .map_or(-1, |d| self.frame - d.frame_created)
    }

    /// The piece's user payload, if it holds a `T`.
    pub fn get_user_state<T: Any>(&self, piece: Piece) -> Option<&T> {
        self.piece_data(piece)
            .and_then(|d| d.user_state.as_ref())
            .and_then(|s| s.downcast_ref::<T>())
    }

    pub fn get_user_state_mut<T: Any>(&mut self, piece: Piece) -> Option<&mut T> {
        if !self.is_live(piece) {
            return None;
        }
        self.pieces[piece]
            .user_state
            .as_mut()
            .and_then(|s| s.downcast_mut::<T>())
    }

    pub fn set_user_state(&mut self, piece: Piece, user_state: Option<Box<dyn Any>>) {
        if self.is_live(piece) {
            self.pieces[piece].user_state = user_state;
        }
    }

    pub fn piece_count_by_group(&self, group: Group) -> usize {
        self.membership.group(group).map_or(0, |set| set.len())
    }

    pub fn pieces_by_group_shuffled<R: rand::Rng + ?Sized>(
        &self,
        group: Group,
        rng: &mut R,
    ) -> Vec<Piece> {
        self.membership
            .group(group)
            .map(|set| set.shuffled_elements(rng))
            .unwrap_or_default()
    }

    pub fn pieces_by_group_shuffled_with_probability<R: rand::Rng + ?Sized>(
        &self,
        group: Group,
        probability: f64,
        rng: &mut R,
    ) -> Vec<Piece> {
        self.membership
            .group(group)
            .map(|set| set.shuffled_elements_with_probability(rng, probability))
            .unwrap_or_default()
    }

    pub fn pieces_by_group_shuffled_with_max_count<R: rand::Rng + ?Sized>(
        &self,
        group: Group,
        max_count: usize,
        rng: &mut R,
    ) -> Vec<Piece> {
        self.membership
            .group(group)
            .map(|set| set.shuffled_elements_with_max_count(rng, max_count))
            .unwrap_or_default()
    }

    /// Empty piece when the group has no members.
    pub fn random_piece_by_group<R: rand::Rng + ?Sized>(&self, group: Group, rng: &mut R) -> Piece {
        self.membership
            .group(group)
            .and_then(|set| set.random_element(rng))
            .unwrap_or(Piece::EMPTY)
    }

    /// Runs `f` with the callback installed for `state`, lending it the grid.
    ///
    /// The callback is taken out of its slot for the duration of the call and
    /// put back afterwards unless `f` installed a replacement. Events queued
    /// for it meanwhile are delivered once it is back.
    fn with_callback<R>(
        &mut self,
        state: State,
        f: impl FnOnce(&mut dyn StateCallback, &mut Grid) -> R,
    ) -> Option<R> {
        let mut callback = self.callbacks.get_mut(state)?.take()?;
        self.running_callbacks.push(state);
        let result = f(callback.as_mut(), self);
        self.running_callbacks.pop();
        if let Some(slot) = self.callbacks.get_mut(state) {
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
        self.deliver_pending_events();
        Some(result)
    }

    /// Delivers `event` to the callback of `state`, or queues it while that
    /// callback is running.
    fn fire(&mut self, state: State, event: CallbackEvent) {
        if self.running_callbacks.contains(&state) {
            trace!(state = %state, ?event, "Callback busy, event queued");
            self.pending_events.push_back((state, event));
            return;
        }
        self.with_callback(state, |callback, grid| event.deliver(callback, grid));
    }

    fn deliver_pending_events(&mut self) {
        while let Some(index) = self
            .pending_events
            .iter()
            .position(|(state, _)| !self.running_callbacks.contains(state))
        {
            if let Some((state, event)) = self.pending_events.remove(index) {
                self.fire(state, event);
            }
        }
    }
}
