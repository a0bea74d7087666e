//! Read-only spatial queries over the occupancy grid.

use lattice_core::algorithms::{
    ray_cast_line, visit_diamond, visit_disc, visit_rectangle, visit_rectangle_clamped,
};
use lattice_core::{Layer, Piece, Position, Topology, Vector};

use super::Grid;
use crate::grid_view::SpriteInstance;

/// A piece found by a query, or the cell where a ray cast stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FindPieceResult {
    pub position: Position,
    pub piece: Piece,
}

impl Grid {
    /// The piece on `layer` at `position`, or empty.
    pub fn piece_at(&self, layer: Layer, position: Position) -> Piece {
        let cell = self.shape.try_to_cell_index(position, layer);
        if cell.is_empty() {
            return Piece::EMPTY;
        }
        self.cells[cell]
    }

    /// One entry per layer for the cell at `position`. Empty when the
    /// position is off a bounded grid.
    pub fn all_piece_handles(&self, position: Position) -> &[Piece] {
        if !self.shape.in_bounds(position) {
            return &[];
        }
        let layer_count = self.shape.layer_count();
        let start = self.shape.to_cell_index(position, Layer::new(0)).index();
        &self.cells.values()[start..start + layer_count]
    }

    /// The render-layer sprites at `position`, after applying pending writes.
    pub fn all_sprite_instances(&mut self, position: Position) -> &[SpriteInstance] {
        self.repaint();
        if !self.shape.in_bounds(position) {
            return &[];
        }
        let count = self.world.num_render_layers().min(self.shape.layer_count());
        let start = self.shape.to_cell_index(position, Layer::new(0)).index();
        &self.render_cells.values()[start..start + count]
    }

    /// Walks from `start` along `direction` and reports the first piece on
    /// `layer`.
    ///
    /// `None` means the whole segment is clear. Otherwise the result holds
    /// the blocking piece, or an empty piece with the last in-bounds cell if
    /// the ray left the grid (`start` itself if it was never in bounds).
    pub fn ray_cast_direction(&self, layer: Layer, start: Position, direction: Vector) -> Option<FindPieceResult> {
        if self.shape.try_to_cell_index(start, layer).is_empty() {
            return Some(FindPieceResult {
                position: start,
                piece: Piece::EMPTY,
            });
        }
        let mut result = None;
        let mut previous = start;
        ray_cast_line(start, start + direction, |position| {
            if !self.shape.in_bounds(position) {
                result = Some(FindPieceResult {
                    position: previous,
                    piece: Piece::EMPTY,
                });
                return true;
            }
            previous = position;
            let piece = self.cells[self.shape.to_cell_index(position, layer)];
            if piece.is_empty() {
                return false;
            }
            result = Some(FindPieceResult { position, piece });
            true
        });
        result
    }

    /// Like [`Grid::ray_cast_direction`] toward `end`, taking the short way
    /// round on a torus.
    pub fn ray_cast(&self, layer: Layer, start: Position, end: Position) -> Option<FindPieceResult> {
        self.ray_cast_direction(layer, start, self.shape.smallest_vector(start, end))
    }

    fn find_piece(&self, layer: Layer, position: Position, result: &mut Vec<FindPieceResult>) {
        let cell = self.shape.try_to_cell_index(position, layer);
        if cell.is_empty() {
            return;
        }
        let piece = self.cells[cell];
        if !piece.is_empty() {
            result.push(FindPieceResult { position, piece });
        }
    }

    /// Pieces on `layer` within Euclidean `radius` of `center`. Positions
    /// are reported unwrapped on a torus.
    pub fn disc_find_all(&self, layer: Layer, center: Position, radius: i32) -> Vec<FindPieceResult> {
        let mut result = Vec::new();
        if layer.is_empty() {
            return result;
        }
        visit_disc(center, radius, |position| self.find_piece(layer, position, &mut result));
        result
    }

    /// Pieces on `layer` within Manhattan `radius` of `center`.
    pub fn diamond_find_all(&self, layer: Layer, center: Position, radius: i32) -> Vec<FindPieceResult> {
        let mut result = Vec::new();
        if layer.is_empty() {
            return result;
        }
        visit_diamond(center, radius, |position| self.find_piece(layer, position, &mut result));
        result
    }

    /// Pieces on `layer` inside the inclusive rectangle between the corners.
    pub fn rectangle_find_all(&self, layer: Layer, corner0: Position, corner1: Position) -> Vec<FindPieceResult> {
        let mut result = Vec::new();
        if layer.is_empty() {
            return result;
        }
        let visit = |position| self.find_piece(layer, position, &mut result);
        match self.shape.topology() {
            Topology::Bounded => visit_rectangle_clamped(corner0, corner1, self.shape.size(), visit),
            Topology::Torus => visit_rectangle(corner0, corner1, visit),
        }
        result
    }
}
