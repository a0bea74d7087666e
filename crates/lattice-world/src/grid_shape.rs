//! Grid geometry: bounds, wrapping and (position, layer) cell encoding.

use lattice_core::{CellIndex, Layer, Position, Size, Topology, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    size: Size,
    layer_count: i32,
    topology: Topology,
}

impl GridShape {
    pub fn new(size: Size, layer_count: usize, topology: Topology) -> Self {
        Self {
            size,
            layer_count: layer_count as i32,
            topology,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn layer_count(&self) -> usize {
        self.layer_count as usize
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Total number of cells over all layers.
    pub fn cell_count(&self) -> usize {
        (self.size.area() * self.layer_count) as usize
    }

    /// Always true on a torus.
    pub fn in_bounds(&self, pos: Position) -> bool {
        match self.topology {
            Topology::Bounded => self.size.contains(pos),
            Topology::Torus => true,
        }
    }

    /// Wraps `pos` into range on a torus; bounded positions are unchanged.
    pub fn normalised(&self, pos: Position) -> Position {
        match self.topology {
            Topology::Bounded => pos,
            Topology::Torus => pos.wrap(self.size.width, self.size.height),
        }
    }

    pub fn modulo_width(&self, x: i32) -> i32 {
        x.rem_euclid(self.size.width)
    }

    pub fn modulo_height(&self, y: i32) -> i32 {
        y.rem_euclid(self.size.height)
    }

    /// Shortest displacement from `start` to `end`. On a torus each axis
    /// picks the shorter way round, preferring the negative direction on a
    /// tie.
    pub fn smallest_vector(&self, start: Position, end: Position) -> Vector {
        let diff = end - start;
        match self.topology {
            Topology::Bounded => diff,
            Topology::Torus => {
                let half_width = self.size.width / 2;
                let half_height = self.size.height / 2;
                Vector::new(
                    self.modulo_width(diff.x + half_width) - half_width,
                    self.modulo_height(diff.y + half_height) - half_height,
                )
            }
        }
    }

    /// Encodes `(y * width + x) * layer_count + layer`. The position must be
    /// in bounds (it is wrapped first on a torus) and the layer non-empty.
    pub fn to_cell_index(&self, pos: Position, layer: Layer) -> CellIndex {
        let pos = self.normalised(pos);
        CellIndex::new((pos.y * self.size.width + pos.x) * self.layer_count + layer.value())
    }

    /// Like [`Self::to_cell_index`] but returns the empty cell for an out of
    /// bounds position or an invalid layer.
    pub fn try_to_cell_index(&self, pos: Position, layer: Layer) -> CellIndex {
        if layer.is_empty() || layer.value() >= self.layer_count || !self.in_bounds(pos) {
            return CellIndex::EMPTY;
        }
        self.to_cell_index(pos, layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn shape(topology: Topology) -> GridShape {
        GridShape::new(Size::new(5, 3), 2, topology)
    }

    #[test]
    fn test_cell_index_layout() {
        let shape = shape(Topology::Bounded);
        assert_eq!(shape.to_cell_index(Position::new(0, 0), Layer::new(0)), CellIndex::new(0));
        assert_eq!(shape.to_cell_index(Position::new(1, 0), Layer::new(0)), CellIndex::new(2));
        assert_eq!(shape.to_cell_index(Position::new(4, 2), Layer::new(1)), CellIndex::new(29));
        assert_eq!(shape.cell_count(), 30);
    }

    #[test]
    fn test_in_bounds() {
        assert!(!shape(Topology::Bounded).in_bounds(Position::new(-1, 0)));
        assert!(shape(Topology::Torus).in_bounds(Position::new(-1, 0)));
    }

    #[test]
    fn test_try_to_cell_index() {
        let bounded = shape(Topology::Bounded);
        assert!(bounded.try_to_cell_index(Position::new(5, 0), Layer::new(0)).is_empty());
        assert!(bounded.try_to_cell_index(Position::new(0, 0), Layer::new(2)).is_empty());
        assert!(bounded.try_to_cell_index(Position::new(0, 0), Layer::EMPTY).is_empty());

        let torus = shape(Topology::Torus);
        assert_eq!(
            torus.try_to_cell_index(Position::new(5, 0), Layer::new(0)),
            CellIndex::new(0)
        );
        assert_eq!(
            torus.try_to_cell_index(Position::new(-1, -1), Layer::new(1)),
            CellIndex::new(29)
        );
    }

    #[test]
    fn test_smallest_vector() {
        let torus = shape(Topology::Torus);
        assert_eq!(
            torus.smallest_vector(Position::new(0, 0), Position::new(3, 0)),
            Vector::new(-2, 0)
        );
        assert_eq!(
            torus.smallest_vector(Position::new(0, 0), Position::new(2, 0)),
            Vector::new(2, 0)
        );
        let bounded = shape(Topology::Bounded);
        assert_eq!(
            bounded.smallest_vector(Position::new(0, 0), Position::new(3, 0)),
            Vector::new(3, 0)
        );
    }

    #[test]
    fn test_smallest_vector_tie_prefers_negative() {
        let torus = GridShape::new(Size::new(4, 4), 1, Topology::Torus);
        assert_eq!(
            torus.smallest_vector(Position::new(0, 0), Position::new(2, 2)),
            Vector::new(-2, -2)
        );
    }

    proptest! {
        #[test]
        fn prop_cell_index_is_unique(
            x in 0i32..5, y in 0i32..3, layer in 0i32..2,
        ) {
            let shape = shape(Topology::Bounded);
            let index = shape.to_cell_index(Position::new(x, y), Layer::new(layer)).value();
            prop_assert!(index >= 0 && (index as usize) < shape.cell_count());
            prop_assert_eq!(index % 2, layer);
            prop_assert_eq!(index / 2, y * 5 + x);
        }

        #[test]
        fn prop_torus_smallest_vector_bounded(
            x0 in -20i32..20, y0 in -20i32..20, x1 in -20i32..20, y1 in -20i32..20,
        ) {
            let torus = GridShape::new(Size::new(7, 6), 1, Topology::Torus);
            let start = Position::new(x0, y0);
            let end = Position::new(x1, y1);
            let v = torus.smallest_vector(start, end);
            prop_assert!(-3 <= v.x && v.x <= 3);
            prop_assert!(-3 <= v.y && v.y < 3);
            prop_assert_eq!(torus.normalised(start + v), torus.normalised(end));
        }
    }
}
