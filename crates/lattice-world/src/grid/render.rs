//! Viewer-relative rendering into sprite-id buffers, and a text dump.

use lattice_core::{Error, Orientation, Position, Result, Topology, Transform};
use tracing::trace;

use super::Grid;
use crate::grid_view::{GridView, SpriteInstance};

/// Inclusive grid rectangle covered by a view and the affine map from grid
/// coordinates to output cells:
/// `cell = (y - offset_y) * span_y + (x - offset_x) * span_x`.
struct GridToView {
    first_x: i32,
    last_x: i32,
    first_y: i32,
    last_y: i32,
    span_x: i32,
    span_y: i32,
    offset_x: i32,
    offset_y: i32,
}

impl GridToView {
    fn new(transform: Transform, view: &GridView) -> Self {
        let window = view.grid_window();
        let width = window.width();
        let Position { x, y } = transform.position;
        match transform.orientation {
            Orientation::North => {
                let (first_x, first_y) = (x - window.left(), y - window.forward());
                Self {
                    first_x,
                    last_x: x + window.right(),
                    first_y,
                    last_y: y + window.backward(),
                    span_x: 1,
                    span_y: width,
                    offset_x: first_x,
                    offset_y: first_y,
                }
            }
            Orientation::East => {
                let (last_x, first_y) = (x + window.forward(), y - window.left());
                Self {
                    first_x: x - window.backward(),
                    last_x,
                    first_y,
                    last_y: y + window.right(),
                    span_x: -width,
                    span_y: 1,
                    offset_x: last_x,
                    offset_y: first_y,
                }
            }
            Orientation::South => {
                let (last_x, last_y) = (x + window.left(), y + window.forward());
                Self {
                    first_x: x - window.right(),
                    last_x,
                    first_y: y - window.backward(),
                    last_y,
                    span_x: -1,
                    span_y: -width,
                    offset_x: last_x,
                    offset_y: last_y,
                }
            }
            Orientation::West => {
                let (first_x, last_y) = (x - window.forward(), y + window.left());
                Self {
                    first_x,
                    last_x: x + window.backward(),
                    first_y: y - window.right(),
                    last_y,
                    span_x: width,
                    span_y: -1,
                    offset_x: first_x,
                    offset_y: last_y,
                }
            }
        }
    }

    fn view_index(&self, x: i32, y: i32, num_render_layers: usize) -> usize {
        let cell = (y - self.offset_y) * self.span_y + (x - self.offset_x) * self.span_x;
        cell as usize * num_render_layers
    }
}

impl Grid {
    /// Fills `sprite_ids` with what a viewer at `transform` sees through
    /// `view`, rotated so the viewer faces up. Each output cell holds
    /// `view.num_render_layers()` ids.
    ///
    /// On a bounded grid, cells outside the grid hold the view's
    /// out-of-bounds sprite; on a torus the view wraps.
    pub fn render(&mut self, transform: Transform, view: &GridView, sprite_ids: &mut [i32]) -> Result<()> {
        if sprite_ids.is_empty() {
            return Ok(());
        }
        if sprite_ids.len() != view.num_cells() {
            return Err(Error::Validation(format!(
                "sprite buffer holds {} ids, view needs {}",
                sprite_ids.len(),
                view.num_cells()
            )));
        }
        if view.num_render_layers() > self.shape.layer_count() {
            return Err(Error::Validation(format!(
                "view renders {} layers, grid has {}",
                view.num_render_layers(),
                self.shape.layer_count()
            )));
        }
        self.repaint();
        trace!(
            x = transform.position.x,
            y = transform.position.y,
            orientation = %transform.orientation,
            "Rendering view"
        );

        let to_view = GridToView::new(transform, view);
        let size = self.shape.size();
        let (first_x, last_x, first_y, last_y) = match self.shape.topology() {
            Topology::Torus => (to_view.first_x, to_view.last_x, to_view.first_y, to_view.last_y),
            Topology::Bounded => {
                let clamped = (
                    to_view.first_x.max(0),
                    to_view.last_x.min(size.width - 1),
                    to_view.first_y.max(0),
                    to_view.last_y.min(size.height - 1),
                );
                if clamped != (to_view.first_x, to_view.last_x, to_view.first_y, to_view.last_y) {
                    let clear = SpriteInstance::new(view.out_of_bounds_sprite(), transform.orientation);
                    sprite_ids.fill(view.to_sprite_id(clear));
                }
                clamped
            }
        };

        let num_render_layers = view.num_render_layers();
        let layer_count = self.shape.layer_count();
        let render = self.render_cells.values();
        for y in first_y..=last_y {
            let grid_y = self.shape.modulo_height(y) * size.width;
            for x in first_x..=last_x {
                let view_pos = to_view.view_index(x, y, num_render_layers);
                let grid_pos = (grid_y + self.shape.modulo_width(x)) as usize * layer_count;
                for i in 0..num_render_layers {
                    let mut instance = render[grid_pos + i];
                    instance.orientation = Orientation::from_view(transform.orientation, instance.orientation);
                    sprite_ids[view_pos + i] = view.to_sprite_id(instance);
                }
            }
        }
        Ok(())
    }

    /// One character per cell, one line per row: the first letter of the
    /// sprite on the last render layer that has one, or a space.
    pub fn to_string(&mut self) -> String {
        self.repaint();
        let size = self.shape.size();
        let render_layers = self.world.num_render_layers().min(self.shape.layer_count());
        let layer_count = self.shape.layer_count();
        let mut text = String::with_capacity(((size.width + 1) * size.height) as usize);
        for y in 0..size.height {
            for x in 0..size.width {
                let start = (y * size.width + x) as usize * layer_count;
                let letter = self.render_cells.values()[start..start + render_layers]
                    .iter()
                    .rev()
                    .filter(|sprite| !sprite.handle.is_empty())
                    .find_map(|sprite| self.world.sprites().to_name(sprite.handle)?.chars().next())
                    .unwrap_or(' ');
                text.push(letter);
            }
            text.push('\n');
        }
        text
    }
}
