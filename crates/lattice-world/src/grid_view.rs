//! Sprite-id encoding for rendered observations.

use lattice_core::collections::FixedHandleMap;
use lattice_core::{Error, Orientation, Result, Sprite};
use serde::Serialize;

use crate::grid_window::GridWindow;
use crate::world::World;

/// A sprite painted in one render cell, with the facing it is drawn at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpriteInstance {
    pub handle: Sprite,
    pub orientation: Orientation,
}

impl SpriteInstance {
    pub fn new(handle: Sprite, orientation: Orientation) -> Self {
        Self {
            handle,
            orientation,
        }
    }
}

/// Describes how a grid is rendered for one viewer: the window, how world
/// sprites map to output sprites and the sentinel sprites.
///
/// Output ids are `0` for nothing, otherwise `mapped * 4 + 1 + orientation`.
#[derive(Debug, Clone)]
pub struct GridView {
    window: GridWindow,
    num_render_layers: usize,
    sprite_map: FixedHandleMap<Sprite, Sprite>,
    out_of_bounds_sprite: Sprite,
    out_of_view_sprite: Sprite,
}

impl GridView {
    pub fn new(
        window: GridWindow,
        num_render_layers: usize,
        sprite_map: FixedHandleMap<Sprite, Sprite>,
        out_of_bounds_sprite: Sprite,
        out_of_view_sprite: Sprite,
    ) -> Self {
        Self {
            window,
            num_render_layers,
            sprite_map,
            out_of_bounds_sprite,
            out_of_view_sprite,
        }
    }

    /// View that renders every world sprite as itself.
    pub fn from_world(world: &World, window: GridWindow) -> Self {
        let sprite_map = world.sprites().iter().map(|(sprite, _)| sprite).collect();
        Self::new(
            window,
            world.num_render_layers(),
            sprite_map,
            world.out_of_bounds_sprite(),
            world.out_of_view_sprite(),
        )
    }

    pub fn grid_window(&self) -> &GridWindow {
        &self.window
    }

    pub fn num_render_layers(&self) -> usize {
        self.num_render_layers
    }

    /// Length of the buffer `Grid::render` fills.
    pub fn num_cells(&self) -> usize {
        self.num_render_layers * self.window.size2d().area() as usize
    }

    pub fn out_of_bounds_sprite(&self) -> Sprite {
        self.out_of_bounds_sprite
    }

    pub fn out_of_view_sprite(&self) -> Sprite {
        self.out_of_view_sprite
    }

    pub fn to_sprite_id(&self, sprite: SpriteInstance) -> i32 {
        match self.sprite_map.get(sprite.handle).and_then(|s| s.get()) {
            Some(mapped) => mapped.value() * 4 + 1 + sprite.orientation.index() as i32,
            None => 0,
        }
    }

    pub fn num_sprite_ids(&self) -> usize {
        self.sprite_map.len() * 4 + 1
    }

    fn check_len(&self, sprite_ids: &[i32]) -> Result<()> {
        if sprite_ids.len() != self.num_cells() {
            return Err(Error::Validation(format!(
                "sprite buffer holds {} ids, view needs {}",
                sprite_ids.len(),
                self.num_cells()
            )));
        }
        Ok(())
    }

    /// Paints the band between the square window and the configured extents
    /// with the out-of-view sprite. Only centered windows have such a band.
    pub fn clear_out_of_view_sprites(
        &self,
        orientation: Orientation,
        sprite_ids: &mut [i32],
    ) -> Result<()> {
        self.check_len(sprite_ids)?;
        if !self.window.centered() {
            return Ok(());
        }

        let w = &self.window;
        let left_pad = w.left() - w.left_actual();
        let right_pad = w.right() - w.right_actual();
        let forward_pad = w.forward() - w.forward_actual();
        let backward_pad = w.backward() - w.backward_actual();

        // Padding on the output's (top, bottom, left, right) edges.
        let (top, bottom, left, right) = match orientation {
            Orientation::North => (forward_pad, backward_pad, left_pad, right_pad),
            Orientation::East => (left_pad, right_pad, backward_pad, forward_pad),
            Orientation::South => (backward_pad, forward_pad, right_pad, left_pad),
            Orientation::West => (right_pad, left_pad, forward_pad, backward_pad),
        };

        let id = self.to_sprite_id(SpriteInstance::new(self.out_of_view_sprite, orientation));
        let per_cell = self.num_render_layers;
        let per_row = w.width() as usize * per_cell;
        let height = w.height() as usize;
        let width = w.width() as usize;
        let (top, bottom) = (top as usize, height - bottom as usize);
        let (left, right) = (left as usize, width - right as usize);

        for (row, cells) in sprite_ids.chunks_mut(per_row).enumerate().take(height) {
            if row < top || row >= bottom {
                cells.fill(id);
            } else {
                cells[..left * per_cell].fill(id);
                cells[right * per_cell..].fill(id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(window: GridWindow) -> GridView {
        let sprite_map: FixedHandleMap<Sprite, Sprite> =
            [Sprite::new(0), Sprite::new(1), Sprite::EMPTY].into_iter().collect();
        GridView::new(window, 1, sprite_map, Sprite::new(0), Sprite::new(1))
    }

    #[test]
    fn test_sprite_ids() {
        let view = view(GridWindow::new(false, 1, 1, 1, 1));
        assert_eq!(view.to_sprite_id(SpriteInstance::default()), 0);
        assert_eq!(
            view.to_sprite_id(SpriteInstance::new(Sprite::new(0), Orientation::North)),
            1
        );
        assert_eq!(
            view.to_sprite_id(SpriteInstance::new(Sprite::new(1), Orientation::West)),
            8
        );
        assert_eq!(
            view.to_sprite_id(SpriteInstance::new(Sprite::new(2), Orientation::East)),
            0
        );
        assert_eq!(view.num_sprite_ids(), 13);
        assert_eq!(view.num_cells(), 9);
    }

    #[test]
    fn test_clear_out_of_view_uncentered_is_noop() {
        let view = view(GridWindow::new(false, 1, 1, 1, 1));
        let mut ids = vec![0; 9];
        view.clear_out_of_view_sprites(Orientation::North, &mut ids).unwrap();
        assert!(ids.iter().all(|&id| id == 0));
    }

    #[test]
    fn test_clear_out_of_view_rejects_bad_buffer() {
        let view = view(GridWindow::new(true, 1, 1, 1, 1));
        let mut ids = vec![0; 4];
        assert!(view.clear_out_of_view_sprites(Orientation::North, &mut ids).is_err());
    }

    #[test]
    fn test_clear_out_of_view_centered() {
        // Square 5x5 window; only two rows ahead and none behind are real.
        let view = view(GridWindow::new(true, 2, 2, 2, 0));
        let mut ids = vec![0; 25];
        view.clear_out_of_view_sprites(Orientation::North, &mut ids).unwrap();
        let oov = view.to_sprite_id(SpriteInstance::new(Sprite::new(1), Orientation::North));
        for row in 0..5 {
            let expected = if row < 3 { 0 } else { oov };
            assert!(ids[row * 5..row * 5 + 5].iter().all(|&id| id == expected), "row {}", row);
        }

        let mut ids = vec![0; 25];
        view.clear_out_of_view_sprites(Orientation::East, &mut ids).unwrap();
        let oov = view.to_sprite_id(SpriteInstance::new(Sprite::new(1), Orientation::East));
        for row in 0..5 {
            assert_eq!(&ids[row * 5..row * 5 + 2], &[oov, oov]);
            assert_eq!(&ids[row * 5 + 2..row * 5 + 5], &[0, 0, 0]);
        }
    }
}
