//! Viewer-relative window extents.

use lattice_core::{Size, WindowConfig};

/// Number of visible cells in each direction from a viewer.
///
/// A centered window reports every extent as the largest one, giving a square
/// observation; the `*_actual` accessors still return the configured extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWindow {
    centered: bool,
    max_dim: i32,
    left: i32,
    right: i32,
    forward: i32,
    backward: i32,
}

impl GridWindow {
    pub fn new(centered: bool, left: i32, right: i32, forward: i32, backward: i32) -> Self {
        Self {
            centered,
            max_dim: left.max(right).max(forward).max(backward),
            left,
            right,
            forward,
            backward,
        }
    }

    pub fn centered(&self) -> bool {
        self.centered
    }

    pub fn size2d(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub fn width(&self) -> i32 {
        self.left() + self.right() + 1
    }

    pub fn height(&self) -> i32 {
        self.forward() + self.backward() + 1
    }

    pub fn left(&self) -> i32 {
        if self.centered { self.max_dim } else { self.left }
    }

    pub fn right(&self) -> i32 {
        if self.centered { self.max_dim } else { self.right }
    }

    pub fn forward(&self) -> i32 {
        if self.centered { self.max_dim } else { self.forward }
    }

    pub fn backward(&self) -> i32 {
        if self.centered { self.max_dim } else { self.backward }
    }

    pub fn left_actual(&self) -> i32 {
        self.left
    }

    pub fn right_actual(&self) -> i32 {
        self.right
    }

    pub fn forward_actual(&self) -> i32 {
        self.forward
    }

    pub fn backward_actual(&self) -> i32 {
        self.backward
    }
}

impl From<WindowConfig> for GridWindow {
    fn from(config: WindowConfig) -> Self {
        Self::new(
            config.centered,
            config.left,
            config.right,
            config.forward,
            config.backward,
        )
    }
}
