//! Layered grid world: the registry of categories, grid geometry, the engine
//! and its viewer-relative renderer.

pub mod grid;
pub mod grid_shape;
pub mod grid_view;
pub mod grid_window;
pub mod text;
pub mod world;

pub use grid::{
    Action, FindPieceResult, Grid, HitResponse, Perspective, StateCallback, TeleportOrientation,
};
pub use grid_shape::GridShape;
pub use grid_view::{GridView, SpriteInstance};
pub use grid_window::GridWindow;
pub use text::CharMap;
pub use world::{HitData, StateData, World};
