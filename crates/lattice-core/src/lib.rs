//! Core types and utilities for the Lattice layered grid simulation engine.

pub mod algorithms;
pub mod collections;
pub mod config;
pub mod error;
pub mod handle;
pub mod math;

pub use error::{Error, Result};
pub use handle::*;
pub use config::*;
pub use math::*;
