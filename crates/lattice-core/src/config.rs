//! Configuration types for building a world and its grid.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Category description for one state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateArg {
    /// Occupancy layer; `None` keeps pieces in this state off the grid
    pub layer: Option<String>,
    /// Sprite painted for pieces in this state
    pub sprite: Option<String>,
    /// Groups pieces in this state belong to
    pub groups: Vec<String>,
    /// Contact category exchanged with co-located pieces
    pub contact: Option<String>,
}

/// Overlay description for one hit type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitArg {
    pub layer: Option<String>,
    pub sprite: Option<String>,
}

/// One update pass. Accepts either `"name"` or `{"name": .., "func": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UpdateOrderRepr")]
pub struct UpdateOrder {
    pub name: String,
    #[serde(rename = "func")]
    pub function: String,
}

impl UpdateOrder {
    /// Update pass whose function shares its name.
    pub fn implicit(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            function: name.clone(),
            name,
        }
    }

    pub fn explicit(name: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum UpdateOrderRepr {
    Name(String),
    Explicit {
        name: String,
        #[serde(default)]
        func: Option<String>,
    },
}

impl From<UpdateOrderRepr> for UpdateOrder {
    fn from(repr: UpdateOrderRepr) -> Self {
        match repr {
            UpdateOrderRepr::Name(name) => UpdateOrder::implicit(name),
            UpdateOrderRepr::Explicit { name, func } => match func {
                Some(function) => UpdateOrder::explicit(name, function),
                None => UpdateOrder::implicit(name),
            },
        }
    }
}

/// Everything needed to build a `World` registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldArgs {
    pub states: BTreeMap<String, StateArg>,
    pub hits: BTreeMap<String, HitArg>,
    /// Layers exported to rendering, in paint order
    pub render_order: Vec<String>,
    pub update_order: Vec<UpdateOrder>,
    /// Sprites not referenced by any state or hit
    pub custom_sprites: Vec<String>,
    pub out_of_bounds_sprite: Option<String>,
    pub out_of_view_sprite: Option<String>,
}

impl WorldArgs {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a JSON world description from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Grid edge behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    #[default]
    Bounded,
    Torus,
}

/// Grid dimensions and topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Width of the grid in cells
    pub width: i32,
    /// Height of the grid in cells
    pub height: i32,
    pub topology: Topology,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            topology: Topology::Bounded,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::Validation(format!(
                "grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// Viewer window extents, in cells from the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub left: i32,
    pub right: i32,
    pub forward: i32,
    pub backward: i32,
    /// Report a square window of the largest extent
    pub centered: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            left: 2,
            right: 2,
            forward: 3,
            backward: 1,
            centered: false,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> Result<()> {
        if [self.left, self.right, self.forward, self.backward]
            .iter()
            .any(|&extent| extent < 0)
        {
            return Err(Error::Validation(
                "window extents must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
