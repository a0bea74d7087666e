//! Scenario files: a world description, a grid, a starting layout and the
//! behaviours bound to each state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lattice_core::{GridConfig, StateArg, Topology, UpdateOrder, WorldArgs};
use serde::{Deserialize, Serialize};

/// Binds an update pass to the members of a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBinding {
    pub update: String,
    pub group: String,
    #[serde(default = "default_probability")]
    pub probability: f64,
    #[serde(default)]
    pub start_frame: i64,
}

fn default_probability() -> f64 {
    1.0
}

/// Built-in callbacks a state can be given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behaviour {
    /// Steps one cell in a random direction on every update
    Wander,
    /// Removed as soon as anything with a contact enters its cell
    Consumable,
}

/// A complete run description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Seed for the tick PRNG; behaviours derive their own seeds from it
    pub seed: u64,
    pub ticks: u64,
    /// Maximum queue passes per tick
    pub flush_count: usize,
    /// Ticks between progress summaries; 0 disables them
    pub log_every: u64,
    pub world: WorldArgs,
    /// JSON world description replacing `world`, relative to the scenario file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_file: Option<PathBuf>,
    pub grid: GridConfig,
    /// ASCII map stamped at the origin
    pub layout: String,
    /// Layout character to state name
    pub state_map: BTreeMap<String, String>,
    pub updates: Vec<UpdateBinding>,
    /// State name to behaviour
    pub behaviours: BTreeMap<String, Behaviour>,
}

impl Default for ScenarioConfig {
    /// A walled garden with two wanderers and some apples to find.
    fn default() -> Self {
        let mut world = WorldArgs::default();
        world.states.insert("Wall".into(), state("walls", "Wall", &[], None));
        world.states.insert(
            "Walker".into(),
            state("walls", "Walker", &["walkers"], Some("walker")),
        );
        world.states.insert(
            "Apple".into(),
            state("fruit", "Apple", &["apples"], Some("food")),
        );
        world.render_order = vec!["fruit".into(), "walls".into()];
        world.update_order = vec![UpdateOrder::implicit("move")];

        let state_map = [("#", "Wall"), ("w", "Walker"), ("a", "Apple")]
            .into_iter()
            .map(|(key, name)| (key.to_string(), name.to_string()))
            .collect();

        Self {
            seed: 42,
            ticks: 100,
            flush_count: 128,
            log_every: 25,
            world,
            world_file: None,
            grid: GridConfig {
                width: 10,
                height: 7,
                topology: Topology::Bounded,
            },
            layout: [
                "##########",
                "#w  a   a#",
                "# ## a## #",
                "#  a   a #",
                "# ##a ## #",
                "#a   a  w#",
                "##########",
            ]
            .join("\n"),
            state_map,
            updates: vec![UpdateBinding {
                update: "move".into(),
                group: "walkers".into(),
                probability: 1.0,
                start_frame: 0,
            }],
            behaviours: [
                ("Walker".to_string(), Behaviour::Wander),
                ("Apple".to_string(), Behaviour::Consumable),
            ]
            .into_iter()
            .collect(),
        }
    }
}

fn state(layer: &str, sprite: &str, groups: &[&str], contact: Option<&str>) -> StateArg {
    StateArg {
        layer: Some(layer.into()),
        sprite: Some(sprite.into()),
        groups: groups.iter().map(|g| g.to_string()).collect(),
        contact: contact.map(Into::into),
    }
}

impl ScenarioConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Self::load(text, Path::new("."))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new("."));
        Self::load(&text, base).with_context(|| format!("invalid scenario {}", path.display()))
    }

    fn load(text: &str, base: &Path) -> Result<Self> {
        let mut config: Self = serde_json::from_str(text).context("failed to parse scenario")?;
        if let Some(file) = &config.world_file {
            let path = base.join(file);
            config.world = WorldArgs::from_path(&path)
                .with_context(|| format!("failed to load world {}", path.display()))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks that every name the scenario refers to is declared.
    pub fn validate(&self) -> Result<()> {
        self.grid.validate()?;
        for binding in &self.updates {
            if !self.world.update_order.iter().any(|u| u.name == binding.update) {
                bail!("update '{}' is not in the update order", binding.update);
            }
            if !(0.0..=1.0).contains(&binding.probability) {
                bail!(
                    "update '{}' has probability {} outside [0, 1]",
                    binding.update,
                    binding.probability
                );
            }
        }
        for name in self.behaviours.keys() {
            if !self.world.states.contains_key(name) {
                bail!("behaviour bound to unknown state '{}'", name);
            }
        }
        Ok(())
    }
}
