//! Runs a grid-world scenario headless and prints the final board.

mod behaviour;
mod scenario;
mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use lattice_core::{Orientation, Position};
use lattice_world::{CharMap, Grid, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::scenario::ScenarioConfig;

fn main() -> Result<()> {
    telemetry::init_telemetry()?;

    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!(path = %path, "Loading scenario");
            ScenarioConfig::from_path(&path)?
        }
        None => {
            info!("No scenario given, using the built-in garden");
            ScenarioConfig::default()
        }
    };

    let mut grid = build_grid(&config)?;
    info!(
        width = config.grid.width,
        height = config.grid.height,
        topology = ?config.grid.topology,
        pieces = grid.piece_count(),
        "Scenario ready"
    );

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    for tick in 1..=config.ticks {
        grid.do_update(&mut rng, config.flush_count);
        if config.log_every > 0 && tick % config.log_every == 0 {
            log_summary(&grid);
        }
    }

    info!(frame = grid.frame(), pieces = grid.piece_count(), "Run complete");
    print!("{}", grid.to_string());
    Ok(())
}

/// World, grid, layout, update bindings and callbacks for `config`.
fn build_grid(config: &ScenarioConfig) -> Result<Grid> {
    let world = Arc::new(World::new(&config.world));
    let char_map = CharMap::from_names(&world, &config.state_map).context("invalid state map")?;
    let mut grid = Grid::from_config(Arc::clone(&world), &config.grid)?;

    let placed = grid.create_layout(&char_map, &config.layout, Position::new(0, 0), Orientation::North);
    debug!(placed = placed.len(), "Layout stamped");

    for binding in &config.updates {
        let update = world.updates().to_handle(&binding.update);
        let group = world.groups().to_handle(&binding.group);
        if group.is_empty() {
            warn!(update = %binding.update, group = %binding.group, "Update bound to unknown group");
        }
        grid.set_update_info(update, group, binding.probability, binding.start_frame);
    }

    for (name, behaviour) in &config.behaviours {
        let state = world.states().to_handle(name);
        let seed = config.seed.wrapping_add(state.value() as u64 + 1);
        grid.set_callback(state, behaviour.callback(seed));
        debug!(state = %name, ?behaviour, "Behaviour installed");
    }

    Ok(grid)
}

fn log_summary(grid: &Grid) {
    let world = grid.world();
    let groups: Vec<String> = world
        .groups()
        .iter()
        .map(|(group, name)| format!("{}={}", name, grid.piece_count_by_group(group)))
        .collect();
    info!(
        frame = grid.frame(),
        pieces = grid.piece_count(),
        groups = %groups.join(" "),
        "Progress"
    );
}
