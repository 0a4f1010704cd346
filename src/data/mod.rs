//! Data layer: settings and the farm map, loaded once at startup.
//!
//! Runs in OnEnter(GameState::Loading): reads `assets/settings.ron` into
//! `GameConfig` and `assets/maps/farm.ron` into `WorldLayout`, falling back
//! to built-in values with a warning when a file is missing or malformed.
//! Then seeds the new-game player and moves to GameState::Playing, where
//! the world is built in the `SetupSet` order.

mod config;
mod farm_map;

pub use config::{load_config, SETTINGS_PATH};
pub use farm_map::{builtin_layout, load_layout, FARM_MAP_PATH};

use bevy::prelude::*;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            OnExit(GameState::Loading),
            (SetupSet::World, SetupSet::Restore, SetupSet::Spawn).chain(),
        )
        .add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(mut commands: Commands, mut next_state: ResMut<NextState<GameState>>) {
    info!("[Data] Loading settings and map…");

    let config = load_config(Path::new(SETTINGS_PATH));
    let layout = load_layout(Path::new(FARM_MAP_PATH));
    info!(
        "[Data] Map {}x{}, {} farmable tiles, {} trees",
        layout.cols,
        layout.rows,
        layout.farmable.len(),
        layout.trees.len()
    );

    commands.insert_resource(new_game_player(&config, &layout));
    commands.insert_resource(config);
    commands.insert_resource(layout);

    next_state.set(GameState::Playing);
}

/// Fresh player at the map's start point with the configured purse and seeds.
pub fn new_game_player(config: &GameConfig, layout: &WorldLayout) -> PlayerState {
    let mut player = PlayerState::new_game(config.start_money, config.start_seeds);
    let start = map_to_world(layout.player_start.0, layout.player_start.1);
    player.pos_x = start.x;
    player.pos_y = start.y;
    player
}

/// Read and parse a RON file.
pub fn read_ron<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    ron::from_str(&text).map_err(|e| format!("cannot parse {}: {e}", path.display()))
}
