//! Save domain: writes the farm to `saves/save.json` and restores it when the
//! world starts.

use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::farming::{SoilShapes, TileGrid};
use crate::shared::*;

mod codec;

pub use codec::{decode, encode, CropRecord, RestoredFarm, SaveError, SaveFile, SavedLevel, SAVE_VERSION};

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Sent by the X key to trigger a manual save.
#[derive(Event, Debug, Clone, Default)]
pub struct SaveRequestEvent;

/// Sent by SavePlugin after a save completes (success or failure).
#[derive(Event, Debug, Clone)]
pub struct SaveCompleteEvent {
    pub success: bool,
    pub error_message: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveRequestEvent>()
            .add_event::<SaveCompleteEvent>()
            .add_systems(
                OnExit(GameState::Loading),
                load_on_start.in_set(SetupSet::Restore),
            )
            .add_systems(
                Update,
                (request_save_on_key, handle_save_request)
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// FILE I/O
// ═══════════════════════════════════════════════════════════════════════

/// `saves/` next to the executable, or the working directory when the
/// executable path is unavailable.
fn saves_directory() -> PathBuf {
    let base = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("saves")
}

/// Where the save lives: `save_path` from settings, else `saves/save.json`.
pub fn save_path(config: &GameConfig) -> PathBuf {
    match &config.save_path {
        Some(path) => PathBuf::from(path),
        None => saves_directory().join("save.json"),
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SaveError + '_ {
    move |source| SaveError::Io { path: path.to_path_buf(), source }
}

/// Write atomically: serialize to a temp file, then rename over the target.
pub fn write_save(path: &Path, file: &SaveFile) -> Result<(), SaveError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_error(dir))?;
    }
    let json = serde_json::to_string_pretty(file)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(io_error(&tmp_path))?;
    fs::rename(&tmp_path, path).map_err(io_error(path))?;
    Ok(())
}

pub fn read_save(path: &Path) -> Result<SaveFile, SaveError> {
    if !path.exists() {
        return Err(SaveError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path).map_err(io_error(path))?;
    let file: SaveFile = serde_json::from_str(&json)?;
    if file.version != SAVE_VERSION {
        warn!(
            "[Save] Save version mismatch: file={}, current={}. Attempting load anyway.",
            file.version, SAVE_VERSION
        );
    }
    Ok(file)
}

/// Read and decode in one step. Nothing live is touched.
pub fn load_farm(path: &Path, rows: usize, cols: usize) -> Result<RestoredFarm, SaveError> {
    let file = read_save(path)?;
    decode(&file, rows, cols)
}

// ═══════════════════════════════════════════════════════════════════════
// SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn request_save_on_key(input: Res<PlayerInput>, mut requests: EventWriter<SaveRequestEvent>) {
    if input.save {
        requests.send(SaveRequestEvent);
    }
}

pub fn handle_save_request(
    mut requests: EventReader<SaveRequestEvent>,
    mut complete: EventWriter<SaveCompleteEvent>,
    config: Res<GameConfig>,
    grid: Res<TileGrid>,
    player: Res<PlayerState>,
    day: Res<DayCycle>,
) {
    // Several presses in one frame still write once.
    if requests.read().count() == 0 {
        return;
    }

    let path = save_path(&config);
    let result = write_save(&path, &encode(&grid, &player, &day));
    match &result {
        Ok(()) => info!("[Save] Saved day {} to {}", day.day, path.display()),
        Err(e) => error!("[Save] Save FAILED: {e}"),
    }
    complete.send(SaveCompleteEvent {
        success: result.is_ok(),
        error_message: result.err().map(|e| e.to_string()),
    });
}

/// Replace the fresh world with the save, if one loads cleanly.
pub fn load_on_start(
    config: Res<GameConfig>,
    mut grid: ResMut<TileGrid>,
    mut shapes: ResMut<SoilShapes>,
    mut player: ResMut<PlayerState>,
    mut day: ResMut<DayCycle>,
) {
    let path = save_path(&config);
    match load_farm(&path, grid.rows(), grid.cols()) {
        Ok(farm) => {
            info!(
                "[Save] Loaded day {} from {} ({} crops)",
                farm.day,
                path.display(),
                farm.grid.crop_count()
            );
            apply_restored(farm, &mut grid, &mut shapes, &mut player, &mut day);
        }
        Err(SaveError::NotFound(_)) => info!("[Save] No save at {}, starting fresh", path.display()),
        Err(e) => warn!("[Save] Could not load {}: {e}. Keeping the fresh farm.", path.display()),
    }
}

pub fn apply_restored(
    farm: RestoredFarm,
    grid: &mut TileGrid,
    shapes: &mut SoilShapes,
    player: &mut PlayerState,
    day: &mut DayCycle,
) {
    *grid = farm.grid;
    *shapes = farm.shapes;
    *player = farm.player;
    day.day = farm.day;
    day.raining = farm.raining;
    day.elapsed = 0.0;
    day.force_daylight = true;
}
