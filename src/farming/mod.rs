//! Farming domain: tile grid, soil shapes, tilling, watering, planting,
//! crop growth, harvest.
//!
//! Other domains reach the farm through the shared events; the save domain
//! and tests use the grid API directly.

use bevy::prelude::*;
use std::collections::HashMap;
use crate::shared::*;

pub mod crops;
pub mod events_handler;
pub mod grid;
pub mod harvest;
mod render;
pub mod shape;
pub mod soil;

pub use crops::{grow_all, CropInstance};
pub use events_handler::{apply_rollover, RolloverReport};
pub use grid::{Marker, TileGrid, TileMarkers, TilePos};
pub use harvest::harvest_touching;
pub use shape::{classify, ShapeId, SoilShapes};
pub use soil::till_tile;

/// Sprite entity for a tilled tile.
#[derive(Component, Debug, Clone, Copy)]
pub struct SoilTileEntity(pub TilePos);

/// Water overlay drawn over a watered tile.
#[derive(Component, Debug, Clone, Copy)]
pub struct WaterTileEntity(pub TilePos);

#[derive(Component, Debug, Clone, Copy)]
pub struct CropTileEntity(pub TilePos);

/// Render entities keyed by tile.
#[derive(Resource, Default, Debug)]
pub struct FarmEntities {
    pub soil: HashMap<TilePos, Entity>,
    pub water: HashMap<TilePos, Entity>,
    pub crops: HashMap<TilePos, Entity>,
}

/// Texture handles for farm sprites. Render systems fall back to flat
/// colours for anything that has not (or will never) finish loading.
#[derive(Resource, Default)]
pub struct FarmingAtlases {
    pub soil_image: Handle<Image>,
    pub soil_layout: Handle<TextureAtlasLayout>,
    pub water_image: Handle<Image>,
    pub crop_images: HashMap<CropKind, Handle<Image>>,
    pub crop_layouts: HashMap<CropKind, Handle<TextureAtlasLayout>>,
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TileGrid>()
            .init_resource::<SoilShapes>()
            .init_resource::<FarmEntities>()
            .init_resource::<FarmingAtlases>()
            .add_systems(
                OnExit(GameState::Loading),
                (setup_farm.in_set(SetupSet::World), load_farming_atlases),
            )
            // ------------------------------------------------------------------
            // Player actions
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (
                    soil::handle_hoe_tool_use,
                    soil::handle_watering_tool_use,
                    crops::handle_plant_seed,
                    harvest::harvest_on_contact,
                    harvest::spawn_harvest_feedback,
                )
                    .chain()
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, harvest::update_harvest_feedback)
            // ------------------------------------------------------------------
            // Rollover: any state, so a sleep request is never dropped
            // ------------------------------------------------------------------
            .add_systems(Update, events_handler::on_day_start)
            // ------------------------------------------------------------------
            // Visual sync
            // ------------------------------------------------------------------
            .add_systems(
                PostUpdate,
                (
                    render::sync_soil_sprites,
                    render::sync_water_sprites,
                    render::sync_crop_sprites,
                )
                    .run_if(not(in_state(GameState::Loading))),
            );
    }
}

/// Build the grid from the world layout and derive the initial shapes.
pub fn setup_farm(
    layout: Res<WorldLayout>,
    mut grid: ResMut<TileGrid>,
    mut shapes: ResMut<SoilShapes>,
) {
    *grid = TileGrid::from_layout(&layout);
    *shapes = SoilShapes::from_grid(&grid);
    info!(
        "[Farming] Grid {}x{} with {} farmable tiles",
        grid.rows(),
        grid.cols(),
        layout.farmable.len()
    );
}

/// Asset paths:
///   graphics/soil/soil.png: 256×256, 4×4 frames of 64×64, `ShapeId` order
///   graphics/soil_water/water.png: 64×64 overlay
///   graphics/fruit/<kind>.png: one row of `frame_count` 64×64 frames
fn load_farming_atlases(
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut atlases: ResMut<FarmingAtlases>,
) {
    let tile = UVec2::splat(TILE_SIZE as u32);

    atlases.soil_image = asset_server.load("graphics/soil/soil.png");
    atlases.soil_layout = layouts.add(TextureAtlasLayout::from_grid(tile, 4, 4, None, None));
    atlases.water_image = asset_server.load("graphics/soil_water/water.png");

    for kind in CropKind::ALL {
        let path = format!("graphics/fruit/{}.png", kind.display_name().to_lowercase());
        atlases.crop_images.insert(kind, asset_server.load(path));
        atlases.crop_layouts.insert(
            kind,
            layouts.add(TextureAtlasLayout::from_grid(tile, kind.frame_count(), 1, None, None)),
        );
    }
}

/// True once an image and its dependencies are in memory.
pub fn image_ready(asset_server: &AssetServer, handle: &Handle<Image>) -> bool {
    asset_server.is_loaded_with_dependencies(handle.id())
}

/// Placeholder colour for a crop frame, pale green seedling to ripe orange.
pub fn crop_stage_color(frame: usize, frames: usize) -> Color {
    let progress = frame as f32 / frames.saturating_sub(1).max(1) as f32;
    let r = 0.35 + 0.55 * progress;
    let g = 0.70 - 0.25 * progress;
    let b = 0.25 * (1.0 - progress);
    Color::srgb(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}
