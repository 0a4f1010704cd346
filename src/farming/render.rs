//! Visual synchronisation: soil, water and crop sprites follow the grid.

use bevy::prelude::*;
use crate::shared::*;
use super::{
    crop_stage_color, image_ready,
    crops::{CropInstance, PLACEHOLDER_FRAMES},
    grid::{TileGrid, TilePos},
    shape::SoilShapes,
    soil::soil_color,
    CropTileEntity, FarmEntities, FarmingAtlases, SoilTileEntity, WaterTileEntity,
};

const SOIL_Z: f32 = 1.0;
const WATER_Z: f32 = 1.1;
const CROP_Z: f32 = 2.0;

fn despawn_missing(
    commands: &mut Commands,
    entities: &mut std::collections::HashMap<TilePos, Entity>,
    keep: impl Fn(TilePos) -> bool,
) {
    let stale: Vec<TilePos> = entities.keys().copied().filter(|pos| !keep(*pos)).collect();
    for pos in stale {
        if let Some(entity) = entities.remove(&pos) {
            commands.entity(entity).despawn();
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Soil
// ─────────────────────────────────────────────────────────────────────────────

pub fn sync_soil_sprites(
    mut commands: Commands,
    mut farm_entities: ResMut<FarmEntities>,
    grid: Res<TileGrid>,
    shapes: Res<SoilShapes>,
    atlases: Res<FarmingAtlases>,
    asset_server: Res<AssetServer>,
    mut was_ready: Local<bool>,
) {
    let ready = image_ready(&asset_server, &atlases.soil_image);
    if !shapes.is_changed() && !grid.is_changed() && ready == *was_ready {
        return;
    }
    *was_ready = ready;

    despawn_missing(&mut commands, &mut farm_entities.soil, |pos| shapes.get(pos).is_some());

    for (pos, shape) in shapes.iter() {
        let sprite = if ready {
            Sprite::from_atlas_image(
                atlases.soil_image.clone(),
                TextureAtlas { layout: atlases.soil_layout.clone(), index: shape.atlas_index() },
            )
        } else {
            Sprite {
                color: soil_color(grid.is_watered(pos)),
                custom_size: Some(Vec2::splat(TILE_SIZE)),
                ..default()
            }
        };

        match farm_entities.soil.get(&pos) {
            Some(&entity) => {
                commands.entity(entity).insert(sprite);
            }
            None => {
                let entity = commands
                    .spawn((
                        sprite,
                        Transform::from_translation(pos.world_center().extend(SOIL_Z)),
                        SoilTileEntity(pos),
                    ))
                    .id();
                farm_entities.soil.insert(pos, entity);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Water overlay: only drawn when the overlay image exists; the placeholder
// soil colour already shows wet tiles otherwise.
// ─────────────────────────────────────────────────────────────────────────────

pub fn sync_water_sprites(
    mut commands: Commands,
    mut farm_entities: ResMut<FarmEntities>,
    grid: Res<TileGrid>,
    atlases: Res<FarmingAtlases>,
    asset_server: Res<AssetServer>,
    mut was_ready: Local<bool>,
) {
    let ready = image_ready(&asset_server, &atlases.water_image);
    if !grid.is_changed() && ready == *was_ready {
        return;
    }
    *was_ready = ready;

    despawn_missing(&mut commands, &mut farm_entities.water, |pos| ready && grid.is_watered(pos));
    if !ready {
        return;
    }

    let watered: Vec<TilePos> = grid
        .tiles()
        .filter(|(pos, _)| grid.is_watered(*pos))
        .map(|(pos, _)| pos)
        .filter(|pos| !farm_entities.water.contains_key(pos))
        .collect();

    for pos in watered {
        let entity = commands
            .spawn((
                Sprite::from_image(atlases.water_image.clone()),
                Transform::from_translation(pos.world_center().extend(WATER_Z)),
                WaterTileEntity(pos),
            ))
            .id();
        farm_entities.water.insert(pos, entity);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Crops
// ─────────────────────────────────────────────────────────────────────────────

/// Crops are drawn on their tile, raised by the kind's offset.
fn crop_translation(crop: &CropInstance) -> Vec3 {
    let center = crop.tile.world_center();
    Vec3::new(center.x, center.y - crop.kind.sprite_offset(), CROP_Z)
}

fn crop_sprite(crop: &CropInstance, atlases: &FarmingAtlases, asset_server: &AssetServer) -> Sprite {
    let sheet = atlases.crop_images.get(&crop.kind).zip(atlases.crop_layouts.get(&crop.kind));
    match sheet {
        Some((image, layout)) if image_ready(asset_server, image) => Sprite::from_atlas_image(
            image.clone(),
            TextureAtlas { layout: layout.clone(), index: crop.frame_index() },
        ),
        _ => Sprite {
            color: crop_stage_color(crop.frame_in(PLACEHOLDER_FRAMES), PLACEHOLDER_FRAMES),
            custom_size: Some(Vec2::splat(TILE_SIZE * if crop.is_harvestable() { 0.8 } else { 0.5 })),
            ..default()
        },
    }
}

pub fn sync_crop_sprites(
    mut commands: Commands,
    mut farm_entities: ResMut<FarmEntities>,
    grid: Res<TileGrid>,
    atlases: Res<FarmingAtlases>,
    asset_server: Res<AssetServer>,
    mut ready_count: Local<usize>,
) {
    let ready = atlases
        .crop_images
        .values()
        .filter(|image| image_ready(&asset_server, image))
        .count();
    if !grid.is_changed() && ready == *ready_count {
        return;
    }
    *ready_count = ready;

    despawn_missing(&mut commands, &mut farm_entities.crops, |pos| grid.crop(pos).is_some());

    for crop in grid.crops() {
        let sprite = crop_sprite(crop, &atlases, &asset_server);
        match farm_entities.crops.get(&crop.tile) {
            Some(&entity) => {
                commands.entity(entity).insert(sprite);
            }
            None => {
                let entity = commands
                    .spawn((
                        sprite,
                        Transform::from_translation(crop_translation(crop)),
                        CropTileEntity(crop.tile),
                    ))
                    .id();
                farm_entities.crops.insert(crop.tile, entity);
            }
        }
    }
}
