//! Crop instances, daily growth, and planting.

use bevy::prelude::*;
use crate::shared::*;
use super::grid::{TileGrid, TilePos};

/// Frames shown when a crop's sprite sheet is missing.
pub const PLACEHOLDER_FRAMES: usize = 3;

// ─────────────────────────────────────────────────────────────────────────────
// CropInstance
// ─────────────────────────────────────────────────────────────────────────────

/// A single planted crop. Lives inside `TileGrid`, keyed by `tile`.
#[derive(Debug, Clone, PartialEq)]
pub struct CropInstance {
    pub kind: CropKind,
    pub tile: TilePos,
    age: f32,
    growth_rate: f32,
    harvestable: bool,
}

impl CropInstance {
    pub fn new(kind: CropKind, tile: TilePos) -> Self {
        Self {
            kind,
            tile,
            age: 0.0,
            growth_rate: kind.growth_rate(),
            harvestable: false,
        }
    }

    /// Rebuild a crop from a saved age. Non-finite or negative ages become 0,
    /// ages past maturity are clamped.
    pub fn restored(kind: CropKind, tile: TilePos, age: f32) -> Self {
        let mut crop = Self::new(kind, tile);
        let age = if age.is_finite() { age.max(0.0) } else { 0.0 };
        crop.age = age.min(crop.max_age());
        crop.harvestable = crop.age >= crop.max_age();
        crop
    }

    pub fn max_age(&self) -> f32 {
        self.kind.frame_count().saturating_sub(1) as f32
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn growth_rate(&self) -> f32 {
        self.growth_rate
    }

    pub fn is_harvestable(&self) -> bool {
        self.harvestable
    }

    /// One day of growth. Nothing happens on a dry tile.
    /// Returns true if the age changed.
    pub fn advance(&mut self, tile_watered: bool) -> bool {
        if !tile_watered {
            return false;
        }
        let before = self.age;
        self.age = (self.age + self.growth_rate).min(self.max_age());
        self.harvestable = self.age >= self.max_age();
        self.age != before
    }

    pub fn frame_index(&self) -> usize {
        self.age.min(self.max_age()).floor() as usize
    }

    /// Frame index into a sheet with only `frames` frames.
    pub fn frame_in(&self, frames: usize) -> usize {
        self.frame_index().min(frames.saturating_sub(1))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth
// ─────────────────────────────────────────────────────────────────────────────

/// Advance every crop by one day against its tile's current water marker.
/// Returns how many crops grew.
pub fn grow_all(grid: &mut TileGrid) -> usize {
    grid.crops_with_water_mut()
        .filter_map(|(crop, watered)| crop.advance(watered).then_some(()))
        .count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

/// Plant a seed from the player's pouch. A seed is spent only when the tile
/// accepts the crop.
pub fn plant_from_inventory(
    grid: &mut TileGrid,
    player: &mut PlayerState,
    pos: TilePos,
    kind: CropKind,
) -> bool {
    if player.seed_count(kind) == 0 {
        return false;
    }
    if grid.plant(pos, kind).is_none() {
        return false;
    }
    player.take_seed(kind)
}

pub fn handle_plant_seed(
    mut plant_events: EventReader<PlantSeedEvent>,
    mut grid: ResMut<TileGrid>,
    mut player: ResMut<PlayerState>,
) {
    for event in plant_events.read() {
        let Some(pos) = grid.tile_at(event.point) else {
            continue;
        };
        if plant_from_inventory(&mut grid, &mut player, pos, event.kind) {
            info!(
                "[Farming] Planted {} at ({}, {}); {} seeds left",
                event.kind.display_name(),
                pos.row,
                pos.col,
                player.seed_count(event.kind)
            );
        }
    }
}
