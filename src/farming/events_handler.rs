//! Day rollover for the farm.
//!
//! The calendar rolls the new day's weather and then sends `DayStartEvent`.
//! This handler applies the soil side of the rollover in a fixed order:
//! 1. Grow every crop against yesterday's water.
//! 2. Dry every tile.
//! 3. If the new day is rainy, water every tilled tile.

use bevy::prelude::*;
use crate::shared::*;
use super::crops::grow_all;
use super::grid::TileGrid;

/// What a rollover did to the grid, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RolloverReport {
    pub grown: usize,
    pub dried: usize,
    pub rain_watered: usize,
}

pub fn apply_rollover(grid: &mut TileGrid, raining: bool) -> RolloverReport {
    let grown = grow_all(grid);
    let dried = grid.remove_all_water();
    let rain_watered = if raining { grid.water_all() } else { 0 };
    RolloverReport { grown, dried, rain_watered }
}

pub fn on_day_start(
    mut day_start_events: EventReader<DayStartEvent>,
    mut grid: ResMut<TileGrid>,
) {
    for event in day_start_events.read() {
        let report = apply_rollover(&mut grid, event.raining);
        info!(
            "[Farming] Day {}: {} crops grew, {} tiles dried, {} watered by rain",
            event.day, report.grown, report.dried, report.rain_watered
        );
    }
}
