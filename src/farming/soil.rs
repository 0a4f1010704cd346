//! Hoe and watering-can responses.

use bevy::prelude::*;
use crate::shared::*;
use super::grid::{TileGrid, TilePos};
use super::shape::SoilShapes;

// ─────────────────────────────────────────────────────────────────────────────
// Hoe: till a farmable tile
// ─────────────────────────────────────────────────────────────────────────────

/// Till `pos` and reshape it and its neighbours. A tile tilled in the rain is
/// watered on the spot.
pub fn till_tile(
    grid: &mut TileGrid,
    shapes: &mut SoilShapes,
    pos: TilePos,
    raining: bool,
) -> bool {
    if !grid.till(pos) {
        return false;
    }
    shapes.refresh_around(grid, pos);
    if raining {
        grid.water(pos);
    }
    true
}

pub fn handle_hoe_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut grid: ResMut<TileGrid>,
    mut shapes: ResMut<SoilShapes>,
    day: Res<DayCycle>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Hoe {
            continue;
        }
        let Some(pos) = grid.tile_at(event.point) else {
            continue;
        };
        if till_tile(&mut grid, &mut shapes, pos, day.raining) {
            debug!("[Farming] Tilled ({}, {})", pos.row, pos.col);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Watering can
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_watering_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut grid: ResMut<TileGrid>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Water {
            continue;
        }
        let Some(pos) = grid.tile_at(event.point) else {
            continue;
        };
        if grid.water(pos) {
            debug!("[Farming] Watered ({}, {})", pos.row, pos.col);
        }
    }
}

/// Placeholder colour for a tilled tile when the soil atlas is unavailable.
pub fn soil_color(watered: bool) -> Color {
    if watered {
        Color::srgb(0.30, 0.22, 0.15)
    } else {
        Color::srgb(0.45, 0.32, 0.20)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farming::shape::ShapeId;

    #[test]
    fn tilling_in_rain_waters_immediately() {
        let pos = TilePos::new(0, 0);
        let mut grid = TileGrid::new(1, 1);
        grid.mark_tillable(pos);
        let mut shapes = SoilShapes::default();

        assert!(till_tile(&mut grid, &mut shapes, pos, true));
        assert!(grid.is_watered(pos));
        assert_eq!(shapes.get(pos), Some(ShapeId::Isolated));
    }

    #[test]
    fn dry_tilling_leaves_tile_dry() {
        let pos = TilePos::new(0, 0);
        let mut grid = TileGrid::new(1, 1);
        grid.mark_tillable(pos);
        let mut shapes = SoilShapes::default();

        assert!(till_tile(&mut grid, &mut shapes, pos, false));
        assert!(!grid.is_watered(pos));
        assert!(!till_tile(&mut grid, &mut shapes, pos, false));
    }
}
