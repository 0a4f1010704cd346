//! On-disk record of a farm: raw tile markers, crops, the player and the day.
//!
//! Soil shapes are never stored; they are re-derived from the markers on load.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::farming::{CropInstance, Marker, SoilShapes, TileGrid, TileMarkers, TilePos};
use crate::shared::*;

/// 1 = markers only, 2 = markers plus per-tile crop records.
pub const SAVE_VERSION: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("no save file at {0}")]
    NotFound(PathBuf),

    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed save JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("soil grid is {rows}x{cols}, world is {expected_rows}x{expected_cols}")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("soil grid row {row} has {found} tiles, expected {expected}")]
    RaggedGrid { row: usize, found: usize, expected: usize },

    #[error("unknown marker {code:?} at ({row}, {col})")]
    UnknownMarker { row: usize, col: usize, code: String },

    #[error("inconsistent markers at ({row}, {col})")]
    InconsistentTile { row: usize, col: usize },

    #[error("crop record at ({row}, {col}) has no planted tile")]
    OrphanCrop { row: usize, col: usize },

    #[error("more than one crop record at ({row}, {col})")]
    DuplicateCrop { row: usize, col: usize },
}

// ─────────────────────────────────────────────────────────────────────────────
// Record
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveFile {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub player: PlayerState,
    pub level: SavedLevel,
    #[serde(default)]
    pub crops: Vec<CropRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLevel {
    #[serde(default)]
    pub raining: bool,
    #[serde(default = "first_day")]
    pub day: u32,
    /// rows × cols lists of marker codes.
    pub soil_grid: Vec<Vec<Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub row: usize,
    pub col: usize,
    pub kind: CropKind,
    #[serde(default)]
    pub age: f32,
}

fn legacy_version() -> u32 {
    1
}

fn first_day() -> u32 {
    1
}

/// A decoded save, ready to replace the live resources.
#[derive(Debug, Clone)]
pub struct RestoredFarm {
    pub grid: TileGrid,
    pub shapes: SoilShapes,
    pub player: PlayerState,
    pub raining: bool,
    pub day: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode / decode
// ─────────────────────────────────────────────────────────────────────────────

pub fn encode(grid: &TileGrid, player: &PlayerState, day: &DayCycle) -> SaveFile {
    let mut soil_grid = vec![vec![Vec::new(); grid.cols()]; grid.rows()];
    for (pos, markers) in grid.tiles() {
        soil_grid[pos.row][pos.col] = markers.iter().map(|m| m.code().to_string()).collect();
    }

    let crops = grid
        .crops()
        .map(|crop| CropRecord {
            row: crop.tile.row,
            col: crop.tile.col,
            kind: crop.kind,
            age: crop.age(),
        })
        .collect();

    SaveFile {
        version: SAVE_VERSION,
        player: player.clone(),
        level: SavedLevel {
            raining: day.raining,
            day: day.day,
            soil_grid,
        },
        crops,
    }
}

/// Rebuild a farm for a world of `rows × cols` tiles. Any invalid entry
/// rejects the whole record.
pub fn decode(file: &SaveFile, rows: usize, cols: usize) -> Result<RestoredFarm, SaveError> {
    let saved = &file.level.soil_grid;
    let saved_cols = saved.first().map_or(0, Vec::len);
    if saved.len() != rows || saved_cols != cols {
        return Err(SaveError::DimensionMismatch {
            rows: saved.len(),
            cols: saved_cols,
            expected_rows: rows,
            expected_cols: cols,
        });
    }

    let mut grid = TileGrid::new(rows, cols);
    for (row, tiles) in saved.iter().enumerate() {
        if tiles.len() != cols {
            return Err(SaveError::RaggedGrid { row, found: tiles.len(), expected: cols });
        }
        for (col, codes) in tiles.iter().enumerate() {
            let markers = codes
                .iter()
                .map(|code| {
                    Marker::from_code(code).ok_or_else(|| SaveError::UnknownMarker {
                        row,
                        col,
                        code: code.clone(),
                    })
                })
                .collect::<Result<TileMarkers, _>>()?;
            if !grid.restore_markers(TilePos::new(row, col), markers) {
                return Err(SaveError::InconsistentTile { row, col });
            }
        }
    }

    for record in &file.crops {
        let pos = TilePos::new(record.row, record.col);
        if grid.crop(pos).is_some() {
            return Err(SaveError::DuplicateCrop { row: record.row, col: record.col });
        }
        if !grid.restore_crop(CropInstance::restored(record.kind, pos, record.age)) {
            return Err(SaveError::OrphanCrop { row: record.row, col: record.col });
        }
    }

    // Planted tiles without a record come from markers-only saves.
    let legacy: Vec<TilePos> = grid
        .tiles()
        .filter(|(pos, markers)| markers.contains(Marker::Planted) && grid.crop(*pos).is_none())
        .map(|(pos, _)| pos)
        .collect();
    for pos in legacy {
        grid.restore_crop(CropInstance::new(file.player.selected_seed, pos));
    }

    let shapes = SoilShapes::from_grid(&grid);
    Ok(RestoredFarm {
        grid,
        shapes,
        player: file.player.clone(),
        raining: file.level.raining,
        day: file.level.day.max(1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farming::shape::shape_at;
    use crate::farming::till_tile;

    fn worked_farm() -> (TileGrid, SoilShapes) {
        let mut grid = TileGrid::new(4, 5);
        for row in 0..4 {
            for col in 0..4 {
                grid.mark_tillable(TilePos::new(row, col));
            }
        }
        let mut shapes = SoilShapes::default();
        for pos in [TilePos::new(1, 1), TilePos::new(1, 2), TilePos::new(2, 2), TilePos::new(3, 0)] {
            assert!(till_tile(&mut grid, &mut shapes, pos, false));
        }
        grid.water(TilePos::new(1, 2));
        grid.plant(TilePos::new(1, 2), CropKind::Tomato);
        grid.plant(TilePos::new(2, 2), CropKind::Corn);
        for (crop, watered) in grid.crops_with_water_mut() {
            crop.advance(watered);
        }
        (grid, shapes)
    }

    fn day(raining: bool, day: u32) -> DayCycle {
        DayCycle { raining, day, ..DayCycle::default() }
    }

    #[test]
    fn round_trip_preserves_markers_shapes_and_crops() {
        let (grid, shapes) = worked_farm();
        let mut player = PlayerState::new_game(75, 2);
        player.add_item(ItemKind::Apple, 3);
        player.selected_tool = ToolKind::Water;

        let json = serde_json::to_string(&encode(&grid, &player, &day(true, 4))).expect("encode");
        let file: SaveFile = serde_json::from_str(&json).expect("parse");
        let restored = decode(&file, 4, 5).expect("decode");

        assert_eq!(restored.grid, grid);
        assert_eq!(restored.shapes.len(), shapes.len());
        for (pos, _) in grid.tiles() {
            assert_eq!(shape_at(&restored.grid, pos), shape_at(&grid, pos));
            assert_eq!(restored.shapes.get(pos), shapes.get(pos));
        }
        assert_eq!(restored.player, player);
        assert!(restored.raining);
        assert_eq!(restored.day, 4);
        assert_eq!(restored.grid.crop(TilePos::new(1, 2)).map(|c| c.age()), Some(1.0));
    }

    #[test]
    fn marker_codes_are_written() {
        let (grid, _) = worked_farm();
        let file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        assert_eq!(file.version, SAVE_VERSION);
        assert_eq!(file.level.soil_grid[1][2], vec!["F", "X", "W", "P"]);
        assert_eq!(file.level.soil_grid[0][4], Vec::<String>::new());
        assert_eq!(file.crops.len(), 2);
    }

    #[test]
    fn legacy_planted_tile_becomes_selected_seed() {
        let (grid, _) = worked_farm();
        let mut file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        file.crops.clear();
        file.player.selected_seed = CropKind::Tomato;

        let restored = decode(&file, 4, 5).expect("decode");
        let crop = restored.grid.crop(TilePos::new(2, 2)).expect("legacy crop");
        assert_eq!(crop.kind, CropKind::Tomato);
        assert_eq!(crop.age(), 0.0);
        assert_eq!(restored.grid.crop_count(), 2);
    }

    #[test]
    fn markers_only_json_loads_with_defaults() {
        let json = r#"{"level": {"soil_grid": [[["F", "X"], []], [[], ["F"]]]}}"#;
        let file: SaveFile = serde_json::from_str(json).expect("parse");
        assert_eq!(file.version, 1);
        let restored = decode(&file, 2, 2).expect("decode");
        assert!(restored.grid.is_tilled(TilePos::new(0, 0)));
        assert_eq!(restored.day, 1);
        assert!(!restored.raining);
        assert_eq!(restored.player, PlayerState::default());
    }

    #[test]
    fn rejects_wrong_dimensions() {
        let (grid, _) = worked_farm();
        let file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        assert!(matches!(decode(&file, 5, 5), Err(SaveError::DimensionMismatch { .. })));
    }

    #[test]
    fn rejects_ragged_grid() {
        let (grid, _) = worked_farm();
        let mut file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        file.level.soil_grid[2].pop();
        assert!(matches!(decode(&file, 4, 5), Err(SaveError::RaggedGrid { row: 2, .. })));
    }

    #[test]
    fn rejects_unknown_marker() {
        let (grid, _) = worked_farm();
        let mut file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        file.level.soil_grid[0][0].push("Q".into());
        let err = decode(&file, 4, 5).unwrap_err();
        assert!(matches!(err, SaveError::UnknownMarker { row: 0, col: 0, ref code } if code == "Q"));
    }

    #[test]
    fn rejects_watered_untilled_tile() {
        let (grid, _) = worked_farm();
        let mut file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        file.level.soil_grid[0][0] = vec!["F".into(), "W".into()];
        assert!(matches!(decode(&file, 4, 5), Err(SaveError::InconsistentTile { row: 0, col: 0 })));
    }

    #[test]
    fn rejects_crop_record_without_planted_tile() {
        let (grid, _) = worked_farm();
        let mut file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        file.crops.push(CropRecord { row: 3, col: 0, kind: CropKind::Corn, age: 2.0 });
        assert!(matches!(decode(&file, 4, 5), Err(SaveError::OrphanCrop { row: 3, col: 0 })));
    }

    #[test]
    fn rejects_second_record_for_one_tile() {
        let (grid, _) = worked_farm();
        let mut file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        let first = file.crops[0].clone();
        let (row, col) = (first.row, first.col);
        file.crops.push(first);
        let err = decode(&file, 4, 5).unwrap_err();
        assert!(matches!(err, SaveError::DuplicateCrop { row: r, col: c } if (r, c) == (row, col)));
        assert!(err.to_string().contains("more than one crop record"));
    }

    #[test]
    fn crop_age_is_clamped_on_load() {
        let (grid, _) = worked_farm();
        let mut file = encode(&grid, &PlayerState::default(), &DayCycle::default());
        for record in &mut file.crops {
            record.age = 99.0;
        }
        let restored = decode(&file, 4, 5).expect("decode");
        let crop = restored.grid.crop(TilePos::new(2, 2)).expect("crop");
        assert_eq!(crop.age(), crop.max_age());
        assert!(crop.is_harvestable());
    }
}
