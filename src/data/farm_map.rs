use bevy::prelude::*;
use std::path::Path;

use crate::shared::*;
use super::read_ron;

pub const FARM_MAP_PATH: &str = "assets/maps/farm.ron";

const MAP_COLS: usize = 50;
const MAP_ROWS: usize = 40;

/// The farm used when no map file can be read: a 50×40 meadow with a field
/// south of the house, an orchard to the west and the trader by the road.
pub fn builtin_layout() -> WorldLayout {
    let mut farmable = Vec::new();
    for row in 18..26 {
        for col in 20..32 {
            farmable.push((row, col));
        }
    }
    for row in 27..30 {
        for col in 22..30 {
            farmable.push((row, col));
        }
    }

    let trees = [
        (TreeSize::Large, 640.0, 1088.0),
        (TreeSize::Small, 832.0, 1216.0),
        (TreeSize::Large, 576.0, 1408.0),
        (TreeSize::Small, 896.0, 1536.0),
        (TreeSize::Small, 704.0, 1728.0),
        (TreeSize::Large, 2368.0, 832.0),
    ]
    .into_iter()
    .map(|(size, x, y)| TreeSpawn { size, x, y })
    .collect();

    WorldLayout {
        cols: MAP_COLS,
        rows: MAP_ROWS,
        farmable,
        trees,
        bed: MapRect::new(1472.0, 896.0, 64.0, 128.0),
        trader: MapRect::new(2304.0, 1600.0, 128.0, 64.0),
        player_start: (1600.0, 1100.0),
    }
}

/// Map from disk, or the built-in farm when the file is unusable.
/// Farmable coordinates outside the grid are dropped.
pub fn load_layout(path: &Path) -> WorldLayout {
    let mut layout = match read_ron::<WorldLayout>(path) {
        Ok(layout) if layout.rows > 0 && layout.cols > 0 => layout,
        Ok(_) => {
            warn!("[Data] {} has an empty grid; using the built-in farm", path.display());
            builtin_layout()
        }
        Err(e) => {
            warn!("[Data] {e}; using the built-in farm");
            builtin_layout()
        }
    };

    let (rows, cols) = (layout.rows, layout.cols);
    let before = layout.farmable.len();
    layout.farmable.retain(|&(row, col)| row < rows && col < cols);
    layout.farmable.sort_unstable();
    layout.farmable.dedup();
    if layout.farmable.len() != before {
        warn!(
            "[Data] Dropped {} farmable entries outside or repeated in the {}x{} grid",
            before - layout.farmable.len(),
            cols,
            rows
        );
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_layout_is_in_bounds() {
        let layout = builtin_layout();
        assert!(!layout.farmable.is_empty());
        assert!(layout.farmable.iter().all(|&(r, c)| r < layout.rows && c < layout.cols));
        let width = layout.cols as f32 * TILE_SIZE;
        let height = layout.rows as f32 * TILE_SIZE;
        assert!(layout.player_start.0 < width && layout.player_start.1 < height);
    }

    #[test]
    fn missing_map_falls_back_to_builtin() {
        assert_eq!(load_layout(Path::new("nowhere/farm.ron")), builtin_layout());
    }

    #[test]
    fn shipped_map_parses() {
        let layout = read_ron::<WorldLayout>(Path::new(FARM_MAP_PATH)).expect("assets/maps/farm.ron parses");
        assert!(layout.rows > 0 && layout.cols > 0);
        assert!(!layout.farmable.is_empty());
    }
}
