//! Soil shape classification from the four-neighbour `Tilled` pattern.

use bevy::prelude::*;
use std::collections::HashMap;

use super::grid::{TileGrid, TilePos, TilledNeighbours};

/// One of the 16 soil tile variants. Named after the tilled neighbours that
/// connect to the tile. The code on each variant is the artwork's name for it,
/// after the open edges of the sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeId {
    /// `x`
    AllSides,
    /// `r`
    LeftOnly,
    /// `l`
    RightOnly,
    /// `lr`
    LeftRight,
    /// `b`
    TopOnly,
    /// `t`
    BottomOnly,
    /// `tb`
    TopBottom,
    /// `tr`
    LeftBottom,
    /// `tl`
    RightBottom,
    /// `br`
    LeftTop,
    /// `bl`
    RightTop,
    /// `tbr`
    TopBottomRight,
    /// `tbl`
    TopBottomLeft,
    /// `lrb`
    LeftRightTop,
    /// `lrt`
    LeftRightBottom,
    /// `o`
    Isolated,
}

impl ShapeId {
    pub const ALL: [ShapeId; 16] = [
        ShapeId::AllSides,
        ShapeId::LeftOnly,
        ShapeId::RightOnly,
        ShapeId::LeftRight,
        ShapeId::TopOnly,
        ShapeId::BottomOnly,
        ShapeId::TopBottom,
        ShapeId::LeftBottom,
        ShapeId::RightBottom,
        ShapeId::LeftTop,
        ShapeId::RightTop,
        ShapeId::TopBottomRight,
        ShapeId::TopBottomLeft,
        ShapeId::LeftRightTop,
        ShapeId::LeftRightBottom,
        ShapeId::Isolated,
    ];

    /// Frame in the 4×4 soil atlas (row-major, same order as `ALL`).
    pub fn atlas_index(self) -> usize {
        ShapeId::ALL.iter().position(|s| *s == self).unwrap_or(15)
    }
}

/// First matching rule wins; the order matters for the corner cases, which
/// also match when a third neighbour is tilled.
pub fn classify(up: bool, down: bool, left: bool, right: bool) -> ShapeId {
    if up && down && left && right {
        ShapeId::AllSides
    } else if left && !(up || down || right) {
        ShapeId::LeftOnly
    } else if right && !(up || down || left) {
        ShapeId::RightOnly
    } else if left && right && !(up || down) {
        ShapeId::LeftRight
    } else if up && !(down || left || right) {
        ShapeId::TopOnly
    } else if down && !(up || left || right) {
        ShapeId::BottomOnly
    } else if up && down && !(left || right) {
        ShapeId::TopBottom
    } else if left && down && !(up || right) {
        ShapeId::LeftBottom
    } else if right && down && !(up || left) {
        ShapeId::RightBottom
    } else if left && up && !(down || right) {
        ShapeId::LeftTop
    } else if right && up && !(down || left) {
        ShapeId::RightTop
    } else if up && down && right && !left {
        ShapeId::TopBottomRight
    } else if up && down && left && !right {
        ShapeId::TopBottomLeft
    } else if left && right && up && !down {
        ShapeId::LeftRightTop
    } else if left && right && down && !up {
        ShapeId::LeftRightBottom
    } else {
        ShapeId::Isolated
    }
}

fn classify_neighbours(n: TilledNeighbours) -> ShapeId {
    classify(n.up, n.down, n.left, n.right)
}

/// Shape of a tilled tile, `None` for untilled ones.
pub fn shape_at(grid: &TileGrid, pos: TilePos) -> Option<ShapeId> {
    grid.is_tilled(pos)
        .then(|| classify_neighbours(grid.tilled_neighbours(pos)))
}

/// Render cache of the current shape of every tilled tile. Always derived
/// from the grid; never saved.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SoilShapes {
    shapes: HashMap<TilePos, ShapeId>,
}

impl SoilShapes {
    /// Full reconstruction, used after world load and save restore.
    pub fn from_grid(grid: &TileGrid) -> Self {
        let shapes = grid
            .tiles()
            .filter_map(|(pos, _)| shape_at(grid, pos).map(|shape| (pos, shape)))
            .collect();
        Self { shapes }
    }

    /// Live update after tilling: the tile and its four neighbours.
    pub fn refresh_around(&mut self, grid: &TileGrid, pos: TilePos) {
        let around = [Some(pos), pos.up(), pos.down(), pos.left(), pos.right()];
        for p in around.into_iter().flatten() {
            match shape_at(grid, p) {
                Some(shape) => {
                    self.shapes.insert(p, shape);
                }
                None => {
                    self.shapes.remove(&p);
                }
            }
        }
    }

    pub fn get(&self, pos: TilePos) -> Option<ShapeId> {
        self.shapes.get(&pos).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TilePos, ShapeId)> + '_ {
        self.shapes.iter().map(|(pos, shape)| (*pos, *shape))
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_combination_matches_the_table() {
        // (up, down, left, right) → expected
        let table = [
            ((false, false, false, false), ShapeId::Isolated),
            ((true, true, true, true), ShapeId::AllSides),
            ((false, false, true, false), ShapeId::LeftOnly),
            ((false, false, false, true), ShapeId::RightOnly),
            ((false, false, true, true), ShapeId::LeftRight),
            ((true, false, false, false), ShapeId::TopOnly),
            ((false, true, false, false), ShapeId::BottomOnly),
            ((true, true, false, false), ShapeId::TopBottom),
            ((false, true, true, false), ShapeId::LeftBottom),
            ((false, true, false, true), ShapeId::RightBottom),
            ((true, false, true, false), ShapeId::LeftTop),
            ((true, false, false, true), ShapeId::RightTop),
            ((true, true, false, true), ShapeId::TopBottomRight),
            ((true, true, true, false), ShapeId::TopBottomLeft),
            ((true, false, true, true), ShapeId::LeftRightTop),
            ((false, true, true, true), ShapeId::LeftRightBottom),
        ];
        for ((up, down, left, right), expected) in table {
            assert_eq!(classify(up, down, left, right), expected, "u={up} d={down} l={left} r={right}");
        }
    }

    #[test]
    fn atlas_indices_follow_declaration_order() {
        for (i, shape) in ShapeId::ALL.iter().enumerate() {
            assert_eq!(shape.atlas_index(), i);
        }
    }

    #[test]
    fn grid_edges_count_as_untilled() {
        let mut grid = TileGrid::new(2, 2);
        for (r, c) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            grid.mark_tillable(TilePos::new(r, c));
            grid.till(TilePos::new(r, c));
        }
        assert_eq!(shape_at(&grid, TilePos::new(0, 0)), Some(ShapeId::RightBottom));
        assert_eq!(shape_at(&grid, TilePos::new(1, 1)), Some(ShapeId::LeftTop));
    }

    #[test]
    fn refresh_around_updates_neighbours() {
        let mut grid = TileGrid::new(3, 3);
        for r in 0..3 {
            for c in 0..3 {
                grid.mark_tillable(TilePos::new(r, c));
            }
        }
        let centre = TilePos::new(1, 1);
        let east = TilePos::new(1, 2);

        grid.till(centre);
        let mut shapes = SoilShapes::from_grid(&grid);
        assert_eq!(shapes.get(centre), Some(ShapeId::Isolated));

        grid.till(east);
        shapes.refresh_around(&grid, east);
        assert_eq!(shapes.get(centre), Some(ShapeId::RightOnly));
        assert_eq!(shapes.get(east), Some(ShapeId::LeftOnly));
        assert_eq!(shapes, SoilShapes::from_grid(&grid));
    }

    #[test]
    fn untilled_tiles_have_no_shape() {
        let mut grid = TileGrid::new(1, 1);
        grid.mark_tillable(TilePos::new(0, 0));
        assert_eq!(shape_at(&grid, TilePos::new(0, 0)), None);
        assert!(SoilShapes::from_grid(&grid).is_empty());
    }
}
