//! Tile grid: marker sets per tile plus the crops attached to planted tiles.
//!
//! Every mutator is total: out-of-range coordinates and illegal transitions
//! are rejected by returning `false`/`None`, never by panicking.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::shared::*;
use super::crops::CropInstance;

// ─────────────────────────────────────────────────────────────────────────────
// Coordinates
// ─────────────────────────────────────────────────────────────────────────────

/// Grid coordinate. Rows grow downward like the ground image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TilePos {
    pub row: usize,
    pub col: usize,
}

impl TilePos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn up(self) -> Option<Self> {
        self.row.checked_sub(1).map(|row| Self::new(row, self.col))
    }

    pub fn down(self) -> Option<Self> {
        self.row.checked_add(1).map(|row| Self::new(row, self.col))
    }

    pub fn left(self) -> Option<Self> {
        self.col.checked_sub(1).map(|col| Self::new(self.row, col))
    }

    pub fn right(self) -> Option<Self> {
        self.col.checked_add(1).map(|col| Self::new(self.row, col))
    }

    /// World-space centre of the tile.
    pub fn world_center(self) -> Vec2 {
        Vec2::new(
            self.col as f32 * TILE_SIZE + TILE_SIZE / 2.0,
            -(self.row as f32 * TILE_SIZE + TILE_SIZE / 2.0),
        )
    }

    /// World-space rectangle covered by the tile.
    pub fn world_rect(self) -> Rect {
        Rect::from_center_size(self.world_center(), Vec2::splat(TILE_SIZE))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Markers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    Farmable,
    Tilled,
    Watered,
    Planted,
}

impl Marker {
    pub const ALL: [Marker; 4] = [Marker::Farmable, Marker::Tilled, Marker::Watered, Marker::Planted];

    fn bit(self) -> u8 {
        match self {
            Marker::Farmable => 0b0001,
            Marker::Tilled => 0b0010,
            Marker::Watered => 0b0100,
            Marker::Planted => 0b1000,
        }
    }

    /// Single-character code used in save files.
    pub fn code(self) -> &'static str {
        match self {
            Marker::Farmable => "F",
            Marker::Tilled => "X",
            Marker::Watered => "W",
            Marker::Planted => "P",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "F" => Some(Marker::Farmable),
            "X" => Some(Marker::Tilled),
            "W" => Some(Marker::Watered),
            "P" => Some(Marker::Planted),
            _ => None,
        }
    }
}

/// The set of markers on one tile, packed into a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileMarkers(u8);

impl TileMarkers {
    pub const EMPTY: TileMarkers = TileMarkers(0);

    pub fn contains(self, marker: Marker) -> bool {
        self.0 & marker.bit() != 0
    }

    /// Returns true if the marker was not already present.
    pub fn insert(&mut self, marker: Marker) -> bool {
        let added = !self.contains(marker);
        self.0 |= marker.bit();
        added
    }

    /// Returns true if the marker was present.
    pub fn remove(&mut self, marker: Marker) -> bool {
        let removed = self.contains(marker);
        self.0 &= !marker.bit();
        removed
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Marker> {
        Marker::ALL.into_iter().filter(move |m| self.contains(*m))
    }

    /// `Watered`/`Planted` need `Tilled`; `Tilled` needs `Farmable`.
    pub fn is_consistent(self) -> bool {
        let tilled = self.contains(Marker::Tilled);
        (!tilled || self.contains(Marker::Farmable))
            && (tilled || !(self.contains(Marker::Watered) || self.contains(Marker::Planted)))
    }
}

impl FromIterator<Marker> for TileMarkers {
    fn from_iter<I: IntoIterator<Item = Marker>>(iter: I) -> Self {
        let mut markers = TileMarkers::EMPTY;
        for marker in iter {
            markers.insert(marker);
        }
        markers
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grid
// ─────────────────────────────────────────────────────────────────────────────

/// Neighbour `Tilled` flags in classifier order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilledNeighbours {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Owns every tile's markers and the crop living on each planted tile.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct TileGrid {
    rows: usize,
    cols: usize,
    cells: Vec<TileMarkers>,
    crops: BTreeMap<TilePos, CropInstance>,
}

impl TileGrid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![TileMarkers::EMPTY; rows * cols],
            crops: BTreeMap::new(),
        }
    }

    /// Fresh grid for a world layout, with every farmable tile marked.
    pub fn from_layout(layout: &WorldLayout) -> Self {
        let mut grid = Self::new(layout.rows, layout.cols);
        for &(row, col) in &layout.farmable {
            grid.mark_tillable(TilePos::new(row, col));
        }
        grid
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: TilePos) -> Option<usize> {
        self.in_bounds(pos).then(|| pos.row * self.cols + pos.col)
    }

    /// Markers on a tile; empty for out-of-range positions.
    pub fn markers(&self, pos: TilePos) -> TileMarkers {
        self.index(pos).map(|i| self.cells[i]).unwrap_or_default()
    }

    pub fn has(&self, pos: TilePos, marker: Marker) -> bool {
        self.markers(pos).contains(marker)
    }

    pub fn is_tilled(&self, pos: TilePos) -> bool {
        self.has(pos, Marker::Tilled)
    }

    pub fn is_watered(&self, pos: TilePos) -> bool {
        self.has(pos, Marker::Watered)
    }

    /// Every position in row-major order with its markers.
    pub fn tiles(&self) -> impl Iterator<Item = (TilePos, TileMarkers)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &markers)| (TilePos::new(i / cols, i % cols), markers))
    }

    /// Tile containing a world-space point (see `TilePos::world_center`).
    pub fn tile_at(&self, point: Vec2) -> Option<TilePos> {
        if !point.x.is_finite() || !point.y.is_finite() || point.x < 0.0 || point.y > 0.0 {
            return None;
        }
        let col = (point.x / TILE_SIZE).floor() as usize;
        let row = (-point.y / TILE_SIZE).floor() as usize;
        let pos = TilePos::new(row, col);
        self.in_bounds(pos).then_some(pos)
    }

    pub fn tilled_neighbours(&self, pos: TilePos) -> TilledNeighbours {
        let tilled = |p: Option<TilePos>| p.is_some_and(|p| self.is_tilled(p));
        TilledNeighbours {
            up: tilled(pos.up()),
            down: tilled(pos.down()),
            left: tilled(pos.left()),
            right: tilled(pos.right()),
        }
    }

    // ── mutators ────────────────────────────────────────────────────────────

    /// World load: mark a tile as farmable. Idempotent.
    pub fn mark_tillable(&mut self, pos: TilePos) {
        if let Some(i) = self.index(pos) {
            self.cells[i].insert(Marker::Farmable);
        }
    }

    /// Hoe a farmable, untilled tile.
    pub fn till(&mut self, pos: TilePos) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        let cell = &mut self.cells[i];
        if !cell.contains(Marker::Farmable) || cell.contains(Marker::Tilled) {
            return false;
        }
        cell.insert(Marker::Tilled)
    }

    /// Water a tilled, dry tile.
    pub fn water(&mut self, pos: TilePos) -> bool {
        let Some(i) = self.index(pos) else {
            return false;
        };
        let cell = &mut self.cells[i];
        if !cell.contains(Marker::Tilled) || cell.contains(Marker::Watered) {
            return false;
        }
        cell.insert(Marker::Watered)
    }

    /// Rain: water every dry tilled tile. Returns how many were watered.
    pub fn water_all(&mut self) -> usize {
        let mut watered = 0;
        for cell in &mut self.cells {
            if cell.contains(Marker::Tilled) && cell.insert(Marker::Watered) {
                watered += 1;
            }
        }
        watered
    }

    /// Dry out every tile. Returns how many tiles lost water.
    pub fn remove_all_water(&mut self) -> usize {
        self.cells
            .iter_mut()
            .filter_map(|cell| cell.remove(Marker::Watered).then_some(()))
            .count()
    }

    /// Plant a new crop on a tilled tile that has none. Water is not required.
    pub fn plant(&mut self, pos: TilePos, kind: CropKind) -> Option<&CropInstance> {
        let i = self.index(pos)?;
        let cell = &mut self.cells[i];
        if !cell.contains(Marker::Tilled) || cell.contains(Marker::Planted) {
            return None;
        }
        cell.insert(Marker::Planted);
        self.crops.insert(pos, CropInstance::new(kind, pos));
        self.crops.get(&pos)
    }

    /// Clear the `Planted` marker and hand the crop back to the caller, who
    /// credits the inventory. Maturity is the caller's check.
    pub fn harvest(&mut self, pos: TilePos) -> Option<CropInstance> {
        let i = self.index(pos)?;
        if !self.cells[i].remove(Marker::Planted) {
            return None;
        }
        self.crops.remove(&pos)
    }

    // ── crops ───────────────────────────────────────────────────────────────

    pub fn crop(&self, pos: TilePos) -> Option<&CropInstance> {
        self.crops.get(&pos)
    }

    pub fn crops(&self) -> impl Iterator<Item = &CropInstance> {
        self.crops.values()
    }

    pub fn crop_count(&self) -> usize {
        self.crops.len()
    }

    /// Each crop paired with its tile's current `Watered` marker.
    pub fn crops_with_water_mut(&mut self) -> impl Iterator<Item = (&mut CropInstance, bool)> + '_ {
        let cells = &self.cells;
        let cols = self.cols;
        self.crops.values_mut().map(move |crop| {
            let watered = cells
                .get(crop.tile.row * cols + crop.tile.col)
                .is_some_and(|cell| cell.contains(Marker::Watered));
            (crop, watered)
        })
    }

    // ── restore (save loading) ──────────────────────────────────────────────

    /// Overwrite a tile's markers wholesale. Rejects out-of-range positions
    /// and inconsistent marker sets.
    pub(crate) fn restore_markers(&mut self, pos: TilePos, markers: TileMarkers) -> bool {
        if !markers.is_consistent() {
            return false;
        }
        let Some(i) = self.index(pos) else {
            return false;
        };
        self.cells[i] = markers;
        true
    }

    /// Attach a reconstructed crop. Its tile must carry `Planted` and be free.
    pub(crate) fn restore_crop(&mut self, crop: CropInstance) -> bool {
        let pos = crop.tile;
        if !self.has(pos, Marker::Planted) || self.crops.contains_key(&pos) {
            return false;
        }
        self.crops.insert(pos, crop);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn farm_3x4() -> TileGrid {
        let mut grid = TileGrid::new(3, 4);
        for row in 0..3 {
            for col in 0..3 {
                grid.mark_tillable(TilePos::new(row, col));
            }
        }
        grid
    }

    #[test]
    fn till_requires_farmable() {
        let mut grid = farm_3x4();
        let outside = TilePos::new(1, 3);
        assert!(!grid.till(outside));
        assert_eq!(grid.markers(outside), TileMarkers::EMPTY);
    }

    #[test]
    fn till_twice_only_succeeds_once() {
        let mut grid = farm_3x4();
        let pos = TilePos::new(1, 1);
        assert!(grid.till(pos));
        assert!(!grid.till(pos));
        assert_eq!(grid.markers(pos).iter().filter(|m| *m == Marker::Tilled).count(), 1);
    }

    #[test]
    fn out_of_range_is_rejected_everywhere() {
        let mut grid = farm_3x4();
        let far = TilePos::new(99, 99);
        grid.mark_tillable(far);
        assert!(!grid.till(far));
        assert!(!grid.water(far));
        assert!(grid.plant(far, CropKind::Corn).is_none());
        assert!(grid.harvest(far).is_none());
        assert!(!grid.is_watered(far));
    }

    #[test]
    fn water_needs_tilled_and_dry() {
        let mut grid = farm_3x4();
        let pos = TilePos::new(0, 0);
        assert!(!grid.water(pos));
        grid.till(pos);
        assert!(grid.water(pos));
        assert!(!grid.water(pos));
        assert!(grid.is_watered(pos));
    }

    #[test]
    fn water_all_only_touches_tilled_tiles() {
        let mut grid = farm_3x4();
        grid.till(TilePos::new(0, 0));
        grid.till(TilePos::new(2, 2));
        grid.water(TilePos::new(2, 2));

        assert_eq!(grid.water_all(), 1);
        for (pos, markers) in grid.tiles() {
            assert_eq!(markers.contains(Marker::Watered), markers.contains(Marker::Tilled), "{pos:?}");
        }
    }

    #[test]
    fn remove_all_water_dries_everything() {
        let mut grid = farm_3x4();
        for (row, col) in [(0, 0), (0, 1), (1, 2)] {
            grid.till(TilePos::new(row, col));
        }
        grid.water_all();
        assert_eq!(grid.remove_all_water(), 3);
        assert!(grid.tiles().all(|(pos, _)| !grid.is_watered(pos)));
    }

    #[test]
    fn plant_needs_tilled_but_not_water() {
        let mut grid = farm_3x4();
        let pos = TilePos::new(1, 0);
        assert!(grid.plant(pos, CropKind::Tomato).is_none());
        grid.till(pos);
        let crop = grid.plant(pos, CropKind::Tomato).expect("tilled tile accepts a seed");
        assert_eq!(crop.kind, CropKind::Tomato);
        assert_eq!(crop.age(), 0.0);
        assert!(grid.has(pos, Marker::Planted));
    }

    #[test]
    fn no_double_planting() {
        let mut grid = farm_3x4();
        let pos = TilePos::new(2, 1);
        grid.till(pos);
        assert!(grid.plant(pos, CropKind::Corn).is_some());
        assert!(grid.plant(pos, CropKind::Tomato).is_none());
        assert_eq!(grid.crop(pos).map(|c| c.kind), Some(CropKind::Corn));
        assert_eq!(grid.crop_count(), 1);
    }

    #[test]
    fn harvest_detaches_crop_and_clears_marker() {
        let mut grid = farm_3x4();
        let pos = TilePos::new(0, 2);
        grid.till(pos);
        grid.plant(pos, CropKind::Corn);

        let crop = grid.harvest(pos).expect("planted tile yields its crop");
        assert_eq!(crop.tile, pos);
        assert!(!grid.has(pos, Marker::Planted));
        assert!(grid.is_tilled(pos));
        assert!(grid.crop(pos).is_none());
        assert!(grid.harvest(pos).is_none());
    }

    #[test]
    fn tile_at_maps_world_points() {
        let grid = farm_3x4();
        let pos = TilePos::new(2, 3);
        assert_eq!(grid.tile_at(pos.world_center()), Some(pos));
        assert_eq!(grid.tile_at(Vec2::new(1.0, -1.0)), Some(TilePos::new(0, 0)));
        assert_eq!(grid.tile_at(Vec2::new(-1.0, -1.0)), None);
        assert_eq!(grid.tile_at(Vec2::new(1.0, 5.0)), None);
        assert_eq!(grid.tile_at(Vec2::new(TILE_SIZE * 4.0 + 1.0, -1.0)), None);
    }

    #[test]
    fn marker_codes_round_trip() {
        for marker in Marker::ALL {
            assert_eq!(Marker::from_code(marker.code()), Some(marker));
        }
        assert_eq!(Marker::from_code("Q"), None);
    }

    #[test]
    fn consistency_rules() {
        let ok: TileMarkers = [Marker::Farmable, Marker::Tilled, Marker::Watered, Marker::Planted]
            .into_iter()
            .collect();
        assert!(ok.is_consistent());
        assert!(!TileMarkers::from_iter([Marker::Tilled]).is_consistent());
        assert!(!TileMarkers::from_iter([Marker::Farmable, Marker::Watered]).is_consistent());
        assert!(!TileMarkers::from_iter([Marker::Farmable, Marker::Planted]).is_consistent());
        assert!(TileMarkers::EMPTY.is_consistent());
    }
}
