//! Contact harvest: walking into a ripe crop picks it.

use bevy::prelude::*;
use crate::shared::*;
use super::crops::CropInstance;
use super::grid::{TileGrid, TilePos};

/// Size of the player's harvest box, centred on the player.
pub const HARVEST_REACH: Vec2 = Vec2::new(TILE_SIZE * 0.5, TILE_SIZE * 0.5);

pub fn harvest_rect(player_pos: Vec2) -> Rect {
    Rect::from_center_size(player_pos, HARVEST_REACH)
}

/// Harvest every ripe crop whose tile overlaps `reach`.
pub fn harvest_touching(grid: &mut TileGrid, reach: Rect) -> Vec<CropInstance> {
    let ripe: Vec<TilePos> = grid
        .crops()
        .filter(|crop| crop.is_harvestable())
        .filter(|crop| !crop.tile.world_rect().intersect(reach).is_empty())
        .map(|crop| crop.tile)
        .collect();

    ripe.into_iter().filter_map(|pos| grid.harvest(pos)).collect()
}

pub fn harvest_on_contact(
    player_query: Query<&Transform, With<Player>>,
    mut grid: ResMut<TileGrid>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
    mut harvested_events: EventWriter<CropHarvestedEvent>,
) {
    let Ok(transform) = player_query.get_single() else {
        return;
    };
    let reach = harvest_rect(transform.translation.truncate());

    // Avoid flagging the grid as changed every frame.
    let any_ripe = grid
        .crops()
        .any(|c| c.is_harvestable() && !c.tile.world_rect().intersect(reach).is_empty());
    if !any_ripe {
        return;
    }

    for crop in harvest_touching(&mut grid, reach) {
        info!(
            "[Farming] Harvested {} at ({}, {})",
            crop.kind.display_name(),
            crop.tile.row,
            crop.tile.col
        );
        pickup_events.send(ItemPickupEvent { item: crop.kind.item(), quantity: 1 });
        harvested_events.send(CropHarvestedEvent {
            kind: crop.kind,
            row: crop.tile.row,
            col: crop.tile.col,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Feedback
// ─────────────────────────────────────────────────────────────────────────────

const SPARKLE_SECS: f32 = 0.6;
const SPARKLE_Z: f32 = 4.0;

/// Short-lived flash over a freshly harvested tile. Rises and fades out.
#[derive(Component, Debug, Clone)]
pub struct HarvestSparkle {
    pub lifetime: Timer,
    pub velocity: Vec2,
}

impl Default for HarvestSparkle {
    fn default() -> Self {
        Self {
            lifetime: Timer::from_seconds(SPARKLE_SECS, TimerMode::Once),
            velocity: Vec2::new(0.0, 24.0),
        }
    }
}

impl HarvestSparkle {
    /// 1.0 at spawn, 0.0 once the lifetime is spent.
    pub fn alpha(&self) -> f32 {
        (1.0 - self.lifetime.fraction()).clamp(0.0, 1.0)
    }
}

pub fn spawn_harvest_feedback(mut commands: Commands, mut harvested: EventReader<CropHarvestedEvent>) {
    for event in harvested.read() {
        let center = TilePos::new(event.row, event.col).world_center();
        commands.spawn((
            HarvestSparkle::default(),
            Sprite {
                color: Color::srgba(1.0, 0.95, 0.6, 1.0),
                custom_size: Some(Vec2::splat(TILE_SIZE * 0.4)),
                ..default()
            },
            Transform::from_translation(center.extend(SPARKLE_Z)),
        ));
        debug!("[Farming] Harvest feedback for {} at ({}, {})", event.kind.display_name(), event.row, event.col);
    }
}

pub fn update_harvest_feedback(
    mut commands: Commands,
    time: Res<Time>,
    mut sparkles: Query<(Entity, &mut HarvestSparkle, &mut Transform, &mut Sprite)>,
) {
    let dt = time.delta_secs();
    for (entity, mut sparkle, mut transform, mut sprite) in &mut sparkles {
        sparkle.lifetime.tick(time.delta());
        transform.translation += (sparkle.velocity * dt).extend(0.0);
        sprite.color = sprite.color.with_alpha(sparkle.alpha());
        if sparkle.lifetime.finished() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::farming::crops::grow_all;

    fn planted(pos: TilePos) -> TileGrid {
        let mut grid = TileGrid::new(4, 4);
        grid.mark_tillable(pos);
        grid.till(pos);
        grid.plant(pos, CropKind::Corn);
        grid
    }

    fn ripen(grid: &mut TileGrid) {
        for _ in 0..CropKind::Corn.frame_count() {
            grid.water_all();
            grow_all(grid);
            grid.remove_all_water();
        }
    }

    #[test]
    fn unripe_crops_stay_put() {
        let pos = TilePos::new(1, 1);
        let mut grid = planted(pos);
        let taken = harvest_touching(&mut grid, harvest_rect(pos.world_center()));
        assert!(taken.is_empty());
        assert!(grid.crop(pos).is_some());
    }

    #[test]
    fn ripe_crop_under_player_is_harvested() {
        let pos = TilePos::new(1, 1);
        let mut grid = planted(pos);
        ripen(&mut grid);

        let taken = harvest_touching(&mut grid, harvest_rect(pos.world_center()));
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].kind, CropKind::Corn);
        assert!(grid.crop(pos).is_none());
        assert!(grid.is_tilled(pos));
    }

    #[test]
    fn distant_player_harvests_nothing() {
        let pos = TilePos::new(1, 1);
        let mut grid = planted(pos);
        ripen(&mut grid);

        let far = TilePos::new(3, 3).world_center();
        assert!(harvest_touching(&mut grid, harvest_rect(far)).is_empty());
        assert!(grid.crop(pos).is_some());
    }

    #[test]
    fn sparkle_fades_over_its_lifetime() {
        let mut sparkle = HarvestSparkle::default();
        assert_eq!(sparkle.alpha(), 1.0);
        sparkle.lifetime.tick(std::time::Duration::from_secs_f32(SPARKLE_SECS / 2.0));
        assert!((sparkle.alpha() - 0.5).abs() < 1e-3);
        sparkle.lifetime.tick(std::time::Duration::from_secs(1));
        assert_eq!(sparkle.alpha(), 0.0);
    }

    #[test]
    fn harvest_event_spawns_sparkle_on_its_tile() {
        let mut app = App::new();
        app.add_event::<CropHarvestedEvent>()
            .add_systems(Update, spawn_harvest_feedback);
        app.world_mut().send_event(CropHarvestedEvent { kind: CropKind::Tomato, row: 2, col: 1 });
        app.update();

        let world = app.world_mut();
        let mut query = world.query_filtered::<&Transform, With<HarvestSparkle>>();
        let spawned: Vec<Vec2> = query.iter(world).map(|t| t.translation.truncate()).collect();
        assert_eq!(spawned, vec![TilePos::new(2, 1).world_center()]);
    }
}
