//! Rain drops: short slanted streaks spawned around the camera while it rains.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

/// Cap on live drops.
const MAX_RAIN_DROPS: usize = 400;
const DROPS_PER_FRAME: usize = 4;
const Z_RAIN: f32 = 20.0;

/// A falling drop. Lives a fraction of a second, then vanishes.
#[derive(Component, Debug, Clone)]
pub struct RainDrop {
    pub velocity: Vec2,
    pub lifetime: Timer,
}

impl RainDrop {
    /// Slants down and to the left, like wind-blown rain.
    pub fn new(speed: f32, lifetime_secs: f32) -> Self {
        Self {
            velocity: Vec2::new(-2.0, -4.0).normalize() * speed,
            lifetime: Timer::from_seconds(lifetime_secs, TimerMode::Once),
        }
    }
}

/// Random drops inside `area`, at most `budget` of them.
pub fn roll_drops(rng: &mut impl Rng, area: Rect, budget: usize) -> Vec<(Vec2, RainDrop)> {
    (0..DROPS_PER_FRAME.min(budget))
        .map(|_| {
            let pos = Vec2::new(
                rng.gen_range(area.min.x..=area.max.x),
                rng.gen_range(area.min.y..=area.max.y),
            );
            (pos, RainDrop::new(rng.gen_range(200.0..=250.0), rng.gen_range(0.4..=0.5)))
        })
        .collect()
}

pub fn spawn_rain_drops(
    mut commands: Commands,
    day: Res<DayCycle>,
    camera_query: Query<&Transform, With<Camera2d>>,
    drops: Query<(), With<RainDrop>>,
) {
    if !day.raining {
        return;
    }
    let Ok(camera) = camera_query.get_single() else {
        return;
    };
    let existing = drops.iter().count();
    if existing >= MAX_RAIN_DROPS {
        return;
    }

    let view = Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) * camera.scale.truncate();
    let area = Rect::from_center_size(camera.translation.truncate(), view);
    for (pos, drop) in roll_drops(&mut rand::thread_rng(), area, MAX_RAIN_DROPS - existing) {
        commands.spawn((
            Sprite {
                color: Color::srgba(0.75, 0.82, 1.0, 0.7),
                custom_size: Some(Vec2::new(2.0, 9.0)),
                ..default()
            },
            Transform::from_translation(pos.extend(Z_RAIN))
                .with_rotation(Quat::from_rotation_z(drop.velocity.to_angle() - std::f32::consts::FRAC_PI_2)),
            drop,
        ));
    }
}

pub fn update_rain_drops(
    mut commands: Commands,
    time: Res<Time>,
    mut drops: Query<(Entity, &mut RainDrop, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut drop, mut transform) in &mut drops {
        drop.lifetime.tick(time.delta());
        transform.translation += (drop.velocity * dt).extend(0.0);
        if drop.lifetime.finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Clear leftover drops once the sky dries up.
pub fn clear_rain_drops(mut commands: Commands, day: Res<DayCycle>, drops: Query<Entity, With<RainDrop>>) {
    if day.raining {
        return;
    }
    for entity in &drops {
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn drops_land_inside_the_view() {
        let mut rng = StdRng::seed_from_u64(11);
        let area = Rect::new(-100.0, -50.0, 100.0, 50.0);
        let drops = roll_drops(&mut rng, area, MAX_RAIN_DROPS);
        assert_eq!(drops.len(), DROPS_PER_FRAME);
        for (pos, drop) in &drops {
            assert!(area.contains(*pos));
            assert!(drop.velocity.y < 0.0 && drop.velocity.x < 0.0);
            let secs = drop.lifetime.duration().as_secs_f32();
            assert!((0.4..=0.5).contains(&secs));
        }
    }

    #[test]
    fn budget_limits_new_drops() {
        let mut rng = StdRng::seed_from_u64(12);
        let area = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(roll_drops(&mut rng, area, 1).len(), 1);
        assert!(roll_drops(&mut rng, area, 0).is_empty());
    }

    #[test]
    fn dry_day_clears_drops() {
        let mut app = App::new();
        app.insert_resource(DayCycle { raining: true, ..DayCycle::default() })
            .add_systems(Update, clear_rain_drops);
        app.world_mut().spawn(RainDrop::new(200.0, 0.5));
        app.update();
        let mut drops = app.world_mut().query::<&RainDrop>();
        assert_eq!(drops.iter(app.world()).count(), 1);

        app.world_mut().resource_mut::<DayCycle>().raining = false;
        app.update();
        assert_eq!(drops.iter(app.world()).count(), 0);
    }
}
