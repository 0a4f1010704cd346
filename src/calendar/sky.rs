//! Sky tint: a full-screen overlay darkening toward dusk or under rain.

use bevy::prelude::*;

use crate::shared::*;

/// Colour channels in 0–255 space.
pub const DAY_COLOR: [f32; 3] = [255.0, 255.0, 255.0];
pub const NIGHT_COLOR: [f32; 3] = [38.0, 101.0, 189.0];
/// Channel units per second the tint moves toward its target.
pub const TINT_SPEED: f32 = 60.0;
/// Overlay alpha at full night.
const MAX_DARKNESS: f32 = 0.55;

#[derive(Component, Debug)]
pub struct SkyOverlay;

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SkyTint {
    pub current: [f32; 3],
    pub target: [f32; 3],
}

impl Default for SkyTint {
    fn default() -> Self {
        Self { current: DAY_COLOR, target: DAY_COLOR }
    }
}

impl SkyTint {
    /// Recompute the target and step `current` toward it.
    pub fn update(&mut self, progress: f32, raining: bool, dt: f32) {
        self.target = if raining {
            NIGHT_COLOR
        } else {
            let t = progress.clamp(0.0, 1.0);
            std::array::from_fn(|i| DAY_COLOR[i] + (NIGHT_COLOR[i] - DAY_COLOR[i]) * t)
        };
        let step = TINT_SPEED * dt.max(0.0);
        for (current, target) in self.current.iter_mut().zip(self.target) {
            let delta = (target - *current).clamp(-step, step);
            *current += delta;
        }
    }

    /// Jump straight to daylight, used on the first frame of a new day.
    pub fn force_day(&mut self) {
        self.current = DAY_COLOR;
        self.target = DAY_COLOR;
    }

    /// 0.0 in full daylight, 1.0 at the night colour.
    pub fn darkness(&self) -> f32 {
        let span: f32 = DAY_COLOR.iter().zip(NIGHT_COLOR).map(|(d, n)| d - n).sum();
        let gone: f32 = DAY_COLOR.iter().zip(self.current).map(|(d, c)| d - c).sum();
        (gone / span).clamp(0.0, 1.0)
    }

    pub fn color(&self) -> Color {
        let [r, g, b] = self.current.map(|c| c / 255.0);
        Color::srgba(r, g, b, self.darkness() * MAX_DARKNESS)
    }
}

pub fn spawn_sky_overlay(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::NONE),
        GlobalZIndex(-1),
        SkyOverlay,
    ));
}

pub fn update_sky_tint(
    time: Res<Time>,
    mut day: ResMut<DayCycle>,
    mut tint: ResMut<SkyTint>,
) {
    if day.force_daylight {
        tint.force_day();
        day.force_daylight = false;
        return;
    }
    tint.update(day.progress(), day.raining, time.delta_secs());
}

pub fn apply_sky_overlay(
    tint: Res<SkyTint>,
    mut overlays: Query<&mut BackgroundColor, With<SkyOverlay>>,
) {
    if !tint.is_changed() {
        return;
    }
    for mut background in &mut overlays {
        background.0 = tint.color();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tint_moves_at_bounded_speed() {
        let mut tint = SkyTint::default();
        tint.update(1.0, false, 1.0);
        assert_eq!(tint.target, NIGHT_COLOR);
        assert_eq!(tint.current, [195.0, 195.0, 195.0]);
    }

    #[test]
    fn rain_targets_night_colour_at_dawn() {
        let mut tint = SkyTint::default();
        tint.update(0.0, true, 0.1);
        assert_eq!(tint.target, NIGHT_COLOR);
        assert!(tint.darkness() > 0.0);
    }

    #[test]
    fn force_day_resets_instantly() {
        let mut tint = SkyTint::default();
        for _ in 0..20 {
            tint.update(1.0, false, 1.0);
        }
        assert_eq!(tint.current, NIGHT_COLOR);
        assert_eq!(tint.darkness(), 1.0);
        tint.force_day();
        assert_eq!(tint.current, DAY_COLOR);
        assert_eq!(tint.darkness(), 0.0);
    }
}
