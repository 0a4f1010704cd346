//! Calendar domain: the day clock of Farmland.
//!
//! Responsible for:
//! - Advancing the day clock while the game is in `Playing`
//! - Turning an expired clock or a sleep request into exactly one rollover
//! - Rolling the new day's rain
//! - Sending `DayStartEvent` so farming and trees can react
//! - Tinting the sky by time of day and weather
//! - Drawing rain drops while it rains

pub mod rain;
pub mod sky;

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;
use sky::SkyTint;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DayCycle>()
            .init_resource::<SkyTint>()
            .add_systems(OnExit(GameState::Loading), (apply_day_length, sky::spawn_sky_overlay))
            // Clock only runs in Playing, so the shop and chat freeze time.
            .add_systems(
                Update,
                tick_day_cycle.run_if(in_state(GameState::Playing)),
            )
            .add_systems(Update, process_day_end.after(tick_day_cycle))
            .add_systems(
                Update,
                (sky::update_sky_tint, sky::apply_sky_overlay)
                    .chain()
                    .after(process_day_end)
                    .run_if(not(in_state(GameState::Loading))),
            )
            .add_systems(
                Update,
                (rain::clear_rain_drops, rain::spawn_rain_drops, rain::update_rain_drops)
                    .chain()
                    .after(process_day_end)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn apply_day_length(config: Res<GameConfig>, mut day: ResMut<DayCycle>) {
    day.day_length = DayCycle::with_day_length(config.day_length_secs).day_length;
    info!("[Calendar] Day {} begins, {}s per day", day.day, day.day_length);
}

/// Pure rain roll, so tests can pass a seeded rng.
pub fn roll_rain(rng: &mut impl Rng, chance: f64) -> bool {
    rng.gen_bool(chance.clamp(0.0, 1.0))
}

// ─── Clock ────────────────────────────────────────────────────────────────────

pub fn tick_day_cycle(
    time: Res<Time>,
    mut day: ResMut<DayCycle>,
    mut day_end_events: EventWriter<DayEndEvent>,
) {
    if day.advance(time.delta_secs()) {
        day_end_events.send(DayEndEvent { day: day.day, cause: DayEndCause::Timer });
    }
}

// ─── Rollover ─────────────────────────────────────────────────────────────────

/// Collapses every `DayEndEvent` raised this frame into one rollover: a sleep
/// request landing on the same frame the clock runs out must not skip a day.
pub fn process_day_end(
    mut day_end_events: EventReader<DayEndEvent>,
    mut day: ResMut<DayCycle>,
    config: Res<GameConfig>,
    mut day_start_events: EventWriter<DayStartEvent>,
) {
    let Some(event) = day_end_events.read().last().cloned() else {
        return;
    };

    info!("[Calendar] Day {} ended ({:?})", event.day, event.cause);

    let raining = roll_rain(&mut rand::thread_rng(), config.rain_chance);
    day.begin_next_day(raining);

    info!(
        "[Calendar] New day: Day {}{}",
        day.day,
        if raining { ", raining" } else { "" }
    );
    day_start_events.send(DayStartEvent { day: day.day, raining });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn rain_chance_extremes() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!((0..50).all(|_| !roll_rain(&mut rng, 0.0)));
        assert!((0..50).all(|_| roll_rain(&mut rng, 1.0)));
        // Out-of-range chances are clamped rather than panicking.
        assert!(roll_rain(&mut rng, 3.0));
        assert!(!roll_rain(&mut rng, -1.0));
    }

    #[test]
    fn clock_requests_rollover_once_day_is_spent() {
        let mut day = DayCycle::with_day_length(10.0);
        assert!(!day.advance(4.0));
        assert!(!day.advance(5.9));
        assert!(day.advance(0.2));
        assert_eq!(day.elapsed, 10.0);

        day.begin_next_day(true);
        assert_eq!(day.day, 2);
        assert_eq!(day.elapsed, 0.0);
        assert!(day.raining);
        assert!(day.force_daylight);
    }

    #[test]
    fn progress_is_clamped() {
        let mut day = DayCycle::with_day_length(60.0);
        day.advance(30.0);
        assert!((day.progress() - 0.5).abs() < f32::EPSILON);
        day.advance(1000.0);
        assert_eq!(day.progress(), 1.0);
    }

    #[test]
    fn invalid_day_length_falls_back() {
        assert_eq!(DayCycle::with_day_length(0.0).day_length, DAY_LENGTH_SECS);
        assert_eq!(DayCycle::with_day_length(-5.0).day_length, DAY_LENGTH_SECS);
    }
}
