//! World domain plugin for Farmland.
//!
//! Responsible for:
//! - Drawing the ground and the interaction spots (bed, trader)
//! - Fruit trees: chopping, apple drops, rainy-day fruit regrowth

use bevy::prelude::*;

use crate::shared::*;

pub mod trees;

use trees::{handle_axe_on_trees, regrow_fruit_on_rain, spawn_trees, sync_apple_sprites};

/// Static map sprites (ground, bed, trader stall).
#[derive(Component, Debug)]
pub struct MapDecoration;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnExit(GameState::Loading),
            (spawn_map, spawn_trees).in_set(SetupSet::World),
        )
        .add_systems(
            Update,
            handle_axe_on_trees.run_if(in_state(GameState::Playing)),
        )
        // Listen for new days in any state so the event is never missed.
        .add_systems(Update, regrow_fruit_on_rain)
        .add_systems(PostUpdate, sync_apple_sprites);
    }
}

/// Size of the whole map in world units.
pub fn map_bounds(layout: &WorldLayout) -> Rect {
    MapRect::new(
        0.0,
        0.0,
        layout.cols as f32 * TILE_SIZE,
        layout.rows as f32 * TILE_SIZE,
    )
    .to_world()
}

fn spawn_map(mut commands: Commands, layout: Res<WorldLayout>) {
    let bounds = map_bounds(&layout);
    commands.spawn((
        Sprite {
            color: Color::srgb(0.42, 0.62, 0.30),
            custom_size: Some(bounds.size()),
            ..default()
        },
        Transform::from_translation(bounds.center().extend(0.0)),
        MapDecoration,
    ));

    for (rect, color) in [
        (layout.bed, Color::srgb(0.75, 0.35, 0.35)),
        (layout.trader, Color::srgb(0.55, 0.40, 0.70)),
    ] {
        let world = rect.to_world();
        commands.spawn((
            Sprite {
                color,
                custom_size: Some(world.size()),
                ..default()
            },
            Transform::from_translation(world.center().extend(0.5)),
            MapDecoration,
        ));
    }
    info!("[World] Map {}x{} ready", layout.cols, layout.rows);
}
