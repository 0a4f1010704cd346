mod camera;
mod interaction;
mod movement;
mod spawn;
mod tools;

pub use interaction::{add_items_to_inventory, apply_item_pickups, spot_at, Spot};
pub use tools::{plant_request, tool_target};

use bevy::prelude::*;
use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerState>();

        // -- Spawn after the world is built and any save restored --
        app.add_systems(
            OnExit(GameState::Loading),
            spawn::spawn_player.in_set(SetupSet::Spawn),
        );

        // -- Systems that run every frame while Playing --
        app.add_systems(
            Update,
            (
                tools::tool_cycle,
                tools::seed_cycle,
                tools::tool_use.after(movement::player_movement),
                tools::plant_selected_seed.after(movement::player_movement),
                movement::player_movement,
                interaction::interact,
                camera::camera_follow_player.after(movement::player_movement),
            )
                .run_if(in_state(GameState::Playing)),
        );

        // -- Pickups land in any state so none are lost --
        app.add_systems(Update, interaction::add_items_to_inventory);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Helpers shared across sub-modules
// ═══════════════════════════════════════════════════════════════════════════

/// Where a tool lands relative to the player's centre, by facing.
pub fn facing_offset(facing: Facing) -> Vec2 {
    match facing {
        Facing::Left => Vec2::new(-50.0, -40.0),
        Facing::Right => Vec2::new(50.0, -40.0),
        Facing::Up => Vec2::new(0.0, 10.0),
        Facing::Down => Vec2::new(0.0, -50.0),
    }
}

/// The player's collision box around its centre.
pub const PLAYER_HITBOX: Vec2 = Vec2::new(40.0, 48.0);

pub fn player_rect(center: Vec2) -> Rect {
    Rect::from_center_size(center, PLAYER_HITBOX)
}
