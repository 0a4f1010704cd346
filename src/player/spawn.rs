use bevy::prelude::*;
use crate::shared::*;
use super::PLAYER_HITBOX;

/// Spawn the player entity at the position held in `PlayerState`, which is
/// either the map start or a restored save. Runs once when leaving Loading.
pub fn spawn_player(
    mut commands: Commands,
    player_state: Res<PlayerState>,
    existing: Query<Entity, With<Player>>,
) {
    if !existing.is_empty() {
        return;
    }

    commands.spawn((
        Player,
        PlayerMovement::default(),
        // Placeholder sprite: a blue box the size of the hitbox
        Sprite {
            color: Color::srgb(0.2, 0.5, 0.8),
            custom_size: Some(PLAYER_HITBOX),
            ..default()
        },
        // Z = 10 so the player draws above soil and crops.
        Transform::from_translation(player_state.position().extend(10.0)),
        Visibility::default(),
    ));
    info!("[Player] Spawned at ({:.0}, {:.0})", player_state.pos_x, player_state.pos_y);
}
