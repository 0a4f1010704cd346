use bevy::prelude::*;
use crate::shared::*;
use super::PLAYER_HITBOX;

/// Continuous movement at `speed` px/s from the input axis. Updates facing
/// and keeps the player inside the map. The position is mirrored into
/// `PlayerState` so saves and the chat status see it.
pub fn player_movement(
    time: Res<Time>,
    input: Res<PlayerInput>,
    layout: Res<WorldLayout>,
    mut player_state: ResMut<PlayerState>,
    mut query: Query<(&mut Transform, &mut PlayerMovement), With<Player>>,
) {
    let Ok((mut transform, mut movement)) = query.get_single_mut() else {
        return;
    };

    let dir = input.move_axis;
    if dir == Vec2::ZERO {
        return;
    }

    // Vertical wins on diagonals; that feels better approaching plots.
    movement.facing = if dir.y.abs() >= dir.x.abs() {
        if dir.y > 0.0 { Facing::Up } else { Facing::Down }
    } else if dir.x > 0.0 {
        Facing::Right
    } else {
        Facing::Left
    };

    let delta = dir.normalize_or_zero() * movement.speed * time.delta_secs();
    let next = clamp_to_map(transform.translation.truncate() + delta, &layout);
    transform.translation.x = next.x;
    transform.translation.y = next.y;

    player_state.pos_x = next.x;
    player_state.pos_y = next.y;
}

/// Keep the player's whole hitbox on the map.
pub fn clamp_to_map(point: Vec2, layout: &WorldLayout) -> Vec2 {
    let width = layout.cols as f32 * TILE_SIZE;
    let height = layout.rows as f32 * TILE_SIZE;
    let half = PLAYER_HITBOX / 2.0;
    Vec2::new(
        point.x.clamp(half.x, (width - half.x).max(half.x)),
        point.y.clamp((-height + half.y).min(-half.y), -half.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_layout;

    #[test]
    fn clamp_keeps_player_on_map() {
        let layout = builtin_layout();
        let inside = Vec2::new(500.0, -500.0);
        assert_eq!(clamp_to_map(inside, &layout), inside);

        let clamped = clamp_to_map(Vec2::new(-100.0, 100.0), &layout);
        assert_eq!(clamped, Vec2::new(PLAYER_HITBOX.x / 2.0, -PLAYER_HITBOX.y / 2.0));
    }
}
