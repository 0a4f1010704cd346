use bevy::prelude::*;
use crate::shared::*;

/// Smoothly follow the player with the camera, clamped to the map so the
/// viewport never shows past the edge.
pub fn camera_follow_player(
    time: Res<Time>,
    layout: Res<WorldLayout>,
    player_query: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut camera_query: Query<(&mut Transform, &OrthographicProjection), (With<Camera2d>, Without<Player>)>,
) {
    let Ok(player) = player_query.get_single() else {
        return;
    };
    let Ok((mut cam_tf, projection)) = camera_query.get_single_mut() else {
        return;
    };

    let target = player.translation.truncate();
    let current = cam_tf.translation.truncate();
    // Snap on teleports (save load); lerp otherwise.
    let next = if current.distance(target) > TILE_SIZE * 8.0 {
        target
    } else {
        current.lerp(target, (5.0 * time.delta_secs()).min(1.0))
    };

    let map_w = layout.cols as f32 * TILE_SIZE;
    let map_h = layout.rows as f32 * TILE_SIZE;
    let half_vw = projection.area.width() / 2.0 * cam_tf.scale.x;
    let half_vh = projection.area.height() / 2.0 * cam_tf.scale.y;

    let min_x = half_vw;
    let max_x = (map_w - half_vw).max(min_x);
    let max_y = -half_vh;
    let min_y = (-map_h + half_vh).min(max_y);

    cam_tf.translation.x = next.x.clamp(min_x, max_x);
    cam_tf.translation.y = next.y.clamp(min_y, max_y);
}
