use bevy::prelude::*;
use crate::shared::*;
use super::facing_offset;

/// World point a tool swing or seed lands on.
pub fn tool_target(center: Vec2, facing: Facing) -> Vec2 {
    center + facing_offset(facing)
}

/// Planting request for the selected seed, if the player has any.
pub fn plant_request(player: &PlayerState, center: Vec2, facing: Facing) -> Option<PlantSeedEvent> {
    let kind = player.selected_seed;
    (player.seed_count(kind) > 0).then(|| PlantSeedEvent { kind, point: tool_target(center, facing) })
}

/// Q: hoe → axe → water.
pub fn tool_cycle(input: Res<PlayerInput>, mut player_state: ResMut<PlayerState>) {
    if input.tool_next {
        player_state.selected_tool = player_state.selected_tool.next();
        debug!("[Player] Tool: {}", player_state.selected_tool.display_name());
    }
}

/// E: corn → tomato.
pub fn seed_cycle(input: Res<PlayerInput>, mut player_state: ResMut<PlayerState>) {
    if input.seed_next {
        player_state.selected_seed = player_state.selected_seed.next();
        debug!("[Player] Seed: {}", player_state.selected_seed.display_name());
    }
}

pub fn tool_use(
    input: Res<PlayerInput>,
    player_state: Res<PlayerState>,
    query: Query<(&Transform, &PlayerMovement), With<Player>>,
    mut tool_events: EventWriter<ToolUseEvent>,
) {
    if !input.tool_use {
        return;
    }
    let Ok((transform, movement)) = query.get_single() else {
        return;
    };
    tool_events.send(ToolUseEvent {
        tool: player_state.selected_tool,
        point: tool_target(transform.translation.truncate(), movement.facing),
    });
}

pub fn plant_selected_seed(
    input: Res<PlayerInput>,
    player_state: Res<PlayerState>,
    query: Query<(&Transform, &PlayerMovement), With<Player>>,
    mut plant_events: EventWriter<PlantSeedEvent>,
) {
    if !input.plant {
        return;
    }
    let Ok((transform, movement)) = query.get_single() else {
        return;
    };
    if let Some(request) = plant_request(&player_state, transform.translation.truncate(), movement.facing) {
        plant_events.send(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_follows_facing() {
        let center = Vec2::new(100.0, -100.0);
        assert_eq!(tool_target(center, Facing::Down), Vec2::new(100.0, -150.0));
        assert_eq!(tool_target(center, Facing::Left), Vec2::new(50.0, -140.0));
    }

    #[test]
    fn no_plant_request_without_seeds() {
        let mut player = PlayerState::new_game(0, 0);
        assert!(plant_request(&player, Vec2::ZERO, Facing::Down).is_none());

        player.seed_inventory.insert(CropKind::Tomato, 1);
        player.selected_seed = CropKind::Tomato;
        let request = plant_request(&player, Vec2::ZERO, Facing::Up).expect("one tomato seed");
        assert_eq!(request.kind, CropKind::Tomato);
        assert_eq!(request.point, Vec2::new(0.0, 10.0));
    }
}
