use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerInput>()
            .init_resource::<InputContext>()
            .add_systems(
                PreUpdate,
                (manage_input_context, reset_and_read_input).chain(),
            );
    }
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}

        InputContext::Gameplay => {
            let mut axis = Vec2::ZERO;
            if keys.pressed(KeyCode::KeyW) || keys.pressed(KeyCode::ArrowUp) {
                axis.y += 1.0;
            }
            if keys.pressed(KeyCode::KeyS) || keys.pressed(KeyCode::ArrowDown) {
                axis.y -= 1.0;
            }
            if keys.pressed(KeyCode::KeyA) || keys.pressed(KeyCode::ArrowLeft) {
                axis.x -= 1.0;
            }
            if keys.pressed(KeyCode::KeyD) || keys.pressed(KeyCode::ArrowRight) {
                axis.x += 1.0;
            }
            input.move_axis = axis.normalize_or_zero();

            input.tool_use = keys.just_pressed(KeyCode::Space);
            input.tool_next = keys.just_pressed(KeyCode::KeyQ);
            input.seed_next = keys.just_pressed(KeyCode::KeyE);
            input.plant = keys.any_just_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
            input.interact = keys.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter]);
            input.toggle_shop = keys.just_pressed(KeyCode::KeyM);
            input.toggle_chat = keys.just_pressed(KeyCode::Tab);
            input.save = keys.just_pressed(KeyCode::KeyX);
        }

        InputContext::Menu => {
            input.ui_up = keys.just_pressed(KeyCode::KeyW) || keys.just_pressed(KeyCode::ArrowUp);
            input.ui_down = keys.just_pressed(KeyCode::KeyS) || keys.just_pressed(KeyCode::ArrowDown);
            input.ui_confirm = keys.any_just_pressed([KeyCode::Space, KeyCode::Enter]);
            input.ui_cancel = keys.just_pressed(KeyCode::Escape);
            input.toggle_shop = keys.just_pressed(KeyCode::KeyM);
        }

        // Letters are text here; only control keys become actions.
        InputContext::Typing => {
            input.toggle_chat = keys.just_pressed(KeyCode::Tab);
            input.ui_confirm = keys.any_just_pressed([KeyCode::Enter, KeyCode::NumpadEnter]);
            input.ui_cancel = keys.just_pressed(KeyCode::Escape);
        }
    }
}

/// Derives InputContext from GameState. ONE system, replaces all per-domain guards.
fn manage_input_context(
    game_state: Res<State<GameState>>,
    mut context: ResMut<InputContext>,
) {
    *context = context_for(*game_state.get());
}

pub fn context_for(state: GameState) -> InputContext {
    match state {
        GameState::Loading => InputContext::Disabled,
        GameState::Playing => InputContext::Gameplay,
        GameState::Shop => InputContext::Menu,
        GameState::Chat => InputContext::Typing,
    }
}
