use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use crate::chat::{ChatMessage, ChatState, Role};

/// Pixels scrolled per wheel notch.
const SCROLL_LINE_PX: f32 = 20.0;

#[derive(Component)]
pub struct ChatPanelRoot;

#[derive(Component)]
pub struct ChatHistoryText;

#[derive(Component)]
pub struct ChatInputText;

/// Scrollable box holding the history text.
#[derive(Component)]
pub struct ChatHistoryArea;

/// New scroll offset after one wheel event. Wheel up reveals older lines;
/// the layout clamps the far end.
pub fn scrolled(offset_y: f32, wheel: &MouseWheel) -> f32 {
    let dy = match wheel.unit {
        MouseScrollUnit::Line => wheel.y * SCROLL_LINE_PX,
        MouseScrollUnit::Pixel => wheel.y,
    };
    (offset_y - dy).max(0.0)
}

pub fn history_text(history: &[ChatMessage], thinking: bool) -> String {
    let mut lines: Vec<String> = history
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| match m.role {
            Role::User => format!("You: {}", m.content),
            _ => format!("Trader: {}", m.content),
        })
        .collect();
    if thinking {
        lines.push("Thinking...".to_string());
    }
    lines.join("\n\n")
}

pub fn spawn_chat_panel(mut commands: Commands, chat: Res<ChatState>) {
    commands
        .spawn((
            ChatPanelRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::FlexStart,
                padding: UiRect::top(Val::Px(120.0)),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(600.0),
                        height: Val::Px(400.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(15.0)),
                        row_gap: Val::Px(8.0),
                        border: UiRect::all(Val::Px(3.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.12, 0.1, 0.08, 0.92)),
                    BorderColor(Color::srgb(0.52, 0.31, 0.13)),
                ))
                .with_children(|panel| {
                    panel.spawn((
                        Text::new("Ask the Trader"),
                        TextFont {
                            font_size: 20.0,
                            ..default()
                        },
                        TextColor(Color::srgb(1.0, 0.9, 0.6)),
                    ));

                    // History, opened scrolled to the newest line
                    panel
                        .spawn((
                            ChatHistoryArea,
                            Node {
                                flex_grow: 1.0,
                                flex_basis: Val::Px(0.0),
                                flex_direction: FlexDirection::Column,
                                padding: UiRect::all(Val::Px(10.0)),
                                overflow: Overflow::scroll_y(),
                                ..default()
                            },
                            ScrollPosition { offset_x: 0.0, offset_y: f32::MAX },
                            BackgroundColor(Color::srgba(0.16, 0.16, 0.2, 0.55)),
                        ))
                        .with_children(|area| {
                            area.spawn((
                                ChatHistoryText,
                                Text::new(history_text(&chat.history, chat.thinking)),
                                TextFont {
                                    font_size: 15.0,
                                    ..default()
                                },
                                TextColor(Color::srgb(0.86, 0.86, 0.86)),
                            ));
                        });

                    panel
                        .spawn((
                            Node {
                                height: Val::Px(35.0),
                                align_items: AlignItems::Center,
                                padding: UiRect::horizontal(Val::Px(10.0)),
                                border: UiRect::all(Val::Px(2.0)),
                                ..default()
                            },
                            BackgroundColor(Color::srgba(1.0, 1.0, 1.0, 0.7)),
                            BorderColor(Color::srgb(0.52, 0.31, 0.13)),
                        ))
                        .with_children(|input| {
                            input.spawn((
                                ChatInputText,
                                Text::new(format!("{}_", chat.input)),
                                TextFont {
                                    font_size: 16.0,
                                    ..default()
                                },
                                TextColor(Color::BLACK),
                            ));
                        });

                    panel.spawn((
                        Text::new("[Enter] Send   [Wheel] Scroll   [Tab/Esc] Close"),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.6, 0.6, 0.6)),
                    ));
                });
        });
}

pub fn despawn_chat_panel(mut commands: Commands, query: Query<Entity, With<ChatPanelRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

pub fn scroll_chat_history(
    mut wheel_events: EventReader<MouseWheel>,
    mut areas: Query<&mut ScrollPosition, With<ChatHistoryArea>>,
) {
    for wheel in wheel_events.read() {
        for mut scroll in &mut areas {
            scroll.offset_y = scrolled(scroll.offset_y, wheel);
        }
    }
}

pub fn update_chat_panel(
    chat: Res<ChatState>,
    mut history_query: Query<&mut Text, (With<ChatHistoryText>, Without<ChatInputText>)>,
    mut input_query: Query<&mut Text, (With<ChatInputText>, Without<ChatHistoryText>)>,
    mut areas: Query<&mut ScrollPosition, With<ChatHistoryArea>>,
    mut shown_lines: Local<(usize, bool)>,
) {
    if !chat.is_changed() {
        return;
    }
    for mut text in &mut history_query {
        **text = history_text(&chat.history, chat.thinking);
    }
    // A new message or the thinking line jumps back to the bottom.
    let lines = (chat.history.len(), chat.thinking);
    if lines != *shown_lines {
        *shown_lines = lines;
        for mut scroll in &mut areas {
            scroll.offset_y = f32::MAX;
        }
    }
    for mut text in &mut input_query {
        **text = format!("{}_", chat.input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_labelled_by_speaker() {
        let history = vec![
            ChatMessage::new(Role::Assistant, "Hello!"),
            ChatMessage::new(Role::User, "Seeds?"),
        ];
        assert_eq!(history_text(&history, false), "Trader: Hello!\n\nYou: Seeds?");
        assert!(history_text(&history, true).ends_with("Thinking..."));
    }

    fn wheel(unit: MouseScrollUnit, y: f32) -> MouseWheel {
        MouseWheel { unit, x: 0.0, y, window: Entity::PLACEHOLDER }
    }

    #[test]
    fn wheel_up_reveals_older_lines() {
        assert_eq!(scrolled(100.0, &wheel(MouseScrollUnit::Line, 1.0)), 100.0 - SCROLL_LINE_PX);
        assert_eq!(scrolled(100.0, &wheel(MouseScrollUnit::Pixel, -15.0)), 115.0);
        assert_eq!(scrolled(5.0, &wheel(MouseScrollUnit::Line, 3.0)), 0.0);
    }

    #[test]
    fn wheel_events_move_the_history_area() {
        let mut app = App::new();
        app.add_event::<MouseWheel>()
            .add_systems(Update, scroll_chat_history);
        let area = app
            .world_mut()
            .spawn((ChatHistoryArea, ScrollPosition { offset_x: 0.0, offset_y: 200.0 }))
            .id();
        app.world_mut().send_event(wheel(MouseScrollUnit::Line, 2.0));
        app.update();
        let offset = app.world().get::<ScrollPosition>(area).map(|s| s.offset_y);
        assert_eq!(offset, Some(200.0 - 2.0 * SCROLL_LINE_PX));
    }
}
