use bevy::prelude::*;
use crate::save::SaveCompleteEvent;
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS: used to query and update HUD elements
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct HudDayText;

#[derive(Component)]
pub struct HudMoneyText;

#[derive(Component)]
pub struct HudToolText;

#[derive(Component)]
pub struct HudInventoryText;

#[derive(Component)]
pub struct HudNoticeText;

/// Short-lived message under the top bar ("Game saved").
#[derive(Resource, Default)]
pub struct HudNotice {
    pub text: String,
    pub timer: Timer,
}

const NOTICE_SECS: f32 = 2.5;

pub fn day_label(day: &DayCycle) -> String {
    let weather = if day.raining { "Rain" } else { "Clear" };
    format!("Day {} - {}", day.day, weather)
}

pub fn tool_label(player: &PlayerState) -> String {
    format!(
        "[Q] {}   [E] {} seeds x{}",
        player.selected_tool.display_name(),
        player.selected_seed.display_name(),
        player.seed_count(player.selected_seed)
    )
}

pub fn inventory_label(player: &PlayerState) -> String {
    ItemKind::ALL
        .iter()
        .map(|&item| format!("{} {}", item.display_name(), player.item_count(item)))
        .collect::<Vec<_>>()
        .join("   ")
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

fn hud_text(marker: impl Component, text: String, size: f32, color: Color) -> impl Bundle {
    (
        marker,
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
        PickingBehavior::IGNORE,
    )
}

pub fn spawn_hud(mut commands: Commands, player: Res<PlayerState>, day: Res<DayCycle>) {
    // Root container: full screen overlay, no interaction blocking
    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::SpaceBetween,
                ..default()
            },
            PickingBehavior::IGNORE,
        ))
        .with_children(|parent| {
            // ─── TOP BAR ───
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        flex_direction: FlexDirection::Column,
                        ..default()
                    },
                    PickingBehavior::IGNORE,
                ))
                .with_children(|top| {
                    top.spawn((
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Px(40.0),
                            flex_direction: FlexDirection::Row,
                            justify_content: JustifyContent::SpaceBetween,
                            align_items: AlignItems::Center,
                            padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                            ..default()
                        },
                        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
                        PickingBehavior::IGNORE,
                    ))
                    .with_children(|bar| {
                        bar.spawn(hud_text(HudDayText, day_label(&day), 18.0, Color::WHITE));
                        bar.spawn(hud_text(
                            HudToolText,
                            tool_label(&player),
                            16.0,
                            Color::srgb(0.8, 0.85, 1.0),
                        ));
                        bar.spawn(hud_text(
                            HudMoneyText,
                            format!("{} G", player.money),
                            18.0,
                            Color::srgb(1.0, 0.84, 0.0),
                        ));
                    });

                    top.spawn((
                        Node {
                            padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                            ..default()
                        },
                        PickingBehavior::IGNORE,
                    ))
                    .with_children(|row| {
                        row.spawn(hud_text(
                            HudNoticeText,
                            String::new(),
                            16.0,
                            Color::srgb(0.6, 1.0, 0.6),
                        ));
                    });
                });

            // ─── BOTTOM BAR ───
            parent
                .spawn((
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Px(32.0),
                        align_items: AlignItems::Center,
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
                    PickingBehavior::IGNORE,
                ))
                .with_children(|bar| {
                    bar.spawn(hud_text(
                        HudInventoryText,
                        inventory_label(&player),
                        15.0,
                        Color::srgb(0.9, 0.9, 0.85),
                    ));
                });
        });
}

pub fn despawn_hud(mut commands: Commands, query: Query<Entity, With<HudRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

pub fn update_day_display(day: Res<DayCycle>, mut query: Query<&mut Text, With<HudDayText>>) {
    if !day.is_changed() {
        return;
    }
    for mut text in &mut query {
        **text = day_label(&day);
    }
}

#[allow(clippy::type_complexity)]
pub fn update_player_display(
    player: Res<PlayerState>,
    mut money_query: Query<&mut Text, (With<HudMoneyText>, Without<HudToolText>, Without<HudInventoryText>)>,
    mut tool_query: Query<&mut Text, (With<HudToolText>, Without<HudMoneyText>, Without<HudInventoryText>)>,
    mut inventory_query: Query<&mut Text, (With<HudInventoryText>, Without<HudMoneyText>, Without<HudToolText>)>,
) {
    if !player.is_changed() {
        return;
    }
    for mut text in &mut money_query {
        **text = format!("{} G", player.money);
    }
    for mut text in &mut tool_query {
        **text = tool_label(&player);
    }
    for mut text in &mut inventory_query {
        **text = inventory_label(&player);
    }
}

pub fn show_save_notice(mut events: EventReader<SaveCompleteEvent>, mut notice: ResMut<HudNotice>) {
    for event in events.read() {
        notice.text = if event.success {
            "Game saved".to_string()
        } else {
            format!(
                "Save failed: {}",
                event.error_message.as_deref().unwrap_or("unknown error")
            )
        };
        notice.timer = Timer::from_seconds(NOTICE_SECS, TimerMode::Once);
    }
}

/// "Sold Corn x1 +20 G" or "Bought Corn seeds x1 -50 G".
pub fn trade_notice(event: &ShopTransactionEvent) -> String {
    let (verb, sign) = if event.is_purchase { ("Bought", '-') } else { ("Sold", '+') };
    format!(
        "{verb} {} x{} {sign}{} G",
        event.item.display_name(),
        event.quantity,
        event.total
    )
}

/// Trades happen in the shop; the notice shows once the HUD is back.
pub fn show_trade_notice(mut events: EventReader<ShopTransactionEvent>, mut notice: ResMut<HudNotice>) {
    if let Some(event) = events.read().last() {
        notice.text = trade_notice(event);
        notice.timer = Timer::from_seconds(NOTICE_SECS, TimerMode::Once);
    }
}

pub fn update_notice(
    time: Res<Time>,
    mut notice: ResMut<HudNotice>,
    mut query: Query<&mut Text, With<HudNoticeText>>,
) {
    if notice.text.is_empty() {
        return;
    }
    notice.timer.tick(time.delta());
    if notice.timer.finished() {
        notice.text.clear();
    }
    for mut text in &mut query {
        **text = notice.text.clone();
    }
}
