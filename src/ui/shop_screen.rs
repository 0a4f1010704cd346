use bevy::prelude::*;
use crate::economy::{shop_listings, unit_price, ShopMenu};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// MARKER COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component)]
pub struct ShopScreenRoot;

#[derive(Component)]
pub struct ShopMoneyDisplay;

#[derive(Component)]
pub struct ShopListItem {
    pub index: usize,
}

#[derive(Component)]
pub struct ShopItemName {
    pub index: usize,
}

#[derive(Component)]
pub struct ShopNoticeText;

const ROW_SELECTED: Color = Color::srgba(0.4, 0.32, 0.18, 0.9);
const ROW_IDLE: Color = Color::NONE;

/// "Sell Corn (x3)" or "Buy Corn seeds (have 5)".
pub fn row_label(item: ShopItem, player: &PlayerState) -> String {
    match item {
        ShopItem::Item(kind) => format!("Sell {} (x{})", kind.display_name(), player.item_count(kind)),
        ShopItem::Seed(kind) => format!("Buy {} seeds (have {})", kind.display_name(), player.seed_count(kind)),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWN / DESPAWN
// ═══════════════════════════════════════════════════════════════════════

pub fn spawn_shop_screen(mut commands: Commands, config: Res<GameConfig>, player: Res<PlayerState>) {
    commands
        .spawn((
            ShopScreenRoot,
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
        ))
        .with_children(|parent| {
            parent
                .spawn((
                    Node {
                        width: Val::Px(460.0),
                        flex_direction: FlexDirection::Column,
                        padding: UiRect::all(Val::Px(16.0)),
                        row_gap: Val::Px(6.0),
                        border: UiRect::all(Val::Px(3.0)),
                        ..default()
                    },
                    BackgroundColor(Color::srgba(0.12, 0.1, 0.08, 0.95)),
                    BorderColor(Color::srgb(0.5, 0.4, 0.25)),
                ))
                .with_children(|panel| {
                    // Title row
                    panel
                        .spawn(Node {
                            width: Val::Percent(100.0),
                            flex_direction: FlexDirection::Row,
                            justify_content: JustifyContent::SpaceBetween,
                            margin: UiRect::bottom(Val::Px(8.0)),
                            ..default()
                        })
                        .with_children(|title_row| {
                            title_row.spawn((
                                Text::new("TRADER"),
                                TextFont {
                                    font_size: 22.0,
                                    ..default()
                                },
                                TextColor(Color::srgb(1.0, 0.9, 0.6)),
                            ));
                            title_row.spawn((
                                ShopMoneyDisplay,
                                Text::new(format!("{} G", player.money)),
                                TextFont {
                                    font_size: 18.0,
                                    ..default()
                                },
                                TextColor(Color::srgb(1.0, 0.84, 0.0)),
                            ));
                        });

                    for (index, item) in shop_listings().into_iter().enumerate() {
                        panel
                            .spawn((
                                ShopListItem { index },
                                Node {
                                    width: Val::Percent(100.0),
                                    flex_direction: FlexDirection::Row,
                                    justify_content: JustifyContent::SpaceBetween,
                                    padding: UiRect::axes(Val::Px(8.0), Val::Px(4.0)),
                                    ..default()
                                },
                                BackgroundColor(if index == 0 { ROW_SELECTED } else { ROW_IDLE }),
                            ))
                            .with_children(|row| {
                                row.spawn((
                                    ShopItemName { index },
                                    Text::new(row_label(item, &player)),
                                    TextFont {
                                        font_size: 16.0,
                                        ..default()
                                    },
                                    TextColor(Color::WHITE),
                                ));
                                row.spawn((
                                    Text::new(format!("{} G", unit_price(item, &config))),
                                    TextFont {
                                        font_size: 16.0,
                                        ..default()
                                    },
                                    TextColor(Color::srgb(1.0, 0.84, 0.0)),
                                ));
                            });
                    }

                    panel.spawn((
                        ShopNoticeText,
                        Text::new(""),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.9, 0.4, 0.4)),
                    ));
                    panel.spawn((
                        Text::new("[W/S] Select   [Space] Trade   [Esc/M] Close"),
                        TextFont {
                            font_size: 13.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.6, 0.6, 0.6)),
                    ));
                });
        });
}

pub fn despawn_shop_screen(mut commands: Commands, query: Query<Entity, With<ShopScreenRoot>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

// ═══════════════════════════════════════════════════════════════════════
// UPDATE
// ═══════════════════════════════════════════════════════════════════════

#[allow(clippy::type_complexity)]
pub fn update_shop_display(
    menu: Res<ShopMenu>,
    player: Res<PlayerState>,
    mut money_query: Query<&mut Text, (With<ShopMoneyDisplay>, Without<ShopItemName>, Without<ShopNoticeText>)>,
    mut name_query: Query<(&ShopItemName, &mut Text), (Without<ShopMoneyDisplay>, Without<ShopNoticeText>)>,
    mut notice_query: Query<&mut Text, (With<ShopNoticeText>, Without<ShopMoneyDisplay>, Without<ShopItemName>)>,
    mut row_query: Query<(&ShopListItem, &mut BackgroundColor)>,
) {
    if !menu.is_changed() && !player.is_changed() {
        return;
    }
    let listings = shop_listings();

    for mut text in &mut money_query {
        **text = format!("{} G", player.money);
    }
    for (name, mut text) in &mut name_query {
        if let Some(&item) = listings.get(name.index) {
            **text = row_label(item, &player);
        }
    }
    for mut text in &mut notice_query {
        **text = menu.notice.clone().unwrap_or_default();
    }
    for (row, mut bg) in &mut row_query {
        *bg = BackgroundColor(if row.index == menu.cursor { ROW_SELECTED } else { ROW_IDLE });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_labels() {
        let player = PlayerState::new_game(0, 5);
        assert_eq!(row_label(ShopItem::Item(ItemKind::Wood), &player), "Sell Wood (x0)");
        assert_eq!(
            row_label(ShopItem::Seed(CropKind::Tomato), &player),
            "Buy Tomato seeds (have 5)"
        );
    }
}
