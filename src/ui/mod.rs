mod chat_panel;
mod hud;
mod shop_screen;

use bevy::prelude::*;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<hud::HudNotice>();

        // ─── HUD: visible during Playing state ───
        app.add_systems(OnEnter(GameState::Playing), hud::spawn_hud);
        app.add_systems(OnExit(GameState::Playing), hud::despawn_hud);
        app.add_systems(
            Update,
            (
                hud::update_day_display,
                hud::update_player_display,
                hud::show_save_notice,
                hud::update_notice,
            )
                .chain()
                .run_if(in_state(GameState::Playing)),
        );
        app.add_systems(Update, hud::show_trade_notice);

        // ─── SHOP SCREEN ───
        app.add_systems(OnEnter(GameState::Shop), shop_screen::spawn_shop_screen);
        app.add_systems(OnExit(GameState::Shop), shop_screen::despawn_shop_screen);
        app.add_systems(
            Update,
            shop_screen::update_shop_display.run_if(in_state(GameState::Shop)),
        );

        // ─── CHAT PANEL ───
        app.add_systems(OnEnter(GameState::Chat), chat_panel::spawn_chat_panel);
        app.add_systems(OnExit(GameState::Chat), chat_panel::despawn_chat_panel);
        app.add_systems(
            Update,
            (chat_panel::scroll_chat_history, chat_panel::update_chat_panel)
                .run_if(in_state(GameState::Chat)),
        );
    }
}
