//! Economy domain: the trader's buy/sell menu.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.

use bevy::prelude::*;
use crate::shared::*;

pub mod shop;

pub use shop::{buy_seed, sell, shop_listings, trade, unit_price, ShopError, ShopMenu};

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ShopMenu>()
            .add_systems(OnEnter(GameState::Shop), shop::on_enter_shop)
            .add_systems(
                Update,
                shop::open_shop.run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                shop::shop_input.run_if(in_state(GameState::Shop)),
            );
    }
}
