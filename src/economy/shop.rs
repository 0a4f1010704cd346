//! The trader: sells seeds, buys everything the farm produces.

use bevy::prelude::*;
use crate::shared::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    #[error("not enough {item}: have {have}, need {need}")]
    NotEnoughItems { item: &'static str, have: u32, need: u32 },

    #[error("not enough money: have {have}, need {need}")]
    NotEnoughMoney { have: u32, need: u32 },

    #[error("quantity must be at least 1")]
    ZeroQuantity,
}

/// Trader menu rows: produce to sell, then seeds to buy.
pub fn shop_listings() -> Vec<ShopItem> {
    ItemKind::ALL
        .iter()
        .map(|&item| ShopItem::Item(item))
        .chain(CropKind::ALL.iter().map(|&kind| ShopItem::Seed(kind)))
        .collect()
}

pub fn unit_price(item: ShopItem, config: &GameConfig) -> u32 {
    match item {
        ShopItem::Item(_) => config.sale_price,
        ShopItem::Seed(_) => config.seed_price,
    }
}

/// Sell `quantity` of an item. Returns the money earned.
pub fn sell(player: &mut PlayerState, item: ItemKind, quantity: u32, price: u32) -> Result<u32, ShopError> {
    if quantity == 0 {
        return Err(ShopError::ZeroQuantity);
    }
    let have = player.item_count(item);
    if have < quantity {
        return Err(ShopError::NotEnoughItems { item: item.display_name(), have, need: quantity });
    }
    let total = price.saturating_mul(quantity);
    player.item_inventory.insert(item, have - quantity);
    player.money = player.money.saturating_add(total);
    Ok(total)
}

/// Buy `quantity` seeds. Returns the money spent. Nothing changes on failure.
pub fn buy_seed(player: &mut PlayerState, kind: CropKind, quantity: u32, price: u32) -> Result<u32, ShopError> {
    if quantity == 0 {
        return Err(ShopError::ZeroQuantity);
    }
    let total = price.saturating_mul(quantity);
    if player.money < total {
        return Err(ShopError::NotEnoughMoney { have: player.money, need: total });
    }
    player.money -= total;
    let seeds = player.seed_inventory.entry(kind).or_insert(0);
    *seeds = seeds.saturating_add(quantity);
    Ok(total)
}

/// One unit of whatever the row offers.
pub fn trade(player: &mut PlayerState, item: ShopItem, config: &GameConfig) -> Result<ShopTransactionEvent, ShopError> {
    let price = unit_price(item, config);
    let (total, is_purchase) = match item {
        ShopItem::Item(kind) => (sell(player, kind, 1, price)?, false),
        ShopItem::Seed(kind) => (buy_seed(player, kind, 1, price)?, true),
    };
    Ok(ShopTransactionEvent { item, quantity: 1, total, is_purchase })
}

// ─────────────────────────────────────────────────────────────────────────────
// Menu state
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource, Debug, Clone, Default)]
pub struct ShopMenu {
    pub cursor: usize,
    /// Last refusal, shown under the list until the next trade.
    pub notice: Option<String>,
}

pub fn open_shop(input: Res<PlayerInput>, mut next_state: ResMut<NextState<GameState>>) {
    if input.toggle_shop {
        next_state.set(GameState::Shop);
    }
}

pub fn on_enter_shop(mut menu: ResMut<ShopMenu>) {
    *menu = ShopMenu::default();
    info!("[Economy] Trader open");
}

pub fn shop_input(
    input: Res<PlayerInput>,
    config: Res<GameConfig>,
    mut menu: ResMut<ShopMenu>,
    mut player: ResMut<PlayerState>,
    mut transactions: EventWriter<ShopTransactionEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if input.ui_cancel || input.toggle_shop {
        next_state.set(GameState::Playing);
        return;
    }

    let rows = shop_listings();
    if input.ui_up {
        menu.cursor = (menu.cursor + rows.len() - 1) % rows.len();
    }
    if input.ui_down {
        menu.cursor = (menu.cursor + 1) % rows.len();
    }
    if !input.ui_confirm {
        return;
    }

    let Some(&item) = rows.get(menu.cursor) else {
        return;
    };
    match trade(&mut player, item, &config) {
        Ok(event) => {
            info!(
                "[Economy] {} {} for {}",
                if event.is_purchase { "Bought" } else { "Sold" },
                item.display_name(),
                event.total
            );
            menu.notice = None;
            transactions.send(event);
        }
        Err(e) => {
            debug!("[Economy] Trade refused: {e}");
            menu.notice = Some(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selling_credits_money() {
        let mut player = PlayerState::new_game(0, 0);
        player.add_item(ItemKind::Corn, 3);
        assert_eq!(sell(&mut player, ItemKind::Corn, 2, SALE_PRICE), Ok(40));
        assert_eq!(player.money, 40);
        assert_eq!(player.item_count(ItemKind::Corn), 1);
    }

    #[test]
    fn cannot_sell_what_you_lack() {
        let mut player = PlayerState::new_game(0, 0);
        let err = sell(&mut player, ItemKind::Apple, 1, SALE_PRICE).unwrap_err();
        assert_eq!(err, ShopError::NotEnoughItems { item: "Apple", have: 0, need: 1 });
        assert_eq!(player.money, 0);
    }

    #[test]
    fn purchase_fails_without_funds() {
        let mut player = PlayerState::new_game(49, 0);
        let err = buy_seed(&mut player, CropKind::Corn, 1, SEED_PRICE).unwrap_err();
        assert_eq!(err, ShopError::NotEnoughMoney { have: 49, need: 50 });
        assert_eq!(player.money, 49);
        assert_eq!(player.seed_count(CropKind::Corn), 0);
    }

    #[test]
    fn purchase_adds_seeds() {
        let mut player = PlayerState::new_game(200, 5);
        assert_eq!(buy_seed(&mut player, CropKind::Tomato, 2, SEED_PRICE), Ok(100));
        assert_eq!(player.money, 100);
        assert_eq!(player.seed_count(CropKind::Tomato), 7);
    }

    #[test]
    fn zero_quantity_is_refused() {
        let mut player = PlayerState::new_game(200, 5);
        assert_eq!(buy_seed(&mut player, CropKind::Corn, 0, SEED_PRICE), Err(ShopError::ZeroQuantity));
        assert_eq!(sell(&mut player, ItemKind::Wood, 0, SALE_PRICE), Err(ShopError::ZeroQuantity));
    }

    #[test]
    fn listings_cover_items_then_seeds() {
        let rows = shop_listings();
        assert_eq!(rows.len(), ItemKind::ALL.len() + CropKind::ALL.len());
        assert_eq!(rows[0], ShopItem::Item(ItemKind::Wood));
        assert_eq!(rows.last(), Some(&ShopItem::Seed(CropKind::Tomato)));
    }

    #[test]
    fn trade_reports_direction() {
        let config = GameConfig::default();
        let mut player = PlayerState::new_game(100, 0);
        let bought = trade(&mut player, ShopItem::Seed(CropKind::Corn), &config).expect("affordable");
        assert!(bought.is_purchase);
        assert_eq!(bought.total, config.seed_price);

        player.add_item(ItemKind::Wood, 1);
        let sold = trade(&mut player, ShopItem::Item(ItemKind::Wood), &config).expect("have wood");
        assert!(!sold.is_purchase);
        assert_eq!(player.money, 100 - config.seed_price + config.sale_price);
    }
}
