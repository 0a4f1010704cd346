use bevy::prelude::*;
use crate::shared::*;
use super::player_rect;

/// Map spots the player can interact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spot {
    Bed,
    Trader,
}

/// The spot the player's hitbox overlaps, trader first.
pub fn spot_at(layout: &WorldLayout, center: Vec2) -> Option<Spot> {
    let body = player_rect(center);
    let touches = |rect: MapRect| !rect.to_world().intersect(body).is_empty();
    if touches(layout.trader) {
        Some(Spot::Trader)
    } else if touches(layout.bed) {
        Some(Spot::Bed)
    } else {
        None
    }
}

/// ENTER: sleep at the bed, trade at the trader.
pub fn interact(
    input: Res<PlayerInput>,
    layout: Res<WorldLayout>,
    day: Res<DayCycle>,
    query: Query<&Transform, With<Player>>,
    mut day_end_events: EventWriter<DayEndEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.interact {
        return;
    }
    let Ok(transform) = query.get_single() else {
        return;
    };
    match spot_at(&layout, transform.translation.truncate()) {
        Some(Spot::Bed) => {
            info!("[Player] Going to sleep on day {}", day.day);
            day_end_events.send(DayEndEvent { day: day.day, cause: DayEndCause::Sleep });
        }
        Some(Spot::Trader) => next_state.set(GameState::Shop),
        None => {}
    }
}

pub fn apply_item_pickups<'a>(
    player: &mut PlayerState,
    pickups: impl IntoIterator<Item = &'a ItemPickupEvent>,
) {
    for pickup in pickups {
        player.add_item(pickup.item, pickup.quantity);
    }
}

pub fn add_items_to_inventory(
    mut pickup_events: EventReader<ItemPickupEvent>,
    mut player_state: ResMut<PlayerState>,
) {
    if pickup_events.is_empty() {
        return;
    }
    apply_item_pickups(&mut player_state, pickup_events.read());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_layout;

    #[test]
    fn spots_are_found_by_overlap() {
        let layout = builtin_layout();
        assert_eq!(spot_at(&layout, layout.bed.to_world().center()), Some(Spot::Bed));
        assert_eq!(spot_at(&layout, layout.trader.to_world().center()), Some(Spot::Trader));
        assert_eq!(spot_at(&layout, Vec2::new(10.0, -10.0)), None);
    }

    #[test]
    fn pickups_accumulate() {
        let mut player = PlayerState::new_game(0, 0);
        let events = [
            ItemPickupEvent { item: ItemKind::Apple, quantity: 1 },
            ItemPickupEvent { item: ItemKind::Apple, quantity: 2 },
            ItemPickupEvent { item: ItemKind::Wood, quantity: 1 },
        ];
        apply_item_pickups(&mut player, events.iter());
        assert_eq!(player.item_count(ItemKind::Apple), 3);
        assert_eq!(player.item_count(ItemKind::Wood), 1);
    }
}
