//! Fruit trees: chopped with the axe, re-fruit on rainy mornings.

use bevy::prelude::*;
use rand::Rng;

use crate::shared::*;

pub const TREE_HEALTH: u32 = 5;

/// Apple slots, in pixels from the tree sprite's top-left corner.
const SMALL_APPLE_SLOTS: [(f32, f32); 6] =
    [(18.0, 17.0), (30.0, 37.0), (12.0, 50.0), (30.0, 45.0), (20.0, 30.0), (30.0, 10.0)];
const LARGE_APPLE_SLOTS: [(f32, f32); 6] =
    [(30.0, 24.0), (60.0, 65.0), (50.0, 50.0), (16.0, 40.0), (45.0, 50.0), (42.0, 70.0)];

pub fn apple_slots(size: TreeSize) -> &'static [(f32, f32)] {
    match size {
        TreeSize::Small => &SMALL_APPLE_SLOTS,
        TreeSize::Large => &LARGE_APPLE_SLOTS,
    }
}

pub fn tree_size_px(size: TreeSize) -> Vec2 {
    match size {
        TreeSize::Small => Vec2::new(64.0, 96.0),
        TreeSize::Large => Vec2::new(96.0, 128.0),
    }
}

/// A slot bears fruit with probability 4 in 11.
fn bears_fruit(rng: &mut impl Rng) -> bool {
    rng.gen_range(0..=10) < 4
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Tree {
    pub size: TreeSize,
    pub health: u32,
    /// One flag per apple slot.
    pub apples: Vec<bool>,
    /// World-space area the axe has to hit.
    pub bounds: Rect,
}

/// Apple sprite hanging in slot `slot` of its parent tree.
#[derive(Component, Debug, Clone, Copy)]
pub struct AppleSprite {
    pub slot: usize,
}

/// What one axe swing produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChopOutcome {
    pub apples: u32,
    pub wood: u32,
}

impl Tree {
    pub fn new(size: TreeSize, bounds: Rect) -> Self {
        Self {
            size,
            health: TREE_HEALTH,
            apples: vec![false; apple_slots(size).len()],
            bounds,
        }
    }

    pub fn from_spawn(spawn: &TreeSpawn) -> Self {
        let px = tree_size_px(spawn.size);
        let bounds = MapRect::new(spawn.x, spawn.y, px.x, px.y).to_world();
        Self::new(spawn.size, bounds)
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn apple_count(&self) -> usize {
        self.apples.iter().filter(|a| **a).count()
    }

    /// Re-roll every apple slot. Stumps bear nothing.
    pub fn regrow_fruit(&mut self, rng: &mut impl Rng) {
        let alive = self.is_alive();
        for apple in &mut self.apples {
            *apple = alive && bears_fruit(rng);
        }
    }

    /// One axe hit: costs a point of health and knocks a random apple loose.
    /// The hit that fells the tree also yields its wood. Stumps ignore hits.
    pub fn chop(&mut self, rng: &mut impl Rng) -> ChopOutcome {
        if !self.is_alive() {
            return ChopOutcome::default();
        }
        self.health -= 1;

        let mut outcome = ChopOutcome::default();
        let hanging: Vec<usize> = (0..self.apples.len()).filter(|&i| self.apples[i]).collect();
        if !hanging.is_empty() {
            let slot = hanging[rng.gen_range(0..hanging.len())];
            self.apples[slot] = false;
            outcome.apples = 1;
        }

        if !self.is_alive() {
            self.apples.iter_mut().for_each(|a| *a = false);
            outcome.wood = 1;
        }
        outcome
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

pub fn spawn_trees(mut commands: Commands, layout: Res<WorldLayout>) {
    let mut rng = rand::thread_rng();
    for spawn in &layout.trees {
        let mut tree = Tree::from_spawn(spawn);
        tree.regrow_fruit(&mut rng);
        let size = tree_size_px(spawn.size);
        let center = tree.bounds.center();

        commands
            .spawn((
                Sprite {
                    color: tree_color(true),
                    custom_size: Some(size),
                    ..default()
                },
                Transform::from_translation(center.extend(3.0)),
                tree,
            ))
            .with_children(|parent| {
                for (slot, &(x, y)) in apple_slots(spawn.size).iter().enumerate() {
                    // Slot offsets are from the top-left corner, y down.
                    let local = Vec2::new(x - size.x / 2.0, size.y / 2.0 - y);
                    parent.spawn((
                        Sprite {
                            color: Color::srgb(0.85, 0.12, 0.10),
                            custom_size: Some(Vec2::splat(10.0)),
                            ..default()
                        },
                        Transform::from_translation(local.extend(0.1)),
                        Visibility::Hidden,
                        AppleSprite { slot },
                    ));
                }
            });
    }
    info!("[World] Spawned {} trees", layout.trees.len());
}

fn tree_color(alive: bool) -> Color {
    if alive {
        Color::srgb(0.18, 0.50, 0.22)
    } else {
        Color::srgb(0.42, 0.30, 0.18)
    }
}

pub fn handle_axe_on_trees(
    mut tool_events: EventReader<ToolUseEvent>,
    mut trees: Query<(&mut Tree, &mut Sprite)>,
    mut pickup_events: EventWriter<ItemPickupEvent>,
) {
    let mut rng = rand::thread_rng();
    for event in tool_events.read() {
        if event.tool != ToolKind::Axe {
            continue;
        }
        for (mut tree, mut sprite) in &mut trees {
            if !tree.is_alive() || !tree.bounds.contains(event.point) {
                continue;
            }
            let outcome = tree.chop(&mut rng);
            if outcome.apples > 0 {
                pickup_events.send(ItemPickupEvent { item: ItemKind::Apple, quantity: outcome.apples });
            }
            if outcome.wood > 0 {
                info!("[World] Tree felled");
                sprite.color = tree_color(false);
                sprite.custom_size = Some(Vec2::new(tree.bounds.width() * 0.6, TILE_SIZE * 0.5));
                pickup_events.send(ItemPickupEvent { item: ItemKind::Wood, quantity: outcome.wood });
            }
        }
    }
}

pub fn regrow_fruit_on_rain(
    mut day_start_events: EventReader<DayStartEvent>,
    mut trees: Query<&mut Tree>,
) {
    let rained = day_start_events.read().any(|event| event.raining);
    if !rained {
        return;
    }
    let mut rng = rand::thread_rng();
    for mut tree in &mut trees {
        tree.regrow_fruit(&mut rng);
    }
}

pub fn sync_apple_sprites(
    trees: Query<(&Tree, &Children), Changed<Tree>>,
    mut apples: Query<(&AppleSprite, &mut Visibility)>,
) {
    for (tree, children) in &trees {
        for &child in children.iter() {
            if let Ok((apple, mut visibility)) = apples.get_mut(child) {
                *visibility = if tree.apples.get(apple.slot).copied().unwrap_or(false) {
                    Visibility::Inherited
                } else {
                    Visibility::Hidden
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_tree() -> Tree {
        Tree::new(TreeSize::Small, Rect::new(0.0, -96.0, 64.0, 0.0))
    }

    #[test]
    fn five_hits_fell_a_tree_and_wood_drops_once() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut tree = small_tree();
        let wood: u32 = (0..TREE_HEALTH).map(|_| tree.chop(&mut rng).wood).sum();
        assert_eq!(wood, 1);
        assert!(!tree.is_alive());
        assert_eq!(tree.chop(&mut rng), ChopOutcome::default());
    }

    #[test]
    fn each_hit_drops_at_most_one_apple() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut tree = small_tree();
        tree.apples = vec![true; tree.apples.len()];
        let outcome = tree.chop(&mut rng);
        assert_eq!(outcome.apples, 1);
        assert_eq!(tree.apple_count(), tree.apples.len() - 1);
    }

    #[test]
    fn bare_tree_drops_no_apples() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = small_tree();
        assert_eq!(tree.chop(&mut rng).apples, 0);
    }

    #[test]
    fn stumps_never_regrow_fruit() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut tree = small_tree();
        tree.health = 0;
        for _ in 0..20 {
            tree.regrow_fruit(&mut rng);
            assert_eq!(tree.apple_count(), 0);
        }
    }

    #[test]
    fn fruit_rate_is_roughly_four_in_eleven() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut tree = small_tree();
        let mut total = 0;
        for _ in 0..1000 {
            tree.regrow_fruit(&mut rng);
            total += tree.apple_count();
        }
        let rate = total as f64 / (1000.0 * tree.apples.len() as f64);
        assert!((rate - 4.0 / 11.0).abs() < 0.03, "rate {rate}");
    }

    #[test]
    fn spawn_bounds_follow_map_space() {
        let tree = Tree::from_spawn(&TreeSpawn { size: TreeSize::Large, x: 64.0, y: 128.0 });
        assert_eq!(tree.bounds.min, Vec2::new(64.0, -256.0));
        assert_eq!(tree.bounds.max, Vec2::new(160.0, -128.0));
        assert_eq!(tree.apples.len(), LARGE_APPLE_SLOTS.len());
    }
}
