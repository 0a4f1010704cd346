//! Shared components, resources, events, and states for Farmland.
//!
//! This is the type contract between domain plugins. Domains talk to each
//! other through the events and resources declared here; the soil/crop data
//! model itself lives in `crate::farming`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE: top-level state machine
// ═══════════════════════════════════════════════════════════════════════

/// `Shop` and `Chat` freeze the player and the day clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Shop,
    Chat,
}

/// World construction steps run once when leaving `Loading`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetupSet {
    /// Grid, trees and static map entities from the `WorldLayout`.
    World,
    /// Overlay an existing save onto the fresh world.
    Restore,
    /// Spawn the player at its (possibly restored) position.
    Spawn,
}

// ═══════════════════════════════════════════════════════════════════════
// DAY CYCLE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct DayCycle {
    /// Seconds elapsed within the current day.
    pub elapsed: f32,
    /// Wall-clock seconds per in-game day.
    pub day_length: f32,
    pub day: u32,
    pub raining: bool,
    /// Set on rollover; the sky snaps to daylight on the next frame and clears it.
    pub force_daylight: bool,
}

impl Default for DayCycle {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            day_length: DAY_LENGTH_SECS,
            day: 1,
            raining: false,
            force_daylight: false,
        }
    }
}

impl DayCycle {
    pub fn with_day_length(day_length: f32) -> Self {
        Self {
            day_length: if day_length > 0.0 { day_length } else { DAY_LENGTH_SECS },
            ..Default::default()
        }
    }

    /// Accumulate `dt` seconds. Returns true when the day is used up and a
    /// rollover should be requested. Elapsed time stays pinned at the day
    /// length until `begin_next_day` resets it.
    pub fn advance(&mut self, dt: f32) -> bool {
        if dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.day_length);
        }
        self.elapsed >= self.day_length
    }

    /// 0.0 at dawn, 1.0 when the day is over.
    pub fn progress(&self) -> f32 {
        if self.day_length <= 0.0 {
            return 0.0;
        }
        (self.elapsed / self.day_length).clamp(0.0, 1.0)
    }

    /// Reset the clock for a new day and record the freshly rolled weather.
    pub fn begin_next_day(&mut self, raining: bool) {
        self.elapsed = 0.0;
        self.day = self.day.saturating_add(1);
        self.raining = raining;
        self.force_daylight = true;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CROPS & ITEMS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropKind {
    Corn,
    Tomato,
}

impl CropKind {
    pub const ALL: [CropKind; 2] = [CropKind::Corn, CropKind::Tomato];

    /// Number of sprite frames; the last frame is the ripe crop.
    pub fn frame_count(self) -> u32 {
        match self {
            CropKind::Corn => 5,
            CropKind::Tomato => 5,
        }
    }

    /// Age gained per watered day.
    pub fn growth_rate(self) -> f32 {
        match self {
            CropKind::Corn => 1.0,
            CropKind::Tomato => 1.0,
        }
    }

    /// Vertical sprite offset from the soil tile's bottom edge, in pixels.
    pub fn sprite_offset(self) -> f32 {
        match self {
            CropKind::Corn => -16.0,
            CropKind::Tomato => -8.0,
        }
    }

    pub fn item(self) -> ItemKind {
        match self {
            CropKind::Corn => ItemKind::Corn,
            CropKind::Tomato => ItemKind::Tomato,
        }
    }

    pub fn next(self) -> Self {
        match self {
            CropKind::Corn => CropKind::Tomato,
            CropKind::Tomato => CropKind::Corn,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            CropKind::Corn => "Corn",
            CropKind::Tomato => "Tomato",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Wood,
    Apple,
    Corn,
    Tomato,
}

impl ItemKind {
    pub const ALL: [ItemKind; 4] = [ItemKind::Wood, ItemKind::Apple, ItemKind::Corn, ItemKind::Tomato];

    pub fn display_name(self) -> &'static str {
        match self {
            ItemKind::Wood => "Wood",
            ItemKind::Apple => "Apple",
            ItemKind::Corn => "Corn",
            ItemKind::Tomato => "Tomato",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Hoe,
    Axe,
    Water,
}

impl ToolKind {
    /// Q cycles hoe → axe → water → hoe.
    pub fn next(self) -> Self {
        match self {
            ToolKind::Hoe => ToolKind::Axe,
            ToolKind::Axe => ToolKind::Water,
            ToolKind::Water => ToolKind::Hoe,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ToolKind::Hoe => "Hoe",
            ToolKind::Axe => "Axe",
            ToolKind::Water => "Water",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

#[derive(Component, Debug, Clone)]
pub struct PlayerMovement {
    pub facing: Facing,
    pub speed: f32,
}

impl Default for PlayerMovement {
    fn default() -> Self {
        Self {
            facing: Facing::Down,
            speed: PLAYER_SPEED,
        }
    }
}

/// Economy and position fields of the player. This is exactly what the save
/// file records under `player`.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerState {
    pub pos_x: f32,
    pub pos_y: f32,
    pub money: u32,
    pub item_inventory: BTreeMap<ItemKind, u32>,
    pub seed_inventory: BTreeMap<CropKind, u32>,
    pub selected_tool: ToolKind,
    pub selected_seed: CropKind,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new_game(START_MONEY, START_SEEDS)
    }
}

impl PlayerState {
    pub fn new_game(money: u32, seeds_per_kind: u32) -> Self {
        Self {
            pos_x: 0.0,
            pos_y: 0.0,
            money,
            item_inventory: ItemKind::ALL.iter().map(|&item| (item, 0)).collect(),
            seed_inventory: CropKind::ALL.iter().map(|&kind| (kind, seeds_per_kind)).collect(),
            selected_tool: ToolKind::Hoe,
            selected_seed: CropKind::Corn,
        }
    }

    pub fn add_item(&mut self, item: ItemKind, quantity: u32) {
        let count = self.item_inventory.entry(item).or_insert(0);
        *count = count.saturating_add(quantity);
    }

    pub fn item_count(&self, item: ItemKind) -> u32 {
        self.item_inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn seed_count(&self, kind: CropKind) -> u32 {
        self.seed_inventory.get(&kind).copied().unwrap_or(0)
    }

    /// Take one seed of `kind`. Returns false when none are left.
    pub fn take_seed(&mut self, kind: CropKind) -> bool {
        match self.seed_inventory.get_mut(&kind) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.pos_x, self.pos_y)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// INPUT: hardware keys become game actions in one place
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub tool_use: bool,
    pub tool_next: bool,
    pub seed_next: bool,
    pub plant: bool,
    pub interact: bool,
    pub toggle_shop: bool,
    pub toggle_chat: bool,
    pub save: bool,
    pub ui_cancel: bool,
    pub ui_up: bool,
    pub ui_down: bool,
    pub ui_confirm: bool,
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Gameplay,
    Menu,
    /// Keys are text; only the chat widget reads the keyboard.
    Typing,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS: cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEndCause {
    /// The day clock ran out.
    Timer,
    /// The player slept in bed.
    Sleep,
}

/// Requests a day rollover. The calendar advances the clock and rolls the
/// weather, then announces the new day with `DayStartEvent`.
#[derive(Event, Debug, Clone)]
pub struct DayEndEvent {
    pub day: u32,
    pub cause: DayEndCause,
}

/// Sent once per rollover after the calendar has advanced.
#[derive(Event, Debug, Clone)]
pub struct DayStartEvent {
    pub day: u32,
    pub raining: bool,
}

/// The player swung a tool at a world-space point.
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub point: Vec2,
}

/// The player tried to plant the selected seed at a world-space point.
#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub kind: CropKind,
    pub point: Vec2,
}

#[derive(Event, Debug, Clone)]
pub struct ItemPickupEvent {
    pub item: ItemKind,
    pub quantity: u32,
}

#[derive(Event, Debug, Clone)]
pub struct CropHarvestedEvent {
    pub kind: CropKind,
    pub row: usize,
    pub col: usize,
}

#[derive(Event, Debug, Clone)]
pub struct ShopTransactionEvent {
    pub item: ShopItem,
    pub quantity: u32,
    pub total: u32,
    pub is_purchase: bool,
}

/// What the trader deals in: sellable items and purchasable seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShopItem {
    Item(ItemKind),
    Seed(CropKind),
}

impl ShopItem {
    pub fn display_name(self) -> String {
        match self {
            ShopItem::Item(item) => item.display_name().to_string(),
            ShopItem::Seed(kind) => format!("{} seeds", kind.display_name()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIGURATION: loaded from assets/settings.ron by the data layer
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub day_length_secs: f32,
    pub rain_chance: f64,
    pub start_money: u32,
    pub start_seeds: u32,
    pub sale_price: u32,
    pub seed_price: u32,
    pub save_path: Option<String>,
    pub chat: ChatConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            day_length_secs: DAY_LENGTH_SECS,
            rain_chance: RAIN_CHANCE,
            start_money: START_MONEY,
            start_seeds: START_SEEDS,
            sale_price: SALE_PRICE,
            seed_price: SEED_PRICE,
            save_path: None,
            chat: ChatConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Messages kept in the sidebar.
    pub history_limit: usize,
    /// Most recent messages sent along with each request.
    pub context_limit: usize,
    pub system_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:1234/v1/chat/completions".to_string(),
            model: "openai/gpt-oss-20b".to_string(),
            temperature: 0.7,
            max_tokens: 120,
            timeout_secs: 60,
            history_limit: 20,
            context_limit: 15,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are the friendly trader of a small farming game. You know the game well and give precise advice.

Controls: WASD/arrows move, SPACE uses the tool, Q switches tool (hoe, axe, water), \
E switches seed (corn, tomato), CTRL plants, ENTER interacts (trader, bed), M opens the shop, \
X saves, TAB toggles this chat.

Farming: till farmable soil with the hoe, water it, plant seeds on tilled soil. \
Crops only grow on days their soil was watered and take 4 watered days to ripen. \
Rain waters every tilled tile. Walk into a ripe crop to harvest it.

Economy: start with 200 money and 5 seeds of each kind. Seeds cost 50 at the trader. \
Corn, tomatoes, apples and wood all sell for 20. Trees drop apples when chopped and \
leave wood after 5 hits. Sleeping in bed starts a new day.

Answer like a game NPC: one direct sentence, fewer than 25 English words.";

// ═══════════════════════════════════════════════════════════════════════
// WORLD LAYOUT: what the map hands to the simulation at load time
// ═══════════════════════════════════════════════════════════════════════

/// Rectangle in map pixels. Map space has its origin at the top-left corner
/// with y growing downward, like the ground image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl MapRect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn to_world(self) -> Rect {
        Rect::new(self.x, -(self.y + self.h), self.x + self.w, -self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TreeSize {
    Small,
    Large,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpawn {
    pub size: TreeSize,
    /// Top-left corner in map pixels.
    pub x: f32,
    pub y: f32,
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldLayout {
    /// Grid columns (ground width / tile size).
    pub cols: usize,
    /// Grid rows (ground height / tile size).
    pub rows: usize,
    /// `(row, col)` of every farmable tile.
    pub farmable: Vec<(usize, usize)>,
    #[serde(default)]
    pub trees: Vec<TreeSpawn>,
    pub bed: MapRect,
    pub trader: MapRect,
    pub player_start: (f32, f32),
}

/// Map pixels (y down) to Bevy world space (y up).
pub fn map_to_world(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, -y)
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const TILE_SIZE: f32 = 64.0;
pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;

pub const DAY_LENGTH_SECS: f32 = 60.0;
pub const RAIN_CHANCE: f64 = 0.3;

pub const PLAYER_SPEED: f32 = 200.0;
pub const START_MONEY: u32 = 200;
pub const START_SEEDS: u32 = 5;

pub const SALE_PRICE: u32 = 20;
pub const SEED_PRICE: u32 = 50;
