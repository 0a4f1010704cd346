use bevy::prelude::*;
use std::path::Path;

use crate::shared::*;
use super::read_ron;

pub const SETTINGS_PATH: &str = "assets/settings.ron";

/// Settings from disk, or defaults when the file is unusable. Nonsense values
/// are pulled back into range rather than rejected.
pub fn load_config(path: &Path) -> GameConfig {
    let mut config = match read_ron::<GameConfig>(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("[Data] {e}; using default settings");
            GameConfig::default()
        }
    };
    sanitize(&mut config);
    config
}

fn sanitize(config: &mut GameConfig) {
    if !(config.day_length_secs > 0.0) {
        warn!("[Data] day_length_secs must be positive; using {DAY_LENGTH_SECS}");
        config.day_length_secs = DAY_LENGTH_SECS;
    }
    if !(0.0..=1.0).contains(&config.rain_chance) {
        warn!("[Data] rain_chance {} out of range; clamping", config.rain_chance);
        config.rain_chance = if config.rain_chance.is_nan() {
            RAIN_CHANCE
        } else {
            config.rain_chance.clamp(0.0, 1.0)
        };
    }
    let chat = &mut config.chat;
    chat.context_limit = chat.context_limit.min(chat.history_limit);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let config = load_config(Path::new("does/not/exist.ron"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn partial_settings_keep_other_defaults() {
        let config: GameConfig = ron::from_str("(day_length_secs: 30.0, sale_price: 25)").expect("valid ron");
        assert_eq!(config.day_length_secs, 30.0);
        assert_eq!(config.sale_price, 25);
        assert_eq!(config.seed_price, SEED_PRICE);
        assert_eq!(config.chat.max_tokens, 120);
    }

    #[test]
    fn sanitize_fixes_out_of_range_values() {
        let mut config = GameConfig { day_length_secs: -1.0, rain_chance: 4.0, ..Default::default() };
        config.chat.context_limit = 99;
        sanitize(&mut config);
        assert_eq!(config.day_length_secs, DAY_LENGTH_SECS);
        assert_eq!(config.rain_chance, 1.0);
        assert_eq!(config.chat.context_limit, config.chat.history_limit);
    }

    #[test]
    fn shipped_settings_parse() {
        let config = read_ron::<GameConfig>(Path::new(SETTINGS_PATH)).expect("assets/settings.ron parses");
        assert_eq!(config.start_money, START_MONEY);
    }
}
