//! Engine timing and presentation settings.
//!
//! Values come from `EngineConfig::default()` and may be overridden through
//! `PILLCUE_*` environment variables. Invalid overrides are logged and ignored.

use log::warn;
use std::time::Duration;

const DEFAULT_MATCH_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_REPEAT_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_MIDNIGHT_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_CATCH_UP_WINDOW: Duration = Duration::from_secs(12 * 60 * 60);
const DEFAULT_EFFECT_COUNT: usize = 5;
const DEFAULT_EFFECT_LIFETIME: Duration = Duration::from_secs(4);
const DEFAULT_EFFECT_ICON_URL: &str = "https://cdn-icons-png.flaticon.com/512/2907/2907219.png";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Cadence of the reminder matcher.
    pub match_interval: Duration,
    /// Cadence of the repeating cue while an alarm is firing.
    pub repeat_interval: Duration,
    /// Cadence of the day-rollover check.
    pub midnight_interval: Duration,
    /// Longest gap of missed time the matcher still replays.
    pub catch_up_window: Duration,
    pub effect_count: usize,
    pub effect_lifetime: Duration,
    pub effect_icon_url: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_interval: DEFAULT_MATCH_INTERVAL,
            repeat_interval: DEFAULT_REPEAT_INTERVAL,
            midnight_interval: DEFAULT_MIDNIGHT_INTERVAL,
            catch_up_window: DEFAULT_CATCH_UP_WINDOW,
            effect_count: DEFAULT_EFFECT_COUNT,
            effect_lifetime: DEFAULT_EFFECT_LIFETIME,
            effect_icon_url: DEFAULT_EFFECT_ICON_URL.to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`, which maps variable names to values.
    ///
    /// Durations are given in whole seconds (`PILLCUE_MATCH_INTERVAL_SECS`,
    /// `PILLCUE_REPEAT_INTERVAL_SECS`, `PILLCUE_MIDNIGHT_INTERVAL_SECS`,
    /// `PILLCUE_CATCH_UP_SECS`, `PILLCUE_EFFECT_LIFETIME_SECS`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let secs = |key: &str, fallback: Duration| match lookup(key) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(value) if value > 0 => Duration::from_secs(value),
                _ => {
                    warn!("event=config_load module=config status=invalid key={key} value={raw}");
                    fallback
                }
            },
            None => fallback,
        };

        config.match_interval = secs("PILLCUE_MATCH_INTERVAL_SECS", config.match_interval);
        config.repeat_interval = secs("PILLCUE_REPEAT_INTERVAL_SECS", config.repeat_interval);
        config.midnight_interval =
            secs("PILLCUE_MIDNIGHT_INTERVAL_SECS", config.midnight_interval);
        config.catch_up_window = secs("PILLCUE_CATCH_UP_SECS", config.catch_up_window);
        config.effect_lifetime = secs("PILLCUE_EFFECT_LIFETIME_SECS", config.effect_lifetime);

        if let Some(raw) = lookup("PILLCUE_EFFECT_COUNT") {
            match raw.trim().parse::<usize>() {
                Ok(count) => config.effect_count = count,
                Err(_) => warn!(
                    "event=config_load module=config status=invalid key=PILLCUE_EFFECT_COUNT value={raw}"
                ),
            }
        }
        if let Some(url) = lookup("PILLCUE_EFFECT_ICON_URL") {
            if !url.trim().is_empty() {
                config.effect_icon_url = url.trim().to_string();
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::EngineConfig;
    use std::collections::HashMap;
    use std::time::Duration;

    #[test]
    fn defaults_match_widget_cadence() {
        let config = EngineConfig::default();
        assert_eq!(config.match_interval, Duration::from_secs(1));
        assert_eq!(config.repeat_interval, Duration::from_secs(1));
        assert_eq!(config.midnight_interval, Duration::from_secs(60));
        assert_eq!(config.effect_count, 5);
    }

    #[test]
    fn lookup_overrides_valid_values_and_ignores_invalid_ones() {
        let vars = HashMap::from([
            ("PILLCUE_MATCH_INTERVAL_SECS", "5"),
            ("PILLCUE_REPEAT_INTERVAL_SECS", "0"),
            ("PILLCUE_EFFECT_COUNT", "many"),
            ("PILLCUE_CATCH_UP_SECS", "3600"),
        ]);
        let config = EngineConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.match_interval, Duration::from_secs(5));
        assert_eq!(config.repeat_interval, Duration::from_secs(1));
        assert_eq!(config.effect_count, 5);
        assert_eq!(config.catch_up_window, Duration::from_secs(3600));
    }
}
