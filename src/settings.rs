//! Player preferences
//!
//! Persisted as a JSON file next to the high scores. Missing or unreadable
//! files fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{FETCH_TIMEOUT_MS, LEVEL_COMPLETE_DELAY_MS};
use crate::symbol::Symbol;

/// Default settings file name
pub const SETTINGS_FILE: &str = "book_breaker_settings.json";

/// Where real order-book data comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceSource {
    /// A recorded order book on disk
    File(PathBuf),
    /// Live spot prices from the API at this root
    Live(String),
    /// Nothing; every level uses sample data
    Offline,
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Symbol whose order book builds the towers
    pub symbol: Symbol,

    // === Data ===
    /// How long a snapshot request may take before falling back
    pub fetch_timeout_ms: u64,
    /// Recorded order book; takes precedence over live prices
    pub order_book_path: Option<PathBuf>,
    /// Build books around live CoinGecko prices
    pub live_prices: bool,
    /// Price API root, for mirrors and proxies
    pub price_api_url: String,

    // === Pacing ===
    /// Pause between a cleared level and the next load
    pub level_delay_ms: u64,

    // === Determinism ===
    /// Seed for launch directions and synthetic books
    pub seed: u64,

    // === Persistence ===
    pub high_scores_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            symbol: Symbol::Btc,

            fetch_timeout_ms: FETCH_TIMEOUT_MS,
            order_book_path: None,
            live_prices: true,
            price_api_url: crate::book::coingecko::COINGECKO_API_URL.to_string(),

            level_delay_ms: LEVEL_COMPLETE_DELAY_MS,

            seed: 0x5EED,

            high_scores_path: PathBuf::from(crate::highscores::HIGH_SCORES_FILE),
        }
    }
}

impl Settings {
    /// Deadline for one snapshot request
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Pause between a cleared level and the next load
    pub fn level_delay(&self) -> Duration {
        Duration::from_millis(self.level_delay_ms)
    }

    /// Pick the primary source: a recorded file wins over live prices
    pub fn price_source(&self) -> PriceSource {
        match (&self.order_book_path, self.live_prices) {
            (Some(path), _) => PriceSource::File(path.clone()),
            (None, true) => PriceSource::Live(self.price_api_url.clone()),
            (None, false) => PriceSource::Offline,
        }
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
