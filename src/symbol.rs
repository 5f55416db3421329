//! Tradable symbols and their fallback base prices

use serde::{Deserialize, Serialize};

/// Base price used when the symbol is not in the table
pub const DEFAULT_BASE_PRICE: f64 = 45000.0;

/// Symbols the player can pick from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Symbol {
    #[default]
    Btc,
    Eth,
    Ada,
    Sol,
    Doge,
}

impl Symbol {
    pub const ALL: [Symbol; 5] = [
        Symbol::Btc,
        Symbol::Eth,
        Symbol::Ada,
        Symbol::Sol,
        Symbol::Doge,
    ];

    /// Ticker shown in the HUD
    pub fn ticker(&self) -> &'static str {
        match self {
            Symbol::Btc => "BTC",
            Symbol::Eth => "ETH",
            Symbol::Ada => "ADA",
            Symbol::Sol => "SOL",
            Symbol::Doge => "DOGE",
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Symbol::Btc => "Bitcoin",
            Symbol::Eth => "Ethereum",
            Symbol::Ada => "Cardano",
            Symbol::Sol => "Solana",
            Symbol::Doge => "Dogecoin",
        }
    }

    /// Identifier used by CoinGecko-style price APIs
    pub fn coin_id(&self) -> &'static str {
        match self {
            Symbol::Btc => "bitcoin",
            Symbol::Eth => "ethereum",
            Symbol::Ada => "cardano",
            Symbol::Sol => "solana",
            Symbol::Doge => "dogecoin",
        }
    }

    /// Price the synthetic order book is centred on
    pub fn base_price(&self) -> f64 {
        match self {
            Symbol::Btc => 45000.0,
            Symbol::Eth => 2500.0,
            Symbol::Ada => 0.45,
            Symbol::Sol => 98.0,
            Symbol::Doge => 0.08,
        }
    }

    /// Parse a ticker, coin id or display name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|sym| {
            sym.ticker().eq_ignore_ascii_case(&s)
                || sym.coin_id() == s
                || sym.name().to_lowercase() == s
        })
    }

    /// Match an exchange pair such as `ETHUSDT` by its base ticker
    pub fn from_pair(pair: &str) -> Option<Self> {
        let pair = pair.trim().to_uppercase();
        Self::from_str(&pair).or_else(|| {
            Self::ALL
                .into_iter()
                .find(|sym| pair.starts_with(sym.ticker()))
        })
    }
}

/// Base price for an arbitrary ticker or pair, defaulting for unknown ones
pub fn base_price_for(ticker: &str) -> f64 {
    Symbol::from_pair(ticker)
        .map(|s| s.base_price())
        .unwrap_or(DEFAULT_BASE_PRICE)
}
