//! Live prices from the CoinGecko API
//!
//! CoinGecko has no order book, only a spot price. The source fetches the
//! symbol's current USD price and lays a generated book around it, so the
//! towers sit at real market prices.

use serde::Deserialize;

use super::source::{FetchError, OrderBookSource};
use super::synthetic::SyntheticBook;
use super::OrderBookSnapshot;
use crate::symbol::Symbol;

/// Public API root
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Spot-price source backed by CoinGecko's `coins/{id}` endpoint
#[derive(Debug, Clone)]
pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
    book: SyntheticBook,
}

impl CoinGeckoSource {
    /// Create a source against `base_url`; `seed` drives level quantities
    pub fn new(base_url: impl Into<String>, seed: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("book-breaker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            book: SyntheticBook::new(seed),
        })
    }

    /// URL of the coin document for a symbol
    pub fn coin_url(&self, symbol: Symbol) -> String {
        format!("{}/coins/{}", self.base_url, symbol.coin_id())
    }

    async fn current_price(&self, symbol: Symbol) -> Result<f64, FetchError> {
        let response = self
            .client
            .get(self.coin_url(symbol))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Unavailable(format!(
                "{} (HTTP {})",
                symbol.ticker(),
                status.as_u16()
            )));
        }
        parse_price(&response.text().await?)
    }
}

impl OrderBookSource for CoinGeckoSource {
    async fn fetch(&mut self, symbol: Symbol) -> Result<OrderBookSnapshot, FetchError> {
        let price = self.current_price(symbol).await?;
        log::debug!("{} spot price {}", symbol.ticker(), price);
        Ok(self.book.generate_around(symbol.ticker(), price))
    }
}

#[derive(Deserialize)]
struct CoinDocument {
    market_data: Option<MarketData>,
}

#[derive(Deserialize)]
struct MarketData {
    current_price: Option<CurrentPrice>,
}

#[derive(Deserialize)]
struct CurrentPrice {
    usd: Option<f64>,
}

/// Pull `market_data.current_price.usd` out of a coin document
pub fn parse_price(json: &str) -> Result<f64, FetchError> {
    let doc: CoinDocument = serde_json::from_str(json)?;
    let price = doc
        .market_data
        .and_then(|m| m.current_price)
        .and_then(|p| p.usd)
        .ok_or_else(|| FetchError::Malformed("no USD price in coin data".to_string()))?;
    if !price.is_finite() || price <= 0.0 {
        return Err(FetchError::Malformed(format!("bad USD price: {price}")));
    }
    Ok(price)
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Io(std::io::Error::other(err))
        }
    }
}
