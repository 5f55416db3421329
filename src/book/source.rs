//! Order-book sources
//!
//! A source turns a symbol into a snapshot, possibly slowly, possibly not at
//! all. Deadlines and fallback live in [`super::Feed`], not here.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use super::{OrderBookSnapshot, PriceLevel, Provenance};
use crate::symbol::Symbol;

/// Why a snapshot could not be acquired
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source did not answer before the deadline
    #[error("order book request timed out after {0:?}")]
    Timeout(Duration),

    /// Reading the underlying resource failed
    #[error("order book I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The response could not be interpreted as an order book
    #[error("malformed order book: {0}")]
    Malformed(String),

    /// The source has nothing for this symbol
    #[error("no order book available for {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Malformed(err.to_string())
    }
}

/// Anything that can produce an order-book snapshot for a symbol
pub trait OrderBookSource {
    fn fetch(
        &mut self,
        symbol: Symbol,
    ) -> impl Future<Output = Result<OrderBookSnapshot, FetchError>>;

    /// Provenance of snapshots this source returns
    fn provenance(&self) -> Provenance {
        Provenance::Real
    }
}

/// A source with no data; every request falls back
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl OrderBookSource for OfflineSource {
    async fn fetch(&mut self, symbol: Symbol) -> Result<OrderBookSnapshot, FetchError> {
        Err(FetchError::Unavailable(symbol.ticker().to_string()))
    }
}

/// Reads a recorded order book from a JSON file
///
/// Accepts exchange-style `[["45000.00", "1.2"], ...]` levels as well as
/// plain numbers. The file's symbol must start with the requested ticker
/// (`BTCUSDT` serves `BTC`).
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Read snapshots from a JSON file, re-read on every fetch
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl OrderBookSource for FileSource {
    async fn fetch(&mut self, symbol: Symbol) -> Result<OrderBookSnapshot, FetchError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let book = parse_book(&json)?;
        if Symbol::from_pair(&book.symbol) != Some(symbol) {
            return Err(FetchError::Unavailable(symbol.ticker().to_string()));
        }
        Ok(book)
    }
}

/// A number that exchanges sometimes send as a string
#[derive(Deserialize)]
#[serde(untagged)]
enum Num {
    Text(String),
    Value(f64),
}

impl Num {
    fn parse(&self) -> Result<f64, FetchError> {
        let value = match self {
            Num::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FetchError::Malformed(format!("not a number: {s:?}")))?,
            Num::Value(v) => *v,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(FetchError::Malformed(format!("bad level value: {value}")));
        }
        Ok(value)
    }
}

#[derive(Deserialize)]
struct RawBook {
    symbol: String,
    #[serde(default)]
    bids: Vec<(Num, Num)>,
    #[serde(default)]
    asks: Vec<(Num, Num)>,
}

fn parse_levels(raw: &[(Num, Num)]) -> Result<Vec<PriceLevel>, FetchError> {
    raw.iter()
        .map(|(price, qty)| Ok(PriceLevel::new(price.parse()?, qty.parse()?)))
        .collect()
}

/// Parse a JSON order book into a snapshot
pub fn parse_book(json: &str) -> Result<OrderBookSnapshot, FetchError> {
    let raw: RawBook = serde_json::from_str(json)?;
    let mut book = OrderBookSnapshot {
        symbol: raw.symbol,
        bids: parse_levels(&raw.bids)?,
        asks: parse_levels(&raw.asks)?,
        reference_price: 0.0,
    };
    book.reference_price = book
        .mid_price()
        .unwrap_or_else(|| crate::symbol::base_price_for(&book.symbol));
    Ok(book)
}
