//! Order-book snapshots and where they come from
//!
//! The game only ever sees a normalized [`OrderBookSnapshot`]. Sources may be
//! slow or broken; [`Feed`] puts a deadline on them and substitutes a
//! synthetic book when they fail, tagging the result with its provenance.

pub mod coingecko;
pub mod feed;
pub mod source;
pub mod synthetic;

pub use coingecko::CoinGeckoSource;
pub use feed::{Feed, SnapshotLoad};
pub use source::{FetchError, FileSource, OfflineSource, OrderBookSource};
pub use synthetic::SyntheticBook;

use serde::{Deserialize, Serialize};

/// Which half of the book a level belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Bid => "bid",
            Side::Ask => "ask",
        }
    }
}

/// One price level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: f64,
    pub quantity: f64,
}

impl PriceLevel {
    #[inline]
    pub fn new(price: f64, quantity: f64) -> Self {
        Self { price, quantity }
    }
}

/// A single fetched-or-generated order book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub symbol: String,
    /// Highest price first
    pub bids: Vec<PriceLevel>,
    /// Lowest price first
    pub asks: Vec<PriceLevel>,
    /// Price shown between the two sections
    pub reference_price: f64,
}

impl OrderBookSnapshot {
    /// Levels for one side, in consumption order
    pub fn side(&self, side: Side) -> &[PriceLevel] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Midpoint of the best bid and ask, or whichever side exists
    pub fn mid_price(&self) -> Option<f64> {
        match (self.bids.first(), self.asks.first()) {
            (Some(b), Some(a)) => Some((b.price + a.price) / 2.0),
            (Some(b), None) => Some(b.price),
            (None, Some(a)) => Some(a.price),
            (None, None) => None,
        }
    }
}

/// Whether a snapshot came from a real source or the synthetic fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Real,
    Synthetic,
}
