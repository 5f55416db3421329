//! Synthetic order books centred on a per-symbol base price

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::source::{FetchError, OrderBookSource};
use super::{OrderBookSnapshot, PriceLevel, Provenance};
use crate::consts::MAX_TOWERS;
use crate::symbol::Symbol;

/// Spread as a fraction of the base price
const SPREAD_FRACTION: f64 = 0.0002;
/// Quantity range for generated levels
const MIN_QUANTITY: f64 = 0.5;
const MAX_QUANTITY: f64 = 1.6;

/// Seeded generator for fallback order books
///
/// Every side gets one level per tower slot.
#[derive(Debug, Clone)]
pub struct SyntheticBook {
    rng: Pcg32,
}

impl SyntheticBook {
    /// Create a generator; equal seeds give equal books
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Generate a book around the symbol's base price
    pub fn generate(&mut self, symbol: Symbol) -> OrderBookSnapshot {
        self.generate_around(symbol.ticker(), symbol.base_price())
    }

    /// Generate a book around an arbitrary price
    pub fn generate_around(&mut self, ticker: &str, base_price: f64) -> OrderBookSnapshot {
        let spread = base_price * SPREAD_FRACTION;
        let decimals = if base_price > 1.0 { 2 } else { 6 };

        let mut bids = Vec::with_capacity(MAX_TOWERS);
        let mut asks = Vec::with_capacity(MAX_TOWERS);

        for i in 0..MAX_TOWERS {
            let price = base_price - spread - i as f64 * spread * 0.5;
            bids.push(PriceLevel::new(round_to(price, decimals), self.quantity()));
        }
        for i in 0..MAX_TOWERS {
            let price = base_price + spread + i as f64 * spread * 0.5;
            asks.push(PriceLevel::new(round_to(price, decimals), self.quantity()));
        }

        OrderBookSnapshot {
            symbol: ticker.to_string(),
            bids,
            asks,
            reference_price: base_price,
        }
    }

    fn quantity(&mut self) -> f64 {
        round_to(self.rng.random_range(MIN_QUANTITY..MAX_QUANTITY), 1)
    }
}

impl OrderBookSource for SyntheticBook {
    async fn fetch(&mut self, symbol: Symbol) -> Result<OrderBookSnapshot, FetchError> {
        Ok(self.generate(symbol))
    }

    fn provenance(&self) -> Provenance {
        Provenance::Synthetic
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
