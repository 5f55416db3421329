//! Deadline-bounded snapshot acquisition with synthetic fallback

use std::time::Duration;

use super::source::{FetchError, OrderBookSource};
use super::synthetic::SyntheticBook;
use super::{OrderBookSnapshot, Provenance};
use crate::symbol::Symbol;

/// A snapshot plus where it came from
#[derive(Debug)]
pub struct SnapshotLoad {
    pub snapshot: OrderBookSnapshot,
    pub provenance: Provenance,
    /// Set when the primary source failed and the fallback was used
    pub fallback_reason: Option<FetchError>,
}

impl SnapshotLoad {
    /// A load that came straight from the given source
    pub fn direct(snapshot: OrderBookSnapshot, provenance: Provenance) -> Self {
        Self {
            snapshot,
            provenance,
            fallback_reason: None,
        }
    }

    /// True when the snapshot came from the primary source
    pub fn is_real(&self) -> bool {
        self.provenance == Provenance::Real
    }
}

/// Wraps a primary source with a deadline and a synthetic fallback
pub struct Feed<S> {
    source: S,
    fallback: SyntheticBook,
    timeout: Duration,
}

impl<S: OrderBookSource> Feed<S> {
    /// `timeout` bounds every primary fetch
    pub fn new(source: S, fallback: SyntheticBook, timeout: Duration) -> Self {
        Self {
            source,
            fallback,
            timeout,
        }
    }

    /// Request a snapshot; never fails
    ///
    /// The primary source gets `timeout` to answer. Dropping the returned
    /// future cancels the in-flight request.
    pub async fn request(&mut self, symbol: Symbol) -> SnapshotLoad {
        let outcome = tokio::time::timeout(self.timeout, self.source.fetch(symbol)).await;
        match outcome {
            Ok(Ok(snapshot)) => {
                log::info!(
                    "Order book for {} loaded ({} bids, {} asks)",
                    symbol.ticker(),
                    snapshot.bids.len(),
                    snapshot.asks.len()
                );
                SnapshotLoad::direct(snapshot, self.source.provenance())
            }
            Ok(Err(err)) => self.fall_back(symbol, err),
            Err(_) => self.fall_back(symbol, FetchError::Timeout(self.timeout)),
        }
    }

    fn fall_back(&mut self, symbol: Symbol, reason: FetchError) -> SnapshotLoad {
        log::warn!(
            "Order book fetch for {} failed ({}), using synthetic data",
            symbol.ticker(),
            reason
        );
        SnapshotLoad {
            snapshot: self.fallback.generate(symbol),
            provenance: Provenance::Synthetic,
            fallback_reason: Some(reason),
        }
    }
}
