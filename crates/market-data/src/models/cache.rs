use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::debug;

use crate::errors::MarketDataError;
use crate::models::{OhlcvTable, Symbol, TimeFrame};

/// Per-provider memo map for fetched candle history.
///
/// Keyed by the exact (symbol, time frame) pair. Entries are written on
/// the first successful fetch and reused for the remainder of the
/// process lifetime; there is no eviction and no refresh, so a
/// long-lived process serves stale history by design. Failed fetches
/// are not recorded - the error propagates and the next identical call
/// hits the venue again.
///
/// Not thread-safe. The crate assumes single-threaded access; callers
/// that share a provider across threads must serialize externally.
#[derive(Debug, Default)]
pub struct FetchCache {
    entries: HashMap<(Symbol, TimeFrame), OhlcvTable>,
}

impl FetchCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, symbol: &str, time_frame: TimeFrame) -> bool {
        self.entries
            .contains_key(&(symbol.to_string(), time_frame))
    }

    /// Return the cached table for the pair, fetching and storing it on
    /// a miss. `fetch` runs at most once; an error from it leaves the
    /// cache untouched.
    pub fn get_or_fetch<F>(
        &mut self,
        symbol: &str,
        time_frame: TimeFrame,
        fetch: F,
    ) -> Result<&OhlcvTable, MarketDataError>
    where
        F: FnOnce() -> Result<OhlcvTable, MarketDataError>,
    {
        match self.entries.entry((symbol.to_string(), time_frame)) {
            Entry::Occupied(hit) => {
                debug!("ohlcv cache hit for {} {}", symbol, time_frame);
                Ok(hit.into_mut())
            }
            Entry::Vacant(slot) => {
                let table = fetch()?;
                debug!(
                    "ohlcv cache miss for {} {}: stored {} rows",
                    symbol,
                    time_frame,
                    table.len()
                );
                Ok(slot.insert(table))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Candle;
    use chrono::{TimeZone, Utc};

    fn table(close: f64) -> OhlcvTable {
        let date = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        OhlcvTable::from_rows(vec![Candle::new(date, 1.0, 2.0, 0.5, close, 10.0)]).unwrap()
    }

    #[test]
    fn test_fetch_runs_once_per_key() {
        let mut cache = FetchCache::new();
        let mut calls = 0;

        for _ in 0..3 {
            let got = cache
                .get_or_fetch("BTC/USDT", TimeFrame::Day1, || {
                    calls += 1;
                    Ok(table(42.0))
                })
                .unwrap();
            assert_eq!(got.last().unwrap().close, 42.0);
        }

        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_distinct_time_frames_are_distinct_entries() {
        let mut cache = FetchCache::new();

        cache
            .get_or_fetch("BTC/USDT", TimeFrame::Day1, || Ok(table(1.0)))
            .unwrap();
        cache
            .get_or_fetch("BTC/USDT", TimeFrame::Hour1, || Ok(table(2.0)))
            .unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("BTC/USDT", TimeFrame::Day1));
        assert!(cache.contains("BTC/USDT", TimeFrame::Hour1));
        assert!(!cache.contains("ETH/USDT", TimeFrame::Day1));
    }

    #[test]
    fn test_empty_tables_are_cached() {
        let mut cache = FetchCache::new();
        let mut calls = 0;

        for _ in 0..2 {
            let got = cache
                .get_or_fetch("DELISTED", TimeFrame::Day1, || {
                    calls += 1;
                    Ok(OhlcvTable::default())
                })
                .unwrap();
            assert!(got.is_empty());
        }

        assert_eq!(calls, 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut cache = FetchCache::new();
        let mut calls = 0;

        for _ in 0..2 {
            let result = cache.get_or_fetch("BTC/USDT", TimeFrame::Day1, || {
                calls += 1;
                Err(MarketDataError::ProviderError {
                    provider: "test".to_string(),
                    message: "boom".to_string(),
                })
            });
            assert!(result.is_err());
        }

        // Each failed call reached the fake venue again.
        assert_eq!(calls, 2);
        assert!(cache.is_empty());
    }
}
