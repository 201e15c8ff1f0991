//! The `MarketProvider` contract every exchange-family adapter implements.

use crate::errors::MarketDataError;
use crate::models::{OhlcvTable, Symbol, TimeFrame};

/// One upstream venue family behind the uniform contract.
///
/// The contract is deliberately synchronous: each adapter owns its
/// upstream HTTP client plus a current-thread runtime and drives its
/// network futures to completion inside the call, so the presentation
/// layer sees plain blocking calls and never branches on exchange
/// family. Construction is network-free; both the symbol universe and
/// candle history are fetched lazily on first use and memoized for the
/// life of the instance.
///
/// Failure semantics: upstream errors propagate unchanged. No retry, no
/// partial results, no fallback to another venue.
pub trait MarketProvider: Send {
    /// Which upstream venue this instance serves.
    fn exchange_name(&self) -> &str;

    /// The tradable universe for this venue, ordered, cached after the
    /// first (possibly network-bound) call.
    fn symbols(&mut self) -> Result<&[Symbol], MarketDataError>;

    /// Full available candle history for the pair, memoized per exact
    /// (symbol, time frame) arguments. A repeated call with identical
    /// arguments returns the stored table without touching the venue,
    /// even when that table is empty. Errors are not memoized.
    fn fetch_ohlcv(
        &mut self,
        symbol: &str,
        time_frame: TimeFrame,
    ) -> Result<&OhlcvTable, MarketDataError>;
}

impl std::fmt::Debug for dyn MarketProvider + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MarketProvider({})", self.exchange_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchCache;

    /// Minimal in-memory adapter used to pin down the trait contract
    /// independently of any real venue.
    struct CountingProvider {
        cache: FetchCache,
        upstream_calls: usize,
    }

    impl MarketProvider for CountingProvider {
        fn exchange_name(&self) -> &str {
            "counting"
        }

        fn symbols(&mut self) -> Result<&[Symbol], MarketDataError> {
            Ok(&[])
        }

        fn fetch_ohlcv(
            &mut self,
            symbol: &str,
            time_frame: TimeFrame,
        ) -> Result<&OhlcvTable, MarketDataError> {
            let calls = &mut self.upstream_calls;
            self.cache.get_or_fetch(symbol, time_frame, || {
                *calls += 1;
                Ok(OhlcvTable::default())
            })
        }
    }

    #[test]
    fn test_identical_arguments_do_not_reissue_the_upstream_call() {
        let mut provider = CountingProvider {
            cache: FetchCache::new(),
            upstream_calls: 0,
        };

        let first = provider.fetch_ohlcv("X", TimeFrame::Day1).unwrap().clone();
        let second = provider.fetch_ohlcv("X", TimeFrame::Day1).unwrap().clone();

        assert_eq!(first, second);
        assert_eq!(provider.upstream_calls, 1);

        provider.fetch_ohlcv("X", TimeFrame::Week1).unwrap();
        assert_eq!(provider.upstream_calls, 2);
    }
}
