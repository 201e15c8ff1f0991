//! Core data types for market data operations:
//! - `time_frame` - the fixed candle granularity set
//! - `candle` - the common OHLCV schema (Candle, OhlcvTable, OhlcvColumn)
//! - `cache` - per-provider (symbol, time frame) memoization

mod cache;
mod candle;
mod time_frame;

pub use cache::FetchCache;
pub use candle::{Candle, OhlcvColumn, OhlcvTable};
pub use time_frame::TimeFrame;

/// Instrument identifier within one exchange's namespace.
///
/// Crypto venues use the unified `BASE/QUOTE` form (e.g. `BTC/USDT`);
/// equities and MOEX use the venue's native ticker.
pub type Symbol = String;
