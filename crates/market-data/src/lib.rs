//! MarketLens market data crate.
//!
//! Fetches and normalizes OHLCV candle history from three upstream
//! source families - spot crypto venues, Yahoo Finance equities, and
//! the Moscow Exchange ISS service - behind one uniform, synchronous
//! provider contract.
//!
//! # Architecture
//!
//! ```text
//! +---------------------+
//! |  ExchangesProvider  |  (registry: one provider per exchange id)
//! +---------------------+
//!           |
//!           v
//! +-----------------------+
//! | MarketProviderFactory |  (identifier group -> variant)
//! +-----------------------+
//!           |
//!           v
//! +---------------------+
//! |   MarketProvider    |  (crypto / yfinance / moex adapter)
//! +---------------------+
//!           |
//!           v
//! +---------------------+
//! |     OhlcvTable      |  (common date/open/high/low/close/volume schema)
//! +---------------------+
//! ```
//!
//! # Caching
//!
//! Every adapter memoizes its symbol universe once per instance and its
//! candle history per exact (symbol, time frame) pair; the registry
//! memoizes one provider instance per exchange identifier. Nothing is
//! ever evicted or refreshed within a process lifetime, and nothing is
//! persisted across restarts. The caches assume single-threaded access.

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::MarketDataError;
pub use models::{Candle, FetchCache, OhlcvColumn, OhlcvTable, Symbol, TimeFrame};
pub use provider::{
    CryptoMarketProvider, MarketProvider, MarketProviderFactory, MoexMarketProvider,
    YFinanceMarketProvider,
};
pub use registry::{ExchangesProvider, DEFAULT_EXCHANGES};
