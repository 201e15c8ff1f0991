//! Market provider abstraction and the per-exchange-family adapters.
//!
//! This module contains:
//! - The `MarketProvider` trait every adapter implements
//! - The factory mapping exchange identifiers to adapter variants
//! - Concrete adapters: crypto venues, Yahoo Finance equities, MOEX
//!
//! Heterogeneous upstreams (different column names, timestamp
//! encodings, sync/async transports) are normalized to the common
//! `date, open, high, low, close, volume` schema and one synchronous
//! contract so callers never branch on exchange family.

mod factory;
mod traits;

pub mod crypto;
pub mod moex;
pub mod yfinance;

pub use crypto::CryptoMarketProvider;
pub use factory::{MarketProviderFactory, CRYPTO_EXCHANGES, EQUITY_EXCHANGES, MOEX_EXCHANGES};
pub use moex::MoexMarketProvider;
pub use traits::MarketProvider;
pub use yfinance::YFinanceMarketProvider;
