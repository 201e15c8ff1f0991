//! Maps exchange identifiers onto provider variants.

use crate::errors::MarketDataError;
use crate::provider::crypto::CryptoMarketProvider;
use crate::provider::moex::MoexMarketProvider;
use crate::provider::yfinance::YFinanceMarketProvider;
use crate::provider::MarketProvider;

/// Identifier groups, disjoint and fixed at compile time.
pub const CRYPTO_EXCHANGES: &[&str] = &["binance", "bybit", "coinbase"];
pub const EQUITY_EXCHANGES: &[&str] = &["yfinance"];
pub const MOEX_EXCHANGES: &[&str] = &["moex"];

pub struct MarketProviderFactory;

impl MarketProviderFactory {
    /// Construct the provider variant whose group contains the
    /// identifier. An identifier outside every group - unconfigured or
    /// misspelled - is an invalid argument, never a half-built provider.
    pub fn create(exchange_id: &str) -> Result<Box<dyn MarketProvider>, MarketDataError> {
        if CRYPTO_EXCHANGES.contains(&exchange_id) {
            return Ok(Box::new(CryptoMarketProvider::new(exchange_id)?));
        }
        if EQUITY_EXCHANGES.contains(&exchange_id) {
            return Ok(Box::new(YFinanceMarketProvider::new(exchange_id)?));
        }
        if MOEX_EXCHANGES.contains(&exchange_id) {
            return Ok(Box::new(MoexMarketProvider::new(exchange_id)?));
        }
        Err(MarketDataError::UnknownExchange(exchange_id.to_string()))
    }
}
