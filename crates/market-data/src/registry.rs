//! Process-wide exchange registry.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use log::info;

use crate::errors::MarketDataError;
use crate::provider::{MarketProvider, MarketProviderFactory};

/// The exchange identifiers enabled out of the box.
pub const DEFAULT_EXCHANGES: &[&str] = &["binance", "bybit", "coinbase", "yfinance", "moex"];

/// Registry of configured exchanges with lazily constructed providers.
///
/// Owns at most one live provider instance per exchange identifier;
/// instances are created through the factory on first access and kept
/// for the process lifetime (first-access-wins, no eviction). Intended
/// to be held by a single composition root and passed by reference -
/// there are no global statics here.
pub struct ExchangesProvider {
    exchanges: Vec<String>,
    providers: HashMap<String, Box<dyn MarketProvider>>,
}

impl ExchangesProvider {
    pub fn new(exchanges: Vec<String>) -> Self {
        Self {
            exchanges,
            providers: HashMap::new(),
        }
    }

    /// Registry over [`DEFAULT_EXCHANGES`].
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_EXCHANGES.iter().map(|s| s.to_string()).collect())
    }

    /// The configured identifiers, in configuration order.
    pub fn exchanges(&self) -> &[String] {
        &self.exchanges
    }

    /// The cached provider for the identifier, constructing it on first
    /// access. A factory failure leaves the registry unchanged.
    pub fn get_market_provider(
        &mut self,
        exchange_id: &str,
    ) -> Result<&mut dyn MarketProvider, MarketDataError> {
        let provider = match self.providers.entry(exchange_id.to_string()) {
            Entry::Occupied(existing) => existing.into_mut(),
            Entry::Vacant(slot) => {
                info!("constructing provider for exchange '{}'", exchange_id);
                slot.insert(MarketProviderFactory::create(exchange_id)?)
            }
        };
        Ok(provider.as_mut())
    }
}
