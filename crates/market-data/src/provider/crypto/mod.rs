//! Crypto-exchange adapter.
//!
//! One provider type serves all configured spot venues (Binance, Bybit,
//! Coinbase Exchange); the venue-specific REST shapes live in
//! [`venue`]. Symbols use the unified `BASE/QUOTE` form so the
//! presentation layer sees one namespace regardless of venue.

mod venue;

pub use venue::CryptoVenue;

use log::info;

use crate::errors::MarketDataError;
use crate::models::{FetchCache, OhlcvTable, Symbol, TimeFrame};
use crate::provider::MarketProvider;

use venue::VenueClient;

#[derive(Debug)]
pub struct CryptoMarketProvider {
    venue: CryptoVenue,
    client: VenueClient,
    symbols: Option<Vec<Symbol>>,
    cache: FetchCache,
}

impl CryptoMarketProvider {
    /// Bind a provider to one venue. No network traffic happens here;
    /// the market list and candle history load lazily.
    pub fn new(exchange_id: &str) -> Result<Self, MarketDataError> {
        let venue = CryptoVenue::from_exchange_id(exchange_id)
            .ok_or_else(|| MarketDataError::UnknownExchange(exchange_id.to_string()))?;

        Ok(Self {
            venue,
            client: VenueClient::new(venue)?,
            symbols: None,
            cache: FetchCache::new(),
        })
    }
}

impl MarketProvider for CryptoMarketProvider {
    fn exchange_name(&self) -> &str {
        self.venue.id()
    }

    fn symbols(&mut self) -> Result<&[Symbol], MarketDataError> {
        if self.symbols.is_none() {
            let markets = self.client.list_markets(self.venue)?;
            info!("{}: loaded {} spot markets", self.venue.id(), markets.len());
            self.symbols = Some(markets);
        }
        Ok(self.symbols.as_deref().unwrap_or_default())
    }

    fn fetch_ohlcv(
        &mut self,
        symbol: &str,
        time_frame: TimeFrame,
    ) -> Result<&OhlcvTable, MarketDataError> {
        let client = &self.client;
        let venue = self.venue;
        self.cache
            .get_or_fetch(symbol, time_frame, || {
                client.fetch_history(venue, symbol, time_frame)
            })
    }
}
