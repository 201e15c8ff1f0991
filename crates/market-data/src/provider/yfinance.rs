//! Equities adapter backed by Yahoo Finance.
//!
//! The symbol universe is the S&P 500 constituent list scraped once
//! from the public Wikipedia table; history comes through the Yahoo
//! chart API. The adjusted-close series Yahoo also returns is dropped
//! during normalization - the common schema carries raw close only.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use log::{debug, info};
use scraper::{Html, Selector};
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{Candle, FetchCache, OhlcvTable, Symbol, TimeFrame};
use crate::provider::MarketProvider;

const PROVIDER_ID: &str = "yfinance";
const CONSTITUENTS_URL: &str = "https://en.wikipedia.org/wiki/List_of_S%26P_500_companies";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct YFinanceMarketProvider {
    exchange_name: String,
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
    connector: yahoo::YahooConnector,
    symbols: Option<Vec<Symbol>>,
    cache: FetchCache,
}

impl YFinanceMarketProvider {
    /// The aggregator is venue-agnostic; the identifier is kept only so
    /// `exchange_name()` reports what the caller selected.
    pub fn new(exchange_id: &str) -> Result<Self, MarketDataError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build provider runtime: {}", e),
            })?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let connector = yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to initialize Yahoo connector: {}", e),
        })?;

        Ok(Self {
            exchange_name: exchange_id.to_string(),
            runtime,
            http,
            connector,
            symbols: None,
            cache: FetchCache::new(),
        })
    }

    fn fetch_constituents(&self) -> Result<Vec<Symbol>, MarketDataError> {
        debug!("GET {}", CONSTITUENTS_URL);
        let body = self.runtime.block_on(async {
            let response = self.http.get(CONSTITUENTS_URL).send().await?;
            if !response.status().is_success() {
                return Err(MarketDataError::ProviderError {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("constituents request failed: {}", response.status()),
                });
            }
            Ok(response.text().await?)
        })?;

        parse_constituents(&body)
    }
}

/// Pull tickers out of the first cell of each constituents-table row
/// and sort them alphabetically.
fn parse_constituents(html: &str) -> Result<Vec<Symbol>, MarketDataError> {
    let document = Html::parse_document(html);
    let rows = Selector::parse("table#constituents tbody tr").expect("static selector");
    let cells = Selector::parse("td, th").expect("static selector");

    let mut symbols: Vec<Symbol> = document
        .select(&rows)
        .filter_map(|row| {
            let first = row.select(&cells).next()?;
            let text: String = first.text().collect();
            let ticker = text.trim();
            // Skip the header row and any decorative rows.
            if ticker.is_empty() || ticker == "Symbol" {
                None
            } else {
                Some(ticker.to_string())
            }
        })
        .collect();

    if symbols.is_empty() {
        return Err(MarketDataError::UnexpectedSchema {
            provider: PROVIDER_ID.to_string(),
            message: "no rows found in constituents table".to_string(),
        });
    }

    symbols.sort();
    Ok(symbols)
}

/// Yahoo chart-API interval code for a time frame. Yahoo has no 4h/8h/
/// 12h/3d buckets.
fn yahoo_interval(time_frame: TimeFrame) -> Result<&'static str, MarketDataError> {
    match time_frame {
        TimeFrame::Hour1 => Ok("60m"),
        TimeFrame::Day1 => Ok("1d"),
        TimeFrame::Week1 => Ok("1wk"),
        TimeFrame::Month1 => Ok("1mo"),
        other => Err(MarketDataError::UnsupportedTimeFrame {
            provider: PROVIDER_ID.to_string(),
            time_frame: other.to_string(),
        }),
    }
}

fn fetch_history(
    runtime: &tokio::runtime::Runtime,
    connector: &yahoo::YahooConnector,
    symbol: &str,
    time_frame: TimeFrame,
) -> Result<OhlcvTable, MarketDataError> {
    let interval = yahoo_interval(time_frame)?;
    debug!("yahoo history for {} interval {}", symbol, interval);

    let response = runtime
        .block_on(connector.get_quote_range(symbol, interval, "max"))
        .map_err(|e| match e {
            yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult => {
                MarketDataError::SymbolNotFound {
                    provider: PROVIDER_ID.to_string(),
                    symbol: symbol.to_string(),
                }
            }
            other => MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: other.to_string(),
            },
        })?;

    let quotes = response
        .quotes()
        .map_err(|e| MarketDataError::UnexpectedSchema {
            provider: PROVIDER_ID.to_string(),
            message: e.to_string(),
        })?;

    // Keep raw OHLCV only; the adjclose field is intentionally dropped.
    let rows: Vec<Candle> = quotes
        .into_iter()
        .filter_map(|q| {
            let date = Utc.timestamp_opt(q.timestamp as i64, 0).single()?;
            Some(Candle::new(
                date,
                q.open,
                q.high,
                q.low,
                q.close,
                q.volume as f64,
            ))
        })
        .filter(Candle::is_complete)
        .collect();

    OhlcvTable::from_rows(rows).map_err(|e| e.for_provider(PROVIDER_ID))
}

impl MarketProvider for YFinanceMarketProvider {
    fn exchange_name(&self) -> &str {
        &self.exchange_name
    }

    fn symbols(&mut self) -> Result<&[Symbol], MarketDataError> {
        if self.symbols.is_none() {
            let constituents = self.fetch_constituents()?;
            info!("yfinance: loaded {} S&P 500 constituents", constituents.len());
            self.symbols = Some(constituents);
        }
        Ok(self.symbols.as_deref().unwrap_or_default())
    }

    fn fetch_ohlcv(
        &mut self,
        symbol: &str,
        time_frame: TimeFrame,
    ) -> Result<&OhlcvTable, MarketDataError> {
        let Self {
            runtime,
            connector,
            cache,
            ..
        } = self;
        cache.get_or_fetch(symbol, time_frame, || {
            fetch_history(runtime, connector, symbol, time_frame)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONSTITUENTS_HTML: &str = r#"
        <html><body>
        <table id="constituents">
        <tbody>
        <tr><th>Symbol</th><th>Security</th></tr>
        <tr><td><a href="/wiki/MMM">MMM</a></td><td>3M</td></tr>
        <tr><td><a href="/wiki/AAPL">AAPL</a></td><td>Apple Inc.</td></tr>
        <tr><td><a href="/wiki/ABT">ABT</a></td><td>Abbott</td></tr>
        </tbody>
        </table>
        <table id="changes"><tbody><tr><td>XYZ</td></tr></tbody></table>
        </body></html>
    "#;

    #[test]
    fn test_parse_constituents_sorts_alphabetically() {
        let symbols = parse_constituents(CONSTITUENTS_HTML).unwrap();
        assert_eq!(symbols, vec!["AAPL", "ABT", "MMM"]);
    }

    #[test]
    fn test_parse_constituents_ignores_other_tables() {
        let symbols = parse_constituents(CONSTITUENTS_HTML).unwrap();
        assert!(!symbols.contains(&"XYZ".to_string()));
    }

    #[test]
    fn test_parse_constituents_rejects_missing_table() {
        let err = parse_constituents("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, MarketDataError::UnexpectedSchema { .. }));
    }

    #[test]
    fn test_interval_mapping() {
        assert_eq!(yahoo_interval(TimeFrame::Day1).unwrap(), "1d");
        assert_eq!(yahoo_interval(TimeFrame::Week1).unwrap(), "1wk");
        assert_eq!(yahoo_interval(TimeFrame::Month1).unwrap(), "1mo");
        assert!(matches!(
            yahoo_interval(TimeFrame::Hour4),
            Err(MarketDataError::UnsupportedTimeFrame { .. })
        ));
    }

    #[test]
    fn test_construction_is_network_free() {
        let provider = YFinanceMarketProvider::new("yfinance").unwrap();
        assert_eq!(provider.exchange_name(), "yfinance");
        assert!(provider.symbols.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    #[ignore] // Requires network access
    async fn test_aapl_daily_scenario() {
        let table = tokio::task::spawn_blocking(|| {
            let mut provider = YFinanceMarketProvider::new("yfinance").unwrap();
            provider
                .fetch_ohlcv("AAPL", TimeFrame::Day1)
                .map(|t| t.clone())
        })
        .await
        .unwrap()
        .unwrap();

        assert!(!table.is_empty());
        assert!(table.last().unwrap().close > 0.0);
        // Common schema only - validate() enforces the five populated
        // value fields and date ordering.
        table.validate().unwrap();
    }
}
