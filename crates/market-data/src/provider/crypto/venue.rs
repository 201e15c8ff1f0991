//! Venue-specific wire handling for the spot crypto exchanges.
//!
//! Each venue exposes the same two capabilities (market listing, kline
//! history) behind a different REST shape; this module owns the URLs,
//! payload models and interval codes, and hands normalized rows back to
//! the provider.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{Candle, OhlcvTable, Symbol, TimeFrame};

const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "marketlens/0.3";

/// How many klines to request per history call. Binance and Bybit both
/// cap at 1000; Coinbase caps at 300 and ignores larger values.
const KLINE_LIMIT: u32 = 1000;

/// A supported spot crypto venue.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CryptoVenue {
    Binance,
    Bybit,
    Coinbase,
}

impl CryptoVenue {
    pub fn from_exchange_id(id: &str) -> Option<Self> {
        match id {
            "binance" => Some(CryptoVenue::Binance),
            "bybit" => Some(CryptoVenue::Bybit),
            "coinbase" => Some(CryptoVenue::Coinbase),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            CryptoVenue::Binance => "binance",
            CryptoVenue::Bybit => "bybit",
            CryptoVenue::Coinbase => "coinbase",
        }
    }

    /// The venue's interval code for a time frame, or an error when the
    /// venue has no such bucket.
    fn interval(&self, time_frame: TimeFrame) -> Result<&'static str, MarketDataError> {
        let code = match (self, time_frame) {
            // Binance interval strings match the canonical set exactly.
            (CryptoVenue::Binance, tf) => Some(tf.as_str()),

            (CryptoVenue::Bybit, TimeFrame::Hour1) => Some("60"),
            (CryptoVenue::Bybit, TimeFrame::Hour4) => Some("240"),
            (CryptoVenue::Bybit, TimeFrame::Hour12) => Some("720"),
            (CryptoVenue::Bybit, TimeFrame::Day1) => Some("D"),
            (CryptoVenue::Bybit, TimeFrame::Week1) => Some("W"),
            (CryptoVenue::Bybit, TimeFrame::Month1) => Some("M"),
            (CryptoVenue::Bybit, _) => None,

            // Coinbase Exchange only offers fixed granularities in seconds.
            (CryptoVenue::Coinbase, TimeFrame::Hour1) => Some("3600"),
            (CryptoVenue::Coinbase, TimeFrame::Day1) => Some("86400"),
            (CryptoVenue::Coinbase, _) => None,
        };

        code.ok_or_else(|| MarketDataError::UnsupportedTimeFrame {
            provider: self.id().to_string(),
            time_frame: time_frame.to_string(),
        })
    }

    /// Map a unified `BASE/QUOTE` symbol to the venue-native id.
    fn native_symbol(&self, symbol: &str) -> Result<String, MarketDataError> {
        let (base, quote) =
            symbol
                .split_once('/')
                .ok_or_else(|| MarketDataError::SymbolNotFound {
                    provider: self.id().to_string(),
                    symbol: symbol.to_string(),
                })?;
        Ok(match self {
            CryptoVenue::Binance | CryptoVenue::Bybit => format!("{}{}", base, quote),
            CryptoVenue::Coinbase => format!("{}-{}", base, quote),
        })
    }
}

// ============================================================================
// Wire models
// ============================================================================

#[derive(Deserialize)]
struct BinanceExchangeInfo {
    symbols: Vec<BinanceMarket>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceMarket {
    status: String,
    base_asset: String,
    quote_asset: String,
}

/// Binance kline row: open time, OHLCV as decimal strings, then six
/// trailing fields we do not consume.
#[derive(Deserialize)]
struct BinanceKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitResponse<T> {
    ret_code: i64,
    ret_msg: String,
    result: T,
}

#[derive(Deserialize)]
struct BybitInstruments {
    list: Vec<BybitInstrument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BybitInstrument {
    base_coin: String,
    quote_coin: String,
    status: String,
}

#[derive(Deserialize)]
struct BybitKlines {
    list: Vec<BybitKline>,
}

/// Bybit kline row: start time and OHLCV as strings, plus turnover.
#[derive(Deserialize)]
struct BybitKline(String, String, String, String, String, String, IgnoredAny);

#[derive(Deserialize)]
struct CoinbaseProduct {
    base_currency: String,
    quote_currency: String,
    status: String,
    #[serde(default)]
    trading_disabled: bool,
}

/// Coinbase candle row: time, low, high, open, close, volume.
#[derive(Deserialize)]
struct CoinbaseCandle(i64, f64, f64, f64, f64, f64);

// ============================================================================
// Client
// ============================================================================

/// HTTP client shared by all venues of the crypto family.
///
/// Owns a current-thread runtime and drives each request future to
/// completion synchronously, one venue call per invocation.
#[derive(Debug)]
pub struct VenueClient {
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
}

impl VenueClient {
    pub fn new(venue: CryptoVenue) -> Result<Self, MarketDataError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| MarketDataError::ProviderError {
                provider: venue.id().to_string(),
                message: format!("Failed to build venue runtime: {}", e),
            })?;
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { runtime, http })
    }

    fn get_json<T: DeserializeOwned>(&self, venue: CryptoVenue, url: &str) -> Result<T, MarketDataError> {
        debug!("GET {}", url);
        self.runtime.block_on(async {
            let response = self.http.get(url).send().await?;
            if !response.status().is_success() {
                return Err(MarketDataError::ProviderError {
                    provider: venue.id().to_string(),
                    message: format!("request failed: {}", response.status()),
                });
            }
            Ok(response.json::<T>().await?)
        })
    }

    /// The venue's tradable spot markets as unified `BASE/QUOTE` symbols,
    /// in the order the venue lists them.
    pub fn list_markets(&self, venue: CryptoVenue) -> Result<Vec<Symbol>, MarketDataError> {
        match venue {
            CryptoVenue::Binance => {
                let info: BinanceExchangeInfo =
                    self.get_json(venue, "https://api.binance.com/api/v3/exchangeInfo")?;
                Ok(info
                    .symbols
                    .into_iter()
                    .filter(|m| m.status == "TRADING")
                    .map(|m| format!("{}/{}", m.base_asset, m.quote_asset))
                    .collect())
            }
            CryptoVenue::Bybit => {
                let response: BybitResponse<BybitInstruments> = self.get_json(
                    venue,
                    "https://api.bybit.com/v5/market/instruments-info?category=spot",
                )?;
                check_bybit(venue, &response)?;
                Ok(response
                    .result
                    .list
                    .into_iter()
                    .filter(|i| i.status == "Trading")
                    .map(|i| format!("{}/{}", i.base_coin, i.quote_coin))
                    .collect())
            }
            CryptoVenue::Coinbase => {
                let products: Vec<CoinbaseProduct> =
                    self.get_json(venue, "https://api.exchange.coinbase.com/products")?;
                Ok(products
                    .into_iter()
                    .filter(|p| p.status == "online" && !p.trading_disabled)
                    .map(|p| format!("{}/{}", p.base_currency, p.quote_currency))
                    .collect())
            }
        }
    }

    /// Most recent kline history for the pair, normalized and sorted.
    pub fn fetch_history(
        &self,
        venue: CryptoVenue,
        symbol: &str,
        time_frame: TimeFrame,
    ) -> Result<OhlcvTable, MarketDataError> {
        let native = venue.native_symbol(symbol)?;
        let interval = venue.interval(time_frame)?;

        let rows = match venue {
            CryptoVenue::Binance => {
                let url = format!(
                    "https://api.binance.com/api/v3/klines?symbol={}&interval={}&limit={}",
                    native, interval, KLINE_LIMIT
                );
                let klines: Vec<BinanceKline> = self.get_json(venue, &url)?;
                klines
                    .into_iter()
                    .map(|k| binance_candle(venue, k))
                    .collect::<Result<Vec<_>, _>>()?
            }
            CryptoVenue::Bybit => {
                let url = format!(
                    "https://api.bybit.com/v5/market/kline?category=spot&symbol={}&interval={}&limit={}",
                    native, interval, KLINE_LIMIT
                );
                let response: BybitResponse<BybitKlines> = self.get_json(venue, &url)?;
                check_bybit(venue, &response)?;
                response
                    .result
                    .list
                    .into_iter()
                    .map(|k| bybit_candle(venue, k))
                    .collect::<Result<Vec<_>, _>>()?
            }
            CryptoVenue::Coinbase => {
                let url = format!(
                    "https://api.exchange.coinbase.com/products/{}/candles?granularity={}",
                    native, interval
                );
                let candles: Vec<CoinbaseCandle> = self.get_json(venue, &url)?;
                candles
                    .into_iter()
                    .map(|c| coinbase_candle(venue, c))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        OhlcvTable::from_rows(rows).map_err(|e| e.for_provider(venue.id()))
    }
}

fn check_bybit<T>(venue: CryptoVenue, response: &BybitResponse<T>) -> Result<(), MarketDataError> {
    if response.ret_code != 0 {
        return Err(MarketDataError::ProviderError {
            provider: venue.id().to_string(),
            message: format!("retCode {}: {}", response.ret_code, response.ret_msg),
        });
    }
    Ok(())
}

fn millis_to_date(venue: CryptoVenue, ms: i64) -> Result<DateTime<Utc>, MarketDataError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| MarketDataError::UnexpectedSchema {
            provider: venue.id().to_string(),
            message: format!("invalid millisecond timestamp {}", ms),
        })
}

fn parse_price(venue: CryptoVenue, field: &str, raw: &str) -> Result<f64, MarketDataError> {
    raw.parse::<f64>()
        .map_err(|_| MarketDataError::UnexpectedSchema {
            provider: venue.id().to_string(),
            message: format!("non-numeric {} value '{}'", field, raw),
        })
}

fn binance_candle(venue: CryptoVenue, k: BinanceKline) -> Result<Candle, MarketDataError> {
    Ok(Candle::new(
        millis_to_date(venue, k.0)?,
        parse_price(venue, "open", &k.1)?,
        parse_price(venue, "high", &k.2)?,
        parse_price(venue, "low", &k.3)?,
        parse_price(venue, "close", &k.4)?,
        parse_price(venue, "volume", &k.5)?,
    ))
}

fn bybit_candle(venue: CryptoVenue, k: BybitKline) -> Result<Candle, MarketDataError> {
    let ms = k.0.parse::<i64>().map_err(|_| MarketDataError::UnexpectedSchema {
        provider: venue.id().to_string(),
        message: format!("non-numeric start time '{}'", k.0),
    })?;
    Ok(Candle::new(
        millis_to_date(venue, ms)?,
        parse_price(venue, "open", &k.1)?,
        parse_price(venue, "high", &k.2)?,
        parse_price(venue, "low", &k.3)?,
        parse_price(venue, "close", &k.4)?,
        parse_price(venue, "volume", &k.5)?,
    ))
}

fn coinbase_candle(venue: CryptoVenue, c: CoinbaseCandle) -> Result<Candle, MarketDataError> {
    let date = Utc
        .timestamp_opt(c.0, 0)
        .single()
        .ok_or_else(|| MarketDataError::UnexpectedSchema {
            provider: venue.id().to_string(),
            message: format!("invalid timestamp {}", c.0),
        })?;
    // Coinbase row order is [time, low, high, open, close, volume].
    Ok(Candle::new(date, c.3, c.2, c.1, c.4, c.5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_mapping() {
        assert_eq!(CryptoVenue::Binance.interval(TimeFrame::Month1).unwrap(), "1M");
        assert_eq!(CryptoVenue::Bybit.interval(TimeFrame::Hour4).unwrap(), "240");
        assert_eq!(CryptoVenue::Coinbase.interval(TimeFrame::Day1).unwrap(), "86400");

        // Bybit has no 8h bucket; surfaced, never substituted.
        let err = CryptoVenue::Bybit.interval(TimeFrame::Hour8).unwrap_err();
        assert!(matches!(err, MarketDataError::UnsupportedTimeFrame { .. }));
    }

    #[test]
    fn test_native_symbol_mapping() {
        assert_eq!(
            CryptoVenue::Binance.native_symbol("BTC/USDT").unwrap(),
            "BTCUSDT"
        );
        assert_eq!(
            CryptoVenue::Coinbase.native_symbol("BTC/USD").unwrap(),
            "BTC-USD"
        );

        let err = CryptoVenue::Bybit.native_symbol("BTCUSDT").unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound { .. }));
    }

    #[test]
    fn test_binance_kline_payload_parses() {
        let body = r#"[
            [1704067200000, "42283.58", "42554.57", "42261.02", "42475.23", "1271.68", 1704153599999, "53921625.9", 123456, "600.1", "25500000.2", "0"],
            [1704153600000, "42475.23", "45879.63", "42214.89", "44179.55", "3141.59", 1704239999999, "138000000.0", 234567, "1500.5", "66000000.8", "0"]
        ]"#;

        let klines: Vec<BinanceKline> = serde_json::from_str(body).unwrap();
        let rows: Vec<Candle> = klines
            .into_iter()
            .map(|k| binance_candle(CryptoVenue::Binance, k).unwrap())
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].open, 42283.58);
        assert_eq!(rows[1].close, 44179.55);
        assert_eq!(rows[0].date.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_bybit_kline_payload_parses_and_sorts() {
        // Bybit returns newest first; normalization must re-order.
        let body = r#"{
            "retCode": 0,
            "retMsg": "OK",
            "result": {
                "category": "spot",
                "list": [
                    ["1704153600000", "42475.23", "45879.63", "42214.89", "44179.55", "3141.59", "1.38e8"],
                    ["1704067200000", "42283.58", "42554.57", "42261.02", "42475.23", "1271.68", "5.39e7"]
                ]
            }
        }"#;

        let response: BybitResponse<BybitKlines> = serde_json::from_str(body).unwrap();
        check_bybit(CryptoVenue::Bybit, &response).unwrap();

        let rows: Vec<Candle> = response
            .result
            .list
            .into_iter()
            .map(|k| bybit_candle(CryptoVenue::Bybit, k).unwrap())
            .collect();
        let table = OhlcvTable::from_rows(rows).unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.rows()[0].date < table.rows()[1].date);
        assert_eq!(table.last().unwrap().close, 44179.55);
    }

    #[test]
    fn test_bybit_error_payload_is_surfaced() {
        let body = r#"{"retCode": 10001, "retMsg": "params error", "result": {"list": []}}"#;
        let response: BybitResponse<BybitKlines> = serde_json::from_str(body).unwrap();

        let err = check_bybit(CryptoVenue::Bybit, &response).unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }

    #[test]
    fn test_coinbase_candle_column_order() {
        let body = r#"[[1704067200, 42214.89, 45879.63, 42283.58, 44179.55, 3141.59]]"#;
        let candles: Vec<CoinbaseCandle> = serde_json::from_str(body).unwrap();
        let row = coinbase_candle(CryptoVenue::Coinbase, candles.into_iter().next().unwrap())
            .unwrap();

        assert_eq!(row.low, 42214.89);
        assert_eq!(row.high, 45879.63);
        assert_eq!(row.open, 42283.58);
        assert_eq!(row.close, 44179.55);
    }

    #[test]
    fn test_binance_market_listing_filters_halted() {
        let body = r#"{"symbols": [
            {"symbol": "BTCUSDT", "status": "TRADING", "baseAsset": "BTC", "quoteAsset": "USDT"},
            {"symbol": "LUNAUSDT", "status": "BREAK", "baseAsset": "LUNA", "quoteAsset": "USDT"}
        ]}"#;

        let info: BinanceExchangeInfo = serde_json::from_str(body).unwrap();
        let symbols: Vec<Symbol> = info
            .symbols
            .into_iter()
            .filter(|m| m.status == "TRADING")
            .map(|m| format!("{}/{}", m.base_asset, m.quote_asset))
            .collect();

        assert_eq!(symbols, vec!["BTC/USDT"]);
    }
}
