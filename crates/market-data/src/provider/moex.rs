//! Moscow Exchange adapter backed by the ISS web service.
//!
//! Two endpoints: the TQBR board security listing for `symbols()`, and
//! the board history endpoint for candles. ISS responses are generic
//! columns-plus-rows tables, so values are looked up by column name and
//! the result is renamed into the common schema. History is bounded to
//! a fixed window (see [`MOEX_HISTORY_START`]); that bound is carried
//! over from the original deployment as-is rather than widened.

use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;
use urlencoding::encode;

use crate::errors::MarketDataError;
use crate::models::{Candle, FetchCache, OhlcvTable, Symbol, TimeFrame};
use crate::provider::MarketProvider;

const PROVIDER_ID: &str = "moex";
const ISS_BASE_URL: &str = "https://iss.moex.com/iss";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = "marketlens/0.3";

/// Fixed historical window requested from ISS. Possibly a stale bound
/// inherited from the first deployment; kept configurable here instead
/// of silently widened.
pub const MOEX_HISTORY_START: &str = "2015-01-01";
pub const MOEX_HISTORY_END: &str = "2023-12-31";

/// ISS pages board history in blocks of 100 rows.
const ISS_PAGE_SIZE: usize = 100;

// ============================================================================
// Wire models
// ============================================================================

/// Generic ISS block: parallel `columns` / `data` arrays.
#[derive(Debug, Deserialize)]
struct IssTable {
    columns: Vec<String>,
    data: Vec<Vec<Value>>,
}

impl IssTable {
    fn column_index(&self, name: &str) -> Result<usize, MarketDataError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| MarketDataError::UnexpectedSchema {
                provider: PROVIDER_ID.to_string(),
                message: format!("missing column {}", name),
            })
    }
}

#[derive(Debug, Deserialize)]
struct SecuritiesResponse {
    securities: IssTable,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    history: IssTable,
    #[serde(rename = "history.cursor")]
    cursor: Option<IssTable>,
}

// ============================================================================
// Provider
// ============================================================================

pub struct MoexMarketProvider {
    exchange_name: String,
    runtime: tokio::runtime::Runtime,
    http: reqwest::Client,
    symbols: Option<Vec<Symbol>>,
    cache: FetchCache,
}

impl MoexMarketProvider {
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

        Ok(Self {
            exchange_name: exchange_id.to_string(),
            runtime,
            http,
            symbols: None,
            cache: FetchCache::new(),
        })
    }

    fn list_securities(&self) -> Result<Vec<Symbol>, MarketDataError> {
        let url = format!(
            "{}/engines/stock/markets/shares/boards/TQBR/securities.json\
             ?iss.meta=off&securities.columns=SECID,REGNUMBER,LOTSIZE,SHORTNAME",
            ISS_BASE_URL
        );
        let response: SecuritiesResponse = get_json(&self.runtime, &self.http, &url)?;
        parse_securities(&response.securities)
    }
}

fn get_json<T: serde::de::DeserializeOwned>(
    runtime: &tokio::runtime::Runtime,
    http: &reqwest::Client,
    url: &str,
) -> Result<T, MarketDataError> {
    debug!("GET {}", url);
    // One venue call per invocation, driven to completion synchronously.
    runtime.block_on(async {
        let response = http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("request failed: {}", response.status()),
            });
        }
        Ok(response.json::<T>().await?)
    })
}

fn parse_securities(table: &IssTable) -> Result<Vec<Symbol>, MarketDataError> {
    let secid = table.column_index("SECID")?;
    Ok(table
        .data
        .iter()
        .filter_map(|row| row.get(secid).and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Turn one page of ISS history rows into candles. Rows with a null in
/// any value field (illiquid sessions report empty OPEN/HIGH/LOW) are
/// dropped so the table invariant holds.
fn parse_history_page(table: &IssTable) -> Result<Vec<Candle>, MarketDataError> {
    let dates = table.column_index("TRADEDATE")?;
    let opens = table.column_index("OPEN")?;
    let highs = table.column_index("HIGH")?;
    let lows = table.column_index("LOW")?;
    let closes = table.column_index("CLOSE")?;
    let volumes = table.column_index("VOLUME")?;

    let mut rows = Vec::with_capacity(table.data.len());
    for row in &table.data {
        let Some(date) = row
            .get(dates)
            .and_then(Value::as_str)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
        else {
            return Err(MarketDataError::UnexpectedSchema {
                provider: PROVIDER_ID.to_string(),
                message: "unparseable TRADEDATE value".to_string(),
            });
        };

        let value_at = |idx: usize| row.get(idx).and_then(Value::as_f64);
        match (
            value_at(opens),
            value_at(highs),
            value_at(lows),
            value_at(closes),
            value_at(volumes),
        ) {
            (Some(open), Some(high), Some(low), Some(close), Some(volume)) => {
                rows.push(Candle::new(date, open, high, low, close, volume));
            }
            _ => debug!("moex: dropping incomplete row at {}", date.date_naive()),
        }
    }
    Ok(rows)
}

/// Next page offset from the `history.cursor` block, or `None` when the
/// range is exhausted.
fn next_offset(cursor: &IssTable) -> Result<Option<usize>, MarketDataError> {
    let index = cursor.column_index("INDEX")?;
    let total = cursor.column_index("TOTAL")?;
    let page_size = cursor.column_index("PAGESIZE")?;

    let row = match cursor.data.first() {
        Some(row) => row,
        None => return Ok(None),
    };
    let read = |idx: usize| -> Result<usize, MarketDataError> {
        row.get(idx)
            .and_then(Value::as_f64)
            .map(|v| v as usize)
            .ok_or_else(|| MarketDataError::UnexpectedSchema {
                provider: PROVIDER_ID.to_string(),
                message: "non-numeric history.cursor row".to_string(),
            })
    };

    let (index, total, page_size) = (read(index)?, read(total)?, read(page_size)?);
    if index + page_size >= total {
        Ok(None)
    } else {
        Ok(Some(index + page_size))
    }
}

/// Full board history for one security, following the ISS paging cursor
/// across the fixed window.
fn fetch_history(
    runtime: &tokio::runtime::Runtime,
    http: &reqwest::Client,
    secid: &str,
) -> Result<OhlcvTable, MarketDataError> {
    let mut rows = Vec::new();
    let mut offset = 0usize;

    loop {
        let url = format!(
            "{}/history/engines/stock/markets/shares/boards/TQBR/securities/{}.json\
             ?iss.meta=off&from={}&till={}\
             &history.columns=TRADEDATE,OPEN,HIGH,LOW,CLOSE,VOLUME&start={}",
            ISS_BASE_URL,
            encode(secid),
            MOEX_HISTORY_START,
            MOEX_HISTORY_END,
            offset
        );

        let page: HistoryResponse = get_json(runtime, http, &url)?;
        let fetched = page.history.data.len();
        rows.extend(parse_history_page(&page.history)?);

        offset = match &page.cursor {
            Some(cursor) => match next_offset(cursor)? {
                Some(next) => next,
                None => break,
            },
            // No cursor block: fall back to the fixed page size.
            None if fetched >= ISS_PAGE_SIZE => offset + fetched,
            None => break,
        };
    }

    OhlcvTable::from_rows(rows).map_err(|e| e.for_provider(PROVIDER_ID))
}

impl MarketProvider for MoexMarketProvider {
    fn exchange_name(&self) -> &str {
        &self.exchange_name
    }

    fn symbols(&mut self) -> Result<&[Symbol], MarketDataError> {
        if self.symbols.is_none() {
            let securities = self.list_securities()?;
            info!("moex: loaded {} TQBR securities", securities.len());
            self.symbols = Some(securities);
        }
        Ok(self.symbols.as_deref().unwrap_or_default())
    }

    /// Board history is daily regardless of the requested granularity;
    /// the time frame still participates in the cache key so the
    /// contract's memoization semantics stay uniform across variants.
    fn fetch_ohlcv(
        &mut self,
        symbol: &str,
        time_frame: TimeFrame,
    ) -> Result<&OhlcvTable, MarketDataError> {
        let Self {
            runtime,
            http,
            cache,
            ..
        } = self;
        cache.get_or_fetch(symbol, time_frame, || fetch_history(runtime, http, symbol))
    }
}
