use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use marketlens_analytics::{pct_change, spearman_matrix, CorrelationMatrix};
use marketlens_market_data::{OhlcvColumn, TimeFrame};

use crate::api::ohlcv::fetch_table;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CorrelationQuery {
    pub exchange: String,
    /// Comma-separated symbol list, e.g. `BTC/USDT,ETH/USDT`.
    pub symbols: String,
    pub time_frame: String,
    /// Which column to correlate; defaults to close.
    pub column: Option<String>,
    /// Correlate pct-change returns instead of raw levels.
    #[serde(default)]
    pub returns: bool,
}

/// `GET /api/correlation?exchange=binance&symbols=BTC/USDT,ETH/USDT&time_frame=1d`
///
/// Spearman rank correlation across symbols of one exchange, on either
/// raw column levels or their one-period returns. Symbols repeat the
/// cached fetch path, so a matrix over already-explored symbols costs
/// no upstream calls.
pub async fn get_correlation(
    State(state): State<AppState>,
    Query(query): Query<CorrelationQuery>,
) -> ApiResult<Json<CorrelationMatrix>> {
    let time_frame: TimeFrame = query.time_frame.parse()?;
    let column_name = query.column.as_deref().unwrap_or("close");
    let column: OhlcvColumn = column_name
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("unknown column '{}'", column_name)))?;

    let mut series = Vec::new();
    for symbol in query.symbols.split(',').map(str::trim) {
        if symbol.is_empty() {
            continue;
        }
        let table = fetch_table(
            &state,
            query.exchange.clone(),
            symbol.to_string(),
            time_frame,
        )
        .await?;

        let mut values = table.column(column);
        if query.returns {
            values = pct_change(&values);
        }
        series.push((symbol.to_string(), values));
    }

    Ok(Json(spearman_matrix(&series)?))
}
