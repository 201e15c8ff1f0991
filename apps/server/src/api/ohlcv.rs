use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use marketlens_market_data::{OhlcvTable, TimeFrame};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OhlcvQuery {
    pub exchange: String,
    pub symbol: String,
    pub time_frame: String,
}

/// Fetch (or replay from the memo) one symbol's full candle history.
pub(crate) async fn fetch_table(
    state: &AppState,
    exchange: String,
    symbol: String,
    time_frame: TimeFrame,
) -> Result<OhlcvTable, crate::error::ApiError> {
    state
        .with_registry(move |registry| {
            let provider = registry.get_market_provider(&exchange)?;
            Ok(provider.fetch_ohlcv(&symbol, time_frame)?.clone())
        })
        .await
}

/// `GET /api/ohlcv?exchange=binance&symbol=BTC/USDT&time_frame=1d`
pub async fn get_ohlcv(
    State(state): State<AppState>,
    Query(query): Query<OhlcvQuery>,
) -> ApiResult<Json<Value>> {
    let time_frame: TimeFrame = query.time_frame.parse()?;
    let table = fetch_table(&state, query.exchange, query.symbol.clone(), time_frame).await?;

    Ok(Json(json!({
        "symbol": query.symbol,
        "time_frame": time_frame.as_str(),
        "rows": table.rows(),
    })))
}
