use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use marketlens_analytics::{
    box_stats, describe, histogram, normal_test, table_returns, total_change_pct, BoxStats,
    Describe, Histogram, NormalTest, TableReturns,
};
use marketlens_market_data::{OhlcvColumn, TimeFrame};

use crate::api::ohlcv::fetch_table;
use crate::error::ApiResult;
use crate::state::AppState;

const DEFAULT_BINS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub exchange: String,
    pub symbol: String,
    pub time_frame: String,
    pub bins: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ColumnStats {
    pub column: &'static str,
    pub describe: Describe,
    /// Absent when the column has too few or degenerate observations
    /// for the normality test.
    pub normality: Option<NormalTest>,
    pub histogram: Histogram,
    pub box_stats: BoxStats,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub symbol: String,
    pub time_frame: &'static str,
    pub dates: Vec<chrono::DateTime<chrono::Utc>>,
    pub columns: Vec<ColumnStats>,
    pub returns: TableReturns,
    pub total_change_pct: f64,
}

/// `GET /api/stats?exchange=yfinance&symbol=AAPL&time_frame=1d&bins=50`
///
/// The per-symbol exploration payload: describe blocks, distribution
/// shapes, pct-change return series, and the total change over the
/// whole history, all from one cached fetch.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<StatsResponse>> {
    let time_frame: TimeFrame = query.time_frame.parse()?;
    let bins = query.bins.unwrap_or(DEFAULT_BINS);

    let table = fetch_table(&state, query.exchange, query.symbol.clone(), time_frame).await?;

    let mut columns = Vec::with_capacity(OhlcvColumn::ALL.len());
    for col in OhlcvColumn::ALL {
        let series = table.column(col);
        columns.push(ColumnStats {
            column: col.as_str(),
            describe: describe(&series)?,
            normality: normal_test(&series).ok(),
            histogram: histogram(&series, bins)?,
            box_stats: box_stats(&series)?,
        });
    }

    Ok(Json(StatsResponse {
        symbol: query.symbol,
        time_frame: time_frame.as_str(),
        dates: table.rows().iter().map(|c| c.date).collect(),
        returns: table_returns(&table),
        total_change_pct: total_change_pct(&table.closes())?,
        columns,
    }))
}
