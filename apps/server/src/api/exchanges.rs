use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// `GET /api/exchanges` - configured exchange identifiers, in
/// configuration order.
pub async fn list_exchanges(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let exchanges = state
        .with_registry(|registry| Ok(registry.exchanges().to_vec()))
        .await?;
    Ok(Json(json!({ "exchanges": exchanges })))
}

/// `GET /api/exchanges/{exchange}/symbols` - the tradable symbol
/// universe of one exchange. First call per exchange hits the upstream;
/// repeats are served from the provider's memo.
pub async fn list_symbols(
    State(state): State<AppState>,
    Path(exchange): Path<String>,
) -> ApiResult<Json<Value>> {
    let symbols = state
        .with_registry(move |registry| {
            let provider = registry.get_market_provider(&exchange)?;
            Ok(provider.symbols()?.to_vec())
        })
        .await?;
    Ok(Json(json!({ "symbols": symbols })))
}
