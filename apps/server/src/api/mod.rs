//! HTTP surface: thin handlers over the registry and the analytics
//! crate. Handlers parse parameters, run the blocking data fetch, and
//! serialize results; no market logic lives here.

pub mod correlation;
pub mod exchanges;
pub mod health;
pub mod ohlcv;
pub mod stats;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/exchanges", get(exchanges::list_exchanges))
        .route(
            "/api/exchanges/{exchange}/symbols",
            get(exchanges::list_symbols),
        )
        .route("/api/ohlcv", get(ohlcv::get_ohlcv))
        .route("/api/stats", get(stats::get_stats))
        .route("/api/correlation", get(correlation::get_correlation))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
