use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use marketlens_analytics::AnalyticsError;
use marketlens_market_data::MarketDataError;

/// API-facing error with an HTTP status mapping.
///
/// The core surfaces every upstream failure unchanged; this layer only
/// decides which status code the interaction fails with. There is no
/// retry and no empty-state fallback - a failed fetch fails the
/// request visibly.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Market(MarketDataError),
    Analytics(AnalyticsError),
    Internal(String),
}

impl From<MarketDataError> for ApiError {
    fn from(e: MarketDataError) -> Self {
        Self::Market(e)
    }
}

impl From<AnalyticsError> for ApiError {
    fn from(e: AnalyticsError) -> Self {
        Self::Analytics(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Market(e) => (market_status(e), e.to_string()),
            ApiError::Analytics(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
        };

        if status.is_server_error() {
            tracing::error!("request failed: {}", message);
        } else {
            tracing::debug!("request rejected: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

fn market_status(error: &MarketDataError) -> StatusCode {
    match error {
        // Caller mistakes
        MarketDataError::UnknownExchange(_)
        | MarketDataError::InvalidTimeFrame(_)
        | MarketDataError::UnsupportedTimeFrame { .. } => StatusCode::BAD_REQUEST,
        MarketDataError::SymbolNotFound { .. } => StatusCode::NOT_FOUND,

        // Upstream failures
        MarketDataError::UnexpectedSchema { .. }
        | MarketDataError::ProviderError { .. }
        | MarketDataError::Network(_) => StatusCode::BAD_GATEWAY,
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            market_status(&MarketDataError::UnknownExchange("kraken".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            market_status(&MarketDataError::SymbolNotFound {
                provider: "binance".into(),
                symbol: "NOPE/USDT".into(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            market_status(&MarketDataError::ProviderError {
                provider: "moex".into(),
                message: "503".into(),
            }),
            StatusCode::BAD_GATEWAY
        );
    }
}
