//! Error types for market data operations.

use thiserror::Error;

/// Errors surfaced by providers, the factory, and the exchange registry.
///
/// The crate performs no local recovery: every failure propagates to the
/// caller unchanged, and the presentation layer is expected to fail the
/// current interaction visibly rather than retry.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The exchange identifier is not in any configured factory group.
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),

    /// The symbol is not tradable on (or not understood by) this venue.
    #[error("Symbol not found on {provider}: {symbol}")]
    SymbolNotFound {
        /// The provider that rejected the symbol
        provider: String,
        /// The offending symbol
        symbol: String,
    },

    /// The time frame string is not in the supported set.
    #[error("Invalid time frame: {0}")]
    InvalidTimeFrame(String),

    /// The venue has no interval bucket for this time frame.
    #[error("Time frame {time_frame} not supported by {provider}")]
    UnsupportedTimeFrame {
        /// The provider lacking the bucket
        provider: String,
        /// The requested granularity
        time_frame: String,
    },

    /// An upstream payload did not have the expected shape
    /// (missing column, wrong type, out-of-order rows).
    #[error("Unexpected response schema from {provider}: {message}")]
    UnexpectedSchema {
        /// The provider whose payload mismatched
        provider: String,
        /// What was wrong with it
        message: String,
    },

    /// The upstream venue rejected the request.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// A network error occurred while talking to an upstream venue.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Attach a provider name to variants built before one was known.
    pub(crate) fn for_provider(self, provider: &str) -> Self {
        match self {
            Self::UnexpectedSchema { message, .. } => Self::UnexpectedSchema {
                provider: provider.to_string(),
                message,
            },
            other => other,
        }
    }
}
