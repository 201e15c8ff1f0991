use std::sync::{Arc, Mutex};

use marketlens_market_data::{ExchangesProvider, MarketDataError};

use crate::error::ApiError;

/// Shared server state: the composition root owning the exchange
/// registry.
///
/// The registry and its provider caches are single-threaded by
/// contract, so all access is serialized through one mutex and runs on
/// the blocking pool. Concurrent requests queue on the lock rather than
/// race the memo caches; hardening beyond that is explicitly out of
/// scope.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<Mutex<ExchangesProvider>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(ExchangesProvider::with_defaults())),
        }
    }

    /// Run a closure against the registry on the blocking thread pool.
    pub async fn with_registry<F, T>(&self, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut ExchangesProvider) -> Result<T, MarketDataError> + Send + 'static,
        T: Send + 'static,
    {
        let registry = Arc::clone(&self.registry);
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = registry.lock().expect("registry lock poisoned");
            f(&mut guard)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("blocking task failed: {}", e)))?;

        result.map_err(ApiError::from)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
