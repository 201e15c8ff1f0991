mod api;
mod error;
mod state;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use api::create_router;
use state::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_line_number(true))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let listen_addr = std::env::var("MARKETLENS_LISTEN_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let state = AppState::new();
    let router = create_router(state);

    tracing::info!("Listening on {}", listen_addr);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
