//! Meal planner API server.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting meal planner server");
    let config = Config::load()?;
    let state = AppState::load(config)?;
    server::run(state).await
}
