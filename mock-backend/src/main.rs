use std::path::PathBuf;

use anyhow::Context;
use mock_backend::{AppState, Dataset};

const DEFAULT_PORT: u16 = 8787;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let port = match std::env::var("PORT") {
        Ok(raw) => raw.parse().with_context(|| format!("PORT is not a port: {raw}"))?,
        Err(_) => DEFAULT_PORT,
    };

    let dataset = match std::env::var_os("MOCK_DATASET").map(PathBuf::from) {
        Some(path) => Dataset::load(&path)?,
        None => Dataset::sample(),
    };
    let entitled_token = std::env::var("MOCK_ENTITLED_TOKEN").ok();
    if entitled_token.is_none() {
        log::warn!("MOCK_ENTITLED_TOKEN not set, premium questions will never be accessible");
    }

    log::info!(
        "serving {} units, {} independent modules, {} questions",
        dataset.content.unites.len(),
        dataset.content.independent_modules.len(),
        dataset.questions.len()
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    log::info!("listening on http://{}", listener.local_addr()?);

    mock_backend::serve(listener, AppState::new(dataset, entitled_token))
        .await
        .context("Server stopped")
}
