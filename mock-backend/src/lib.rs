//! A small in-memory implementation of the question bank API, good enough to drive the session
//! wizard end to end without the real service.

mod dataset;
mod routes;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

pub use dataset::{Dataset, StoredQuestion};
pub use routes::StoredSession;

#[derive(Clone)]
pub struct AppState {
    dataset: Arc<Dataset>,
    sessions: Arc<Mutex<HashMap<String, StoredSession>>>,
    /// Bearer token that unlocks premium questions. `None` means nobody is entitled.
    entitled_token: Option<String>,
}

impl AppState {
    pub fn new(dataset: Dataset, entitled_token: Option<String>) -> Self {
        Self {
            dataset: Arc::new(dataset),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            entitled_token,
        }
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/content/filters", get(routes::content_filters))
        .route("/questions/count", post(routes::question_count))
        .route("/questions/by-selection", post(routes::questions))
        .route("/sessions", post(routes::create_session))
        .route("/sessions/{id}", get(routes::get_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves until the listener fails.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state)).await
}
