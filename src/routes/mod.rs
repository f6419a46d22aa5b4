pub mod generate;
pub mod health;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/generate", post(generate::generate))
        .with_state(state)
}
