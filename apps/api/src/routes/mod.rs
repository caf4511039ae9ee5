pub mod health;

use axum::{
    routing::{any, get},
    Router,
};

use crate::relay::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Every method is routed to the relay so it can answer with its own 405 body
        .route("/api/generate", any(handlers::handle_relay))
        .with_state(state)
}
