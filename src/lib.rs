//! Campaign SMS relay
//!
//! Sends templated broadcasts through Twilio, answers inbound texts with
//! canned replies and keeps an in-memory opt-out list.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod rate_limit;
pub mod responder;
pub mod state;
pub mod template;
pub mod types;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/test-connection", post(handlers::test_connection))
        .route("/send", post(handlers::send_broadcast))
        .route("/incoming", post(handlers::incoming))
        .route("/messages", get(handlers::list_messages))
        .route("/reply", post(handlers::reply))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
