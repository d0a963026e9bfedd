use super::handlers;
use super::state::AppState;
use super::ws;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Agent lifecycle
        .route("/session/start", post(handlers::start_session))
        .route("/session/update", post(handlers::update_session))
        .route("/session/stop", post(handlers::stop_session))
        // Agent commands
        .route("/session/command", post(handlers::send_command))
        // Session queries
        .route("/session/status", get(handlers::get_status))
        .route("/session/transcript", get(handlers::get_transcript))
        // UI event stream
        .route("/session/events", get(ws::session_events))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // Browser-based UIs live on another origin
        .layer(CorsLayer::permissive())
        .with_state(state)
}
