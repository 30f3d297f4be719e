use super::handlers;
use super::state::AppState;
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
        // UI projection
        .route("/ui", get(handlers::get_ui))
        // User intents
        .route("/controls/:control", post(handlers::press_control))
        .route(
            "/controls/volume/:direction",
            post(handlers::press_volume),
        )
        // Capture subsystem
        .route("/talk/chunk", post(handlers::push_talk_chunk))
        .route("/talk/finished", post(handlers::capture_finished))
        .route("/talk/denied", post(handlers::capture_denied))
        // Playback subsystem
        .route("/listen/audio", get(handlers::get_listen_audio))
        .route("/listen/failed", post(handlers::playback_failed))
        // Rendered video feed
        .route("/stream/failed", post(handlers::stream_failed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
