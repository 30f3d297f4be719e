use super::state::AppState;
use crate::controller::{ClientEvent, UserIntent};
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    pub status: String,
    pub event: String,
}

/// Body of every front-end failure report
#[derive(Debug, Deserialize)]
pub struct FailureReport {
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

async fn submit(state: &AppState, event: ClientEvent, label: String) -> Response {
    match state.events.send(event).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(AcceptedResponse {
                status: "accepted".to_string(),
                event: label,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Control loop unavailable: {}", e);
            error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Control loop is not running".to_string(),
            )
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /ui
/// Snapshot of everything the UI currently shows
pub async fn get_ui(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.ui.snapshot())
}

/// POST /controls/:control
/// Press one of the toggle buttons
pub async fn press_control(
    State(state): State<AppState>,
    Path(control): Path<String>,
) -> Response {
    let intent = match control.as_str() {
        "camera" => UserIntent::ToggleCamera,
        "ai" => UserIntent::AskAi,
        "listen" => UserIntent::ToggleListen,
        "talk" => UserIntent::ToggleTalk,
        other => {
            return error_response(StatusCode::NOT_FOUND, format!("Unknown control {}", other));
        }
    };

    info!("Control pressed: {}", control);
    submit(&state, ClientEvent::Intent(intent), control).await
}

/// POST /controls/volume/:direction
pub async fn press_volume(
    State(state): State<AppState>,
    Path(direction): Path<String>,
) -> Response {
    let intent = match direction.as_str() {
        "up" => UserIntent::VolumeUp,
        "down" => UserIntent::VolumeDown,
        other => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("Unknown volume direction {}", other),
            );
        }
    };

    submit(&state, ClientEvent::Intent(intent), format!("volume_{}", direction)).await
}

/// POST /talk/chunk
/// One encoded chunk from the capture subsystem
pub async fn push_talk_chunk(State(state): State<AppState>, body: Bytes) -> Response {
    let len = body.len();
    submit(
        &state,
        ClientEvent::CaptureChunk(body.to_vec()),
        format!("chunk_{}_bytes", len),
    )
    .await
}

/// POST /talk/finished
/// Capture stopped and every chunk has been delivered
pub async fn capture_finished(State(state): State<AppState>) -> Response {
    submit(&state, ClientEvent::CaptureFinished, "capture_finished".to_string()).await
}

/// POST /talk/denied
/// The capture subsystem was refused microphone access
pub async fn capture_denied(
    State(state): State<AppState>,
    Json(req): Json<FailureReport>,
) -> Response {
    submit(
        &state,
        ClientEvent::CaptureDenied(req.reason),
        "capture_denied".to_string(),
    )
    .await
}

/// GET /listen/audio
/// Current playback clip as raw audio
pub async fn get_listen_audio(State(state): State<AppState>) -> Response {
    match state.ui.playback() {
        Some(clip) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, clip.mime)],
            clip.bytes,
        )
            .into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No audio clip".to_string()),
    }
}

/// POST /listen/failed
/// The player could not play the current clip
pub async fn playback_failed(
    State(state): State<AppState>,
    Json(req): Json<FailureReport>,
) -> Response {
    submit(
        &state,
        ClientEvent::PlaybackFailed(req.reason),
        "playback_failed".to_string(),
    )
    .await
}

/// POST /stream/failed
/// The rendered video feed errored
pub async fn stream_failed(
    State(state): State<AppState>,
    Json(req): Json<FailureReport>,
) -> Response {
    submit(
        &state,
        ClientEvent::StreamBroken { reason: req.reason },
        "stream_failed".to_string(),
    )
    .await
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
