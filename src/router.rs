//! Inbound routing
//!
//! Demultiplexes arriving messages by exact topic match into typed
//! [`Inbound`] values. Unknown topics and malformed payloads are logged and
//! dropped, never raised.

use crate::error::ClientError;
use crate::sync::Toggle;
use crate::topics::Topic;
use serde::Deserialize;
use tracing::{debug, warn};

/// Plain-text marker the device publishes while the AI request is in flight
pub const LEGACY_WAITING_TEXT: &str = "waiting for the AI to Answer...";
/// Prefix the device puts on AI failures when it sends plain text
pub const LEGACY_ERROR_PREFIX: &str = "❌ GPT error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiResponse {
    Waiting,
    Answer(String),
    Error(String),
}

impl AiResponse {
    /// Text shown in the response area
    pub fn display_text(&self) -> &str {
        match self {
            AiResponse::Waiting => LEGACY_WAITING_TEXT,
            AiResponse::Answer(text) | AiResponse::Error(text) => text,
        }
    }

    /// Parse a response payload.
    ///
    /// A JSON object with an explicit `status` field wins; otherwise the
    /// plain-text conventions are applied.
    pub fn parse(payload: &str) -> AiResponse {
        if let Ok(tagged) = serde_json::from_str::<TaggedResponse>(payload) {
            return match tagged.status {
                ResponseStatus::Waiting => AiResponse::Waiting,
                ResponseStatus::Answer => AiResponse::Answer(tagged.text),
                ResponseStatus::Error => AiResponse::Error(tagged.text),
            };
        }

        if payload == LEGACY_WAITING_TEXT {
            AiResponse::Waiting
        } else if payload.starts_with(LEGACY_ERROR_PREFIX) {
            AiResponse::Error(payload.to_string())
        } else {
            AiResponse::Answer(payload.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ResponseStatus {
    Waiting,
    Answer,
    Error,
}

#[derive(Debug, Deserialize)]
struct TaggedResponse {
    status: ResponseStatus,
    #[serde(default)]
    text: String,
}

/// A routed inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    AiResponse(AiResponse),
    CameraStatus(Toggle),
    AudioResponse(Vec<u8>),
}

/// Route a message to its handler kind. Returns `None` when it is dropped.
pub fn route(topic: &str, payload: &[u8]) -> Option<Inbound> {
    debug!("Message from {} ({} bytes)", topic, payload.len());

    let routed = match Topic::from_name(topic) {
        Some(Topic::AiResponse) => decode_text(Topic::AiResponse, payload)
            .map(|text| Inbound::AiResponse(AiResponse::parse(&text))),
        Some(Topic::CameraStatus) => decode_text(Topic::CameraStatus, payload)
            .and_then(|text| {
                Toggle::parse(text.trim()).ok_or_else(|| ClientError::MalformedPayload {
                    topic: topic.to_string(),
                    reason: format!("unexpected camera status {:?}", text),
                })
            })
            .map(Inbound::CameraStatus),
        Some(Topic::ListenAudio) => Ok(Inbound::AudioResponse(payload.to_vec())),
        _ => {
            warn!("Unhandled topic: {}", topic);
            return None;
        }
    };

    match routed {
        Ok(inbound) => Some(inbound),
        Err(e) => {
            warn!("Dropping message: {}", e);
            None
        }
    }
}

fn decode_text(topic: Topic, payload: &[u8]) -> Result<String, ClientError> {
    String::from_utf8(payload.to_vec()).map_err(|e| ClientError::MalformedPayload {
        topic: topic.name().to_string(),
        reason: e.to_string(),
    })
}
