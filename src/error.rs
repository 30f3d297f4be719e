use thiserror::Error;

/// Errors raised by the control layer.
///
/// Only `Connect`, `StreamExhausted` and `CaptureDenied` are meant to reach
/// the user; everything else is logged and swallowed where it happens.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to broker at {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("channel not connected, dropped command for {topic}")]
    NotConnected { topic: String },

    #[error("failed to publish to {topic}: {reason}")]
    Publish { topic: String, reason: String },

    #[error("failed to subscribe to {topic}: {reason}")]
    Subscribe { topic: String, reason: String },

    #[error("video stream failed to load: {0}")]
    StreamLoad(String),

    #[error("video stream unavailable after {attempts} attempts")]
    StreamExhausted { attempts: u32 },

    #[error("malformed payload on {topic}: {reason}")]
    MalformedPayload { topic: String, reason: String },

    #[error("microphone access denied: {0}")]
    CaptureDenied(String),

    #[error("audio playback failed: {0}")]
    Playback(String),
}

impl ClientError {
    /// Whether this error must be shown to the user as a blocking alert
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ClientError::Connect { .. }
                | ClientError::StreamExhausted { .. }
                | ClientError::CaptureDenied(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
