use crate::connection::ConnectionStatus;
use crate::topics::{Direction, Topic};
use crate::transport::Transport;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Payload handed to the dispatcher; forwarded untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Text(String),
    Binary(Vec<u8>),
}

impl Payload {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Payload::Text(text) => text.into_bytes(),
            Payload::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Text(text) => text.len(),
            Payload::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Binary(bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Published,
    /// Channel not connected; the command was dropped
    Dropped,
    /// The transport rejected the publish; logged only
    Failed,
}

/// Publishes commands, gated on the connection state.
///
/// Command loss is accepted: nothing here is surfaced to the user.
pub struct CommandDispatcher {
    transport: Arc<dyn Transport>,
    status: ConnectionStatus,
}

impl CommandDispatcher {
    pub fn new(transport: Arc<dyn Transport>, status: ConnectionStatus) -> Self {
        Self { transport, status }
    }

    pub async fn send(&self, topic: Topic, payload: impl Into<Payload>) -> SendOutcome {
        if topic.direction() != Direction::Outbound {
            warn!("Refusing to publish on inbound topic {}", topic);
            return SendOutcome::Failed;
        }

        if !self.status.is_connected() {
            warn!("Broker not connected. Skipping send: {}", topic);
            return SendOutcome::Dropped;
        }

        let payload = payload.into();
        let len = payload.len();

        match self.transport.publish(topic, payload.into_bytes()).await {
            Ok(()) => {
                debug!("Sent {} bytes to {}", len, topic);
                SendOutcome::Published
            }
            Err(e) => {
                error!("Publish to {} failed: {}", topic, e);
                SendOutcome::Failed
            }
        }
    }
}
