//! Broker transport
//!
//! The control layer never talks to the broker directly; it goes through the
//! `Transport` trait so the connection can be swapped for a test double.
//! Delivery is assumed ordered per topic and at-least-once.

pub mod nats;

use crate::error::Result;
use crate::topics::Topic;
use async_trait::async_trait;
use tokio::sync::mpsc;

pub use nats::NatsTransport;

/// Parameters for a single broker session
#[derive(Debug, Clone)]
pub struct ConnectParams {
    /// Broker URL, e.g. `nats://192.168.220.124:9001`
    pub endpoint: String,
    pub secure: bool,
    /// Unique per-session client identifier
    pub client_id: String,
    pub timeout: std::time::Duration,
}

/// A message delivered on a subscribed topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Topic name as received; may be one the registry does not know
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Events the transport reports after a successful connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message(InboundMessage),
    ConnectionLost(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Open the broker session.
    ///
    /// Returns the receiver on which inbound messages and connection-loss
    /// notifications arrive for the lifetime of the session.
    async fn connect(&self, params: &ConnectParams) -> Result<mpsc::Receiver<TransportEvent>>;

    async fn subscribe(&self, topic: Topic) -> Result<()>;

    /// Publish raw bytes; the transport performs no transformation
    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()>;

    /// Get transport name for logging
    fn name(&self) -> &str;
}
