//! Connection lifecycle
//!
//! Owns the single broker session and the typed "channel usable" state.
//! Everything that needs to know whether publishing is possible reads it
//! through a [`ConnectionStatus`] handle rather than a shared flag.

use crate::error::{ClientError, Result};
use crate::topics::Topic;
use crate::transport::{ConnectParams, Transport, TransportEvent};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const CLIENT_ID_SUFFIX_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Read-only view of the connection state
#[derive(Debug, Clone)]
pub struct ConnectionStatus {
    rx: watch::Receiver<ConnectionState>,
}

impl ConnectionStatus {
    pub fn state(&self) -> ConnectionState {
        *self.rx.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }
}

pub struct ConnectionManager {
    transport: Arc<dyn Transport>,
    params: ConnectParams,
    state: watch::Sender<ConnectionState>,
}

impl ConnectionManager {
    pub fn new(transport: Arc<dyn Transport>, endpoint: String, secure: bool, client_id: String) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            params: ConnectParams {
                endpoint,
                secure,
                client_id,
                timeout: CONNECT_TIMEOUT,
            },
            state,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            rx: self.state.subscribe(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn client_id(&self) -> &str {
        &self.params.client_id
    }

    pub fn is_secure(&self) -> bool {
        self.params.secure
    }

    /// Connect and subscribe to every inbound topic.
    ///
    /// A failed subscription is logged and does not fail the connect; the
    /// channel is marked usable once the session is open.
    pub async fn connect(&self) -> Result<mpsc::Receiver<TransportEvent>> {
        self.state.send_replace(ConnectionState::Connecting);

        let events = match self.transport.connect(&self.params).await {
            Ok(events) => events,
            Err(e) => {
                error!("Broker connect failed: {}", e);
                self.state.send_replace(ConnectionState::Disconnected);
                return Err(match e {
                    err @ ClientError::Connect { .. } => err,
                    other => ClientError::Connect {
                        endpoint: self.params.endpoint.clone(),
                        reason: other.to_string(),
                    },
                });
            }
        };

        info!(
            "Connected to broker via {} ({})",
            self.transport.name(),
            if self.params.secure { "secure" } else { "plain" }
        );

        for topic in Topic::INBOUND {
            match self.transport.subscribe(topic).await {
                Ok(()) => info!("Subscribed to: {}", topic),
                Err(e) => error!("Subscribe failed: {}: {}", topic, e),
            }
        }

        self.state.send_replace(ConnectionState::Connected);

        Ok(events)
    }

    /// Mark the channel unusable immediately; no reconnect is attempted
    pub fn connection_lost(&self, reason: &str) {
        warn!("Broker connection lost: {}", reason);
        self.state.send_replace(ConnectionState::Disconnected);
    }
}

/// Per-session client identifier: prefix plus six random alphanumerics
pub fn make_client_id(prefix: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(CLIENT_ID_SUFFIX_LEN)
        .collect();
    format!("{}{}", prefix, suffix)
}
