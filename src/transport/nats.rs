use super::{ConnectParams, InboundMessage, Transport, TransportEvent};
use crate::error::{ClientError, Result};
use crate::topics::{subject_to_topic, Topic};
use async_nats::{Client, ConnectOptions, Event};
use async_trait::async_trait;
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const EVENT_BUFFER: usize = 100;

/// Broker transport backed by a NATS server with its MQTT bridge enabled.
///
/// A session is single-shot: on disconnect the client and every subscription
/// forwarder are torn down, so nothing is delivered after `ConnectionLost`.
pub struct NatsTransport {
    client: Arc<RwLock<Option<Client>>>,
    events: RwLock<Option<mpsc::Sender<TransportEvent>>>,
    session: RwLock<CancellationToken>,
}

impl NatsTransport {
    pub fn new() -> Self {
        Self {
            client: Arc::new(RwLock::new(None)),
            events: RwLock::new(None),
            session: RwLock::new(CancellationToken::new()),
        }
    }

    async fn client(&self, topic: Topic) -> Result<Client> {
        self.client
            .read()
            .await
            .clone()
            .ok_or_else(|| ClientError::NotConnected {
                topic: topic.name().to_string(),
            })
    }
}

impl Default for NatsTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for NatsTransport {
    async fn connect(&self, params: &ConnectParams) -> Result<mpsc::Receiver<TransportEvent>> {
        info!("Connecting to broker at {} as {}", params.endpoint, params.client_id);

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let lost_tx = tx.clone();
        let session = CancellationToken::new();
        let lost_session = session.clone();
        let client_slot = Arc::clone(&self.client);

        let client = ConnectOptions::new()
            .name(&params.client_id)
            .require_tls(params.secure)
            .connection_timeout(params.timeout)
            .event_callback(move |event| {
                let lost_tx = lost_tx.clone();
                let lost_session = lost_session.clone();
                let client_slot = Arc::clone(&client_slot);
                async move {
                    match event {
                        Event::Disconnected => {
                            if lost_session.is_cancelled() {
                                return;
                            }
                            warn!("Broker connection lost");
                            // Dropping the last client handle closes the connection
                            lost_session.cancel();
                            client_slot.write().await.take();
                            if let Err(e) = lost_tx
                                .send(TransportEvent::ConnectionLost("disconnected".to_string()))
                                .await
                            {
                                debug!("Connection-loss event dropped: {}", e);
                            }
                        }
                        other => debug!("Broker event: {:?}", other),
                    }
                }
            })
            .connect(params.endpoint.as_str())
            .await
            .map_err(|e| ClientError::Connect {
                endpoint: params.endpoint.clone(),
                reason: e.to_string(),
            })?;

        info!("Connected to broker successfully");

        let previous = std::mem::replace(&mut *self.session.write().await, session);
        previous.cancel();
        *self.client.write().await = Some(client);
        *self.events.write().await = Some(tx);

        Ok(rx)
    }

    async fn subscribe(&self, topic: Topic) -> Result<()> {
        let client = self.client(topic).await?;
        let tx = self
            .events
            .read()
            .await
            .clone()
            .ok_or_else(|| ClientError::NotConnected {
                topic: topic.name().to_string(),
            })?;

        let subject = topic.subject();
        let mut subscriber =
            client
                .subscribe(subject.clone())
                .await
                .map_err(|e| ClientError::Subscribe {
                    topic: topic.name().to_string(),
                    reason: e.to_string(),
                })?;

        info!("Subscribed to {} (subject {})", topic, subject);

        let session = self.session.read().await.clone();
        tokio::spawn(async move {
            loop {
                let msg = tokio::select! {
                    _ = session.cancelled() => break,
                    msg = subscriber.next() => match msg {
                        Some(msg) => msg,
                        None => break,
                    },
                };
                let inbound = InboundMessage {
                    topic: subject_to_topic(&msg.subject.to_string()),
                    payload: msg.payload.to_vec(),
                };
                if let Err(e) = tx.send(TransportEvent::Message(inbound)).await {
                    error!("Failed to forward inbound message: {}", e);
                    break;
                }
            }
            debug!("Subscription to {} ended", subject);
        });

        Ok(())
    }

    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        let client = self.client(topic).await?;
        let len = payload.len();

        client
            .publish(topic.subject(), payload.into())
            .await
            .map_err(|e| ClientError::Publish {
                topic: topic.name().to_string(),
                reason: e.to_string(),
            })?;

        debug!("Published to {} ({} bytes)", topic, len);

        Ok(())
    }

    fn name(&self) -> &str {
        "nats"
    }
}
