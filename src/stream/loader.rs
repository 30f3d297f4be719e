use crate::error::{ClientError, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use std::time::Duration;
use tracing::debug;

/// Loads the video feed at a URL and reports whether it is playable
#[async_trait]
pub trait StreamLoader: Send + Sync {
    async fn load(&self, url: &str) -> Result<()>;
}

/// Probes the MJPEG feed over HTTP: the request must succeed with a
/// multipart/image content type and deliver a first body chunk in time.
pub struct HttpStreamLoader {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpStreamLoader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl StreamLoader for HttpStreamLoader {
    async fn load(&self, url: &str) -> Result<()> {
        let probe = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| ClientError::StreamLoad(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ClientError::StreamLoad(format!("HTTP {}", status)));
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if !(content_type.starts_with("multipart/") || content_type.starts_with("image/")) {
                return Err(ClientError::StreamLoad(format!(
                    "unexpected content type {:?}",
                    content_type
                )));
            }

            let mut body = response.bytes_stream();
            match body.next().await {
                Some(Ok(chunk)) => {
                    debug!("Video stream delivered first chunk ({} bytes)", chunk.len());
                    Ok(())
                }
                Some(Err(e)) => Err(ClientError::StreamLoad(e.to_string())),
                None => Err(ClientError::StreamLoad("empty stream".to_string())),
            }
        };

        tokio::time::timeout(self.timeout, probe)
            .await
            .map_err(|_| ClientError::StreamLoad(format!("timed out after {:?}", self.timeout)))?
    }
}
