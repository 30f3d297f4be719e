use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub broker: BrokerConfig,
    pub stream: StreamConfig,
    pub sync: SyncConfig,
    pub http: HttpConfig,
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub secure_port: u16,
    /// Secure transport; only valid when the client runs in a secure context
    pub secure: bool,
    pub client_id_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub base_url: String,
    pub path: String,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub load_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// How long an optimistic camera state may go unconfirmed before the UI flags it
    pub confirm_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub query: String,
}

impl BrokerConfig {
    pub fn effective_port(&self) -> u16 {
        if self.secure {
            self.secure_port
        } else {
            self.port
        }
    }

    pub fn endpoint(&self) -> String {
        let scheme = if self.secure { "tls" } else { "nats" };
        format!("{}://{}:{}", scheme, self.host, self.effective_port())
    }
}

impl StreamConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }
}

impl SyncConfig {
    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }
}

impl Config {
    /// Load configuration from an optional file plus `DOORBELL__*` environment overrides.
    ///
    /// Every key has a default, so a missing file is not an error.
    pub fn load(path: &str) -> Result<Self> {
        let path = shellexpand::tilde(path).into_owned();

        let settings = Self::defaults()?
            .add_source(config::File::with_name(&path).required(false))
            .add_source(config::Environment::with_prefix("DOORBELL").separator("__"))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("broker.host", "192.168.220.124")?
            .set_default("broker.port", 9001)?
            .set_default("broker.secure_port", 9002)?
            .set_default("broker.secure", false)?
            .set_default("broker.client_id_prefix", "doorbell_")?
            .set_default("stream.base_url", "http://192.168.220.124:8000")?
            .set_default("stream.path", "/stream.mjpg")?
            .set_default("stream.max_retries", 3)?
            .set_default("stream.retry_delay_ms", 1000)?
            .set_default("stream.load_timeout_ms", 5000)?
            .set_default("sync.confirm_timeout_ms", 3000)?
            .set_default("http.bind", "127.0.0.1")?
            .set_default("http.port", 8080)?
            .set_default("ai.query", "describe this image")?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            broker: BrokerConfig {
                host: "192.168.220.124".to_string(),
                port: 9001,
                secure_port: 9002,
                secure: false,
                client_id_prefix: "doorbell_".to_string(),
            },
            stream: StreamConfig {
                base_url: "http://192.168.220.124:8000".to_string(),
                path: "/stream.mjpg".to_string(),
                max_retries: 3,
                retry_delay_ms: 1000,
                load_timeout_ms: 5000,
            },
            sync: SyncConfig {
                confirm_timeout_ms: 3000,
            },
            http: HttpConfig {
                bind: "127.0.0.1".to_string(),
                port: 8080,
            },
            ai: AiConfig {
                query: "describe this image".to_string(),
            },
        }
    }
}
