use anyhow::{Context, Result};
use clap::Parser;
use doorbell_remote::{
    create_router, AppState, CaptureAvailability, Config, Controller, HttpStreamLoader,
    NatsTransport, SharedUi,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "doorbell-remote", version, about = "Remote control client for a networked doorbell")]
struct Args {
    /// Configuration file (TOML); missing files fall back to defaults
    #[arg(long, default_value = "~/.config/doorbell-remote/config")]
    config: String,

    /// Use secure broker transport and enable talk-back capture
    #[arg(long)]
    secure: bool,

    /// Override the broker host
    #[arg(long)]
    broker_host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut cfg = Config::load(&args.config)?;
    if args.secure {
        cfg.broker.secure = true;
    }
    if let Some(host) = args.broker_host {
        cfg.broker.host = host;
    }

    info!("Doorbell remote v{}", env!("CARGO_PKG_VERSION"));
    info!("Broker endpoint: {}", cfg.broker.endpoint());
    info!("Video feed: {}{}", cfg.stream.base_url, cfg.stream.path);

    // Microphone capture is only offered in a secure context
    let capture = if cfg.broker.secure {
        CaptureAvailability::Ready
    } else {
        CaptureAvailability::Unavailable(
            "run over a secure transport to enable audio recording".to_string(),
        )
    };

    let ui = SharedUi::new();
    let (mut controller, events_rx) = Controller::new(
        &cfg,
        Arc::new(NatsTransport::new()),
        Arc::new(HttpStreamLoader::new(cfg.stream.load_timeout())),
        Arc::new(ui.clone()),
        capture,
    );

    let app = create_router(AppState::new(controller.sender(), ui));
    let addr = format!("{}:{}", cfg.http.bind, cfg.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind control API on {}", addr))?;
    info!("Control API listening on http://{}", addr);

    // A failed connect is already on screen as an alert; keep serving the UI
    if let Err(e) = controller.start().await {
        error!("Starting without a broker session: {}", e);
    }

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.context("Control API server failed")?;
        }
        _ = controller.run(events_rx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down");
        }
    }

    Ok(())
}
