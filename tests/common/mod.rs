// Shared test doubles for the broker transport, the video feed loader and
// the UI surface.

#![allow(dead_code)]

use async_trait::async_trait;
use doorbell_remote::audio::PlaybackClip;
use doorbell_remote::error::{ClientError, Result};
use doorbell_remote::transport::{ConnectParams, InboundMessage, Transport, TransportEvent};
use doorbell_remote::ui::{Control, Element, SharedUi, UiSurface};
use doorbell_remote::{CaptureAvailability, ClientEvent, Config, Controller, StreamLoader, Topic};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

// ============================================================================
// Transport
// ============================================================================

#[derive(Default)]
pub struct MockTransport {
    pub published: Mutex<Vec<(Topic, Vec<u8>)>>,
    pub subscribed: Mutex<Vec<Topic>>,
    pub fail_connect: bool,
    pub fail_subscribe: Option<Topic>,
    pub fail_publish: bool,
    pub events: Mutex<Option<mpsc::Sender<TransportEvent>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(Topic, Vec<u8>)> {
        self.published.lock().unwrap().clone()
    }

    /// Published messages as (topic, utf8 text)
    pub fn published_text(&self) -> Vec<(Topic, String)> {
        self.published()
            .into_iter()
            .map(|(t, p)| (t, String::from_utf8_lossy(&p).into_owned()))
            .collect()
    }

    pub fn subscribed(&self) -> Vec<Topic> {
        self.subscribed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, params: &ConnectParams) -> Result<mpsc::Receiver<TransportEvent>> {
        if self.fail_connect {
            return Err(ClientError::Connect {
                endpoint: params.endpoint.clone(),
                reason: "connection refused".to_string(),
            });
        }
        let (tx, rx) = mpsc::channel(16);
        *self.events.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn subscribe(&self, topic: Topic) -> Result<()> {
        if self.fail_subscribe == Some(topic) {
            return Err(ClientError::Subscribe {
                topic: topic.name().to_string(),
                reason: "not authorized".to_string(),
            });
        }
        self.subscribed.lock().unwrap().push(topic);
        Ok(())
    }

    async fn publish(&self, topic: Topic, payload: Vec<u8>) -> Result<()> {
        if self.fail_publish {
            return Err(ClientError::Publish {
                topic: topic.name().to_string(),
                reason: "broker rejected".to_string(),
            });
        }
        self.published.lock().unwrap().push((topic, payload));
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Video feed loader
// ============================================================================

/// Replays scripted outcomes; once the script runs out every load uses `fallback`
pub struct ScriptedLoader {
    script: Mutex<VecDeque<std::result::Result<(), String>>>,
    fallback: std::result::Result<(), String>,
    pub urls: Mutex<Vec<String>>,
}

impl ScriptedLoader {
    pub fn succeeding() -> Self {
        Self::with_script(vec![], Ok(()))
    }

    pub fn failing() -> Self {
        Self::with_script(vec![], Err("connection reset".to_string()))
    }

    pub fn with_script(
        script: Vec<std::result::Result<(), String>>,
        fallback: std::result::Result<(), String>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn load_count(&self) -> usize {
        self.urls.lock().unwrap().len()
    }
}

#[async_trait]
impl StreamLoader for ScriptedLoader {
    async fn load(&self, url: &str) -> Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        outcome.map_err(ClientError::StreamLoad)
    }
}

// ============================================================================
// UI
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Label(Control, String),
    Enabled(Control, bool),
    Visible(Element, bool),
    ResponseText(String),
    StreamSource(Option<String>),
    Play(String),
    StopAudio,
    Alert(String, String),
}

/// Keeps a call log on top of the real shared UI model
#[derive(Default)]
pub struct RecordingUi {
    pub shared: SharedUi,
    pub calls: Mutex<Vec<UiCall>>,
    pub fail_playback: bool,
}

impl RecordingUi {
    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                UiCall::Alert(title, text) => Some((title, text)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &UiCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: UiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl UiSurface for RecordingUi {
    fn set_label(&self, control: Control, text: &str) {
        self.record(UiCall::Label(control, text.to_string()));
        self.shared.set_label(control, text);
    }

    fn set_enabled(&self, control: Control, enabled: bool) {
        self.record(UiCall::Enabled(control, enabled));
        self.shared.set_enabled(control, enabled);
    }

    fn set_visible(&self, element: Element, visible: bool) {
        self.record(UiCall::Visible(element, visible));
        self.shared.set_visible(element, visible);
    }

    fn set_response_text(&self, text: &str) {
        self.record(UiCall::ResponseText(text.to_string()));
        self.shared.set_response_text(text);
    }

    fn set_stream_source(&self, url: Option<&str>) {
        self.record(UiCall::StreamSource(url.map(str::to_string)));
        self.shared.set_stream_source(url);
    }

    fn play_audio(&self, clip: &PlaybackClip) -> Result<()> {
        self.record(UiCall::Play(clip.mime.clone()));
        if self.fail_playback {
            return Err(ClientError::Playback("autoplay blocked".to_string()));
        }
        self.shared.play_audio(clip)
    }

    fn stop_audio(&self) {
        self.record(UiCall::StopAudio);
        self.shared.stop_audio();
    }

    fn alert(&self, title: &str, text: &str) {
        self.record(UiCall::Alert(title.to_string(), text.to_string()));
        self.shared.alert(title, text);
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub controller: Controller,
    pub rx: mpsc::Receiver<ClientEvent>,
    pub transport: Arc<MockTransport>,
    pub loader: Arc<ScriptedLoader>,
    pub ui: Arc<RecordingUi>,
}

pub fn test_config() -> Config {
    let mut cfg = Config::default();
    cfg.stream.base_url = "http://doorbell.local:8000".to_string();
    cfg
}

pub fn harness(transport: MockTransport, loader: ScriptedLoader, capture: CaptureAvailability) -> Harness {
    harness_with_ui(transport, loader, capture, RecordingUi::default())
}

pub fn harness_with_ui(
    transport: MockTransport,
    loader: ScriptedLoader,
    capture: CaptureAvailability,
    ui: RecordingUi,
) -> Harness {
    let transport = Arc::new(transport);
    let loader = Arc::new(loader);
    let ui = Arc::new(ui);
    let (controller, rx) = Controller::new(
        &test_config(),
        transport.clone(),
        loader.clone(),
        ui.clone(),
        capture,
    );
    Harness {
        controller,
        rx,
        transport,
        loader,
        ui,
    }
}

/// Harness already connected, with a feed that always loads
pub async fn connected() -> Harness {
    let mut h = harness(
        MockTransport::new(),
        ScriptedLoader::succeeding(),
        CaptureAvailability::Ready,
    );
    h.controller.start().await.expect("connect");
    h
}

impl Harness {
    /// Feed queued and timer-driven events to the controller until nothing
    /// arrives for `idle`. Returns the events handled, in order.
    pub async fn drain(&mut self, idle: Duration) -> Vec<ClientEvent> {
        let mut seen = Vec::new();
        while let Ok(Some(event)) = tokio::time::timeout(idle, self.rx.recv()).await {
            seen.push(event.clone());
            self.controller.handle(event).await;
        }
        seen
    }

    /// Handle events until one matching `pred` has been handled
    pub async fn handle_until(&mut self, pred: impl Fn(&ClientEvent) -> bool) -> ClientEvent {
        loop {
            let event = tokio::time::timeout(Duration::from_secs(30), self.rx.recv())
                .await
                .expect("event before timeout")
                .expect("channel open");
            let matched = pred(&event);
            self.controller.handle(event.clone()).await;
            if matched {
                return event;
            }
        }
    }

    pub async fn press(&mut self, intent: doorbell_remote::UserIntent) {
        self.controller.handle(ClientEvent::Intent(intent)).await;
    }

    pub async fn deliver(&mut self, topic: &str, payload: &[u8]) {
        self.controller
            .handle(ClientEvent::Transport(TransportEvent::Message(InboundMessage {
                topic: topic.to_string(),
                payload: payload.to_vec(),
            })))
            .await;
    }
}

/// A short valid 16-bit mono WAV clip
pub fn wav_bytes() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..1600 {
            writer.write_sample(((i % 100) * 100) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}
