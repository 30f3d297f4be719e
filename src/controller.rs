//! Control loop
//!
//! All state (feature states, stream attempt, talk recording, connection
//! state) is mutated only here, one [`ClientEvent`] at a time. Everything
//! asynchronous (broker deliveries, feed loads, retry and confirmation
//! timers, captured audio) re-enters the loop as an event.

use crate::audio::{CaptureAvailability, PlaybackClip, TalkRecorder};
use crate::config::Config;
use crate::connection::{make_client_id, ConnectionManager, ConnectionState};
use crate::dispatcher::{CommandDispatcher, SendOutcome};
use crate::error::ClientError;
use crate::router::{self, AiResponse, Inbound};
use crate::stream::{FailureAction, LoadRequest, StreamLoader, StreamRetryController};
use crate::sync::{AiTransition, DeviceSync, Feature, Toggle};
use crate::topics::Topic;
use crate::transport::{Transport, TransportEvent};
use crate::ui::{Control, Element, UiSurface};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

const EVENT_BUFFER: usize = 256;

/// What the user asked for through the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserIntent {
    ToggleCamera,
    AskAi,
    ToggleListen,
    ToggleTalk,
    VolumeUp,
    VolumeDown,
}

impl UserIntent {
    fn control(self) -> Control {
        match self {
            UserIntent::ToggleCamera => Control::Camera,
            UserIntent::AskAi => Control::Ai,
            UserIntent::ToggleListen => Control::Listen,
            UserIntent::ToggleTalk => Control::Talk,
            UserIntent::VolumeUp => Control::VolumeUp,
            UserIntent::VolumeDown => Control::VolumeDown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Intent(UserIntent),
    Transport(TransportEvent),
    StreamLoaded { generation: u64 },
    StreamFailed { generation: u64, reason: String },
    StreamRetryDue { generation: u64 },
    /// Confirmation time-box for the camera intent with this sequence number
    ConfirmDeadline { seq: u64 },
    /// Feed rendered by the front end broke (e.g. image error after loading)
    StreamBroken { reason: String },
    CaptureChunk(Vec<u8>),
    /// Capture subsystem delivered its last chunk for the session
    CaptureFinished,
    CaptureDenied(String),
    /// The player could not play the current clip
    PlaybackFailed(String),
}

pub struct Controller {
    connection: ConnectionManager,
    dispatcher: CommandDispatcher,
    sync: DeviceSync,
    stream: StreamRetryController,
    talk: TalkRecorder,
    loader: Arc<dyn StreamLoader>,
    ui: Arc<dyn UiSurface>,
    events: mpsc::Sender<ClientEvent>,
    ai_query: String,
    controls_ready: bool,
}

impl Controller {
    /// Build the controller and the receiver its event loop consumes
    pub fn new(
        config: &Config,
        transport: Arc<dyn Transport>,
        loader: Arc<dyn StreamLoader>,
        ui: Arc<dyn UiSurface>,
        capture: CaptureAvailability,
    ) -> (Self, mpsc::Receiver<ClientEvent>) {
        let (events, rx) = mpsc::channel(EVENT_BUFFER);

        let connection = ConnectionManager::new(
            Arc::clone(&transport),
            config.broker.endpoint(),
            config.broker.secure,
            make_client_id(&config.broker.client_id_prefix),
        );
        let dispatcher = CommandDispatcher::new(transport, connection.status());

        let controller = Self {
            connection,
            dispatcher,
            sync: DeviceSync::new(config.sync.confirm_timeout()),
            stream: StreamRetryController::new(
                &config.stream.base_url,
                &config.stream.path,
                config.stream.max_retries,
                config.stream.retry_delay(),
            ),
            talk: TalkRecorder::new(capture),
            loader,
            ui,
            events,
            ai_query: config.ai.query.clone(),
            controls_ready: false,
        };

        (controller, rx)
    }

    /// Sender for feeding intents and capture data into the loop
    pub fn sender(&self) -> mpsc::Sender<ClientEvent> {
        self.events.clone()
    }

    pub fn sync(&self) -> &DeviceSync {
        &self.sync
    }

    pub fn stream(&self) -> &StreamRetryController {
        &self.stream
    }

    pub fn talk(&self) -> &TalkRecorder {
        &self.talk
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn client_id(&self) -> &str {
        self.connection.client_id()
    }

    /// Connect to the broker and enable the controls.
    ///
    /// A connect failure is shown to the user and returned.
    pub async fn start(&mut self) -> Result<(), ClientError> {
        for control in Control::ALL {
            self.ui.set_enabled(control, false);
        }
        self.render_labels();

        let mut transport_rx = match self.connection.connect().await {
            Ok(rx) => rx,
            Err(e) => {
                self.ui.alert("Broker Failure", &e.to_string());
                return Err(e);
            }
        };

        let tx = self.events.clone();
        tokio::spawn(async move {
            while let Some(event) = transport_rx.recv().await {
                if tx.send(ClientEvent::Transport(event)).await.is_err() {
                    break;
                }
            }
            debug!("Transport event forwarder stopped");
        });

        self.controls_ready = true;
        for control in Control::ALL {
            self.ui.set_enabled(control, self.is_enabled(control));
        }

        info!(
            "Client {} connected ({})",
            self.connection.client_id(),
            if self.connection.is_secure() { "secure" } else { "plain" }
        );

        Ok(())
    }

    /// Process events until every sender is gone
    pub async fn run(mut self, mut rx: mpsc::Receiver<ClientEvent>) {
        info!("Control loop started");
        while let Some(event) = rx.recv().await {
            self.handle(event).await;
        }
        self.stream.stop();
        info!("Control loop stopped");
    }

    pub async fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::Intent(intent) => self.handle_intent(intent).await,
            ClientEvent::Transport(TransportEvent::Message(msg)) => {
                if self.connection.state() != ConnectionState::Connected {
                    debug!("Ignoring message on {}: channel not connected", msg.topic);
                    return;
                }
                if let Some(inbound) = router::route(&msg.topic, &msg.payload) {
                    self.handle_inbound(inbound);
                }
            }
            ClientEvent::Transport(TransportEvent::ConnectionLost(reason)) => {
                self.connection.connection_lost(&reason);
            }
            ClientEvent::StreamLoaded { generation } => {
                self.stream.on_load_success(generation);
            }
            ClientEvent::StreamFailed { generation, reason } => {
                self.handle_stream_failure(generation, &reason);
            }
            ClientEvent::StreamBroken { reason } => {
                if self.stream.has_pending_retry() {
                    debug!("Ignoring stream report: retry already scheduled");
                    return;
                }
                let generation = self.stream.generation();
                self.handle_stream_failure(generation, &reason);
            }
            ClientEvent::StreamRetryDue { generation } => {
                if !self.sync.camera.displayed().is_on() {
                    debug!("Ignoring stream retry: camera is off");
                    return;
                }
                if let Some(req) = self.stream.on_retry_due(generation, now_ms()) {
                    self.begin_load(req);
                }
            }
            ClientEvent::ConfirmDeadline { seq } => {
                if seq == self.sync.camera.intent_seq() {
                    self.render_label(Feature::Camera);
                }
            }
            ClientEvent::CaptureChunk(chunk) => self.talk.push_chunk(chunk),
            ClientEvent::CaptureFinished => self.finish_talk().await,
            ClientEvent::CaptureDenied(reason) => self.handle_capture_denied(&reason),
            ClientEvent::PlaybackFailed(reason) => {
                error!("{}", ClientError::Playback(reason));
                self.ui.stop_audio();
                self.ui.set_visible(Element::AudioPlayer, false);
            }
        }
    }

    fn is_enabled(&self, control: Control) -> bool {
        if !self.controls_ready {
            return false;
        }
        match control {
            Control::Camera | Control::Ai => !self.sync.ai.is_pending(),
            Control::Talk => self.talk.is_ready(),
            Control::Listen | Control::VolumeUp | Control::VolumeDown => true,
        }
    }

    async fn handle_intent(&mut self, intent: UserIntent) {
        if !self.is_enabled(intent.control()) {
            debug!("Ignoring {:?}: control disabled", intent);
            return;
        }

        match intent {
            UserIntent::ToggleCamera => {
                let before = self.sync.camera.displayed();
                let mode = self.sync.camera.toggle(Instant::now());
                self.apply_camera(before);
                self.dispatcher.send(Topic::CameraControl, mode.as_command()).await;
                self.schedule_confirm_deadline();
            }
            UserIntent::AskAi => self.ask_ai().await,
            UserIntent::ToggleListen => {
                let mode = self.sync.listen.toggle(Instant::now());
                self.render_label(Feature::Listen);
                self.dispatcher.send(Topic::MicrophoneControl, mode.as_command()).await;

                self.ui.set_visible(Element::AudioPlayer, false);
                if !mode.is_on() {
                    self.ui.stop_audio();
                }
            }
            UserIntent::ToggleTalk => self.toggle_talk().await,
            UserIntent::VolumeUp => {
                self.dispatcher.send(Topic::VolumeControl, "up").await;
            }
            UserIntent::VolumeDown => {
                self.dispatcher.send(Topic::VolumeControl, "down").await;
            }
        }
    }

    async fn ask_ai(&mut self) {
        if !self.sync.camera.displayed().is_on() {
            self.ui
                .alert("Camera must be running", "Start camera before asking GPT.");
            return;
        }

        let query = self.ai_query.clone();
        if self.dispatcher.send(Topic::AiRequest, query.as_str()).await == SendOutcome::Published
            && self.sync.ai.begin()
        {
            info!("AI query issued");
            self.lock_for_ai();
        }

        // The device snapshots the frame itself; the feed is torn down meanwhile
        self.dispatcher
            .send(Topic::CameraControl, Toggle::Off.as_command())
            .await;
        let before = self.sync.camera.displayed();
        self.sync.camera.set_intent(Toggle::Off, Instant::now());
        self.apply_camera(before);
        self.schedule_confirm_deadline();
    }

    async fn toggle_talk(&mut self) {
        if self.sync.talk.displayed().is_on() {
            self.sync.talk.set_intent(Toggle::Off, Instant::now());
            self.render_label(Feature::Talk);
            self.talk.request_stop();
        } else if self.talk.start() {
            self.sync.talk.set_intent(Toggle::On, Instant::now());
            self.render_label(Feature::Talk);
        }
    }

    /// Publish the finished session. Capture may also end on its own, in
    /// which case the talk state follows.
    async fn finish_talk(&mut self) {
        if self.sync.talk.displayed().is_on() {
            self.sync.talk.set_intent(Toggle::Off, Instant::now());
            self.render_label(Feature::Talk);
        }
        if let Some(payload) = self.talk.finish() {
            let len = payload.len();
            if self.dispatcher.send(Topic::TalkAudio, payload).await == SendOutcome::Published {
                info!("Sent talk audio: {} bytes", len);
            }
        }
    }

    fn handle_inbound(&mut self, inbound: Inbound) {
        match inbound {
            Inbound::CameraStatus(status) => {
                info!("Updating camera UI from device: {}", status.as_command());
                let before = self.sync.camera.displayed();
                self.sync.camera.confirm(status);
                self.apply_camera(before);
            }
            Inbound::AiResponse(response) => self.handle_ai_response(response),
            Inbound::AudioResponse(payload) => self.handle_audio_response(&payload),
        }
    }

    fn handle_ai_response(&mut self, response: AiResponse) {
        self.ui.set_response_text(response.display_text());

        match response {
            AiResponse::Waiting => {
                if self.sync.ai.waiting() == AiTransition::Entered {
                    self.lock_for_ai();
                }
            }
            AiResponse::Answer(_) | AiResponse::Error(_) => {
                if self.sync.ai.resolved() == AiTransition::Cleared {
                    info!("AI response received");
                    self.ui.set_visible(Element::Spinner, false);
                    self.ui
                        .set_visible(Element::CameraImage, self.sync.camera.displayed().is_on());
                    self.ui.set_enabled(Control::Ai, true);
                    self.ui.set_enabled(Control::Camera, true);
                }
            }
        }
    }

    fn handle_audio_response(&mut self, payload: &[u8]) {
        let clip = match PlaybackClip::from_payload(payload) {
            Ok(clip) => clip,
            Err(e) => {
                error!("Failed to handle audio message: {}", e);
                return;
            }
        };

        match self.ui.play_audio(&clip) {
            Ok(()) => {
                debug!("Playing {} clip ({} bytes)", clip.mime, clip.size_bytes);
                self.ui.set_visible(Element::AudioPlayer, true);
            }
            Err(e) => error!("Audio playback failed: {}", e),
        }
    }

    fn handle_capture_denied(&mut self, reason: &str) {
        error!("Microphone access error: {}", reason);
        self.talk.deny(reason);
        if self.sync.talk.displayed().is_on() {
            self.sync.talk.set_intent(Toggle::Off, Instant::now());
            self.render_label(Feature::Talk);
        }
        self.ui.set_enabled(Control::Talk, false);
        self.ui
            .alert("Microphone access error", &ClientError::CaptureDenied(reason.to_string()).to_string());
    }

    fn handle_stream_failure(&mut self, generation: u64, reason: &str) {
        if !self.sync.camera.displayed().is_on() {
            debug!("Ignoring stream failure: camera is off");
            return;
        }

        match self.stream.on_load_failure(generation, reason) {
            FailureAction::Ignored => {}
            FailureAction::RetryScheduled {
                delay,
                generation,
                cancel,
            } => self.schedule_retry(delay, generation, cancel),
            FailureAction::Exhausted { attempts, last_error } => {
                let err = ClientError::StreamExhausted { attempts };
                warn!("{} (last error: {})", err, last_error);
                self.ui.alert("Camera Error", "Unable to load video stream.");
            }
        }
    }

    /// Bring the feed and camera widgets in line with the displayed camera state
    fn apply_camera(&mut self, before: Toggle) {
        self.render_label(Feature::Camera);

        let now = self.sync.camera.displayed();
        if now == before {
            return;
        }

        if now.is_on() {
            self.ui.set_visible(Element::CameraImage, true);
            let req = self.stream.start(now_ms());
            self.begin_load(req);
        } else {
            self.stream.stop();
            self.ui.set_visible(Element::CameraImage, false);
            self.ui.set_stream_source(None);
        }
    }

    fn lock_for_ai(&self) {
        self.ui.set_enabled(Control::Ai, false);
        self.ui.set_enabled(Control::Camera, false);
        self.ui.set_visible(Element::Spinner, true);
        self.ui.set_visible(Element::CameraImage, false);
    }

    fn render_label(&self, feature: Feature) {
        let control = match feature {
            Feature::Camera => Control::Camera,
            Feature::Listen => Control::Listen,
            Feature::Talk => Control::Talk,
        };
        self.ui
            .set_label(control, &self.sync.label(feature, Instant::now()));
    }

    fn render_labels(&self) {
        for feature in [Feature::Camera, Feature::Listen, Feature::Talk] {
            self.render_label(feature);
        }
    }

    fn begin_load(&self, req: LoadRequest) {
        self.ui.set_stream_source(Some(&req.url));

        let loader = Arc::clone(&self.loader);
        let tx = self.events.clone();
        tokio::spawn(async move {
            let event = match loader.load(&req.url).await {
                Ok(()) => ClientEvent::StreamLoaded {
                    generation: req.generation,
                },
                Err(e) => ClientEvent::StreamFailed {
                    generation: req.generation,
                    reason: e.to_string(),
                },
            };
            if tx.send(event).await.is_err() {
                debug!("Control loop gone; stream result dropped");
            }
        });
    }

    fn schedule_retry(&self, delay: Duration, generation: u64, cancel: CancellationToken) {
        let tx = self.events.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Stream retry {} cancelled", generation);
                }
                _ = tokio::time::sleep(delay) => {
                    if tx.send(ClientEvent::StreamRetryDue { generation }).await.is_err() {
                        debug!("Control loop gone; stream retry dropped");
                    }
                }
            }
        });
    }

    fn schedule_confirm_deadline(&self) {
        let seq = self.sync.camera.intent_seq();
        let delay = self.sync.confirm_timeout();
        let tx = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(ClientEvent::ConfirmDeadline { seq }).await.is_err() {
                debug!("Control loop gone; confirmation deadline dropped");
            }
        });
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
