//! UI surface
//!
//! The rendering layer is an external collaborator; the controller only
//! drives it through the simple setters of [`UiSurface`]. [`SharedUi`] is
//! the in-process implementation the HTTP surface serves as a snapshot.

use crate::audio::PlaybackClip;
use crate::error::ClientError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

const MAX_ALERTS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Camera,
    Ai,
    Listen,
    Talk,
    VolumeUp,
    VolumeDown,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Camera,
        Control::Ai,
        Control::Listen,
        Control::Talk,
        Control::VolumeUp,
        Control::VolumeDown,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    CameraImage,
    Spinner,
    AudioPlayer,
}

pub trait UiSurface: Send + Sync {
    fn set_label(&self, control: Control, text: &str);
    fn set_enabled(&self, control: Control, enabled: bool);
    fn set_visible(&self, element: Element, visible: bool);
    fn set_response_text(&self, text: &str);
    /// Point the camera image at a feed URL, or clear it
    fn set_stream_source(&self, url: Option<&str>);
    /// Hand a clip to the player and start playback
    fn play_audio(&self, clip: &PlaybackClip) -> Result<(), ClientError>;
    fn stop_audio(&self);
    /// Blocking, user-visible notice
    fn alert(&self, title: &str, text: &str);
}

#[derive(Debug, Clone, Serialize)]
pub struct ControlView {
    pub label: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub title: String,
    pub text: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiSnapshot {
    pub camera: ControlView,
    pub ai: ControlView,
    pub listen: ControlView,
    pub talk: ControlView,
    pub volume_up: ControlView,
    pub volume_down: ControlView,
    pub camera_image_visible: bool,
    pub spinner_visible: bool,
    pub audio_player_visible: bool,
    pub stream_url: Option<String>,
    pub response_text: String,
    pub playback: Option<PlaybackClip>,
    /// `data:` URL of the current clip, as handed to the player
    pub playback_url: Option<String>,
    pub alerts: Vec<Alert>,
}

impl Default for UiSnapshot {
    fn default() -> Self {
        let control = |label: &str| ControlView {
            label: label.to_string(),
            enabled: false,
        };
        Self {
            camera: control("Start Camera"),
            ai: control("Ask GPT"),
            listen: control("Listen"),
            talk: control("Talk"),
            volume_up: control("Volume Up"),
            volume_down: control("Volume Down"),
            camera_image_visible: false,
            spinner_visible: false,
            audio_player_visible: false,
            stream_url: None,
            response_text: String::new(),
            playback: None,
            playback_url: None,
            alerts: Vec::new(),
        }
    }
}

impl UiSnapshot {
    fn control_mut(&mut self, control: Control) -> &mut ControlView {
        match control {
            Control::Camera => &mut self.camera,
            Control::Ai => &mut self.ai,
            Control::Listen => &mut self.listen,
            Control::Talk => &mut self.talk,
            Control::VolumeUp => &mut self.volume_up,
            Control::VolumeDown => &mut self.volume_down,
        }
    }
}

/// Thread-safe UI model read by the HTTP surface
#[derive(Debug, Clone, Default)]
pub struct SharedUi {
    inner: Arc<Mutex<UiSnapshot>>,
}

impl SharedUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> UiSnapshot {
        self.lock().clone()
    }

    pub fn playback(&self) -> Option<PlaybackClip> {
        self.lock().playback.clone()
    }

    fn lock(&self) -> MutexGuard<'_, UiSnapshot> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UiSurface for SharedUi {
    fn set_label(&self, control: Control, text: &str) {
        self.lock().control_mut(control).label = text.to_string();
    }

    fn set_enabled(&self, control: Control, enabled: bool) {
        self.lock().control_mut(control).enabled = enabled;
    }

    fn set_visible(&self, element: Element, visible: bool) {
        let mut ui = self.lock();
        match element {
            Element::CameraImage => ui.camera_image_visible = visible,
            Element::Spinner => ui.spinner_visible = visible,
            Element::AudioPlayer => ui.audio_player_visible = visible,
        }
    }

    fn set_response_text(&self, text: &str) {
        self.lock().response_text = text.to_string();
    }

    fn set_stream_source(&self, url: Option<&str>) {
        self.lock().stream_url = url.map(str::to_string);
    }

    fn play_audio(&self, clip: &PlaybackClip) -> Result<(), ClientError> {
        let mut ui = self.lock();
        ui.playback_url = Some(clip.data_url());
        ui.playback = Some(clip.clone());
        Ok(())
    }

    fn stop_audio(&self) {
        let mut ui = self.lock();
        ui.playback = None;
        ui.playback_url = None;
    }

    fn alert(&self, title: &str, text: &str) {
        let mut ui = self.lock();
        ui.alerts.push(Alert {
            title: title.to_string(),
            text: text.to_string(),
            raised_at: Utc::now(),
        });
        if ui.alerts.len() > MAX_ALERTS {
            let excess = ui.alerts.len() - MAX_ALERTS;
            ui.alerts.drain(..excess);
        }
    }
}
