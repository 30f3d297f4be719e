//! Device state synchronization
//!
//! One [`FeatureState`] per controllable feature reconciles the user's
//! optimistic intent with the state the device reports. The UI label is a
//! pure projection of that state; it is never read back as the source of
//! truth.

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Off,
    On,
}

impl Toggle {
    pub fn parse(text: &str) -> Option<Toggle> {
        match text {
            "on" => Some(Toggle::On),
            "off" => Some(Toggle::Off),
            _ => None,
        }
    }

    /// Command string sent on control topics
    pub fn as_command(self) -> &'static str {
        match self {
            Toggle::On => "on",
            Toggle::Off => "off",
        }
    }

    pub fn flipped(self) -> Toggle {
        match self {
            Toggle::On => Toggle::Off,
            Toggle::Off => Toggle::On,
        }
    }

    pub fn is_on(self) -> bool {
        self == Toggle::On
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Camera,
    Listen,
    Talk,
}

impl Feature {
    fn label(self, state: Toggle) -> &'static str {
        match (self, state) {
            (Feature::Camera, Toggle::On) => "Stop Camera",
            (Feature::Camera, Toggle::Off) => "Start Camera",
            (Feature::Listen, Toggle::On) => "Stop Listening",
            (Feature::Listen, Toggle::Off) => "Listen",
            (Feature::Talk, Toggle::On) => "Stop Talking",
            (Feature::Talk, Toggle::Off) => "Talk",
        }
    }

    /// Only the camera has an authoritative status topic
    fn has_remote_status(self) -> bool {
        self == Feature::Camera
    }
}

#[derive(Debug, Clone)]
pub struct FeatureState {
    feature: Feature,
    local_intent: Toggle,
    remote_confirmed: Option<Toggle>,
    intent_at: Option<Instant>,
    /// Bumped on every local intent so stale confirmation deadlines can be told apart
    intent_seq: u64,
}

impl FeatureState {
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            local_intent: Toggle::Off,
            remote_confirmed: None,
            intent_at: None,
            intent_seq: 0,
        }
    }

    pub fn feature(&self) -> Feature {
        self.feature
    }

    pub fn local_intent(&self) -> Toggle {
        self.local_intent
    }

    pub fn remote_confirmed(&self) -> Option<Toggle> {
        self.remote_confirmed
    }

    pub fn intent_seq(&self) -> u64 {
        self.intent_seq
    }

    /// Confirmed state when one arrived since the last intent, else the intent
    pub fn displayed(&self) -> Toggle {
        self.remote_confirmed.unwrap_or(self.local_intent)
    }

    /// User click: flip what is currently displayed and record it as intent
    pub fn toggle(&mut self, now: Instant) -> Toggle {
        let next = self.displayed().flipped();
        self.set_intent(next, now);
        next
    }

    pub fn set_intent(&mut self, intent: Toggle, now: Instant) {
        self.local_intent = intent;
        self.remote_confirmed = None;
        self.intent_at = Some(now);
        self.intent_seq += 1;
    }

    /// Authoritative status from the device; overrides any local intent
    pub fn confirm(&mut self, status: Toggle) {
        self.remote_confirmed = Some(status);
    }

    /// Optimistic state that the device has not confirmed within `timeout`
    pub fn is_unconfirmed(&self, now: Instant, timeout: Duration) -> bool {
        self.feature.has_remote_status()
            && self.remote_confirmed.is_none()
            && self
                .intent_at
                .is_some_and(|at| now.saturating_duration_since(at) >= timeout)
    }

    pub fn label(&self, now: Instant, timeout: Duration) -> String {
        let base = self.feature.label(self.displayed());
        if self.is_unconfirmed(now, timeout) {
            format!("{} (unconfirmed)", base)
        } else {
            base.to_string()
        }
    }
}

/// How an AI response changed the pending flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTransition {
    Entered,
    Cleared,
    Unchanged,
}

/// "Waiting for AI response" overlay
#[derive(Debug, Clone, Default)]
pub struct AiQueryState {
    pending: bool,
}

impl AiQueryState {
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Mark a request as issued; false if one is already outstanding
    pub fn begin(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    pub fn waiting(&mut self) -> AiTransition {
        if self.pending {
            AiTransition::Unchanged
        } else {
            self.pending = true;
            AiTransition::Entered
        }
    }

    pub fn resolved(&mut self) -> AiTransition {
        if self.pending {
            self.pending = false;
            AiTransition::Cleared
        } else {
            AiTransition::Unchanged
        }
    }
}

/// All feature state for one session
#[derive(Debug, Clone)]
pub struct DeviceSync {
    pub camera: FeatureState,
    pub listen: FeatureState,
    pub talk: FeatureState,
    pub ai: AiQueryState,
    confirm_timeout: Duration,
}

impl DeviceSync {
    pub fn new(confirm_timeout: Duration) -> Self {
        Self {
            camera: FeatureState::new(Feature::Camera),
            listen: FeatureState::new(Feature::Listen),
            talk: FeatureState::new(Feature::Talk),
            ai: AiQueryState::default(),
            confirm_timeout,
        }
    }

    pub fn confirm_timeout(&self) -> Duration {
        self.confirm_timeout
    }

    pub fn feature(&self, feature: Feature) -> &FeatureState {
        match feature {
            Feature::Camera => &self.camera,
            Feature::Listen => &self.listen,
            Feature::Talk => &self.talk,
        }
    }

    pub fn label(&self, feature: Feature, now: Instant) -> String {
        self.feature(feature).label(now, self.confirm_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_follows_displayed_state() {
        let now = Instant::now();
        let mut camera = FeatureState::new(Feature::Camera);

        assert_eq!(camera.toggle(now), Toggle::On);
        camera.confirm(Toggle::Off);
        // Device said off, so the next click asks for on again
        assert_eq!(camera.toggle(now), Toggle::On);
        assert_eq!(camera.displayed(), Toggle::On);
    }

    #[test]
    fn test_confirmation_overrides_intent() {
        let now = Instant::now();
        let mut camera = FeatureState::new(Feature::Camera);

        camera.toggle(now);
        camera.confirm(Toggle::Off);
        assert_eq!(camera.local_intent(), Toggle::On);
        assert_eq!(camera.displayed(), Toggle::Off);
    }

    #[test]
    fn test_unconfirmed_after_timeout() {
        let start = Instant::now();
        let timeout = Duration::from_secs(3);
        let mut camera = FeatureState::new(Feature::Camera);

        camera.toggle(start);
        assert!(!camera.is_unconfirmed(start + Duration::from_secs(1), timeout));
        assert!(camera.is_unconfirmed(start + timeout, timeout));
        assert_eq!(camera.label(start + timeout, timeout), "Stop Camera (unconfirmed)");

        camera.confirm(Toggle::On);
        assert_eq!(camera.label(start + timeout, timeout), "Stop Camera");
    }

    #[test]
    fn test_local_only_features_never_unconfirmed() {
        let start = Instant::now();
        let mut listen = FeatureState::new(Feature::Listen);

        listen.toggle(start);
        assert!(!listen.is_unconfirmed(start + Duration::from_secs(60), Duration::from_secs(1)));
        assert_eq!(listen.label(start, Duration::from_secs(1)), "Stop Listening");
    }

    #[test]
    fn test_ai_pending_transitions_are_idempotent() {
        let mut ai = AiQueryState::default();

        assert!(ai.begin());
        assert!(!ai.begin());
        assert_eq!(ai.waiting(), AiTransition::Unchanged);
        assert_eq!(ai.resolved(), AiTransition::Cleared);
        assert_eq!(ai.resolved(), AiTransition::Unchanged);
        assert_eq!(ai.waiting(), AiTransition::Entered);
    }
}
