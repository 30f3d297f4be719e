use crate::controller::ClientEvent;
use crate::ui::SharedUi;
use tokio::sync::mpsc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Feeds intents and captured audio into the control loop
    pub events: mpsc::Sender<ClientEvent>,

    /// UI model the control loop renders into
    pub ui: SharedUi,
}

impl AppState {
    pub fn new(events: mpsc::Sender<ClientEvent>, ui: SharedUi) -> Self {
        Self { events, ui }
    }
}
