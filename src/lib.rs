pub mod audio;
pub mod config;
pub mod connection;
pub mod controller;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod router;
pub mod stream;
pub mod sync;
pub mod topics;
pub mod transport;
pub mod ui;

pub use audio::{CaptureAvailability, CapturePhase, PlaybackClip, TalkRecorder};
pub use config::Config;
pub use connection::{ConnectionManager, ConnectionState, ConnectionStatus};
pub use controller::{ClientEvent, Controller, UserIntent};
pub use dispatcher::{CommandDispatcher, Payload, SendOutcome};
pub use error::ClientError;
pub use http::{create_router, AppState};
pub use router::{AiResponse, Inbound};
pub use stream::{HttpStreamLoader, StreamLoader, StreamRetryController};
pub use sync::{DeviceSync, Feature, FeatureState, Toggle};
pub use topics::Topic;
pub use transport::{NatsTransport, Transport, TransportEvent};
pub use ui::{SharedUi, UiSurface};
