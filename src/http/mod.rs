//! Local control API
//!
//! A front end drives the client through these routes:
//! - GET /ui - current UI projection (labels, enabled flags, feed URL, alerts)
//! - POST /controls/{camera,ai,listen,talk} - user intents
//! - POST /controls/volume/{up,down} - volume steps
//! - POST /talk/chunk - encoded audio from the capture subsystem
//! - POST /talk/finished - capture completed; publishes the session
//! - POST /talk/denied - capture permission refused
//! - GET /listen/audio - current playback clip
//! - POST /listen/failed - player error
//! - POST /stream/failed - rendered feed error, counted against the retry budget
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
