//! Audio exchange
//!
//! Two independent directions:
//! - talk: captured chunks are accumulated per session and published as one message
//! - listen: inbound audio is probed and handed to the player as a clip

pub mod capture;
pub mod playback;

pub use capture::{CaptureAvailability, CapturePhase, TalkRecorder};
pub use playback::PlaybackClip;
