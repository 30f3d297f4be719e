use serde::Serialize;
use tracing::{debug, info, warn};

/// Whether the capture subsystem can hand us audio
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum CaptureAvailability {
    Ready,
    /// Not offered in this context (e.g. insecure transport); talk stays disabled
    Unavailable(String),
    /// The user or platform refused microphone access
    Denied(String),
}

/// Where the current talk session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    Idle,
    Recording,
    /// Stop was requested; the capture subsystem may still deliver its
    /// buffered data before it reports completion
    Stopping,
}

/// Talk-back recording: accumulates encoded chunks for one session and
/// concatenates them into a single payload once capture has finished.
#[derive(Debug)]
pub struct TalkRecorder {
    availability: CaptureAvailability,
    phase: CapturePhase,
    chunks: Vec<Vec<u8>>,
}

impl TalkRecorder {
    pub fn new(availability: CaptureAvailability) -> Self {
        if let CaptureAvailability::Unavailable(reason) = &availability {
            warn!("Microphone not initialized: {}", reason);
        }
        Self {
            availability,
            phase: CapturePhase::Idle,
            chunks: Vec::new(),
        }
    }

    pub fn availability(&self) -> &CaptureAvailability {
        &self.availability
    }

    pub fn is_ready(&self) -> bool {
        self.availability == CaptureAvailability::Ready
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn is_recording(&self) -> bool {
        self.phase == CapturePhase::Recording
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Capture access was refused; any session in progress is discarded
    pub fn deny(&mut self, reason: &str) {
        self.availability = CaptureAvailability::Denied(reason.to_string());
        self.phase = CapturePhase::Idle;
        self.chunks.clear();
    }

    /// Begin a session. Returns false when capture is not available or the
    /// previous session has not finished yet.
    pub fn start(&mut self) -> bool {
        if !self.is_ready() {
            warn!("Cannot start recording: capture {:?}", self.availability);
            return false;
        }
        match self.phase {
            CapturePhase::Recording => {
                debug!("Recording already in progress");
                true
            }
            CapturePhase::Stopping => {
                warn!("Previous recording is still finishing");
                false
            }
            CapturePhase::Idle => {
                self.chunks.clear();
                self.phase = CapturePhase::Recording;
                info!("Recording started");
                true
            }
        }
    }

    /// Ask for the session to end. Chunks keep being accepted until
    /// [`TalkRecorder::finish`].
    pub fn request_stop(&mut self) -> bool {
        if self.phase != CapturePhase::Recording {
            return false;
        }
        self.phase = CapturePhase::Stopping;
        info!("Recording stop requested");
        true
    }

    pub fn push_chunk(&mut self, chunk: Vec<u8>) {
        if chunk.is_empty() {
            return;
        }
        if self.phase == CapturePhase::Idle {
            debug!("Dropping {} byte chunk outside a recording session", chunk.len());
            return;
        }
        self.chunks.push(chunk);
    }

    /// Capture completed: end the session and take the concatenated payload.
    ///
    /// Returns `None` when nothing was captured so no empty message is sent.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.phase == CapturePhase::Idle {
            debug!("Capture finished with no session open");
            return None;
        }
        self.phase = CapturePhase::Idle;
        let chunks = std::mem::take(&mut self.chunks);
        let payload = chunks.concat();

        if payload.is_empty() {
            info!("Recording stopped with no audio captured");
            None
        } else {
            info!(
                "Recording stopped: {} chunks, {} bytes",
                chunks.len(),
                payload.len()
            );
            Some(payload)
        }
    }
}
