//! Video feed retry control
//!
//! The feed is an HTTP resource independent of the broker. A load failure is
//! retried after a fixed delay until `max_retries` consecutive failures, then
//! reported once and abandoned until the camera is switched off and on again.
//!
//! Every load carries a generation number and every scheduled retry carries a
//! [`CancellationToken`]; disabling the feed cancels the token and bumps the
//! generation so late timers and late load results are ignored.

mod loader;

pub use loader::{HttpStreamLoader, StreamLoader};

use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Retry bookkeeping for the current camera session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamAttempt {
    pub retry_count: u32,
    pub max_retries: u32,
    pub last_error: Option<String>,
}

impl StreamAttempt {
    fn new(max_retries: u32) -> Self {
        Self {
            retry_count: 0,
            max_retries,
            last_error: None,
        }
    }
}

/// A load the caller must perform and report back with the same generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub url: String,
    pub generation: u64,
}

/// What the caller must do after a load failure
#[derive(Debug, Clone)]
pub enum FailureAction {
    /// Stale or irrelevant failure
    Ignored,
    /// Fire a retry for `generation` after `delay` unless `cancel` is triggered
    RetryScheduled {
        delay: Duration,
        generation: u64,
        cancel: CancellationToken,
    },
    /// Retries used up; report to the user
    Exhausted { attempts: u32, last_error: String },
}

#[derive(Debug)]
pub struct StreamRetryController {
    base_url: String,
    path: String,
    max_retries: u32,
    retry_delay: Duration,
    attempt: Option<StreamAttempt>,
    generation: u64,
    pending_retry: Option<CancellationToken>,
}

impl StreamRetryController {
    pub fn new(base_url: &str, path: &str, max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            path: path.to_string(),
            max_retries,
            retry_delay,
            attempt: None,
            generation: 0,
            pending_retry: None,
        }
    }

    pub fn attempt(&self) -> Option<&StreamAttempt> {
        self.attempt.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.attempt.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_retry(&self) -> bool {
        self.pending_retry
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Camera turned on: fresh attempt with a zero retry count
    pub fn start(&mut self, now_ms: i64) -> LoadRequest {
        self.cancel_pending();
        self.attempt = Some(StreamAttempt::new(self.max_retries));
        info!("Starting video stream");
        self.next_load(now_ms)
    }

    /// Camera turned off: cancel any scheduled retry and discard the attempt
    pub fn stop(&mut self) {
        self.cancel_pending();
        if self.attempt.take().is_some() {
            info!("Video stream stopped");
        }
        self.generation += 1;
    }

    pub fn on_load_success(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        match self.attempt.as_mut() {
            Some(attempt) => {
                attempt.retry_count = 0;
                attempt.last_error = None;
                info!("Video stream loaded");
                true
            }
            None => false,
        }
    }

    pub fn on_load_failure(&mut self, generation: u64, reason: &str) -> FailureAction {
        if generation != self.generation || self.has_pending_retry() {
            return FailureAction::Ignored;
        }
        let Some(attempt) = self.attempt.as_mut() else {
            return FailureAction::Ignored;
        };

        error!("Failed to load video stream: {}", reason);
        attempt.retry_count += 1;
        attempt.last_error = Some(reason.to_string());

        if attempt.retry_count < attempt.max_retries {
            info!(
                "Retrying video stream ({}/{})",
                attempt.retry_count, attempt.max_retries
            );
            let cancel = CancellationToken::new();
            self.pending_retry = Some(cancel.clone());
            FailureAction::RetryScheduled {
                delay: self.retry_delay,
                generation,
                cancel,
            }
        } else {
            let attempts = attempt.retry_count;
            warn!("Video stream unavailable after {} attempts", attempts);
            self.attempt = None;
            self.pending_retry = None;
            FailureAction::Exhausted {
                attempts,
                last_error: reason.to_string(),
            }
        }
    }

    /// A scheduled retry fired; yields the reload unless it was superseded
    pub fn on_retry_due(&mut self, generation: u64, now_ms: i64) -> Option<LoadRequest> {
        if generation != self.generation || self.attempt.is_none() {
            return None;
        }
        match self.pending_retry.take() {
            Some(token) if !token.is_cancelled() => Some(self.next_load(now_ms)),
            _ => None,
        }
    }

    fn next_load(&mut self, now_ms: i64) -> LoadRequest {
        self.generation += 1;
        LoadRequest {
            url: format!("{}{}?ts={}", self.base_url, self.path, now_ms),
            generation: self.generation,
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending_retry.take() {
            token.cancel();
        }
    }
}
