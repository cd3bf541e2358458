//! Liveness timer
//!
//! One timer per replica. While requests are pending it counts down the
//! request timeout; if nothing executes before it fires, it asks the
//! view-change manager for a new view.

use crate::domain::ViewChangeSignal;
use crate::metrics;
use crate::ports::ViewChangeTrigger;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Builds the expiry signal at fire time. `None` means there is nothing
/// pending any more and the expiry is dropped.
pub type SignalSource = Box<dyn FnOnce() -> Option<ViewChangeSignal> + Send + 'static>;

/// Request timer backed by a tokio task.
pub struct LivenessTimer {
    timeout: Duration,
    trigger: Arc<dyn ViewChangeTrigger>,
    handle: Option<JoinHandle<()>>,
}

impl LivenessTimer {
    pub fn new(timeout: Duration, trigger: Arc<dyn ViewChangeTrigger>) -> Self {
        Self {
            timeout,
            trigger,
            handle: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether a countdown is in progress.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start the countdown.
    ///
    /// With `override_running` an active countdown is restarted; without it
    /// an active countdown is left alone. Must be called within a tokio
    /// runtime.
    pub fn start(&mut self, override_running: bool, source: SignalSource) {
        if self.is_running() {
            if !override_running {
                debug!("Liveness timer already running");
                return;
            }
            self.stop();
        }

        let timeout = self.timeout;
        let trigger = Arc::clone(&self.trigger);
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let Some(signal) = source() else {
                debug!("Liveness timer expired with nothing pending");
                return;
            };

            warn!(
                current_view = signal.current_view,
                proposed_view = signal.proposed_view,
                pending = signal.pending.len(),
                "Request timeout, requesting view change"
            );
            metrics::record_view_change_signal();
            trigger.request_view_change(signal);
        }));

        debug!(timeout_ms = timeout.as_millis() as u64, "Liveness timer started");
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Liveness timer stopped");
        }
    }
}

impl Drop for LivenessTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
