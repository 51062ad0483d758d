//! Cooperative cancellation between steps.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable stop flag shared between an engine and its controllers.
///
/// The drive loop checks the flag before each step, so a stop request
/// always lands after the in-flight step has finished and its statistics
/// have reached the sink. A step is never cut short.
///
/// The flag stays raised until [`reset`](StopHandle::reset) is called;
/// every drive call made in the meantime returns immediately.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// A new, lowered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Lower the flag so driving can resume.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}
