//! Viewport lock adapter for headless front ends.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::domain::ports::ViewportLock;

/// Records the scroll-lock state and logs transitions.
#[derive(Debug, Default)]
pub struct TracingViewportLock {
    locked: AtomicBool,
}

impl TracingViewportLock {
    /// Unlocked viewport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether background scrolling is currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }
}

impl ViewportLock for TracingViewportLock {
    fn set_scroll_locked(&self, locked: bool) {
        let previous = self.locked.swap(locked, Ordering::AcqRel);
        if previous != locked {
            debug!(locked, "viewport scroll lock changed");
        }
    }
}
