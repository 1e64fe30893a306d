//! Port for the background-scroll lock toggled by the editor.

/// Receives the single lock/unlock effect the edit session emits.
///
/// Opening the editor locks background scrolling; closing it unlocks.
#[cfg_attr(test, mockall::automock)]
pub trait ViewportLock: Send + Sync {
    /// Lock (`true`) or unlock (`false`) background scrolling.
    fn set_scroll_locked(&self, locked: bool);
}

/// Fixture implementation that ignores every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureViewportLock;

impl ViewportLock for FixtureViewportLock {
    fn set_scroll_locked(&self, _locked: bool) {}
}
