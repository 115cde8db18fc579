//! Transition detector: decides when a time-windowed aggregate has crossed
//! into or out of its active window because of a mutation.
//!
//! The detector samples `is_active` once before the mutation and once after
//! it, each with its own reading of the clock. The two readings are not
//! atomic with the write, so a window whose bounds sit right at "now" can
//! resolve either way.

use crate::time::Timestamp;

/// Anything with an inclusive `[start, end]` activity window.
pub trait TimeWindow {
    fn window_start(&self) -> Timestamp;
    fn window_end(&self) -> Timestamp;

    /// `start <= now <= end`, both bounds inclusive.
    fn is_active(&self, now: Timestamp) -> bool {
        self.window_start() <= now && now <= self.window_end()
    }
}

/// Lifecycle event the detector asks the caller to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Ended,
}

/// Compare the two samples and decide which lifecycle event, if any, fires.
#[must_use]
pub fn detect(was_active: bool, is_active_after: bool) -> Option<Transition> {
    match (was_active, is_active_after) {
        (false, true) => Some(Transition::Started),
        (true, false) => Some(Transition::Ended),
        _ => None,
    }
}

/// Carries the "before" sample across a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionDetector {
    /// `None` when there was no prior state (creation).
    was_active: Option<bool>,
}

impl TransitionDetector {
    /// Detector for a freshly created aggregate.
    ///
    /// Creation always resolves to [`Transition::Started`], whether or not
    /// the new window contains "now". Future-dated promotions therefore
    /// announce themselves as started on creation.
    #[must_use]
    pub fn for_create() -> Self {
        Self { was_active: None }
    }

    /// Take the "before" sample of an existing aggregate.
    #[must_use]
    pub fn before(window: &impl TimeWindow, now: Timestamp) -> Self {
        Self {
            was_active: Some(window.is_active(now)),
        }
    }

    /// Whether the aggregate was active when the "before" sample was taken.
    #[must_use]
    pub fn was_active(&self) -> Option<bool> {
        self.was_active
    }

    /// Resolve after a create or an update, sampling the mutated window at `now`.
    #[must_use]
    pub fn after(self, window: &impl TimeWindow, now: Timestamp) -> Option<Transition> {
        match self.was_active {
            None => Some(Transition::Started),
            Some(was_active) => detect(was_active, window.is_active(now)),
        }
    }

    /// Resolve after a delete: the aggregate is never active afterwards.
    #[must_use]
    pub fn after_delete(self) -> Option<Transition> {
        match self.was_active {
            None => None,
            Some(was_active) => detect(was_active, false),
        }
    }
}
