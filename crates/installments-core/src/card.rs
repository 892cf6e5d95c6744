//! Card Input Completion
//!
//! The secure card field emits a change event on every keystroke. Submission
//! should happen once when the field becomes valid, not on every event after.

/// Tracks the validity of the card input across change events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CardCompletion {
    complete: bool,
}

impl CardCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a change event. Returns `true` only on the transition into the
    /// complete, error-free state.
    pub fn on_change(&mut self, complete: bool, has_error: bool) -> bool {
        let valid = complete && !has_error;
        let fire = valid && !self.complete;
        self.complete = valid;
        fire
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
