//! Replay actions: a captured, call-once re-issue of a user's submit gesture.

/// Re-issues the original submission when invoked.
///
/// `invoke` consumes the action, so a replay can run at most once. Dropping it
/// abandons the submission.
pub struct ReplayAction {
    action: Box<dyn FnOnce() + Send>,
}

impl ReplayAction {
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Box::new(action),
        }
    }

    pub fn invoke(self) {
        (self.action)()
    }
}

impl std::fmt::Debug for ReplayAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ReplayAction")
    }
}
