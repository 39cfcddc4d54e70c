use thiserror::Error;
use tokio::sync::oneshot;

use crate::gesture::GestureDescription;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("bridge call failed: {0}")]
    Bridge(String),
    #[error("platform dispatcher refused the gesture")]
    Rejected,
}

// Submission never blocks: the returned receiver resolves later, on whatever
// thread the platform delivers its result callback.
pub trait GestureDispatcher: Send + Sync {
    fn dispatch(
        &self,
        gesture: GestureDescription,
    ) -> Result<oneshot::Receiver<GestureOutcome>, DispatchError>;
}
