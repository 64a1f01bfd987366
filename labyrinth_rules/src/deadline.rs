//! Deadlines and cancellation for storage-backed operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{LabyrinthError, LabyrinthResult};

/// Shared flag a caller flips to abandon in-flight operations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Bound on how long an operation may run before it must give up.
///
/// Operations call [`Deadline::check`] before every storage call and right
/// before committing, so an expired or cancelled request never writes.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    at: Option<Instant>,
    token: Option<CancelToken>,
}

impl Deadline {
    /// No time limit and no cancellation.
    pub fn none() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Some(Instant::now() + timeout),
            token: None,
        }
    }

    /// Expire at a fixed instant.
    pub fn at(instant: Instant) -> Self {
        Self {
            at: Some(instant),
            token: None,
        }
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.at.map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Fail with `Cancelled` or `Timeout` if the operation must stop.
    pub fn check(&self) -> LabyrinthResult<()> {
        if self.token.as_ref().is_some_and(CancelToken::is_cancelled) {
            return Err(LabyrinthError::Cancelled);
        }
        match self.at {
            Some(at) if Instant::now() >= at => Err(LabyrinthError::Timeout),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_deadline_passes() {
        assert!(Deadline::none().check().is_ok());
        assert!(Deadline::none().remaining().is_none());
    }

    #[test]
    fn test_expired_deadline() {
        let deadline = Deadline::at(Instant::now() - Duration::from_millis(1));
        assert!(matches!(deadline.check(), Err(LabyrinthError::Timeout)));
    }

    #[test]
    fn test_cancellation_wins() {
        let token = CancelToken::new();
        let deadline = Deadline::after(Duration::from_secs(60)).with_cancel(token.clone());
        assert!(deadline.check().is_ok());

        token.cancel();
        assert!(matches!(deadline.check(), Err(LabyrinthError::Cancelled)));
    }
}
