//! Per-call deadline and cancellation.
//!
//! Every invocation carries a [`CallContext`]. Host implementations must
//! honor it: anything that blocks derives its I/O timeout from
//! [`CallContext::remaining`], so a sandbox-level timeout aborts the
//! external request instead of leaking it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline and cancellation state for one invocation.
///
/// Cloning shares the cancellation flag; contexts are cheap to pass around
/// and never outlive the call they were created for.
#[derive(Debug, Clone)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl CallContext {
    /// A context with no deadline. Still cancellable.
    pub fn unbounded() -> Self {
        Self {
            deadline: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A context that expires `budget` from now.
    pub fn with_timeout(budget: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + budget),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A handle another thread can use to cancel this call.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancelled))
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Time left before the deadline, `None` when unbounded.
    ///
    /// Once expired this returns `Some(Duration::ZERO)`, never a negative
    /// surrogate, so it can be fed directly into I/O timeouts.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// True when the deadline has elapsed or the call was cancelled.
    pub fn expired(&self) -> bool {
        if self.is_cancelled() {
            return true;
        }
        matches!(self.remaining(), Some(remaining) if remaining.is_zero())
    }
}

/// Cancels the associated call when triggered.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_expires() {
        let ctx = CallContext::unbounded();
        assert_eq!(ctx.remaining(), None);
        assert!(!ctx.expired());
    }

    #[test]
    fn test_deadline_expires() {
        let ctx = CallContext::with_timeout(Duration::from_millis(0));
        std::thread::sleep(Duration::from_millis(2));
        assert!(ctx.expired());
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_cancel_from_another_handle() {
        let ctx = CallContext::unbounded();
        let handle = ctx.cancel_handle();
        assert!(!ctx.is_cancelled());
        handle.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.expired());
    }
}
