//! Cancellation Context
//!
//! Cooperative cancellation for font resolution. A context is cancelled
//! explicitly, by reaching its deadline, or through its parent. Observers
//! either poll [`Context::err`] or await [`Context::done`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use smol::channel::{Receiver, Sender};
use smol::{Timer, future};

/// Why a context ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

struct State {
    parent: Option<Context>,
    deadline: Option<Instant>,
    reason: Mutex<Option<ContextError>>,
    // Closing the channel wakes every `done()` waiter
    closer: Sender<()>,
    closed: Receiver<()>,
}

/// Cancellation context, cheap to clone
///
/// All clones share the same state: cancelling one cancels them all.
#[derive(Clone)]
pub struct Context {
    state: Arc<State>,
}

impl Context {
    fn with_state(parent: Option<Context>, deadline: Option<Instant>) -> Self {
        let (closer, closed) = smol::channel::bounded(1);
        Self {
            state: Arc::new(State {
                parent,
                deadline,
                reason: Mutex::new(None),
                closer,
                closed,
            }),
        }
    }

    /// A fresh context with no deadline
    pub fn background() -> Self {
        Self::with_state(None, None)
    }

    /// A fresh context expiring after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_state(None, Some(Instant::now() + timeout))
    }

    /// A fresh context expiring at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self::with_state(None, Some(deadline))
    }

    /// Derive a context that ends with this one, or earlier
    pub fn child(&self) -> Self {
        Self::with_state(Some(self.clone()), None)
    }

    /// Derive a context that ends with this one or after `timeout`
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        Self::with_state(Some(self.clone()), Some(Instant::now() + timeout))
    }

    /// Cancel this context and every context derived from it
    pub fn cancel(&self) {
        {
            let mut reason = self.state.reason.lock().unwrap();
            if reason.is_none() {
                *reason = Some(ContextError::Canceled);
            }
        }
        self.state.closer.close();
    }

    /// The deadline, if any (the parent's deadline is not included)
    pub fn deadline(&self) -> Option<Instant> {
        self.state.deadline
    }

    /// `None` while the context is live, the reason once it has ended
    pub fn err(&self) -> Option<ContextError> {
        if let Some(reason) = *self.state.reason.lock().unwrap() {
            return Some(reason);
        }
        if let Some(deadline) = self.state.deadline {
            if Instant::now() >= deadline {
                return Some(ContextError::DeadlineExceeded);
            }
        }
        self.state.parent.as_ref().and_then(|p| p.err())
    }

    pub fn is_cancelled(&self) -> bool {
        self.err().is_some()
    }

    /// Check for cancellation, as a `Result`
    pub fn check(&self) -> Result<(), ContextError> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Wait until the context ends, returning the reason
    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            // Only ever errors: nothing is sent, the channel is just closed
            let _ = self.state.closed.recv().await;
            self.err().unwrap_or(ContextError::Canceled)
        };
        let expired = async {
            match self.state.deadline {
                Some(deadline) => {
                    Timer::at(deadline).await;
                    ContextError::DeadlineExceeded
                }
                None => future::pending().await,
            }
        };
        let parent = async {
            match &self.state.parent {
                Some(parent) => Box::pin(parent.done()).await,
                None => future::pending().await,
            }
        };
        future::or(cancelled, future::or(expired, parent)).await
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("deadline", &self.state.deadline)
            .field("err", &self.err())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        assert!(ctx.check().is_ok());
    }

    #[test]
    fn test_cancel_shared_by_clones() {
        let ctx = Context::background();
        let clone = ctx.clone();
        ctx.cancel();
        assert_eq!(clone.err(), Some(ContextError::Canceled));
        assert_eq!(smol::block_on(clone.done()), ContextError::Canceled);
    }

    #[test]
    fn test_deadline_expires() {
        let ctx = Context::with_timeout(Duration::from_millis(10));
        assert_eq!(smol::block_on(ctx.done()), ContextError::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[test]
    fn test_past_deadline_is_expired() {
        let ctx = Context::with_deadline(Instant::now());
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[test]
    fn test_child_follows_parent() {
        let parent = Context::background();
        let child = parent.child();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert_eq!(child.err(), Some(ContextError::Canceled));
        assert_eq!(smol::block_on(child.done()), ContextError::Canceled);
    }

    #[test]
    fn test_child_cancel_leaves_parent() {
        let parent = Context::background();
        let child = parent.child_with_timeout(Duration::from_secs(60));
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[test]
    fn test_done_wakes_on_cancel_from_other_thread() {
        let ctx = Context::background();
        let other = ctx.clone();
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            other.cancel();
        });
        assert_eq!(smol::block_on(ctx.done()), ContextError::Canceled);
        handle.join().unwrap();
    }
}
