//! app::context
//!
//! Cooperative cancellation for application functions.
//!
//! A [`Context`] is a cheap, clonable handle. Cancelling a context cancels
//! every context derived from it with [`Context::with_cancel`], never its
//! ancestors. Nothing is preempted: long-running application code is expected
//! to poll [`Context::is_cancelled`] or call [`Context::check`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use thiserror::Error;

/// Returned by [`Context::check`] once the context is cancelled.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("context canceled")]
pub struct Cancelled;

#[derive(Debug, Default)]
pub(crate) struct Inner {
    cancelled: AtomicBool,
    parent: Option<Arc<Inner>>,
}

impl Inner {
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }
}

/// A cancellable execution context.
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<Inner>,
}

impl Context {
    /// A root context that is only cancelled explicitly.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context.
    pub fn with_cancel(&self) -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                parent: Some(self.inner.clone()),
            }),
        }
    }

    /// Cancel this context and everything derived from it.
    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_cancelled()
    }

    /// Return `Err(Cancelled)` if the context has been cancelled.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<Inner> {
        Arc::downgrade(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelling_parent_cancels_child() {
        let parent = Context::background();
        let child = parent.with_cancel();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
        assert_eq!(child.check(), Err(Cancelled));
    }

    #[test]
    fn cancelling_child_leaves_parent() {
        let parent = Context::background();
        let child = parent.with_cancel();
        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
        assert_eq!(parent.check(), Ok(()));
    }
}
