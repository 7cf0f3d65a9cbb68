//! Append-only log of user-visible messages.

use std::sync::{Arc, Mutex, MutexGuard};

/// Shared message sink. Clones share the same underlying list.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    inner: Arc<Mutex<Vec<String>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, message: impl Into<String>) {
        self.lock().push(message.into());
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the messages in append order.
    pub fn messages(&self) -> Vec<String> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means another holder panicked mid-push; the Vec is still valid.
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
