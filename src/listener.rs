use crate::error::{Result, SessionError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A consumer of decoded responses and connection failures.
///
/// Callbacks run on the session's dispatcher task, one frame at a time in
/// decode order. A callback that returns an error is logged and skipped;
/// it never interrupts delivery to the other listeners. Callbacks should
/// finish promptly: a callback that stalls holds up every listener behind
/// it and, once the hand-off queue fills, the socket reader itself.
#[async_trait]
pub trait SessionListener: Send + Sync {
    /// Called with the text of each decoded response, terminator stripped
    async fn on_response(&self, response: &str) -> Result<()>;

    /// Called once when the connection is lost; no further responses will
    /// arrive until the session is reconnected
    async fn on_error(&self, error: &SessionError) -> Result<()>;
}

/// Insertion-ordered set of listener handles, shared between the
/// dispatcher task and arbitrary caller tasks.
///
/// Dispatch works on a snapshot, so the lock is never held while a
/// callback runs and a listener may remove itself from inside its own
/// callback. Registering the same handle twice yields two entries (and
/// two deliveries per frame); removal takes out the first occurrence and
/// is a no-op when the handle is absent.
#[derive(Clone, Default)]
pub(crate) struct ListenerRegistry {
    listeners: Arc<Mutex<Vec<Arc<dyn SessionListener>>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn SessionListener>) {
        self.listeners.lock().unwrap().push(listener);
    }

    pub fn remove(&self, listener: &Arc<dyn SessionListener>) {
        let mut listeners = self.listeners.lock().unwrap();
        if let Some(pos) = listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
            listeners.remove(pos);
        }
    }

    pub fn clear(&self) {
        self.listeners.lock().unwrap().clear();
    }

    /// Clone of the current registration list, in registration order
    pub fn snapshot(&self) -> Vec<Arc<dyn SessionListener>> {
        self.listeners.lock().unwrap().clone()
    }
}
