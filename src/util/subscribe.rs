use std::fmt;

pub type Unsubscribe = Box<dyn FnOnce() + Send + 'static>;

/// Owns the cancellation of one live subscription.
///
/// Dropping the handle detaches the subscription; `detach` does the same
/// explicitly. Cancellation runs at most once.
pub struct ListenerRegistration {
    unsubscribe: Option<Unsubscribe>,
}

impl ListenerRegistration {
    pub fn new<F>(unsubscribe: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    pub fn detach(mut self) {
        self.cancel();
    }

    pub fn is_detached(&self) -> bool {
        self.unsubscribe.is_none()
    }

    fn cancel(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for ListenerRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistration")
            .field("detached", &self.is_detached())
            .finish()
    }
}
