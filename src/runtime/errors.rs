//! The global, dismissible error banner.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::error;

/// Sink for failures that are not tied to a single field.
///
/// Injected into every editor; see [`crate::framework::EditorContext`].
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: String);
}

/// Holds the most recent reported error until it is dismissed.
///
/// Clones share the same banner.
#[derive(Clone)]
pub struct ErrorChannel {
    current: Arc<watch::Sender<Option<String>>>,
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorChannel {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            current: Arc::new(sender),
        }
    }

    /// The message currently shown, if any.
    pub fn current(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Clears the banner. Returns the dismissed message.
    pub fn dismiss(&self) -> Option<String> {
        self.current.send_replace(None)
    }

    /// Observes banner changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }
}

impl ErrorReporter for ErrorChannel {
    fn report(&self, message: String) {
        error!(%message, "Reported");
        self.current.send_replace(Some(message));
    }
}
