// Notification seam. The host application plugs in its toast system; the
// default implementation emits through tracing so headless runs keep the
// messages in the structured log.

use tracing::{error, info};

/// Sink for user-facing success and danger messages.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn danger(&self, message: &str);
}

/// Default notifier that logs instead of toasting.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(notification = "success", "{message}");
    }

    fn danger(&self, message: &str) {
        error!(notification = "danger", "{message}");
    }
}
