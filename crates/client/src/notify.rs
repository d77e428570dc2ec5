//! User-visible notifications ("toasts").

/// Sink for success and error notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(message, "Notification");
    }

    fn error(&self, message: &str) {
        tracing::warn!(message, "Error notification");
    }
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toast {
    Success(String),
    Error(String),
}

/// Collects notifications for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    toasts: std::sync::Mutex<Vec<Toast>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub(crate) fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.toasts.lock().unwrap().push(Toast::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.toasts.lock().unwrap().push(Toast::Error(message.to_string()));
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn success(&self, message: &str) {
        (**self).success(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn shared_notifier_forwards_to_inner() {
        let recorder = Arc::new(RecordingNotifier::default());
        let shared: Arc<dyn Notifier> = recorder.clone();

        shared.success("Dashboard saved");
        shared.error("Request failed with status 502");

        assert_eq!(
            recorder.toasts(),
            vec![
                Toast::Success("Dashboard saved".to_string()),
                Toast::Error("Request failed with status 502".to_string()),
            ]
        );
    }

    #[test]
    fn tracing_notifier_is_usable_behind_arc() {
        let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
        notifier.success("Layout reset");
        notifier.error("Could not reach the server");
    }
}
