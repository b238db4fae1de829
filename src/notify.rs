use console::style;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Opaque handle for dismissing an in-progress notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeToken(Uuid);

impl NoticeToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Host-UI notification sink.
///
/// The engine reports progress and outcomes through this seam instead of
/// printing. `info` returns a token so an in-flight progress notice can be
/// dismissed on both the success and the failure path.
pub trait Notifier: Send + Sync {
    fn info(&self, message: &str) -> NoticeToken;
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn dismiss(&self, token: NoticeToken);
}

/// Factory: create the right sink from config.
pub fn create_notifier(backend: &str) -> Box<dyn Notifier> {
    match backend {
        "console" => Box::new(ConsoleNotifier::new()),
        "log" => Box::new(TracingNotifier),
        _ => {
            tracing::warn!("Unknown notifier backend '{backend}', falling back to log");
            Box::new(TracingNotifier)
        }
    }
}

// ─── Console sink ───────────────────────────────────────────────────────────

/// Styled terminal notifier. Printed lines cannot be retracted, so
/// `dismiss` is a no-op; progress notices are rendered dim to read as
/// transient.
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) -> NoticeToken {
        println!("{}", style(message).dim());
        NoticeToken::new()
    }

    fn success(&self, message: &str) {
        println!("{}", style(message).green().bold());
    }

    fn error(&self, message: &str) {
        eprintln!("{}", style(message).red().bold());
    }

    fn dismiss(&self, _token: NoticeToken) {}
}

// ─── Tracing sink ───────────────────────────────────────────────────────────

/// Routes notices into the structured log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn info(&self, message: &str) -> NoticeToken {
        let token = NoticeToken::new();
        tracing::info!(notice = ?token.0, "{message}");
        token
    }

    fn success(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn dismiss(&self, token: NoticeToken) {
        tracing::debug!(notice = ?token.0, "notice dismissed");
    }
}

// ─── Recording sink ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyEvent {
    Info(String),
    Success(String),
    Error(String),
    Dismiss(NoticeToken),
}

/// Test double that records every call. Clones share the same event log.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<NotifyEvent>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotifyEvent> {
        self.events.lock().expect("event log poisoned").clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                NotifyEvent::Error(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: NotifyEvent) {
        self.events.lock().expect("event log poisoned").push(event);
    }
}

impl Notifier for RecordingNotifier {
    fn info(&self, message: &str) -> NoticeToken {
        self.push(NotifyEvent::Info(message.to_string()));
        NoticeToken::new()
    }

    fn success(&self, message: &str) {
        self.push(NotifyEvent::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(NotifyEvent::Error(message.to_string()));
    }

    fn dismiss(&self, token: NoticeToken) {
        self.push(NotifyEvent::Dismiss(token));
    }
}
