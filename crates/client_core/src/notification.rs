//! Transient status messages with a single replaceable dismiss timer.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use tokio::{sync::watch, task::JoinHandle};

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(3000);
pub const REJECTION_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    pub duration: Duration,
    pub shown_at: DateTime<Utc>,
}

/// Shows at most one notification at a time. Showing a new one aborts the
/// pending dismissal of the previous one.
pub struct Notifier {
    current: Arc<watch::Sender<Option<Notification>>>,
    dismiss_task: Option<JoinHandle<()>>,
    next_id: u64,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            dismiss_task: None,
            next_id: 1,
        }
    }

    /// Must be called from within a tokio runtime; the dismissal runs as a spawned task.
    pub fn show(
        &mut self,
        message: impl Into<String>,
        kind: NotificationKind,
        duration: Duration,
    ) -> Notification {
        if let Some(task) = self.dismiss_task.take() {
            task.abort();
        }

        let id = self.next_id;
        self.next_id += 1;
        let notification = Notification {
            id,
            message: message.into(),
            kind,
            duration,
            shown_at: Utc::now(),
        };
        self.current.send_replace(Some(notification.clone()));

        let current = Arc::clone(&self.current);
        self.dismiss_task = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // An aborted task may still be past its sleep; only clear our own message.
            current.send_if_modified(|shown| {
                if shown.as_ref().is_some_and(|n| n.id == id) {
                    *shown = None;
                    true
                } else {
                    false
                }
            });
        }));

        notification
    }

    pub fn dismiss(&mut self) {
        if let Some(task) = self.dismiss_task.take() {
            task.abort();
        }
        self.current.send_replace(None);
    }

    pub fn current(&self) -> Option<Notification> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.current.subscribe()
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        if let Some(task) = self.dismiss_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn notification_dismisses_after_duration() {
        let mut notifier = Notifier::new();
        notifier.show("saved", NotificationKind::Success, Duration::from_millis(3000));

        sleep(Duration::from_millis(2999)).await;
        assert_eq!(
            notifier.current().map(|n| n.message),
            Some("saved".to_string())
        );

        sleep(Duration::from_millis(2)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn newer_notification_replaces_pending_dismissal() {
        let mut notifier = Notifier::new();
        notifier.show("first", NotificationKind::Info, Duration::from_millis(3000));

        sleep(Duration::from_millis(1000)).await;
        notifier.show("second", NotificationKind::Error, Duration::from_millis(3000));

        // Past the first message's original deadline.
        sleep(Duration::from_millis(2500)).await;
        let shown = notifier.current().expect("second still visible");
        assert_eq!(shown.message, "second");
        assert_eq!(shown.kind, NotificationKind::Error);

        sleep(Duration::from_millis(600)).await;
        assert!(notifier.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_observe_show_and_dismiss() {
        let mut notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.show("hello", NotificationKind::Info, Duration::from_millis(10));
        rx.changed().await.expect("shown");
        assert!(rx.borrow_and_update().is_some());

        rx.changed().await.expect("dismissed");
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn explicit_dismiss_clears_immediately() {
        let mut notifier = Notifier::new();
        notifier.show("bye", NotificationKind::Info, Duration::from_secs(60));
        notifier.dismiss();
        assert!(notifier.current().is_none());
    }
}
