//! Notification dispatcher trait and implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::Notification;
use crate::Result;

/// Trait for delivering notifications.
///
/// Delivery is fire-and-forget from the quote service's point of view: a
/// failed send is logged and surfaced as a warning, never as a failure of
/// the operation that triggered it.
#[async_trait]
pub trait NotificationDispatcherTrait: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<()>;
}

/// No-op implementation for tests or contexts without a transport.
#[derive(Clone, Default)]
pub struct NoOpNotificationDispatcher;

#[async_trait]
impl NotificationDispatcherTrait for NoOpNotificationDispatcher {
    async fn send(&self, _notification: Notification) -> Result<()> {
        Ok(())
    }
}

/// Mock dispatcher for testing - collects sent notifications.
#[derive(Clone, Default)]
pub struct MockNotificationDispatcher {
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotificationDispatcher {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all collected notifications.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl NotificationDispatcherTrait for MockNotificationDispatcher {
    async fn send(&self, notification: Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::NotificationType;
    use serde_json::json;

    #[tokio::test]
    async fn mock_dispatcher_collects_notifications() {
        let dispatcher = MockNotificationDispatcher::new();
        assert!(dispatcher.is_empty());

        dispatcher
            .send(Notification::quote_ready("project-1", json!({"quoteNumber": "MW-202608-001"})))
            .await
            .unwrap();
        dispatcher
            .send(Notification::quote_approved("user-1", json!({"quoteNumber": "MW-202608-001"})))
            .await
            .unwrap();

        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].notification_type, NotificationType::QuoteReady);
        assert_eq!(sent[1].recipient, "user-1");
    }

    #[tokio::test]
    async fn noop_dispatcher_discards_notifications() {
        let dispatcher = NoOpNotificationDispatcher;
        dispatcher
            .send(Notification::quote_ready("project-1", json!({})))
            .await
            .unwrap();
    }
}
