//! Notification types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events that trigger a message to a client or internal stakeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    QuoteReady,
    QuoteApproved,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::QuoteReady => "QUOTE_READY",
            NotificationType::QuoteApproved => "QUOTE_APPROVED",
        }
    }
}

/// A single outbound notification.
///
/// `recipient` is a routing key (project or user identifier); the dispatcher
/// resolves it to an actual address. Transport is external to this core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub notification_type: NotificationType,
    pub recipient: String,
    pub payload: Value,
}

impl Notification {
    /// Tells the project's client that a quote is ready for review.
    pub fn quote_ready(recipient: impl Into<String>, payload: Value) -> Self {
        Self {
            notification_type: NotificationType::QuoteReady,
            recipient: recipient.into(),
            payload,
        }
    }

    /// Tells the internal owner that the client approved the quote.
    pub fn quote_approved(recipient: impl Into<String>, payload: Value) -> Self {
        Self {
            notification_type: NotificationType::QuoteApproved,
            recipient: recipient.into(),
            payload,
        }
    }
}
