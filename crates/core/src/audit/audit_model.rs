//! Audit trail types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// State-changing quote events recorded for compliance review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    QuoteCreated,
    QuotePdfGenerated,
    QuotePdfFailed,
    QuoteApproved,
    QuoteExpired,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::QuoteCreated => "QUOTE_CREATED",
            AuditEventType::QuotePdfGenerated => "QUOTE_PDF_GENERATED",
            AuditEventType::QuotePdfFailed => "QUOTE_PDF_FAILED",
            AuditEventType::QuoteApproved => "QUOTE_APPROVED",
            AuditEventType::QuoteExpired => "QUOTE_EXPIRED",
        }
    }
}

/// An append-only, immutable log entry capturing a state-changing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub event_type: AuditEventType,
    pub quote_id: String,
    /// Who triggered the event, when attributable.
    pub actor: Option<String>,
    pub payload: Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        event_type: AuditEventType,
        quote_id: impl Into<String>,
        actor: Option<String>,
        payload: Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type,
            quote_id: quote_id.into(),
            actor,
            payload,
            recorded_at: Utc::now(),
        }
    }
}
