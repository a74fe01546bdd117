//! Quote domain models.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{QUOTE_NUMBER_PREFIX, QUOTE_SEQUENCE_WIDTH};
use crate::errors::ValidationError;
use crate::{Error, Result};

/// Quote status lifecycle.
///
/// Legal edges are encoded in [`QuoteStatus::can_transition_to`]; everything
/// else is rejected by the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    ReadyForReview,
    ApprovedByClient,
    GenerationFailed,
    Expired,
}

impl QuoteStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::ReadyForReview => "ready_for_review",
            QuoteStatus::ApprovedByClient => "approved_by_client",
            QuoteStatus::GenerationFailed => "generation_failed",
            QuoteStatus::Expired => "expired",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(QuoteStatus::Draft),
            "ready_for_review" => Some(QuoteStatus::ReadyForReview),
            "approved_by_client" => Some(QuoteStatus::ApprovedByClient),
            "generation_failed" => Some(QuoteStatus::GenerationFailed),
            "expired" => Some(QuoteStatus::Expired),
            _ => None,
        }
    }

    /// True for states a quote never leaves. `generation_failed` is not
    /// terminal: rendering may be retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::ApprovedByClient | QuoteStatus::Expired)
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::ReadyForReview)
                | (QuoteStatus::Draft, QuoteStatus::GenerationFailed)
                | (QuoteStatus::GenerationFailed, QuoteStatus::ReadyForReview)
                | (QuoteStatus::GenerationFailed, QuoteStatus::GenerationFailed)
                | (QuoteStatus::ReadyForReview, QuoteStatus::ApprovedByClient)
                | (QuoteStatus::ReadyForReview, QuoteStatus::Expired)
        )
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_db_str())
    }
}

/// A priced line on a quote, derived from the work request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QuoteLine {
    #[serde(rename_all = "camelCase")]
    Material {
        description: String,
        quantity: Decimal,
        unit_price: Decimal,
        line_total: Decimal,
    },
    #[serde(rename_all = "camelCase")]
    Labor {
        description: String,
        hours: Decimal,
        hourly_rate: Decimal,
        line_total: Decimal,
    },
}

impl QuoteLine {
    pub fn line_total(&self) -> Decimal {
        match self {
            QuoteLine::Material { line_total, .. } => *line_total,
            QuoteLine::Labor { line_total, .. } => *line_total,
        }
    }
}

/// Output of the cost calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub lines: Vec<QuoteLine>,
    pub subtotal: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
}

/// Numbering partition: quote sequences are unique and contiguous within
/// a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotePeriod {
    pub year: i32,
    pub month: u32,
}

impl QuotePeriod {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Invalid quote period month: {}",
                month
            ))));
        }
        Ok(Self { year, month })
    }

    pub fn from_datetime(timestamp: &DateTime<Utc>) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// Partition key, e.g. `202608` for August 2026.
    pub fn key(&self) -> String {
        format!("{:04}{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for QuotePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key())
    }
}

/// An allocated quote identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteNumber {
    pub value: String,
    pub sequence: u32,
    pub period: QuotePeriod,
}

impl QuoteNumber {
    pub fn new(period: QuotePeriod, sequence: u32) -> Self {
        let value = format!(
            "{}-{}-{:0width$}",
            QUOTE_NUMBER_PREFIX,
            period.key(),
            sequence,
            width = QUOTE_SEQUENCE_WIDTH
        );
        Self {
            value,
            sequence,
            period,
        }
    }
}

/// Domain model representing a quote for extra work on a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: String,
    /// Unique, e.g. `MW-202608-007`.
    pub quote_number: String,
    pub sequence: u32,
    /// Numbering partition key (`YYYYMM`).
    pub period: String,
    pub request_id: String,
    pub project_id: String,
    pub status: QuoteStatus,
    pub lines: Vec<QuoteLine>,
    pub subtotal: Decimal,
    /// Fixed at creation time; never recomputed afterwards.
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
    /// Fixed at creation time; never recomputed afterwards.
    pub valid_until: DateTime<Utc>,
    /// Set once rendering succeeds.
    pub document_url: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_origin: Option<String>,
    /// SHA-256 hex digest of the client signature. The raw signature is
    /// never persisted.
    pub signature_digest: Option<String>,
}

impl Quote {
    pub fn is_past_validity(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }

    pub fn is_approvable(&self, now: DateTime<Utc>) -> bool {
        self.status == QuoteStatus::ReadyForReview && !self.is_past_validity(now)
    }
}

/// Input model for persisting a newly created quote. Always inserted in
/// `draft` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub quote_number: String,
    pub sequence: u32,
    pub period: String,
    pub request_id: String,
    pub project_id: String,
    pub lines: Vec<QuoteLine>,
    pub subtotal: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
    pub valid_until: DateTime<Utc>,
    pub created_by: String,
}

impl NewQuote {
    /// Validates the new quote data.
    pub fn validate(&self) -> Result<()> {
        if self.quote_number.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "quote_number".to_string(),
            )));
        }
        if self.request_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "request_id".to_string(),
            )));
        }
        if self.subtotal < Decimal::ZERO || self.vat_amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Quote amounts cannot be negative".to_string(),
            )));
        }
        if self.total != self.subtotal + self.vat_amount {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Quote total must equal subtotal plus VAT".to_string(),
            )));
        }
        Ok(())
    }
}

/// The act of a client approving a quote. Write-once, tied to exactly one
/// quote; retained for dispute resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRecord {
    pub id: String,
    pub quote_id: String,
    pub approver: String,
    pub origin_address: String,
    pub signature_digest: String,
    pub approved_at: DateTime<Utc>,
}

/// Approval data carried on a status patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApprovalRecord {
    pub approver: String,
    pub origin_address: String,
    pub signature_digest: String,
    pub approved_at: DateTime<Utc>,
}

/// Conditional status update: applied only when the persisted status still
/// matches the expectation given to
/// [`QuoteRepositoryTrait::update_quote_status`](super::QuoteRepositoryTrait::update_quote_status).
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteStatusPatch {
    pub status: QuoteStatus,
    pub document_url: Option<String>,
    pub approval: Option<NewApprovalRecord>,
}

impl QuoteStatusPatch {
    pub fn new(status: QuoteStatus) -> Self {
        Self {
            status,
            document_url: None,
            approval: None,
        }
    }

    pub fn with_document_url(mut self, url: impl Into<String>) -> Self {
        self.document_url = Some(url.into());
        self
    }

    pub fn with_approval(mut self, approval: NewApprovalRecord) -> Self {
        self.approval = Some(approval);
        self
    }
}

/// Result of a state-changing quote operation.
///
/// `warnings` carries post-commit failures (audit backend down, notification
/// undeliverable, work request untouched). The primary transition has been
/// durably persisted whenever this struct is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteOutcome {
    pub quote: Quote,
    pub warnings: Vec<String>,
}

/// Result of an expiry sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteExpirySweep {
    pub expired: Vec<Quote>,
    pub warnings: Vec<String>,
}
