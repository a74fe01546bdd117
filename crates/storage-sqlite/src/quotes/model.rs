//! Database models for quotes and approval records.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use meerwerk_core::errors::DatabaseError;
use meerwerk_core::quotes::{ApprovalRecord, NewQuote, Quote, QuoteLine, QuoteStatus};
use meerwerk_core::{Error, Result};

use crate::utils::{format_datetime, parse_datetime, parse_decimal, parse_optional_datetime};

/// Database model for quotes. Lines are stored as a JSON array; monetary
/// amounts as TEXT-encoded decimals.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::quotes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuoteDB {
    pub id: String,
    pub quote_number: String,
    pub sequence: i32,
    pub period: String,
    pub request_id: String,
    pub project_id: String,
    pub status: String,
    pub lines: String,
    pub subtotal: String,
    pub vat_rate: String,
    pub vat_amount: String,
    pub total: String,
    pub valid_until: String,
    pub document_url: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<String>,
    pub approval_origin: Option<String>,
    pub signature_digest: Option<String>,
}

impl QuoteDB {
    /// Builds the row for a new quote: fresh id when absent, `draft` status,
    /// creation timestamps.
    pub fn from_new(new_quote: NewQuote) -> Result<Self> {
        let now = format_datetime(chrono::Utc::now());
        Ok(Self {
            id: new_quote
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            quote_number: new_quote.quote_number,
            sequence: new_quote.sequence as i32,
            period: new_quote.period,
            request_id: new_quote.request_id,
            project_id: new_quote.project_id,
            status: QuoteStatus::Draft.as_db_str().to_string(),
            lines: serde_json::to_string(&new_quote.lines)?,
            subtotal: new_quote.subtotal.to_string(),
            vat_rate: new_quote.vat_rate.to_string(),
            vat_amount: new_quote.vat_amount.to_string(),
            total: new_quote.total.to_string(),
            valid_until: format_datetime(new_quote.valid_until),
            document_url: None,
            created_by: new_quote.created_by,
            created_at: now.clone(),
            updated_at: now,
            approved_by: None,
            approved_at: None,
            approval_origin: None,
            signature_digest: None,
        })
    }

    pub fn into_domain(self) -> Result<Quote> {
        let status = QuoteStatus::from_db_str(&self.status).ok_or_else(|| {
            Error::Database(DatabaseError::Internal(format!(
                "Unknown quote status '{}'",
                self.status
            )))
        })?;
        let lines: Vec<QuoteLine> = serde_json::from_str(&self.lines).map_err(|e| {
            Error::Database(DatabaseError::Internal(format!(
                "Invalid lines payload for quote {}: {}",
                self.id, e
            )))
        })?;
        Ok(Quote {
            sequence: self.sequence as u32,
            subtotal: parse_decimal(&self.subtotal, "subtotal"),
            vat_rate: parse_decimal(&self.vat_rate, "vat_rate"),
            vat_amount: parse_decimal(&self.vat_amount, "vat_amount"),
            total: parse_decimal(&self.total, "total"),
            valid_until: parse_datetime(&self.valid_until, "valid_until"),
            created_at: parse_datetime(&self.created_at, "created_at"),
            updated_at: parse_datetime(&self.updated_at, "updated_at"),
            approved_at: parse_optional_datetime(self.approved_at.as_deref(), "approved_at"),
            id: self.id,
            quote_number: self.quote_number,
            period: self.period,
            request_id: self.request_id,
            project_id: self.project_id,
            status,
            lines,
            document_url: self.document_url,
            created_by: self.created_by,
            approved_by: self.approved_by,
            approval_origin: self.approval_origin,
            signature_digest: self.signature_digest,
        })
    }
}

/// Database model for approval records.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::approval_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ApprovalRecordDB {
    pub id: String,
    pub quote_id: String,
    pub approver: String,
    pub origin_address: String,
    pub signature_digest: String,
    pub approved_at: String,
}

impl From<ApprovalRecordDB> for ApprovalRecord {
    fn from(record: ApprovalRecordDB) -> Self {
        ApprovalRecord {
            approved_at: parse_datetime(&record.approved_at, "approved_at"),
            id: record.id,
            quote_id: record.quote_id,
            approver: record.approver,
            origin_address: record.origin_address,
            signature_digest: record.signature_digest,
        }
    }
}
