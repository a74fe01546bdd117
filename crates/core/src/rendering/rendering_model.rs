//! Rendering payload models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::quotes::{Quote, QuoteLine};
use crate::work_requests::WorkRequest;

/// Structured payload handed to the document renderer. The renderer owns the
/// visual layout; this core only supplies the figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocumentPayload {
    pub quote_number: String,
    pub project_id: String,
    pub request_description: String,
    pub lines: Vec<QuoteLine>,
    pub subtotal: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl QuoteDocumentPayload {
    pub fn from_quote(quote: &Quote, request: &WorkRequest) -> Self {
        Self {
            quote_number: quote.quote_number.clone(),
            project_id: quote.project_id.clone(),
            request_description: request.description.clone(),
            lines: quote.lines.clone(),
            subtotal: quote.subtotal,
            vat_rate: quote.vat_rate,
            vat_amount: quote.vat_amount,
            total: quote.total,
            valid_until: quote.valid_until,
            created_at: quote.created_at,
        }
    }
}

/// Reference to a successfully rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub url: String,
}
