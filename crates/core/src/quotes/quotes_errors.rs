//! Quote-specific error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::quotes_model::QuoteStatus;

/// Errors raised by the quote lifecycle.
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Quote not found: {0}")]
    NotFound(String),

    #[error("Work request not found: {0}")]
    WorkRequestNotFound(String),

    #[error("Quote {quote_id} is in state '{actual}', expected '{expected}'")]
    StateConflict {
        quote_id: String,
        expected: QuoteStatus,
        actual: QuoteStatus,
    },

    #[error("Quote {quote_id} expired on {valid_until}")]
    Expired {
        quote_id: String,
        valid_until: DateTime<Utc>,
    },

    #[error("Quote number allocation failed: {0}")]
    Allocation(String),

    #[error("Document rendering failed: {0}")]
    Rendering(String),

    #[error("Cost calculation failed: {0}")]
    Calculation(String),
}
