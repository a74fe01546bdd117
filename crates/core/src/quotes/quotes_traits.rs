use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::quotes_model::{
    ApprovalRecord, NewQuote, Quote, QuoteExpirySweep, QuoteOutcome, QuotePeriod, QuoteStatus,
    QuoteStatusPatch,
};
use crate::Result;

/// Trait defining the contract for Quote repository operations.
#[async_trait]
pub trait QuoteRepositoryTrait: Send + Sync {
    fn get_quote(&self, quote_id: &str) -> Result<Quote>;
    fn get_quotes_by_project(&self, project_id: &str) -> Result<Vec<Quote>>;
    /// Quotes in `ready_for_review` whose validity window has passed.
    fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Quote>>;
    fn get_approval_record(&self, quote_id: &str) -> Result<Option<ApprovalRecord>>;
    async fn insert_quote(&self, new_quote: NewQuote) -> Result<Quote>;
    /// Conditional update: applies `patch` only while the persisted status
    /// still equals `expected`, otherwise fails with
    /// `QuoteError::StateConflict` carrying the actual status. When the patch
    /// carries approval data, the approval record is written in the same
    /// transaction.
    async fn update_quote_status(
        &self,
        quote_id: &str,
        expected: QuoteStatus,
        patch: QuoteStatusPatch,
    ) -> Result<Quote>;
    /// Atomically increments and returns the next sequence number for the
    /// period. Implementations must be safe under arbitrary concurrent
    /// callers; a read-then-insert is not an acceptable implementation.
    async fn next_sequence_for_period(&self, period: &QuotePeriod) -> Result<u32>;
}

/// Trait defining the contract for Quote service operations.
#[async_trait]
pub trait QuoteServiceTrait: Send + Sync {
    /// Prices a work request, allocates a quote number, and persists a new
    /// quote in `draft`.
    async fn create_quote(&self, request_id: &str, user_id: &str) -> Result<QuoteOutcome>;
    /// Renders the quote document and advances the quote to
    /// `ready_for_review`, or to `generation_failed` when rendering fails or
    /// times out.
    async fn request_rendering(&self, quote_id: &str) -> Result<QuoteOutcome>;
    /// Records a client approval. Only legal from `ready_for_review` and
    /// within the validity window.
    async fn approve_quote(
        &self,
        quote_id: &str,
        approver: &str,
        origin_address: &str,
        signature: &str,
    ) -> Result<QuoteOutcome>;
    /// Fetches a quote, lazily expiring it when its validity has passed.
    async fn get_quote(&self, quote_id: &str) -> Result<Quote>;
    fn get_quotes_by_project(&self, project_id: &str) -> Result<Vec<Quote>>;
    fn get_approval_record(&self, quote_id: &str) -> Result<Option<ApprovalRecord>>;
    /// Expires every overdue `ready_for_review` quote. Optional convenience
    /// for operators; lazy expiry on access remains authoritative.
    async fn expire_overdue_quotes(&self) -> Result<QuoteExpirySweep>;
}
