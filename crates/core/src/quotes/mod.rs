//! Quotes module - domain models, lifecycle service, and traits.

pub mod costing;
mod numbering;
mod quotes_errors;
mod quotes_model;
mod quotes_service;
mod quotes_traits;



// Re-export the public interface
pub use numbering::QuoteNumberAllocator;
pub use quotes_errors::QuoteError;
pub use quotes_model::{
    ApprovalRecord, CostBreakdown, NewApprovalRecord, NewQuote, Quote, QuoteExpirySweep,
    QuoteLine, QuoteNumber, QuoteOutcome, QuotePeriod, QuoteStatus, QuoteStatusPatch,
};
pub use quotes_service::QuoteService;
pub use quotes_traits::{QuoteRepositoryTrait, QuoteServiceTrait};
