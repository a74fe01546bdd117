//! Work requests module - domain models and traits.

mod work_requests_model;
mod work_requests_traits;

// Re-export the public interface
pub use work_requests_model::{MaterialInput, WorkRequest, WorkRequestStatus};
pub use work_requests_traits::WorkRequestRepositoryTrait;
