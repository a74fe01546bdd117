//! Rendering module - document renderer contract and payload models.

mod rendering_model;
mod rendering_traits;

// Re-export the public interface
pub use rendering_model::{QuoteDocumentPayload, RenderedDocument};
pub use rendering_traits::DocumentRendererTrait;
