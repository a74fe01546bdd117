use async_trait::async_trait;

use super::rendering_model::{QuoteDocumentPayload, RenderedDocument};
use crate::Result;

/// Trait defining the contract for the document rendering collaborator.
///
/// Calls may fail or hang; the quote service bounds every call with the
/// configured timeout and treats a timeout as a rendering failure.
#[async_trait]
pub trait DocumentRendererTrait: Send + Sync {
    async fn render(&self, payload: &QuoteDocumentPayload) -> Result<RenderedDocument>;
}
