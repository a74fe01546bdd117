//! Audit recorder trait and implementations.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::AuditEntry;
use crate::Result;

/// Trait for the append-only audit backend.
///
/// Recording happens after the state-changing write. A failed record is
/// logged and surfaced as a degraded-audit warning so operators can
/// reconcile; it never fails or rolls back the operation it describes.
#[async_trait]
pub trait AuditRecorderTrait: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<()>;
}

/// No-op implementation for tests or contexts without an audit backend.
#[derive(Clone, Default)]
pub struct NoOpAuditRecorder;

#[async_trait]
impl AuditRecorderTrait for NoOpAuditRecorder {
    async fn record(&self, _entry: AuditEntry) -> Result<()> {
        Ok(())
    }
}

/// Mock recorder for testing - collects recorded entries.
#[derive(Clone, Default)]
pub struct MockAuditRecorder {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MockAuditRecorder {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns all collected entries.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl AuditRecorderTrait for MockAuditRecorder {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}
