//! Audit module - append-only compliance trail for quote transitions.

mod audit_model;
mod recorder;

pub use audit_model::{AuditEntry, AuditEventType};
pub use recorder::{AuditRecorderTrait, MockAuditRecorder, NoOpAuditRecorder};
