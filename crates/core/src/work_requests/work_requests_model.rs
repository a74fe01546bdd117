//! Work request domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status of a work request as it moves through quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkRequestStatus {
    #[default]
    Submitted,
    Quoted,
    Approved,
}

impl WorkRequestStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            WorkRequestStatus::Submitted => "submitted",
            WorkRequestStatus::Quoted => "quoted",
            WorkRequestStatus::Approved => "approved",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "submitted" => Some(WorkRequestStatus::Submitted),
            "quoted" => Some(WorkRequestStatus::Quoted),
            "approved" => Some(WorkRequestStatus::Approved),
            _ => None,
        }
    }
}

/// A requested material on a work request. A missing unit price means the
/// material is priced at zero until procurement supplies one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialInput {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
}

/// A request for out-of-scope ("extra") construction work requiring a priced
/// quote. Created by an upstream process; read-mostly to the quote core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub id: String,
    pub project_id: String,
    pub description: String,
    pub estimated_hours: Decimal,
    pub materials: Vec<MaterialInput>,
    pub status: WorkRequestStatus,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
