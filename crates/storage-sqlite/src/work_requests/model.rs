//! Database models for work requests.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use meerwerk_core::errors::DatabaseError;
use meerwerk_core::work_requests::{MaterialInput, WorkRequest, WorkRequestStatus};
use meerwerk_core::{Error, Result};

use crate::utils::{format_datetime, parse_datetime, parse_decimal};

/// Database model for work requests. Materials are stored as a JSON array.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::work_requests)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WorkRequestDB {
    pub id: String,
    pub project_id: String,
    pub description: String,
    pub estimated_hours: String,
    pub materials: String,
    pub status: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl WorkRequestDB {
    pub fn into_domain(self) -> Result<WorkRequest> {
        let status = WorkRequestStatus::from_db_str(&self.status).ok_or_else(|| {
            Error::Database(DatabaseError::Internal(format!(
                "Unknown work request status '{}'",
                self.status
            )))
        })?;
        let materials: Vec<MaterialInput> = serde_json::from_str(&self.materials).map_err(|e| {
            Error::Database(DatabaseError::Internal(format!(
                "Invalid materials payload for work request {}: {}",
                self.id, e
            )))
        })?;
        Ok(WorkRequest {
            estimated_hours: parse_decimal(&self.estimated_hours, "estimated_hours"),
            created_at: parse_datetime(&self.created_at, "created_at"),
            updated_at: parse_datetime(&self.updated_at, "updated_at"),
            id: self.id,
            project_id: self.project_id,
            description: self.description,
            materials,
            status,
            created_by: self.created_by,
        })
    }

    pub fn from_domain(request: &WorkRequest) -> Result<Self> {
        Ok(Self {
            id: request.id.clone(),
            project_id: request.project_id.clone(),
            description: request.description.clone(),
            estimated_hours: request.estimated_hours.to_string(),
            materials: serde_json::to_string(&request.materials)?,
            status: request.status.as_db_str().to_string(),
            created_by: request.created_by.clone(),
            created_at: format_datetime(request.created_at),
            updated_at: format_datetime(request.updated_at),
        })
    }
}
