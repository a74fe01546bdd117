use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;

use meerwerk_core::errors::DatabaseError;
use meerwerk_core::work_requests::{WorkRequest, WorkRequestRepositoryTrait, WorkRequestStatus};
use meerwerk_core::{Error, Result};

use super::model::WorkRequestDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::work_requests;
use crate::utils::format_datetime;

pub struct WorkRequestRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WorkRequestRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        WorkRequestRepository { pool, writer }
    }

    /// Persists a work request coming from the upstream intake process.
    pub async fn insert_work_request(&self, request: &WorkRequest) -> Result<WorkRequest> {
        let row = WorkRequestDB::from_domain(request)?;
        self.writer
            .exec(move |conn| {
                diesel::insert_into(work_requests::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                work_requests::table
                    .find(row.id.as_str())
                    .first::<WorkRequestDB>(conn)
                    .map_err(StorageError::from)?
                    .into_domain()
            })
            .await
    }
}

#[async_trait]
impl WorkRequestRepositoryTrait for WorkRequestRepository {
    fn get_work_request(&self, request_id: &str) -> Result<WorkRequest> {
        let mut conn = get_connection(&self.pool)?;
        work_requests::table
            .find(request_id)
            .first::<WorkRequestDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_domain()
    }

    fn get_work_requests_by_project(&self, project_id: &str) -> Result<Vec<WorkRequest>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = work_requests::table
            .filter(work_requests::project_id.eq(project_id))
            .order(work_requests::created_at.asc())
            .load::<WorkRequestDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(WorkRequestDB::into_domain).collect()
    }

    async fn update_status(&self, request_id: &str, status: WorkRequestStatus) -> Result<()> {
        let request_id = request_id.to_string();
        self.writer
            .exec(move |conn| {
                let affected = diesel::update(work_requests::table.find(request_id.as_str()))
                    .set((
                        work_requests::status.eq(status.as_db_str()),
                        work_requests::updated_at.eq(format_datetime(Utc::now())),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "Work request {} not found",
                        request_id
                    ))));
                }
                Ok(())
            })
            .await
    }
}
