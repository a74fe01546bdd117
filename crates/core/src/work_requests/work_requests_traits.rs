use async_trait::async_trait;

use super::work_requests_model::{WorkRequest, WorkRequestStatus};
use crate::Result;

/// Trait defining the contract for WorkRequest repository operations.
#[async_trait]
pub trait WorkRequestRepositoryTrait: Send + Sync {
    fn get_work_request(&self, request_id: &str) -> Result<WorkRequest>;
    fn get_work_requests_by_project(&self, project_id: &str) -> Result<Vec<WorkRequest>>;
    async fn update_status(&self, request_id: &str, status: WorkRequestStatus) -> Result<()>;
}
