use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use uuid::Uuid;

use meerwerk_core::errors::{DatabaseError, ValidationError};
use meerwerk_core::quotes::{
    ApprovalRecord, NewQuote, Quote, QuoteError, QuotePeriod, QuoteRepositoryTrait, QuoteStatus,
    QuoteStatusPatch,
};
use meerwerk_core::{Error, Result};

use super::model::{ApprovalRecordDB, QuoteDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{approval_records, quote_sequences, quotes};
use crate::utils::format_datetime;

pub struct QuoteRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl QuoteRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        QuoteRepository { pool, writer }
    }
}

#[async_trait]
impl QuoteRepositoryTrait for QuoteRepository {
    fn get_quote(&self, quote_id: &str) -> Result<Quote> {
        let mut conn = get_connection(&self.pool)?;
        quotes::table
            .find(quote_id)
            .first::<QuoteDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_domain()
    }

    fn get_quotes_by_project(&self, project_id: &str) -> Result<Vec<Quote>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = quotes::table
            .filter(quotes::project_id.eq(project_id))
            .order(quotes::created_at.asc())
            .load::<QuoteDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(QuoteDB::into_domain).collect()
    }

    fn list_overdue(&self, now: DateTime<Utc>) -> Result<Vec<Quote>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = quotes::table
            .filter(quotes::status.eq(QuoteStatus::ReadyForReview.as_db_str()))
            .filter(quotes::valid_until.lt(format_datetime(now)))
            .order(quotes::valid_until.asc())
            .load::<QuoteDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(QuoteDB::into_domain).collect()
    }

    fn get_approval_record(&self, quote_id: &str) -> Result<Option<ApprovalRecord>> {
        let mut conn = get_connection(&self.pool)?;
        let record = approval_records::table
            .filter(approval_records::quote_id.eq(quote_id))
            .first::<ApprovalRecordDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(record.map(ApprovalRecord::from))
    }

    async fn insert_quote(&self, new_quote: NewQuote) -> Result<Quote> {
        new_quote.validate()?;
        self.writer
            .exec(move |conn| {
                let row = QuoteDB::from_new(new_quote)?;
                diesel::insert_into(quotes::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                quotes::table
                    .find(row.id.as_str())
                    .first::<QuoteDB>(conn)
                    .map_err(StorageError::from)?
                    .into_domain()
            })
            .await
    }

    async fn update_quote_status(
        &self,
        quote_id: &str,
        expected: QuoteStatus,
        patch: QuoteStatusPatch,
    ) -> Result<Quote> {
        let quote_id = quote_id.to_string();
        self.writer
            .exec(move |conn| {
                // Read-check-write is atomic here: the closure runs inside
                // the single writer's immediate transaction.
                let current: QuoteDB = quotes::table
                    .find(quote_id.as_str())
                    .first(conn)
                    .map_err(StorageError::from)?;
                let current_status =
                    QuoteStatus::from_db_str(&current.status).ok_or_else(|| {
                        Error::Database(DatabaseError::Internal(format!(
                            "Unknown quote status '{}'",
                            current.status
                        )))
                    })?;
                if current_status != expected {
                    return Err(Error::Quote(QuoteError::StateConflict {
                        quote_id: quote_id.clone(),
                        expected,
                        actual: current_status,
                    }));
                }
                if !expected.can_transition_to(patch.status) {
                    return Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "Illegal status transition {} -> {}",
                        expected, patch.status
                    ))));
                }

                let now_str = format_datetime(Utc::now());
                diesel::update(
                    quotes::table
                        .find(quote_id.as_str())
                        .filter(quotes::status.eq(expected.as_db_str())),
                )
                .set((
                    quotes::status.eq(patch.status.as_db_str()),
                    quotes::updated_at.eq(now_str.as_str()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                if let Some(url) = &patch.document_url {
                    diesel::update(quotes::table.find(quote_id.as_str()))
                        .set(quotes::document_url.eq(url.as_str()))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                if let Some(approval) = &patch.approval {
                    let approved_at_str = format_datetime(approval.approved_at);
                    diesel::update(quotes::table.find(quote_id.as_str()))
                        .set((
                            quotes::approved_by.eq(approval.approver.as_str()),
                            quotes::approved_at.eq(approved_at_str.as_str()),
                            quotes::approval_origin.eq(approval.origin_address.as_str()),
                            quotes::signature_digest.eq(approval.signature_digest.as_str()),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;

                    // UNIQUE(quote_id) makes the approval record write-once;
                    // a second insert rolls the whole transaction back.
                    let record = ApprovalRecordDB {
                        id: Uuid::new_v4().to_string(),
                        quote_id: quote_id.clone(),
                        approver: approval.approver.clone(),
                        origin_address: approval.origin_address.clone(),
                        signature_digest: approval.signature_digest.clone(),
                        approved_at: approved_at_str,
                    };
                    diesel::insert_into(approval_records::table)
                        .values(&record)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                quotes::table
                    .find(quote_id.as_str())
                    .first::<QuoteDB>(conn)
                    .map_err(StorageError::from)?
                    .into_domain()
            })
            .await
    }

    async fn next_sequence_for_period(&self, period: &QuotePeriod) -> Result<u32> {
        let period_key = period.key();
        self.writer
            .exec(move |conn| {
                let current: Option<i32> = quote_sequences::table
                    .find(period_key.as_str())
                    .select(quote_sequences::last_sequence)
                    .first(conn)
                    .optional()
                    .map_err(StorageError::from)?;

                let next = match current {
                    Some(value) => {
                        diesel::update(quote_sequences::table.find(period_key.as_str()))
                            .set(quote_sequences::last_sequence.eq(value + 1))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        value + 1
                    }
                    None => {
                        // First allocation for the period: seed the counter
                        // from the highest already-persisted quote.
                        let highest: Option<i32> = quotes::table
                            .filter(quotes::period.eq(period_key.as_str()))
                            .select(max(quotes::sequence))
                            .first(conn)
                            .map_err(StorageError::from)?;
                        let seeded = highest.unwrap_or(0) + 1;
                        diesel::insert_into(quote_sequences::table)
                            .values((
                                quote_sequences::period.eq(period_key.as_str()),
                                quote_sequences::last_sequence.eq(seeded),
                            ))
                            .execute(conn)
                            .map_err(StorageError::from)?;
                        seeded
                    }
                };
                Ok(next as u32)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use crate::work_requests::WorkRequestRepository;
    use chrono::Duration;
    use meerwerk_core::quotes::{NewApprovalRecord, QuoteLine};
    use meerwerk_core::work_requests::{MaterialInput, WorkRequest, WorkRequestStatus};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    async fn create_test_repository() -> (QuoteRepository, WorkRequestRepository, tempfile::TempDir)
    {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let db_path_str = db_path.to_string_lossy().to_string();

        let pool = create_pool(&db_path_str).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());

        let quote_repository = QuoteRepository::new(Arc::clone(&pool), writer.clone());
        let request_repository = WorkRequestRepository::new(Arc::clone(&pool), writer);
        (quote_repository, request_repository, temp_dir)
    }

    async fn seed_work_request(repository: &WorkRequestRepository, request_id: &str) {
        let now = Utc::now();
        repository
            .insert_work_request(&WorkRequest {
                id: request_id.to_string(),
                project_id: "project-1".to_string(),
                description: "Extra foundation drainage".to_string(),
                estimated_hours: Decimal::from(3),
                materials: vec![MaterialInput {
                    description: "Concrete".to_string(),
                    quantity: Decimal::from(2),
                    unit_price: Some(Decimal::from(100)),
                }],
                status: WorkRequestStatus::Submitted,
                created_by: "foreman-1".to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("Failed to seed work request");
    }

    fn new_quote(request_id: &str, sequence: u32) -> NewQuote {
        let now = Utc::now();
        NewQuote {
            id: None,
            quote_number: format!("MW-202608-{:03}", sequence),
            sequence,
            period: "202608".to_string(),
            request_id: request_id.to_string(),
            project_id: "project-1".to_string(),
            lines: vec![QuoteLine::Material {
                description: "Concrete".to_string(),
                quantity: Decimal::from(2),
                unit_price: Decimal::from(100),
                line_total: Decimal::from(200),
            }],
            subtotal: Decimal::new(45500, 2),
            vat_rate: Decimal::new(21, 2),
            vat_amount: Decimal::new(9555, 2),
            total: Decimal::new(55055, 2),
            valid_until: now + Duration::days(30),
            created_by: "user-1".to_string(),
        }
    }

    fn approval() -> NewApprovalRecord {
        NewApprovalRecord {
            approver: "J. de Vries".to_string(),
            origin_address: "203.0.113.7".to_string(),
            signature_digest: "a".repeat(64),
            approved_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;

        let inserted = repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap();
        let fetched = repository.get_quote(&inserted.id).unwrap();

        assert_eq!(fetched.quote_number, "MW-202608-001");
        assert_eq!(fetched.status, QuoteStatus::Draft);
        assert_eq!(fetched.subtotal, Decimal::new(45500, 2));
        assert_eq!(fetched.total, Decimal::new(55055, 2));
        assert_eq!(fetched.lines.len(), 1);
        assert!(fetched.document_url.is_none());
        assert!(fetched.approved_by.is_none());
    }

    #[tokio::test]
    async fn duplicate_quote_number_is_rejected() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;

        repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap();
        let err = repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Database(DatabaseError::UniqueViolation(_))
        ));
    }

    #[tokio::test]
    async fn conditional_update_applies_patch() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;
        let quote = repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap();

        let updated = repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview)
                    .with_document_url("https://documents.local/quotes/q.pdf"),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, QuoteStatus::ReadyForReview);
        assert_eq!(
            updated.document_url.as_deref(),
            Some("https://documents.local/quotes/q.pdf")
        );
    }

    #[tokio::test]
    async fn conditional_update_conflicts_on_stale_expectation() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;
        let quote = repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap();
        repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview),
            )
            .await
            .unwrap();

        let err = repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview),
            )
            .await
            .unwrap_err();

        match err {
            Error::Quote(QuoteError::StateConflict {
                expected, actual, ..
            }) => {
                assert_eq!(expected, QuoteStatus::Draft);
                assert_eq!(actual, QuoteStatus::ReadyForReview);
            }
            other => panic!("Expected StateConflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn illegal_transition_is_rejected() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;
        let quote = repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap();

        let err = repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ApprovedByClient).with_approval(approval()),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(
            repository.get_quote(&quote.id).unwrap().status,
            QuoteStatus::Draft
        );
    }

    #[tokio::test]
    async fn approval_patch_writes_record_once() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;
        let quote = repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap();
        repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview),
            )
            .await
            .unwrap();

        let approved = repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::ReadyForReview,
                QuoteStatusPatch::new(QuoteStatus::ApprovedByClient).with_approval(approval()),
            )
            .await
            .unwrap();

        assert_eq!(approved.status, QuoteStatus::ApprovedByClient);
        assert_eq!(approved.approved_by.as_deref(), Some("J. de Vries"));
        let record = repository.get_approval_record(&quote.id).unwrap().unwrap();
        assert_eq!(record.quote_id, quote.id);
        assert_eq!(record.signature_digest, "a".repeat(64));

        // a second approval attempt finds the status already advanced
        let err = repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::ReadyForReview,
                QuoteStatusPatch::new(QuoteStatus::ApprovedByClient).with_approval(approval()),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Quote(QuoteError::StateConflict { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_approvals_have_a_single_winner() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;
        let quote = repository
            .insert_quote(new_quote("request-1", 1))
            .await
            .unwrap();
        repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview),
            )
            .await
            .unwrap();

        let first = repository.update_quote_status(
            &quote.id,
            QuoteStatus::ReadyForReview,
            QuoteStatusPatch::new(QuoteStatus::ApprovedByClient).with_approval(approval()),
        );
        let second = repository.update_quote_status(
            &quote.id,
            QuoteStatus::ReadyForReview,
            QuoteStatusPatch::new(QuoteStatus::ApprovedByClient).with_approval(approval()),
        );
        let (first, second) = tokio::join!(first, second);

        assert_eq!(
            first.is_ok() as u8 + second.is_ok() as u8,
            1,
            "exactly one approval must win"
        );
    }

    #[tokio::test]
    async fn next_sequence_is_contiguous() {
        let (repository, _requests, _tmp) = create_test_repository().await;
        let period = QuotePeriod::new(2026, 8).unwrap();

        assert_eq!(repository.next_sequence_for_period(&period).await.unwrap(), 1);
        assert_eq!(repository.next_sequence_for_period(&period).await.unwrap(), 2);
        assert_eq!(repository.next_sequence_for_period(&period).await.unwrap(), 3);

        let other = QuotePeriod::new(2026, 9).unwrap();
        assert_eq!(repository.next_sequence_for_period(&other).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn next_sequence_seeds_from_existing_quotes() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;
        repository
            .insert_quote(new_quote("request-1", 4))
            .await
            .unwrap();

        let period = QuotePeriod::new(2026, 8).unwrap();
        assert_eq!(repository.next_sequence_for_period(&period).await.unwrap(), 5);
        assert_eq!(repository.next_sequence_for_period(&period).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn concurrent_allocations_are_distinct_and_contiguous() {
        let (repository, _requests, _tmp) = create_test_repository().await;
        let repository = Arc::new(repository);
        let period = QuotePeriod::new(2026, 8).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move {
                    repository.next_sequence_for_period(&period).await.unwrap()
                })
            })
            .collect();

        let mut sequences = Vec::new();
        for handle in handles {
            sequences.push(handle.await.unwrap());
        }
        sequences.sort_unstable();
        assert_eq!(sequences, (1..=10).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn list_overdue_filters_on_status_and_validity() {
        let (repository, requests, _tmp) = create_test_repository().await;
        seed_work_request(&requests, "request-1").await;

        let mut overdue = new_quote("request-1", 1);
        overdue.valid_until = Utc::now() - Duration::days(1);
        let overdue = repository.insert_quote(overdue).await.unwrap();
        repository
            .update_quote_status(
                &overdue.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview),
            )
            .await
            .unwrap();

        let mut current = new_quote("request-1", 2);
        current.valid_until = Utc::now() + Duration::days(30);
        let current = repository.insert_quote(current).await.unwrap();
        repository
            .update_quote_status(
                &current.id,
                QuoteStatus::Draft,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview),
            )
            .await
            .unwrap();

        // still draft, also past validity
        let mut stale_draft = new_quote("request-1", 3);
        stale_draft.valid_until = Utc::now() - Duration::days(1);
        repository.insert_quote(stale_draft).await.unwrap();

        let listed = repository.list_overdue(Utc::now()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, overdue.id);
    }

    #[tokio::test]
    async fn get_missing_quote_is_not_found() {
        let (repository, _requests, _tmp) = create_test_repository().await;

        let err = repository.get_quote("quote-9").unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
    }
}
