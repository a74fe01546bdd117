use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::{debug, warn};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::audit::{AuditEntry, AuditEventType, AuditRecorderTrait};
use crate::errors::{DatabaseError, ValidationError};
use crate::notifications::{Notification, NotificationDispatcherTrait};
use crate::rendering::{DocumentRendererTrait, QuoteDocumentPayload};
use crate::settings::SettingsServiceTrait;
use crate::work_requests::{WorkRequest, WorkRequestRepositoryTrait, WorkRequestStatus};
use crate::{Error, Result};

use super::costing;
use super::numbering::QuoteNumberAllocator;
use super::quotes_errors::QuoteError;
use super::quotes_model::{
    ApprovalRecord, NewApprovalRecord, NewQuote, Quote, QuoteExpirySweep, QuoteOutcome,
    QuotePeriod, QuoteStatus, QuoteStatusPatch,
};
use super::quotes_traits::{QuoteRepositoryTrait, QuoteServiceTrait};

/// Service owning the quote lifecycle: creation, rendering, approval, and
/// expiry. All status changes go through conditional repository updates, so
/// concurrent callers cannot drive a quote through an illegal edge.
pub struct QuoteService {
    quote_repository: Arc<dyn QuoteRepositoryTrait>,
    work_request_repository: Arc<dyn WorkRequestRepositoryTrait>,
    settings_service: Arc<dyn SettingsServiceTrait>,
    renderer: Arc<dyn DocumentRendererTrait>,
    notification_dispatcher: Arc<dyn NotificationDispatcherTrait>,
    audit_recorder: Arc<dyn AuditRecorderTrait>,
    allocator: QuoteNumberAllocator,
}

impl QuoteService {
    /// Creates a new QuoteService instance with injected dependencies
    pub fn new(
        quote_repository: Arc<dyn QuoteRepositoryTrait>,
        work_request_repository: Arc<dyn WorkRequestRepositoryTrait>,
        settings_service: Arc<dyn SettingsServiceTrait>,
        renderer: Arc<dyn DocumentRendererTrait>,
        notification_dispatcher: Arc<dyn NotificationDispatcherTrait>,
        audit_recorder: Arc<dyn AuditRecorderTrait>,
    ) -> Self {
        let allocator = QuoteNumberAllocator::new(Arc::clone(&quote_repository));
        Self {
            quote_repository,
            work_request_repository,
            settings_service,
            renderer,
            notification_dispatcher,
            audit_recorder,
            allocator,
        }
    }

    fn signature_digest(signature: &str) -> String {
        hex::encode(Sha256::digest(signature.as_bytes()))
    }

    fn load_quote(&self, quote_id: &str) -> Result<Quote> {
        match self.quote_repository.get_quote(quote_id) {
            Err(Error::Database(DatabaseError::NotFound(_))) => {
                Err(Error::Quote(QuoteError::NotFound(quote_id.to_string())))
            }
            other => other,
        }
    }

    fn load_work_request(&self, request_id: &str) -> Result<WorkRequest> {
        match self.work_request_repository.get_work_request(request_id) {
            Err(Error::Database(DatabaseError::NotFound(_))) => Err(Error::Quote(
                QuoteError::WorkRequestNotFound(request_id.to_string()),
            )),
            other => other,
        }
    }

    /// Records an audit entry post-commit. Failures degrade to a warning on
    /// the operation result.
    async fn record_audit(&self, entry: AuditEntry, warnings: &mut Vec<String>) {
        let event = entry.event_type.as_str();
        if let Err(err) = self.audit_recorder.record(entry).await {
            warn!("audit record {} failed: {}", event, err);
            warnings.push(format!("audit record {} not written: {}", event, err));
        }
    }

    /// Dispatches a notification post-commit. Failures degrade to a warning
    /// on the operation result.
    async fn dispatch(&self, notification: Notification, warnings: &mut Vec<String>) {
        let event = notification.notification_type.as_str();
        if let Err(err) = self.notification_dispatcher.send(notification).await {
            warn!("notification {} failed: {}", event, err);
            warnings.push(format!("notification {} not delivered: {}", event, err));
        }
    }

    /// Moves a `ready_for_review` quote past its validity window to
    /// `expired`. Returns `None` when a concurrent transition won the race.
    async fn expire_quote(&self, quote: &Quote) -> Result<Option<Quote>> {
        match self
            .quote_repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::ReadyForReview,
                QuoteStatusPatch::new(QuoteStatus::Expired),
            )
            .await
        {
            Ok(expired) => {
                debug!(
                    "quote {} expired (valid until {})",
                    quote.quote_number, quote.valid_until
                );
                if let Err(err) = self
                    .audit_recorder
                    .record(AuditEntry::new(
                        AuditEventType::QuoteExpired,
                        &quote.id,
                        None,
                        json!({
                            "quoteNumber": quote.quote_number,
                            "validUntil": quote.valid_until,
                        }),
                    ))
                    .await
                {
                    warn!(
                        "audit record for expired quote {} failed: {}",
                        quote.quote_number, err
                    );
                }
                Ok(Some(expired))
            }
            Err(Error::Quote(QuoteError::StateConflict { .. })) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Persists the failure state, audits it, and surfaces the rendering
    /// error. The state change happens before the error propagates.
    async fn fail_rendering(
        &self,
        quote: &Quote,
        from_status: QuoteStatus,
        reason: String,
    ) -> Result<QuoteOutcome> {
        warn!("rendering failed for quote {}: {}", quote.quote_number, reason);
        self.quote_repository
            .update_quote_status(
                &quote.id,
                from_status,
                QuoteStatusPatch::new(QuoteStatus::GenerationFailed),
            )
            .await?;
        if let Err(err) = self
            .audit_recorder
            .record(AuditEntry::new(
                AuditEventType::QuotePdfFailed,
                &quote.id,
                None,
                json!({
                    "quoteNumber": quote.quote_number,
                    "reason": reason,
                }),
            ))
            .await
        {
            warn!(
                "audit record for failed rendering of quote {} failed: {}",
                quote.quote_number, err
            );
        }
        Err(Error::Quote(QuoteError::Rendering(reason)))
    }
}

#[async_trait]
impl QuoteServiceTrait for QuoteService {
    async fn create_quote(&self, request_id: &str, user_id: &str) -> Result<QuoteOutcome> {
        if user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "user_id".to_string(),
            )));
        }

        let request = self.load_work_request(request_id)?;
        let settings = self.settings_service.get_settings()?;

        let costs = costing::compute(
            &request.materials,
            request.estimated_hours,
            settings.hourly_rate,
            settings.vat_rate,
        )
        .map_err(|err| Error::Quote(QuoteError::Calculation(err.to_string())))?;

        let now = Utc::now();
        let number = self
            .allocator
            .allocate(QuotePeriod::from_datetime(&now))
            .await?;

        let new_quote = NewQuote {
            id: None,
            quote_number: number.value,
            sequence: number.sequence,
            period: number.period.key(),
            request_id: request.id.clone(),
            project_id: request.project_id.clone(),
            lines: costs.lines,
            subtotal: costs.subtotal,
            vat_rate: costs.vat_rate,
            vat_amount: costs.vat_amount,
            total: costs.total,
            valid_until: now + Duration::days(settings.validity_days),
            created_by: user_id.to_string(),
        };
        new_quote.validate()?;

        let quote = self.quote_repository.insert_quote(new_quote).await?;
        debug!(
            "created quote {} for work request {}",
            quote.quote_number, request_id
        );

        let mut warnings = Vec::new();
        if let Err(err) = self
            .work_request_repository
            .update_status(request_id, WorkRequestStatus::Quoted)
            .await
        {
            warn!("work request {} not marked quoted: {}", request_id, err);
            warnings.push(format!(
                "work request {} not marked quoted: {}",
                request_id, err
            ));
        }
        self.record_audit(
            AuditEntry::new(
                AuditEventType::QuoteCreated,
                &quote.id,
                Some(user_id.to_string()),
                json!({
                    "quoteNumber": quote.quote_number,
                    "requestId": quote.request_id,
                    "subtotal": quote.subtotal,
                    "total": quote.total,
                }),
            ),
            &mut warnings,
        )
        .await;

        Ok(QuoteOutcome { quote, warnings })
    }

    async fn request_rendering(&self, quote_id: &str) -> Result<QuoteOutcome> {
        let quote = self.load_quote(quote_id)?;
        let from_status = quote.status;
        if !matches!(
            from_status,
            QuoteStatus::Draft | QuoteStatus::GenerationFailed
        ) {
            return Err(Error::Quote(QuoteError::StateConflict {
                quote_id: quote.id,
                expected: QuoteStatus::Draft,
                actual: from_status,
            }));
        }

        let request = self.load_work_request(&quote.request_id)?;
        let settings = self.settings_service.get_settings()?;
        let payload = QuoteDocumentPayload::from_quote(&quote, &request);

        let timeout = StdDuration::from_secs(settings.render_timeout_secs);
        let rendered = match tokio::time::timeout(timeout, self.renderer.render(&payload)).await {
            Ok(Ok(document)) => document,
            Ok(Err(err)) => {
                return self
                    .fail_rendering(&quote, from_status, err.to_string())
                    .await
            }
            Err(_) => {
                return self
                    .fail_rendering(
                        &quote,
                        from_status,
                        format!(
                            "renderer timed out after {}s",
                            settings.render_timeout_secs
                        ),
                    )
                    .await
            }
        };

        let updated = self
            .quote_repository
            .update_quote_status(
                &quote.id,
                from_status,
                QuoteStatusPatch::new(QuoteStatus::ReadyForReview)
                    .with_document_url(rendered.url.clone()),
            )
            .await?;
        debug!("quote {} rendered to {}", updated.quote_number, rendered.url);

        let mut warnings = Vec::new();
        self.record_audit(
            AuditEntry::new(
                AuditEventType::QuotePdfGenerated,
                &updated.id,
                None,
                json!({
                    "quoteNumber": updated.quote_number,
                    "documentUrl": rendered.url,
                }),
            ),
            &mut warnings,
        )
        .await;
        self.dispatch(
            Notification::quote_ready(
                updated.project_id.clone(),
                json!({
                    "quoteNumber": updated.quote_number,
                    "total": updated.total,
                    "validUntil": updated.valid_until,
                }),
            ),
            &mut warnings,
        )
        .await;

        Ok(QuoteOutcome {
            quote: updated,
            warnings,
        })
    }

    async fn approve_quote(
        &self,
        quote_id: &str,
        approver: &str,
        origin_address: &str,
        signature: &str,
    ) -> Result<QuoteOutcome> {
        if approver.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "approver".to_string(),
            )));
        }
        if signature.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "signature".to_string(),
            )));
        }

        let quote = self.load_quote(quote_id)?;
        let now = Utc::now();

        if quote.status == QuoteStatus::Expired
            || (quote.status == QuoteStatus::ReadyForReview && quote.is_past_validity(now))
        {
            if quote.status == QuoteStatus::ReadyForReview {
                if let Err(err) = self.expire_quote(&quote).await {
                    warn!(
                        "deferred expiry for quote {} failed: {}",
                        quote.quote_number, err
                    );
                }
            }
            return Err(Error::Quote(QuoteError::Expired {
                quote_id: quote.id,
                valid_until: quote.valid_until,
            }));
        }

        if quote.status != QuoteStatus::ReadyForReview {
            return Err(Error::Quote(QuoteError::StateConflict {
                quote_id: quote.id,
                expected: QuoteStatus::ReadyForReview,
                actual: quote.status,
            }));
        }

        let signature_digest = Self::signature_digest(signature);
        let approval = NewApprovalRecord {
            approver: approver.to_string(),
            origin_address: origin_address.to_string(),
            signature_digest: signature_digest.clone(),
            approved_at: now,
        };

        let updated = self
            .quote_repository
            .update_quote_status(
                &quote.id,
                QuoteStatus::ReadyForReview,
                QuoteStatusPatch::new(QuoteStatus::ApprovedByClient).with_approval(approval),
            )
            .await?;
        debug!("quote {} approved by {}", updated.quote_number, approver);

        let mut warnings = Vec::new();
        if let Err(err) = self
            .work_request_repository
            .update_status(&updated.request_id, WorkRequestStatus::Approved)
            .await
        {
            warn!(
                "work request {} not marked approved: {}",
                updated.request_id, err
            );
            warnings.push(format!(
                "work request {} not marked approved: {}",
                updated.request_id, err
            ));
        }
        self.record_audit(
            AuditEntry::new(
                AuditEventType::QuoteApproved,
                &updated.id,
                Some(approver.to_string()),
                json!({
                    "quoteNumber": updated.quote_number,
                    "origin": origin_address,
                    "signatureDigest": signature_digest,
                }),
            ),
            &mut warnings,
        )
        .await;
        self.dispatch(
            Notification::quote_approved(
                updated.created_by.clone(),
                json!({
                    "quoteNumber": updated.quote_number,
                    "approver": approver,
                }),
            ),
            &mut warnings,
        )
        .await;

        Ok(QuoteOutcome {
            quote: updated,
            warnings,
        })
    }

    async fn get_quote(&self, quote_id: &str) -> Result<Quote> {
        let quote = self.load_quote(quote_id)?;
        if quote.status == QuoteStatus::ReadyForReview && quote.is_past_validity(Utc::now()) {
            return match self.expire_quote(&quote).await? {
                Some(expired) => Ok(expired),
                None => self.load_quote(quote_id),
            };
        }
        Ok(quote)
    }

    fn get_quotes_by_project(&self, project_id: &str) -> Result<Vec<Quote>> {
        self.quote_repository.get_quotes_by_project(project_id)
    }

    fn get_approval_record(&self, quote_id: &str) -> Result<Option<ApprovalRecord>> {
        self.quote_repository.get_approval_record(quote_id)
    }

    async fn expire_overdue_quotes(&self) -> Result<QuoteExpirySweep> {
        let overdue = self.quote_repository.list_overdue(Utc::now())?;
        let mut expired = Vec::new();
        let mut warnings = Vec::new();
        for quote in overdue {
            match self.expire_quote(&quote).await {
                Ok(Some(q)) => expired.push(q),
                Ok(None) => {}
                Err(err) => {
                    warn!("expiry of quote {} failed: {}", quote.quote_number, err);
                    warnings.push(format!("quote {} not expired: {}", quote.quote_number, err));
                }
            }
        }
        Ok(QuoteExpirySweep { expired, warnings })
    }
}
