//! Quote number allocation.
//!
//! Numbers are formatted `MW-<YYYY><MM>-<NNN>` with the sequence reset each
//! month. The repository owns the atomicity of the underlying counter; this
//! allocator only formats and classifies failures.

use std::sync::Arc;

use super::quotes_errors::QuoteError;
use super::quotes_model::{QuoteNumber, QuotePeriod};
use super::quotes_traits::QuoteRepositoryTrait;
use crate::{Error, Result};

pub struct QuoteNumberAllocator {
    repository: Arc<dyn QuoteRepositoryTrait>,
}

impl QuoteNumberAllocator {
    pub fn new(repository: Arc<dyn QuoteRepositoryTrait>) -> Self {
        Self { repository }
    }

    /// Allocates the next identifier for the period.
    ///
    /// Storage failures surface as `QuoteError::Allocation`; callers must
    /// never create a quote without a successfully allocated number.
    pub async fn allocate(&self, period: QuotePeriod) -> Result<QuoteNumber> {
        let sequence = self
            .repository
            .next_sequence_for_period(&period)
            .await
            .map_err(|err| match err {
                Error::Validation(_) => err,
                other => Error::Quote(QuoteError::Allocation(other.to_string())),
            })?;
        Ok(QuoteNumber::new(period, sequence))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DatabaseError;
    use crate::quotes::quotes_model::{
        ApprovalRecord, NewQuote, Quote, QuoteStatus, QuoteStatusPatch,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Counter-only repository; the quote methods are never exercised here.
    struct CounterRepository {
        sequences: Mutex<HashMap<String, u32>>,
        fail: bool,
    }

    impl CounterRepository {
        fn new() -> Self {
            Self {
                sequences: Mutex::new(HashMap::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sequences: Mutex::new(HashMap::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl QuoteRepositoryTrait for CounterRepository {
        fn get_quote(&self, _quote_id: &str) -> crate::Result<Quote> {
            unimplemented!()
        }

        fn get_quotes_by_project(&self, _project_id: &str) -> crate::Result<Vec<Quote>> {
            unimplemented!()
        }

        fn list_overdue(&self, _now: DateTime<Utc>) -> crate::Result<Vec<Quote>> {
            unimplemented!()
        }

        fn get_approval_record(
            &self,
            _quote_id: &str,
        ) -> crate::Result<Option<ApprovalRecord>> {
            unimplemented!()
        }

        async fn insert_quote(&self, _new_quote: NewQuote) -> crate::Result<Quote> {
            unimplemented!()
        }

        async fn update_quote_status(
            &self,
            _quote_id: &str,
            _expected: QuoteStatus,
            _patch: QuoteStatusPatch,
        ) -> crate::Result<Quote> {
            unimplemented!()
        }

        async fn next_sequence_for_period(&self, period: &QuotePeriod) -> crate::Result<u32> {
            if self.fail {
                return Err(Error::Database(DatabaseError::ConnectionFailed(
                    "sequence backend offline".to_string(),
                )));
            }
            let mut sequences = self.sequences.lock().unwrap();
            let next = sequences.entry(period.key()).or_insert(0);
            *next += 1;
            Ok(*next)
        }
    }

    #[tokio::test]
    async fn allocates_contiguous_numbers_within_a_period() {
        let allocator = QuoteNumberAllocator::new(Arc::new(CounterRepository::new()));
        let period = QuotePeriod::new(2026, 8).unwrap();

        let first = allocator.allocate(period).await.unwrap();
        let second = allocator.allocate(period).await.unwrap();

        assert_eq!(first.value, "MW-202608-001");
        assert_eq!(second.value, "MW-202608-002");
        assert!(second.value > first.value);
    }

    #[tokio::test]
    async fn sequence_resets_per_period() {
        let allocator = QuoteNumberAllocator::new(Arc::new(CounterRepository::new()));
        let august = QuotePeriod::new(2026, 8).unwrap();
        let september = QuotePeriod::new(2026, 9).unwrap();

        allocator.allocate(august).await.unwrap();
        allocator.allocate(august).await.unwrap();
        let fresh = allocator.allocate(september).await.unwrap();

        assert_eq!(fresh.value, "MW-202609-001");
    }

    #[tokio::test]
    async fn widens_past_three_digits() {
        let repository = Arc::new(CounterRepository::new());
        repository
            .sequences
            .lock()
            .unwrap()
            .insert("202608".to_string(), 999);
        let allocator = QuoteNumberAllocator::new(repository);

        let number = allocator
            .allocate(QuotePeriod::new(2026, 8).unwrap())
            .await
            .unwrap();
        assert_eq!(number.value, "MW-202608-1000");
    }

    #[tokio::test]
    async fn concurrent_allocations_are_distinct() {
        let allocator = Arc::new(QuoteNumberAllocator::new(Arc::new(CounterRepository::new())));
        let period = QuotePeriod::new(2026, 8).unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                tokio::spawn(async move { allocator.allocate(period).await.unwrap().value })
            })
            .collect();

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort();
        values.dedup();
        assert_eq!(values.len(), 16);
    }

    #[tokio::test]
    async fn storage_failure_maps_to_allocation_error() {
        let allocator = QuoteNumberAllocator::new(Arc::new(CounterRepository::failing()));

        let err = allocator
            .allocate(QuotePeriod::new(2026, 8).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Quote(QuoteError::Allocation(_))));
    }

    #[test]
    fn rejects_invalid_month() {
        assert!(QuotePeriod::new(2026, 0).is_err());
        assert!(QuotePeriod::new(2026, 13).is_err());
    }
}
