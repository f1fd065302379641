//! In-memory storage implementation for tests.
//!
//! Holds its mutex across each whole read-modify-write, so it gives the
//! same at-most-once consumption guarantee the PostgreSQL backend gets
//! from conditional SQL statements.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use deckvault_core::{
    CreditLedger, CreditType, MonthKey, SubmissionId, SubmissionRecord, SubmissionType, UserId,
};

use crate::error::{Result, StoreError};
use crate::LedgerStore;

#[derive(Default)]
struct Inner {
    ledgers: HashMap<UserId, CreditLedger>,
    submissions: Vec<SubmissionRecord>,
}

/// In-memory storage implementation.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: Mutex<Inner>,
    fail_submission_inserts: AtomicBool,
}

impl MemoryLedgerStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `insert_submission` fail with a database
    /// error. Lets tests exercise the refund-on-failed-write path.
    pub fn fail_submission_inserts(&self, fail: bool) {
        self.fail_submission_inserts.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Database("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get_ledger(&self, user_id: &UserId) -> Result<Option<CreditLedger>> {
        Ok(self.lock()?.ledgers.get(user_id).cloned())
    }

    async fn refresh_credits(
        &self,
        user_id: &UserId,
        credit_type: &CreditType,
        allocation: i64,
        month: MonthKey,
    ) -> Result<i64> {
        let mut inner = self.lock()?;
        let ledger = inner
            .ledgers
            .entry(*user_id)
            .or_insert_with(|| CreditLedger::empty(*user_id));

        if ledger.needs_refresh(credit_type, month) {
            ledger.balances.insert(credit_type.clone(), allocation);
            ledger.last_granted.insert(credit_type.clone(), month);
            ledger.updated_at = Utc::now();
        }

        Ok(ledger.balance(credit_type))
    }

    async fn consume_credit(&self, user_id: &UserId, credit_type: &CreditType) -> Result<i64> {
        let mut inner = self.lock()?;
        let Some(ledger) = inner.ledgers.get_mut(user_id) else {
            return Err(StoreError::InsufficientCredits {
                credit_type: credit_type.clone(),
            });
        };

        let balance = ledger.balance(credit_type);
        if balance <= 0 {
            return Err(StoreError::InsufficientCredits {
                credit_type: credit_type.clone(),
            });
        }

        ledger.balances.insert(credit_type.clone(), balance - 1);
        ledger.updated_at = Utc::now();
        Ok(balance - 1)
    }

    async fn refund_credit(&self, user_id: &UserId, credit_type: &CreditType) -> Result<i64> {
        let mut inner = self.lock()?;
        let ledger = inner
            .ledgers
            .entry(*user_id)
            .or_insert_with(|| CreditLedger::empty(*user_id));

        let balance = ledger.balance(credit_type) + 1;
        ledger.balances.insert(credit_type.clone(), balance);
        ledger.updated_at = Utc::now();
        Ok(balance)
    }

    async fn insert_submission(&self, submission: &SubmissionRecord) -> Result<()> {
        if self.fail_submission_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Database(
                "injected submission insert failure".to_string(),
            ));
        }

        self.lock()?.submissions.push(submission.clone());
        Ok(())
    }

    async fn get_submission(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>> {
        Ok(self
            .lock()?
            .submissions
            .iter()
            .find(|s| s.id == *id)
            .cloned())
    }

    async fn list_submissions_by_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionRecord>> {
        let inner = self.lock()?;
        let mut own: Vec<SubmissionRecord> = inner
            .submissions
            .iter()
            .filter(|s| s.user_id == *user_id)
            .cloned()
            .collect();
        own.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(own
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .collect())
    }

    async fn count_queued(&self, user_id: &UserId, submission_type: SubmissionType) -> Result<i64> {
        let count = self
            .lock()?
            .submissions
            .iter()
            .filter(|s| {
                s.user_id == *user_id
                    && s.submission_type == submission_type
                    && s.status == deckvault_core::SubmissionStatus::Queued
            })
            .count();

        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}
