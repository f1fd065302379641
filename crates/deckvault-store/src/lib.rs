//! Storage layer for DeckVault credits.
//!
//! This crate persists the credit ledger (`user_credits`) and submission
//! records (`deck_submissions`) and exposes the mutation primitives the
//! submission flow is built on.
//!
//! # Race safety
//!
//! The ledger row is shared mutable state across stateless request
//! handlers, possibly on different machines. Every balance mutation is a
//! single conditional statement against the persisted row ("decrement iff
//! positive", "grant iff not yet granted this month"), never a
//! read-then-write in application code. Two concurrent consumptions with
//! one credit left therefore cannot both succeed.
//!
//! # Backends
//!
//! - [`PgLedgerStore`]: PostgreSQL via sqlx; the production backend.
//! - [`MemoryLedgerStore`]: mutex-guarded in-memory maps with the same
//!   atomicity contract, for tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;

pub use error::{Result, StoreError};
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

use async_trait::async_trait;

use deckvault_core::{
    CreditLedger, CreditType, MonthKey, SubmissionId, SubmissionRecord, SubmissionType, UserId,
};

/// The storage trait defining all ledger and submission operations.
///
/// Implementations must uphold the atomicity contract documented at the
/// crate level for `refresh_credits`, `consume_credit`, and
/// `refund_credit`.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Get the credit ledger for a user, if a row exists.
    ///
    /// Callers treat a missing ledger as all-zero balances with no grant
    /// markers; rows are created lazily by `refresh_credits` and
    /// `refund_credit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_ledger(&self, user_id: &UserId) -> Result<Option<CreditLedger>>;

    /// Apply the monthly grant for a credit type if it has not been applied
    /// for `month` yet, creating the ledger row when absent.
    ///
    /// When `last_granted[credit_type]` is unset or before `month`, the
    /// balance is reset to `allocation` and the marker stamped; otherwise
    /// this is a no-op and any mid-month consumption is preserved. Returns
    /// the balance after the check either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails. The caller must
    /// then treat the balance as stale, not assume the grant happened.
    async fn refresh_credits(
        &self,
        user_id: &UserId,
        credit_type: &CreditType,
        allocation: i64,
        month: MonthKey,
    ) -> Result<i64>;

    /// Atomically take one credit: decrement the balance iff it is
    /// currently positive. Returns the new balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::InsufficientCredits` if the balance is zero (or the
    ///   ledger row does not exist); nothing is mutated.
    /// - `StoreError::Database` if the operation fails.
    async fn consume_credit(&self, user_id: &UserId, credit_type: &CreditType) -> Result<i64>;

    /// Compensating action: put one credit back. Returns the new balance.
    ///
    /// This is not a transactional rollback of a consumption; callers
    /// invoke it when a write gated by `consume_credit` failed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn refund_credit(&self, user_id: &UserId, credit_type: &CreditType) -> Result<i64>;

    // =========================================================================
    // Submission Operations
    // =========================================================================

    /// Insert a submission record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_submission(&self, submission: &SubmissionRecord) -> Result<()>;

    /// Get a submission by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_submission(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>>;

    /// List a user's submissions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_submissions_by_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionRecord>>;

    /// Count the user's submissions of one type currently in `queued`
    /// status. Feeds the queue admission policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn count_queued(&self, user_id: &UserId, submission_type: SubmissionType) -> Result<i64>;
}
