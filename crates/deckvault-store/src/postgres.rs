//! PostgreSQL storage implementation.
//!
//! The ledger maps (`credits`, `last_granted`) live as JSONB documents on
//! the `user_credits` row and are typed `HashMap`s everywhere above this
//! module. Balance mutations run as single conditional statements so the
//! database, not application code, arbitrates concurrent requests.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use deckvault_core::{
    CreditLedger, CreditType, MonthKey, SubmissionId, SubmissionRecord, SubmissionStatus,
    SubmissionType, UserId,
};

use crate::error::{Result, StoreError};
use crate::LedgerStore;

/// Embedded schema migrations (see `migrations/`).
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Grant the monthly allocation iff it has not been granted for this month
/// yet. The WHERE guard makes a same-month re-run a no-op, so concurrent
/// refreshes grant at most once and mid-month consumption survives.
const REFRESH_SQL: &str = r"
INSERT INTO user_credits (user_id, credits, last_granted, updated_at)
VALUES ($1, jsonb_build_object($2::text, $3::bigint), jsonb_build_object($2::text, to_jsonb($4::date)), now())
ON CONFLICT (user_id) DO UPDATE
SET credits = user_credits.credits || jsonb_build_object($2::text, $3::bigint),
    last_granted = user_credits.last_granted || jsonb_build_object($2::text, to_jsonb($4::date)),
    updated_at = now()
WHERE COALESCE((user_credits.last_granted->>$2)::date, 'epoch'::date) < $4
RETURNING (user_credits.credits->>$2)::bigint AS balance
";

/// Decrement iff the balance is currently positive. No matched row means
/// the credit was not there to take.
const CONSUME_SQL: &str = r"
UPDATE user_credits
SET credits = jsonb_set(credits, ARRAY[$2::text], to_jsonb(COALESCE((credits->>$2)::bigint, 0) - 1)),
    updated_at = now()
WHERE user_id = $1 AND COALESCE((credits->>$2)::bigint, 0) > 0
RETURNING (credits->>$2)::bigint AS balance
";

/// Put one credit back, creating the ledger row if it is somehow gone.
const REFUND_SQL: &str = r"
INSERT INTO user_credits (user_id, credits, last_granted, updated_at)
VALUES ($1, jsonb_build_object($2::text, 1::bigint), '{}'::jsonb, now())
ON CONFLICT (user_id) DO UPDATE
SET credits = jsonb_set(user_credits.credits, ARRAY[$2::text], to_jsonb(COALESCE((user_credits.credits->>$2)::bigint, 0) + 1)),
    updated_at = now()
RETURNING (user_credits.credits->>$2)::bigint AS balance
";

const BALANCE_SQL: &str = r"
SELECT COALESCE((credits->>$2)::bigint, 0) AS balance FROM user_credits WHERE user_id = $1
";

/// PostgreSQL-backed storage implementation.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Run embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails to apply.
    pub async fn run_migrations(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Current balance for a credit type; zero when the row is absent.
    async fn current_balance(&self, user_id: &UserId, credit_type: &CreditType) -> Result<i64> {
        let row = sqlx::query(BALANCE_SQL)
            .bind(user_id.as_uuid())
            .bind(credit_type.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(match row {
            Some(row) => row.try_get("balance")?,
            None => 0,
        })
    }
}

fn ledger_from_row(row: &PgRow) -> Result<CreditLedger> {
    let user_id: uuid::Uuid = row.try_get("user_id")?;
    let credits: serde_json::Value = row.try_get("credits")?;
    let last_granted: serde_json::Value = row.try_get("last_granted")?;
    let updated_at: chrono::DateTime<chrono::Utc> = row.try_get("updated_at")?;

    let balances: HashMap<CreditType, i64> =
        serde_json::from_value(credits).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let last_granted: HashMap<CreditType, MonthKey> = serde_json::from_value(last_granted)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;

    Ok(CreditLedger {
        user_id: UserId::from_uuid(user_id),
        balances,
        last_granted,
        updated_at,
    })
}

fn submission_from_row(row: &PgRow) -> Result<SubmissionRecord> {
    let id: uuid::Uuid = row.try_get("id")?;
    let user_id: uuid::Uuid = row.try_get("user_id")?;
    let submission_type: String = row.try_get("submission_type")?;
    let status: String = row.try_get("status")?;

    Ok(SubmissionRecord {
        id: SubmissionId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        submission_type: parse_submission_type(&submission_type)?,
        status: parse_status(&status)?,
        title: row.try_get("title")?,
        decklist_url: row.try_get("decklist_url")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
    })
}

fn parse_submission_type(value: &str) -> Result<SubmissionType> {
    match value {
        "deck" => Ok(SubmissionType::Deck),
        "roast" => Ok(SubmissionType::Roast),
        other => Err(StoreError::Serialization(format!(
            "unknown submission type: {other}"
        ))),
    }
}

fn parse_status(value: &str) -> Result<SubmissionStatus> {
    match value {
        "draft" => Ok(SubmissionStatus::Draft),
        "pending" => Ok(SubmissionStatus::Pending),
        "queued" => Ok(SubmissionStatus::Queued),
        "in_progress" => Ok(SubmissionStatus::InProgress),
        "completed" => Ok(SubmissionStatus::Completed),
        "rejected" => Ok(SubmissionStatus::Rejected),
        other => Err(StoreError::Serialization(format!(
            "unknown submission status: {other}"
        ))),
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn get_ledger(&self, user_id: &UserId) -> Result<Option<CreditLedger>> {
        let row = sqlx::query(
            "SELECT user_id, credits, last_granted, updated_at FROM user_credits WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(ledger_from_row).transpose()
    }

    async fn refresh_credits(
        &self,
        user_id: &UserId,
        credit_type: &CreditType,
        allocation: i64,
        month: MonthKey,
    ) -> Result<i64> {
        let row = sqlx::query(REFRESH_SQL)
            .bind(user_id.as_uuid())
            .bind(credit_type.as_str())
            .bind(allocation)
            .bind(month.as_date())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            // The grant fired; RETURNING carries the reset balance.
            Some(row) => {
                let balance: i64 = row.try_get("balance")?;
                tracing::debug!(
                    user_id = %user_id,
                    credit_type = %credit_type,
                    month = %month,
                    balance = %balance,
                    "Monthly credit grant applied"
                );
                Ok(balance)
            }
            // Already granted this month; report the live balance.
            None => self.current_balance(user_id, credit_type).await,
        }
    }

    async fn consume_credit(&self, user_id: &UserId, credit_type: &CreditType) -> Result<i64> {
        let row = sqlx::query(CONSUME_SQL)
            .bind(user_id.as_uuid())
            .bind(credit_type.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.try_get("balance")?),
            None => Err(StoreError::InsufficientCredits {
                credit_type: credit_type.clone(),
            }),
        }
    }

    async fn refund_credit(&self, user_id: &UserId, credit_type: &CreditType) -> Result<i64> {
        let row = sqlx::query(REFUND_SQL)
            .bind(user_id.as_uuid())
            .bind(credit_type.as_str())
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("balance")?)
    }

    async fn insert_submission(&self, submission: &SubmissionRecord) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO deck_submissions (id, user_id, submission_type, status, title, decklist_url, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(submission.id.as_uuid())
        .bind(submission.user_id.as_uuid())
        .bind(submission.submission_type.as_str())
        .bind(submission.status.as_str())
        .bind(&submission.title)
        .bind(&submission.decklist_url)
        .bind(&submission.notes)
        .bind(submission.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_submission(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, submission_type, status, title, decklist_url, notes, created_at
            FROM deck_submissions WHERE id = $1
            ",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(submission_from_row).transpose()
    }

    async fn list_submissions_by_user(
        &self,
        user_id: &UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SubmissionRecord>> {
        let rows = sqlx::query(
            r"
            SELECT id, user_id, submission_type, status, title, decklist_url, notes, created_at
            FROM deck_submissions WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.as_uuid())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(submission_from_row).collect()
    }

    async fn count_queued(&self, user_id: &UserId, submission_type: SubmissionType) -> Result<i64> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS queued FROM deck_submissions
            WHERE user_id = $1 AND submission_type = $2 AND status = 'queued'
            ",
        )
        .bind(user_id.as_uuid())
        .bind(submission_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("queued")?)
    }
}
