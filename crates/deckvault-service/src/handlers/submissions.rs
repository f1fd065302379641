//! Submission intake handlers.
//!
//! `create_submission` is the credit-gated flow: refresh the month's
//! allocation, atomically take a credit, then write the record. If the
//! write fails after the credit committed, a best-effort refund puts the
//! credit back. Exhausted members fall through to the bounded personal
//! queue instead of a flat rejection.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use deckvault_core::{
    admit_submission, allocation_for, CreditType, MonthKey, SubmissionAdmission, SubmissionRecord,
    SubmissionStatus, SubmissionType, UserId, MAX_QUEUED_SUBMISSIONS,
};
use deckvault_store::{LedgerStore, StoreError};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Default page size for submission listings.
const DEFAULT_LIST_LIMIT: i64 = 50;

/// Hard cap on submission listing page size.
const MAX_LIST_LIMIT: i64 = 200;

/// New submission request body.
#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    /// Deck build or roast.
    pub submission_type: SubmissionType,
    /// Save as draft: no credit check, not yet submitted.
    #[serde(default)]
    pub draft: bool,
    /// Short title, e.g. the commander name.
    pub title: String,
    /// Link to an existing decklist (required for roasts).
    #[serde(default)]
    pub decklist_url: Option<String>,
    /// Free-form notes for the deck builder.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Submission response.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    /// The new submission id.
    pub id: String,
    /// The status it was created with.
    pub status: SubmissionStatus,
    /// Deck build or roast.
    pub submission_type: SubmissionType,
    /// Whether a credit was charged for this submission.
    pub credit_charged: bool,
    /// Remaining balance in the relevant pool, when the gate ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_credits: Option<i64>,
}

/// Create a deck or roast submission.
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    if body.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }
    if body.submission_type == SubmissionType::Roast && body.decklist_url.is_none() {
        return Err(ApiError::BadRequest(
            "roast requests need a decklist_url".into(),
        ));
    }

    // Drafts skip the credit gate entirely.
    if body.draft {
        let record = build_record(&auth, &body, SubmissionStatus::Draft);
        state.store.insert_submission(&record).await?;
        return Ok(respond(StatusCode::CREATED, &record, false, None));
    }

    let profile = state.members.profile(&auth.user_id).await?;

    // Moderators and admins submit without being charged.
    if profile.role.bypasses_credit_gate() {
        let record = build_record(&auth, &body, SubmissionStatus::Pending);
        state.store.insert_submission(&record).await?;

        tracing::info!(
            user_id = %auth.user_id,
            submission_id = %record.id,
            role = ?profile.role,
            "Privileged submission accepted without credit charge"
        );
        return Ok(respond(StatusCode::CREATED, &record, false, None));
    }

    let credit_type = body.submission_type.credit_type();
    let month = MonthKey::current();
    let allocation = allocation_for(&profile.tier, &credit_type);

    // Ensure this month's allocation is applied before we look at the
    // balance. A failure here fails the request; we never proceed on a
    // balance we could not verify.
    let balance = state
        .store
        .refresh_credits(&auth.user_id, &credit_type, allocation, month)
        .await?;

    let queued = state
        .store
        .count_queued(&auth.user_id, body.submission_type)
        .await?;

    match admit_submission(balance, queued, MAX_QUEUED_SUBMISSIONS) {
        SubmissionAdmission::ConsumeCredit => {
            match state.store.consume_credit(&auth.user_id, &credit_type).await {
                Ok(new_balance) => {
                    submit_charged(&state, &auth, &body, &credit_type, new_balance).await
                }
                // Lost the race to a concurrent submission; fall back to
                // the queue policy with the now-exhausted balance.
                Err(StoreError::InsufficientCredits { .. }) => {
                    submit_queued(&state, &auth, &body, &credit_type, queued).await
                }
                Err(other) => Err(other.into()),
            }
        }
        SubmissionAdmission::Queue => {
            submit_queued(&state, &auth, &body, &credit_type, queued).await
        }
        SubmissionAdmission::AtCapacity => Err(ApiError::QueueCapacityReached {
            queued,
            max: MAX_QUEUED_SUBMISSIONS,
        }),
    }
}

/// Persist a `pending` submission after a successful consumption, refunding
/// the credit if the write fails.
async fn submit_charged(
    state: &AppState,
    auth: &AuthUser,
    body: &CreateSubmissionRequest,
    credit_type: &CreditType,
    new_balance: i64,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    let record = build_record(auth, body, SubmissionStatus::Pending);

    if let Err(write_err) = state.store.insert_submission(&record).await {
        tracing::error!(
            user_id = %auth.user_id,
            credit_type = %credit_type,
            error = %write_err,
            "Submission write failed after credit consumption; refunding"
        );

        refund_consumed_credit(state.store.as_ref(), &auth.user_id, credit_type).await;
        return Err(write_err.into());
    }

    tracing::info!(
        user_id = %auth.user_id,
        submission_id = %record.id,
        credit_type = %credit_type,
        remaining = %new_balance,
        "Submission accepted, credit consumed"
    );

    Ok(respond(StatusCode::CREATED, &record, true, Some(new_balance)))
}

/// Persist a `queued` submission (no charge) if the personal queue has
/// room, otherwise reject at capacity.
async fn submit_queued(
    state: &AppState,
    auth: &AuthUser,
    body: &CreateSubmissionRequest,
    credit_type: &CreditType,
    queued: i64,
) -> Result<(StatusCode, Json<SubmissionResponse>), ApiError> {
    if queued >= MAX_QUEUED_SUBMISSIONS {
        return Err(ApiError::QueueCapacityReached {
            queued,
            max: MAX_QUEUED_SUBMISSIONS,
        });
    }

    let record = build_record(auth, body, SubmissionStatus::Queued);
    state.store.insert_submission(&record).await?;

    tracing::info!(
        user_id = %auth.user_id,
        submission_id = %record.id,
        credit_type = %credit_type,
        queued = %(queued + 1),
        "Credits exhausted; submission queued without charge"
    );

    Ok(respond(StatusCode::CREATED, &record, false, Some(0)))
}

/// Best-effort compensation: the consumption already committed, so try to
/// put the credit back. A refund failure is logged and swallowed; the
/// original write failure is what the caller sees.
async fn refund_consumed_credit(store: &dyn LedgerStore, user_id: &UserId, credit_type: &CreditType) {
    match store.refund_credit(user_id, credit_type).await {
        Ok(balance) => {
            tracing::info!(
                user_id = %user_id,
                credit_type = %credit_type,
                balance = %balance,
                "Credit refunded after failed submission write"
            );
        }
        Err(refund_err) => {
            tracing::error!(
                user_id = %user_id,
                credit_type = %credit_type,
                error = %refund_err,
                "Refund failed; one credit lost until manual reconciliation"
            );
        }
    }
}

fn build_record(
    auth: &AuthUser,
    body: &CreateSubmissionRequest,
    status: SubmissionStatus,
) -> SubmissionRecord {
    SubmissionRecord::new(
        auth.user_id,
        body.submission_type,
        status,
        body.title.trim().to_string(),
        body.decklist_url.clone(),
        body.notes.clone(),
    )
}

fn respond(
    status: StatusCode,
    record: &SubmissionRecord,
    credit_charged: bool,
    remaining_credits: Option<i64>,
) -> (StatusCode, Json<SubmissionResponse>) {
    (
        status,
        Json(SubmissionResponse {
            id: record.id.to_string(),
            status: record.status,
            submission_type: record.submission_type,
            credit_charged,
            remaining_credits,
        }),
    )
}

// ============================================================================
// Listing
// ============================================================================

/// Query parameters for submission listings.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Maximum records to return (default 50, capped at 200).
    pub limit: Option<i64>,
    /// Records to skip.
    pub offset: Option<i64>,
}

/// Submission listing response.
#[derive(Debug, Serialize)]
pub struct ListSubmissionsResponse {
    /// The caller's submissions, newest first.
    pub submissions: Vec<SubmissionRecord>,
}

/// List the caller's own submissions, newest first.
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<ListSubmissionsResponse>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let offset = params.offset.unwrap_or(0).max(0);

    let submissions = state
        .store
        .list_submissions_by_user(&auth.user_id, limit, offset)
        .await?;

    Ok(Json(ListSubmissionsResponse { submissions }))
}
