//! Credit eligibility handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use deckvault_core::{allocation_for, CreditLedger, CreditType, EligibilitySnapshot, MonthKey};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Eligibility response for the dashboard.
#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    /// The member's current tier name.
    pub tier: String,

    /// Balances, per-type eligibility flags, and monthly allotments.
    #[serde(flatten)]
    pub snapshot: EligibilitySnapshot,
}

/// Get the caller's credit eligibility snapshot.
///
/// Runs the monthly refresh check for every known credit type first, so the
/// snapshot reflects the current month's grant rather than being one cycle
/// stale.
pub async fn get_eligibility(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<EligibilityResponse>, ApiError> {
    let profile = state.members.profile(&auth.user_id).await?;
    let month = MonthKey::current();

    for credit_type in CreditType::known() {
        let allocation = allocation_for(&profile.tier, &credit_type);
        state
            .store
            .refresh_credits(&auth.user_id, &credit_type, allocation, month)
            .await?;
    }

    let ledger = state
        .store
        .get_ledger(&auth.user_id)
        .await?
        .unwrap_or_else(|| CreditLedger::empty(auth.user_id));

    Ok(Json(EligibilityResponse {
        tier: profile.tier.clone(),
        snapshot: EligibilitySnapshot::project(&ledger, &profile.tier),
    }))
}
