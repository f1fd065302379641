//! Eligibility facade integration tests.

mod common;

use common::TestHarness;
use serde_json::json;

use deckvault_core::Role;

async fn get_eligibility(harness: &TestHarness) -> serde_json::Value {
    let response = harness
        .server
        .get("/v1/credits/eligibility")
        .add_header("authorization", harness.auth_header())
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn eligibility_creates_and_fills_the_ledger() {
    let harness = TestHarness::with_member("Wizard", Role::Member);

    let body = get_eligibility(&harness).await;

    assert_eq!(body["tier"], "Wizard");
    assert_eq!(body["balances"]["deck"], 2);
    assert_eq!(body["balances"]["roast"], 1);
    assert_eq!(body["eligibility"]["deck"], true);
    assert_eq!(body["eligibility"]["roast"], true);
    assert_eq!(body["monthly_allocation"]["deck"], 2);
    assert_eq!(body["monthly_allocation"]["roast"], 1);
}

#[tokio::test]
async fn repeated_views_do_not_double_grant() {
    let harness = TestHarness::with_member("Duke", Role::Member);

    let first = get_eligibility(&harness).await;
    let second = get_eligibility(&harness).await;

    assert_eq!(first["balances"]["deck"], 1);
    assert_eq!(second["balances"]["deck"], 1);
}

#[tokio::test]
async fn eligibility_reflects_consumption() {
    let harness = TestHarness::with_member("Wizard", Role::Member);

    harness
        .server
        .post("/v1/submissions")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "submission_type": "deck",
            "title": "Atraxa, Praetors' Voice"
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let body = get_eligibility(&harness).await;
    assert_eq!(body["balances"]["deck"], 1);
    assert_eq!(body["balances"]["roast"], 1);
    assert_eq!(body["eligibility"]["deck"], true);
}

#[tokio::test]
async fn unknown_tier_shows_zero_everything() {
    let harness = TestHarness::with_member("FoilCollector", Role::Member);

    let body = get_eligibility(&harness).await;

    assert_eq!(body["balances"]["deck"], 0);
    assert_eq!(body["eligibility"]["deck"], false);
    assert_eq!(body["monthly_allocation"]["deck"], 0);
}

#[tokio::test]
async fn eligibility_requires_a_session() {
    let harness = TestHarness::with_member("Wizard", Role::Member);

    let response = harness.server.get("/v1/credits/eligibility").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn eligibility_without_profile_is_unprocessable() {
    let harness = TestHarness::with_session_only();

    let response = harness
        .server
        .get("/v1/credits/eligibility")
        .add_header("authorization", harness.auth_header())
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
}
