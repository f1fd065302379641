//! Submission flow integration tests: the credit gate, queue policy, and
//! refund compensation.

mod common;

use common::TestHarness;
use serde_json::json;

use deckvault_core::{CreditType, Role};
use deckvault_store::LedgerStore;

async fn submit_deck(harness: &TestHarness, title: &str) -> axum_test::TestResponse {
    harness
        .server
        .post("/v1/submissions")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "submission_type": "deck",
            "title": title
        }))
        .await
}

// ============================================================================
// End-to-end credit gate
// ============================================================================

#[tokio::test]
async fn wizard_deck_submissions_end_to_end() {
    // Wizard allocation: deck = 2. First two submissions consume, the
    // third queues without charge.
    let harness = TestHarness::with_member("Wizard", Role::Member);

    let first = submit_deck(&harness, "Atraxa, Praetors' Voice").await;
    first.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = first.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["credit_charged"], true);
    assert_eq!(body["remaining_credits"], 1);

    let second = submit_deck(&harness, "Muldrotha, the Gravetide").await;
    let body: serde_json::Value = second.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["remaining_credits"], 0);

    let third = submit_deck(&harness, "Krenko, Mob Boss").await;
    third.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = third.json();
    assert_eq!(body["status"], "queued");
    assert_eq!(body["credit_charged"], false);

    // Ledger was created lazily and drained to zero.
    let ledger = harness
        .store
        .get_ledger(&harness.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.balance(&CreditType::Deck), 0);
}

#[tokio::test]
async fn credit_pools_are_independent() {
    // Wizard allocation: deck = 2, roast = 1.
    let harness = TestHarness::with_member("Wizard", Role::Member);

    let roast = harness
        .server
        .post("/v1/submissions")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "submission_type": "roast",
            "title": "Roast my Gitrog pile",
            "decklist_url": "https://decks.defcat.example/gitrog"
        }))
        .await;
    let body: serde_json::Value = roast.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["remaining_credits"], 0);

    // The roast pool is empty, but deck submissions still consume.
    let deck = submit_deck(&harness, "The Gitrog Monster").await;
    let body: serde_json::Value = deck.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["credit_charged"], true);
}

// ============================================================================
// Queue policy
// ============================================================================

#[tokio::test]
async fn exhausted_member_queues_up_to_capacity() {
    // Citizen allocation: deck = 0, so every submission hits the queue.
    let harness = TestHarness::with_member("Citizen", Role::Member);

    for i in 0..3 {
        let response = submit_deck(&harness, &format!("Budget brew {i}")).await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "queued");
        assert_eq!(body["credit_charged"], false);
    }

    // Fourth request: queue full.
    let rejected = submit_deck(&harness, "One brew too many").await;
    rejected.assert_status(axum::http::StatusCode::TOO_MANY_REQUESTS);
    let body: serde_json::Value = rejected.json();
    assert_eq!(body["error"]["code"], "queue_capacity_reached");
    assert_eq!(body["error"]["details"]["queued"], 3);
    assert_eq!(body["error"]["details"]["max"], 3);
}

#[tokio::test]
async fn unknown_tier_gets_zero_allocation_not_an_error() {
    let harness = TestHarness::with_member("NotARealTier", Role::Member);

    let response = submit_deck(&harness, "Mystery tier brew").await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "queued");
}

// ============================================================================
// Bypasses
// ============================================================================

#[tokio::test]
async fn draft_skips_the_credit_gate() {
    let harness = TestHarness::with_member("Citizen", Role::Member);

    let response = harness
        .server
        .post("/v1/submissions")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "submission_type": "deck",
            "draft": true,
            "title": "Half-finished Sliver list"
        }))
        .await;

    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "draft");
    assert_eq!(body["credit_charged"], false);

    // The gate never ran: no ledger row was created.
    assert!(harness
        .store
        .get_ledger(&harness.user_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn moderator_submits_without_charge() {
    let harness = TestHarness::with_member("Citizen", Role::Moderator);

    let response = submit_deck(&harness, "Staff showcase deck").await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["credit_charged"], false);

    assert!(harness
        .store
        .get_ledger(&harness.user_id)
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// Refund compensation
// ============================================================================

#[tokio::test]
async fn failed_write_after_consumption_refunds_the_credit() {
    // Duke allocation: deck = 1.
    let harness = TestHarness::with_member("Duke", Role::Member);

    harness.store.fail_submission_inserts(true);
    let response = submit_deck(&harness, "Doomed submission").await;
    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);

    harness.store.fail_submission_inserts(false);

    // The consumed credit came back; the next submission succeeds.
    let ledger = harness
        .store
        .get_ledger(&harness.user_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ledger.balance(&CreditType::Deck), 1);

    let retry = submit_deck(&harness, "Second attempt").await;
    let body: serde_json::Value = retry.json();
    assert_eq!(body["status"], "pending");
    assert_eq!(body["remaining_credits"], 0);
}

// ============================================================================
// Auth and validation
// ============================================================================

#[tokio::test]
async fn submission_without_session_is_unauthorized() {
    let harness = TestHarness::with_member("Wizard", Role::Member);

    let response = harness
        .server
        .post("/v1/submissions")
        .json(&json!({
            "submission_type": "deck",
            "title": "No session"
        }))
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn missing_profile_is_surfaced_distinctly() {
    let harness = TestHarness::with_session_only();

    let response = submit_deck(&harness, "Ghost brew").await;
    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "profile_unavailable");
}

#[tokio::test]
async fn roast_without_decklist_is_rejected() {
    let harness = TestHarness::with_member("Wizard", Role::Member);

    let response = harness
        .server
        .post("/v1/submissions")
        .add_header("authorization", harness.auth_header())
        .json(&json!({
            "submission_type": "roast",
            "title": "Roast with nothing to roast"
        }))
        .await;

    response.assert_status_bad_request();
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn listing_returns_own_submissions_newest_first() {
    let harness = TestHarness::with_member("Wizard", Role::Member);

    submit_deck(&harness, "First")
        .await
        .assert_status(axum::http::StatusCode::CREATED);
    submit_deck(&harness, "Second")
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = harness
        .server
        .get("/v1/submissions")
        .add_header("authorization", harness.auth_header())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let submissions = body["submissions"].as_array().unwrap();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0]["title"], "Second");
    assert_eq!(submissions[1]["title"], "First");
}
