//! Shared test harness: in-memory store, static membership directory.

#![allow(dead_code)] // Not every test binary uses every helper.

use std::sync::Arc;

use axum_test::TestServer;

use deckvault_core::{Role, UserId};
use deckvault_service::{create_router, AppState, ServiceConfig, StaticMembershipDirectory};
use deckvault_store::{LedgerStore, MemoryLedgerStore};

/// A running test server with direct access to the backing store.
pub struct TestHarness {
    /// The in-process test server.
    pub server: TestServer,
    /// The backing store, for direct assertions and failure injection.
    pub store: Arc<MemoryLedgerStore>,
    /// The registered test user.
    pub user_id: UserId,
    /// The test user's session token.
    pub token: String,
}

impl TestHarness {
    /// A harness with one registered member on the given tier and role.
    pub fn with_member(tier: &str, role: Role) -> Self {
        let user_id = UserId::generate();
        let token = format!("tok_{user_id}");
        let directory = StaticMembershipDirectory::new().with_member(
            &token,
            user_id,
            "member@defcat.example",
            tier,
            role,
        );
        Self::build(user_id, token, directory)
    }

    /// A harness whose user has a valid session but no membership profile.
    pub fn with_session_only() -> Self {
        let user_id = UserId::generate();
        let token = format!("tok_{user_id}");
        let directory = StaticMembershipDirectory::new().with_session_only(
            &token,
            user_id,
            "ghost@defcat.example",
        );
        Self::build(user_id, token, directory)
    }

    fn build(user_id: UserId, token: String, directory: StaticMembershipDirectory) -> Self {
        let store = Arc::new(MemoryLedgerStore::new());
        let state = AppState::new(
            Arc::clone(&store) as Arc<dyn LedgerStore>,
            Arc::new(directory),
            ServiceConfig::for_tests(),
        );
        let server = TestServer::new(create_router(state)).unwrap();

        Self {
            server,
            store,
            user_id,
            token,
        }
    }

    /// The `Authorization` header value for the test user.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}
