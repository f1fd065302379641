//! Application state.

use std::sync::Arc;

use deckvault_store::LedgerStore;

use crate::config::ServiceConfig;
use crate::membership::MembershipDirectory;

/// Application state shared across handlers.
///
/// The store and membership directory are trait objects injected at
/// construction: production wires the PostgreSQL store and the HTTP
/// membership client, tests wire the in-memory store and a static
/// directory.
#[derive(Clone)]
pub struct AppState {
    /// The ledger/submission storage backend.
    pub store: Arc<dyn LedgerStore>,

    /// The membership identity upstream.
    pub members: Arc<dyn MembershipDirectory>,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(
        store: Arc<dyn LedgerStore>,
        members: Arc<dyn MembershipDirectory>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            members,
            config,
        }
    }
}
