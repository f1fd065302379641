//! The membership identity port.
//!
//! DeckVault does not own identity: a membership upstream (the Patreon-tier
//! provider) resolves session tokens to users and users to a tier/role
//! profile. Handlers depend on the [`MembershipDirectory`] trait, injected
//! through application state, so the HTTP client below is swappable for a
//! static directory in tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use deckvault_core::{Role, UserId};

/// Timeout for membership upstream requests.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// An authenticated session as reported by the membership upstream.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// The user id.
    pub user_id: UserId,
    /// The user's email address.
    pub email: String,
}

/// A user's membership profile: tier label and site role.
#[derive(Debug, Clone)]
pub struct MemberProfile {
    /// Membership tier name, as the upstream labels it. Unknown labels are
    /// legal and simply carry zero credit allocations.
    pub tier: String,
    /// Site role.
    pub role: Role,
    /// The user's email address.
    pub email: String,
}

/// Errors from the membership directory.
#[derive(Debug, thiserror::Error)]
pub enum MembershipError {
    /// The session token is missing, expired, or invalid.
    #[error("unauthorized")]
    Unauthorized,

    /// The user exists but no tier/role profile is on record.
    #[error("profile unavailable: {0}")]
    ProfileUnavailable(String),

    /// The upstream call itself failed.
    #[error("membership upstream error: {0}")]
    Upstream(String),
}

/// Resolves sessions and membership profiles.
#[async_trait]
pub trait MembershipDirectory: Send + Sync {
    /// Resolve a session bearer token to the current user.
    ///
    /// # Errors
    ///
    /// `MembershipError::Unauthorized` for unknown or expired tokens.
    async fn session(&self, token: &str) -> Result<SessionUser, MembershipError>;

    /// Look up a user's tier/role profile.
    ///
    /// # Errors
    ///
    /// `MembershipError::ProfileUnavailable` when the user has no profile.
    async fn profile(&self, user_id: &UserId) -> Result<MemberProfile, MembershipError>;
}

// ============================================================================
// HTTP implementation (production)
// ============================================================================

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user_id: UserId,
    email: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    tier: String,
    role: Role,
    email: String,
}

/// Membership directory backed by the membership HTTP API.
pub struct HttpMembershipDirectory {
    client: reqwest::Client,
    base_url: String,
    service_key: Option<String>,
}

impl HttpMembershipDirectory {
    /// Create a client against the membership API at `base_url`.
    ///
    /// `service_key` authenticates profile lookups (server-to-server);
    /// session lookups are authenticated by the member's own token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, service_key: Option<String>) -> Result<Self, MembershipError> {
        let client = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .map_err(|e| MembershipError::Upstream(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
        })
    }
}

#[async_trait]
impl MembershipDirectory for HttpMembershipDirectory {
    async fn session(&self, token: &str) -> Result<SessionUser, MembershipError> {
        let response = self
            .client
            .get(format!("{}/v1/session", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| MembershipError::Upstream(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body: SessionResponse = response
                    .json()
                    .await
                    .map_err(|e| MembershipError::Upstream(e.to_string()))?;
                Ok(SessionUser {
                    user_id: body.user_id,
                    email: body.email,
                })
            }
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Err(MembershipError::Unauthorized)
            }
            status => Err(MembershipError::Upstream(format!(
                "session lookup returned {status}"
            ))),
        }
    }

    async fn profile(&self, user_id: &UserId) -> Result<MemberProfile, MembershipError> {
        let mut request = self
            .client
            .get(format!("{}/v1/members/{user_id}", self.base_url));

        if let Some(key) = &self.service_key {
            request = request.header("x-service-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MembershipError::Upstream(e.to_string()))?;

        match response.status() {
            status if status.is_success() => {
                let body: ProfileResponse = response
                    .json()
                    .await
                    .map_err(|e| MembershipError::Upstream(e.to_string()))?;
                Ok(MemberProfile {
                    tier: body.tier,
                    role: body.role,
                    email: body.email,
                })
            }
            reqwest::StatusCode::NOT_FOUND => Err(MembershipError::ProfileUnavailable(format!(
                "no membership profile for {user_id}"
            ))),
            status => Err(MembershipError::Upstream(format!(
                "profile lookup returned {status}"
            ))),
        }
    }
}

// ============================================================================
// Static implementation (tests)
// ============================================================================

/// Fixed-map membership directory for tests.
#[derive(Default)]
pub struct StaticMembershipDirectory {
    sessions: HashMap<String, SessionUser>,
    profiles: HashMap<UserId, MemberProfile>,
}

impl StaticMembershipDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a member with a session token and a profile.
    #[must_use]
    pub fn with_member(
        mut self,
        token: &str,
        user_id: UserId,
        email: &str,
        tier: &str,
        role: Role,
    ) -> Self {
        self.sessions.insert(
            token.to_string(),
            SessionUser {
                user_id,
                email: email.to_string(),
            },
        );
        self.profiles.insert(
            user_id,
            MemberProfile {
                tier: tier.to_string(),
                role,
                email: email.to_string(),
            },
        );
        self
    }

    /// Register a session with no profile behind it.
    #[must_use]
    pub fn with_session_only(mut self, token: &str, user_id: UserId, email: &str) -> Self {
        self.sessions.insert(
            token.to_string(),
            SessionUser {
                user_id,
                email: email.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl MembershipDirectory for StaticMembershipDirectory {
    async fn session(&self, token: &str) -> Result<SessionUser, MembershipError> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or(MembershipError::Unauthorized)
    }

    async fn profile(&self, user_id: &UserId) -> Result<MemberProfile, MembershipError> {
        self.profiles.get(user_id).cloned().ok_or_else(|| {
            MembershipError::ProfileUnavailable(format!("no membership profile for {user_id}"))
        })
    }
}
