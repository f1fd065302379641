//! Authentication extractor.
//!
//! `AuthUser` resolves the `Authorization: Bearer <token>` header through
//! the injected membership directory. No ledger access happens before this
//! succeeds.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use deckvault_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// An authenticated user extracted from a session bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
    /// The user's email address.
    pub email: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // Extract the Authorization header
            let auth_header = parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            // Extract the Bearer token
            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::Unauthorized)?;

            let session = state.members.session(token).await?;

            Ok(AuthUser {
                user_id: session.user_id,
                email: session.email,
            })
        })
    }
}
