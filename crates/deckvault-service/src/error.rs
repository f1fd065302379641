//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::membership::MembershipError;

/// API error type.
///
/// "Out of credits" and "queue full" are expected, user-actionable outcomes
/// with their own variants and codes, distinct from storage or upstream
/// failures which surface as retryable errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid session.
    #[error("unauthorized")]
    Unauthorized,

    /// Session resolved but the membership profile (tier/role) is missing.
    #[error("membership profile unavailable: {0}")]
    ProfileUnavailable(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No credits left and the queue policy rejected the request.
    #[error("no {credit_type} credits remaining; your allowance refreshes next month")]
    InsufficientCredits {
        /// The exhausted credit pool.
        credit_type: String,
    },

    /// The personal submission queue is already full.
    #[error("submission queue at capacity ({queued} of {max}); wait for queued requests to start")]
    QueueCapacityReached {
        /// Currently queued submissions.
        queued: i64,
        /// The queue cap.
        max: i64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Membership upstream error.
    #[error("membership service error: {0}")]
    Upstream(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::ProfileUnavailable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "profile_unavailable",
                msg.clone(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::InsufficientCredits { credit_type } => (
                StatusCode::TOO_MANY_REQUESTS,
                "insufficient_credits",
                self.to_string(),
                Some(serde_json::json!({ "credit_type": credit_type })),
            ),
            Self::QueueCapacityReached { queued, max } => (
                StatusCode::TOO_MANY_REQUESTS,
                "queue_capacity_reached",
                self.to_string(),
                Some(serde_json::json!({ "queued": queued, "max": max })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::Upstream(msg) => (
                StatusCode::BAD_GATEWAY,
                "membership_upstream_error",
                msg.clone(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<deckvault_store::StoreError> for ApiError {
    fn from(err: deckvault_store::StoreError) -> Self {
        match err {
            deckvault_store::StoreError::NotFound => Self::NotFound("record not found".to_string()),
            deckvault_store::StoreError::InsufficientCredits { credit_type } => {
                Self::InsufficientCredits {
                    credit_type: credit_type.to_string(),
                }
            }
            deckvault_store::StoreError::Database(msg)
            | deckvault_store::StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Unauthorized => Self::Unauthorized,
            MembershipError::ProfileUnavailable(msg) => Self::ProfileUnavailable(msg),
            MembershipError::Upstream(msg) => Self::Upstream(msg),
        }
    }
}
