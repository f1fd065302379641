//! DeckVault HTTP API Service.
//!
//! This crate provides the HTTP API for DeckVault's credit and submission
//! subsystem, including:
//!
//! - Submission intake (deck builds and roasts) with the credit gate
//! - Credit eligibility snapshots for the dashboard
//! - The membership identity port (tier and role lookups)
//!
//! # Authentication
//!
//! Callers present a session bearer token; the token is resolved to a user
//! through the injected [`membership::MembershipDirectory`], so tests swap
//! in a static directory instead of a live membership upstream.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Some handlers need async for consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod membership;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use membership::{
    HttpMembershipDirectory, MemberProfile, MembershipDirectory, MembershipError, SessionUser,
    StaticMembershipDirectory,
};
pub use routes::create_router;
pub use state::AppState;
