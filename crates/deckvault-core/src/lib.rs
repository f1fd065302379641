//! Core types and credit rules for DeckVault.
//!
//! This crate provides the foundational types used throughout the DeckVault
//! credit subsystem:
//!
//! - **Identifiers**: `UserId`, `SubmissionId`
//! - **Tiers**: `MembershipTier` and the static tier catalog
//! - **Credits**: `CreditType`, `CreditLedger`, `MonthKey`
//! - **Submissions**: `SubmissionRecord`, `SubmissionStatus`, `SubmissionType`
//! - **Policy**: the queue admission decision table
//!
//! # Credit model
//!
//! Each membership tier grants a monthly allowance of credits per credit
//! type (deck, roast). A credit is consumed when a submission is accepted
//! as `pending`; exhausted users may still queue a bounded number of
//! requests without being charged.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod credits;
pub mod eligibility;
pub mod ids;
pub mod policy;
pub mod role;
pub mod submission;
pub mod tier;

pub use credits::{CreditLedger, CreditType, MonthKey};
pub use eligibility::EligibilitySnapshot;
pub use ids::{IdError, SubmissionId, UserId};
pub use policy::{admit_submission, SubmissionAdmission, MAX_QUEUED_SUBMISSIONS};
pub use role::Role;
pub use submission::{SubmissionRecord, SubmissionStatus, SubmissionType};
pub use tier::{allocation_for, tier_by_name, MembershipTier, TIER_CATALOG};
