//! Deck and roast submission records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CreditType, SubmissionId, UserId};

/// What kind of work a submission requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionType {
    /// A full Commander deck build.
    Deck,
    /// A roast (critique) of an existing list.
    Roast,
}

impl SubmissionType {
    /// The credit pool this submission type draws from.
    #[must_use]
    pub fn credit_type(self) -> CreditType {
        match self {
            Self::Deck => CreditType::Deck,
            Self::Roast => CreditType::Roast,
        }
    }

    /// Canonical string label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deck => "deck",
            Self::Roast => "roast",
        }
    }
}

/// Lifecycle status of a submission.
///
/// Creating a `pending` submission requires a consumed credit; `draft`
/// and `queued` bypass consumption (`queued` because the balance was
/// already known to be exhausted when it was accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    /// Saved but not yet submitted; no credit charged.
    Draft,
    /// Submitted and awaiting review; one credit consumed.
    Pending,
    /// Accepted without a credit into the personal queue.
    Queued,
    /// Being worked on.
    InProgress,
    /// Finished and published.
    Completed,
    /// Declined by an admin.
    Rejected,
}

impl SubmissionStatus {
    /// Canonical string label (matches the persisted column values).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

/// A deck or roast request as stored in `deck_submissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Unique submission id.
    pub id: SubmissionId,

    /// The requesting user.
    pub user_id: UserId,

    /// Deck build or roast.
    pub submission_type: SubmissionType,

    /// Current lifecycle status.
    pub status: SubmissionStatus,

    /// Short title, e.g. the commander name.
    pub title: String,

    /// Link to an existing decklist (required for roasts).
    pub decklist_url: Option<String>,

    /// Free-form notes from the requester.
    pub notes: Option<String>,

    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Build a new record with a fresh id and the current timestamp.
    #[must_use]
    pub fn new(
        user_id: UserId,
        submission_type: SubmissionType,
        status: SubmissionStatus,
        title: String,
        decklist_url: Option<String>,
        notes: Option<String>,
    ) -> Self {
        Self {
            id: SubmissionId::generate(),
            user_id,
            submission_type,
            status,
            title,
            decklist_url,
            notes,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_type_maps_to_credit_pool() {
        assert_eq!(SubmissionType::Deck.credit_type(), CreditType::Deck);
        assert_eq!(SubmissionType::Roast.credit_type(), CreditType::Roast);
    }

    #[test]
    fn status_labels_are_stable() {
        assert_eq!(SubmissionStatus::Pending.as_str(), "pending");
        assert_eq!(SubmissionStatus::InProgress.as_str(), "in_progress");

        let json = serde_json::to_string(&SubmissionStatus::Queued).unwrap();
        assert_eq!(json, "\"queued\"");
    }
}
