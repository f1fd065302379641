//! Submission queue admission policy.
//!
//! When a member's credit balance is exhausted, a new request may still be
//! accepted into a bounded personal queue instead of being rejected
//! outright. The decision table:
//!
//! | balance | queued < max | outcome |
//! |---------|--------------|---------|
//! | > 0     | any          | consume a credit, submit as `pending` |
//! | 0       | yes          | no charge, submit as `queued` |
//! | 0       | no           | reject: at queue capacity |

/// Maximum number of a user's submissions that may sit in `queued` status.
pub const MAX_QUEUED_SUBMISSIONS: i64 = 3;

/// Outcome of the queue admission check for a new submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionAdmission {
    /// Balance available: consume one credit and submit as `pending`.
    ConsumeCredit,
    /// Balance exhausted but queue has room: submit as `queued`, no charge.
    Queue,
    /// Balance exhausted and the personal queue is full: reject.
    AtCapacity,
}

/// Decide how a new submission is admitted.
///
/// `credit_balance` is the post-refresh, pre-consumption balance;
/// `queued_count` is how many of the user's submissions currently sit in
/// `queued` status.
#[must_use]
pub fn admit_submission(
    credit_balance: i64,
    queued_count: i64,
    max_queued: i64,
) -> SubmissionAdmission {
    if credit_balance > 0 {
        SubmissionAdmission::ConsumeCredit
    } else if queued_count < max_queued {
        SubmissionAdmission::Queue
    } else {
        SubmissionAdmission::AtCapacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_balance_consumes() {
        assert_eq!(
            admit_submission(1, MAX_QUEUED_SUBMISSIONS, MAX_QUEUED_SUBMISSIONS),
            SubmissionAdmission::ConsumeCredit
        );
        assert_eq!(admit_submission(5, 0, 3), SubmissionAdmission::ConsumeCredit);
    }

    #[test]
    fn exhausted_balance_queues_below_capacity() {
        assert_eq!(admit_submission(0, 0, 3), SubmissionAdmission::Queue);
        assert_eq!(admit_submission(0, 2, 3), SubmissionAdmission::Queue);
    }

    #[test]
    fn exhausted_balance_rejects_at_capacity() {
        assert_eq!(admit_submission(0, 3, 3), SubmissionAdmission::AtCapacity);
        assert_eq!(admit_submission(0, 4, 3), SubmissionAdmission::AtCapacity);
    }
}
