//! Site roles, as reported by the membership identity provider.

use serde::{Deserialize, Serialize};

/// A user's site role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular member.
    Member,
    /// Can review submissions; not charged credits.
    Moderator,
    /// Full admin console access; not charged credits.
    Admin,
}

impl Role {
    /// Whether submissions from this role skip the credit gate entirely.
    #[must_use]
    pub const fn bypasses_credit_gate(self) -> bool {
        matches!(self, Self::Moderator | Self::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn privileged_roles_bypass_gate() {
        assert!(!Role::Member.bypasses_credit_gate());
        assert!(Role::Moderator.bypasses_credit_gate());
        assert!(Role::Admin.bypasses_credit_gate());
    }
}
