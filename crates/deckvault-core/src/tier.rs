//! The static membership tier catalog.
//!
//! Tiers mirror the Patreon membership levels. Each tier carries a rank
//! (used elsewhere for access gating) and a monthly credit allowance per
//! credit type. Lookups are fail-safe: an unknown tier or credit type
//! yields a zero allocation, never an error.

use crate::CreditType;

/// A membership tier: name, rank, and monthly credit allowances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MembershipTier {
    /// Tier name as reported by the membership provider.
    pub name: &'static str,

    /// Ordinal rank; tiers are totally ordered by this.
    pub rank: u8,

    /// Deck credits granted per month.
    pub deck_credits: i64,

    /// Roast credits granted per month.
    pub roast_credits: i64,
}

impl MembershipTier {
    /// Monthly allocation for a credit type. Unknown types get zero.
    #[must_use]
    pub fn allocation(&self, credit_type: &CreditType) -> i64 {
        match credit_type {
            CreditType::Deck => self.deck_credits,
            CreditType::Roast => self.roast_credits,
            CreditType::Other(_) => 0,
        }
    }
}

/// All tiers in ascending rank order.
pub const TIER_CATALOG: [MembershipTier; 6] = [
    MembershipTier {
        name: "Citizen",
        rank: 0,
        deck_credits: 0,
        roast_credits: 0,
    },
    MembershipTier {
        name: "Squire",
        rank: 1,
        deck_credits: 0,
        roast_credits: 0,
    },
    MembershipTier {
        name: "Knight",
        rank: 2,
        deck_credits: 1,
        roast_credits: 0,
    },
    MembershipTier {
        name: "Duke",
        rank: 3,
        deck_credits: 1,
        roast_credits: 1,
    },
    MembershipTier {
        name: "Wizard",
        rank: 4,
        deck_credits: 2,
        roast_credits: 1,
    },
    MembershipTier {
        name: "Archmage",
        rank: 5,
        deck_credits: 3,
        roast_credits: 2,
    },
];

/// Look up a tier by the name the membership provider reports.
///
/// Matching ignores ASCII case so provider-side label tweaks do not lock
/// members out of their credits.
#[must_use]
pub fn tier_by_name(name: &str) -> Option<&'static MembershipTier> {
    let name = name.trim();
    TIER_CATALOG
        .iter()
        .find(|tier| tier.name.eq_ignore_ascii_case(name))
}

/// Monthly allocation for `(tier, credit type)`. Unknown tiers or credit
/// types yield zero.
#[must_use]
pub fn allocation_for(tier_name: &str, credit_type: &CreditType) -> i64 {
    tier_by_name(tier_name).map_or(0, |tier| tier.allocation(credit_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_is_rank_ordered() {
        for window in TIER_CATALOG.windows(2) {
            assert!(window[0].rank < window[1].rank);
        }
    }

    #[test]
    fn known_tier_allocations() {
        assert_eq!(allocation_for("Duke", &CreditType::Deck), 1);
        assert_eq!(allocation_for("Wizard", &CreditType::Deck), 2);
        assert_eq!(allocation_for("Wizard", &CreditType::Roast), 1);
        assert_eq!(allocation_for("Citizen", &CreditType::Deck), 0);
    }

    #[test]
    fn unknown_tier_never_errors() {
        assert_eq!(allocation_for("NotARealTier", &CreditType::Deck), 0);
        assert_eq!(
            allocation_for("Duke", &CreditType::Other("proxy".into())),
            0
        );
    }

    #[test]
    fn lookup_ignores_case_and_whitespace() {
        assert_eq!(tier_by_name(" duke ").map(|t| t.rank), Some(3));
        assert_eq!(tier_by_name("ARCHMAGE").map(|t| t.deck_credits), Some(3));
    }
}
