//! Read-only eligibility projection for the UI layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{allocation_for, CreditLedger, CreditType};

/// Snapshot of a user's credit standing, combining the tier catalog with
/// the ledger. Display-only: the UI never mutates the ledger through this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilitySnapshot {
    /// Current balance per credit type.
    pub balances: HashMap<CreditType, i64>,

    /// Whether the user can submit right now, per credit type
    /// (balance strictly positive).
    pub eligibility: HashMap<CreditType, bool>,

    /// The tier's monthly allotment per credit type.
    pub monthly_allocation: HashMap<CreditType, i64>,
}

impl EligibilitySnapshot {
    /// Project a snapshot from a ledger and the user's current tier.
    ///
    /// Covers every known credit type, so types with no ledger entry show
    /// up as zero balance rather than being omitted.
    #[must_use]
    pub fn project(ledger: &CreditLedger, tier_name: &str) -> Self {
        let mut balances = HashMap::new();
        let mut eligibility = HashMap::new();
        let mut monthly_allocation = HashMap::new();

        for credit_type in CreditType::known() {
            let balance = ledger.balance(&credit_type);
            balances.insert(credit_type.clone(), balance);
            eligibility.insert(credit_type.clone(), balance > 0);
            monthly_allocation.insert(credit_type.clone(), allocation_for(tier_name, &credit_type));
        }

        Self {
            balances,
            eligibility,
            monthly_allocation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserId;

    #[test]
    fn projection_covers_all_known_types() {
        let mut ledger = CreditLedger::empty(UserId::generate());
        ledger.balances.insert(CreditType::Deck, 2);

        let snapshot = EligibilitySnapshot::project(&ledger, "Wizard");

        assert_eq!(snapshot.balances[&CreditType::Deck], 2);
        assert_eq!(snapshot.balances[&CreditType::Roast], 0);
        assert!(snapshot.eligibility[&CreditType::Deck]);
        assert!(!snapshot.eligibility[&CreditType::Roast]);
        assert_eq!(snapshot.monthly_allocation[&CreditType::Deck], 2);
        assert_eq!(snapshot.monthly_allocation[&CreditType::Roast], 1);
    }

    #[test]
    fn unknown_tier_projects_zero_allotments() {
        let ledger = CreditLedger::empty(UserId::generate());
        let snapshot = EligibilitySnapshot::project(&ledger, "NotARealTier");
        assert_eq!(snapshot.monthly_allocation[&CreditType::Deck], 0);
    }
}
