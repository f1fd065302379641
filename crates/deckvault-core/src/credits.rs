//! Credit types, month keys, and the per-user credit ledger.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A credit pool identifier.
///
/// The two pools DeckVault charges today are `deck` and `roast`; unknown
/// labels round-trip through serialization intact and simply carry a zero
/// allocation everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CreditType {
    /// A full deck build request.
    Deck,
    /// A deck roast (critique) request.
    Roast,
    /// Any credit type this build does not know about.
    Other(String),
}

impl CreditType {
    /// The credit types with catalog-defined allocations.
    #[must_use]
    pub fn known() -> [Self; 2] {
        [Self::Deck, Self::Roast]
    }

    /// The canonical string label for this credit type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Deck => "deck",
            Self::Roast => "roast",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for CreditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for CreditType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "deck" => Self::Deck,
            "roast" => Self::Roast,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for CreditType {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<CreditType> for String {
    fn from(value: CreditType) -> Self {
        value.as_str().to_string()
    }
}

/// A calendar month marker, pinned to the first day of the month.
///
/// Month keys order chronologically and serialize as `yyyy-mm-01`, the
/// shape stored in the `last_granted` column. Refresh callers supply the
/// current month key explicitly so grant logic stays testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    /// The month key containing the given date.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// The month key for the current UTC date.
    #[must_use]
    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    /// The first day of the month as a date.
    #[must_use]
    pub const fn as_date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for MonthKey {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::of(NaiveDate::parse_from_str(s, "%Y-%m-%d")?))
    }
}

/// Per-user credit bookkeeping.
///
/// One row per user, created lazily the first time a refresh or consumption
/// touches them. Balances never go negative, and `last_granted` for a
/// credit type never moves backward once stamped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditLedger {
    /// The owning user.
    pub user_id: UserId,

    /// Current usable credit count per credit type.
    pub balances: HashMap<CreditType, i64>,

    /// Last calendar month for which the monthly allocation was applied,
    /// per credit type.
    pub last_granted: HashMap<CreditType, MonthKey>,

    /// When the ledger was last written.
    pub updated_at: DateTime<Utc>,
}

impl CreditLedger {
    /// An empty ledger for a user with no persisted row: all balances zero,
    /// no grant markers.
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            balances: HashMap::new(),
            last_granted: HashMap::new(),
            updated_at: Utc::now(),
        }
    }

    /// Current balance for a credit type (zero when absent).
    #[must_use]
    pub fn balance(&self, credit_type: &CreditType) -> i64 {
        self.balances.get(credit_type).copied().unwrap_or(0)
    }

    /// Whether the monthly grant for `month` has not yet been applied for
    /// this credit type.
    #[must_use]
    pub fn needs_refresh(&self, credit_type: &CreditType, month: MonthKey) -> bool {
        match self.last_granted.get(credit_type) {
            Some(granted) => *granted < month,
            None => true,
        }
    }
}
