use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Change notifications broadcast by the store to its listeners.
///
/// The set is closed: display components react to exactly these three kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    /// A deposit was accepted on the given calendar day (month is 1-based).
    Deposit {
        day: u32,
        month: u32,
        year: i32,
        amount: u64,
    },
    /// The active wishlist changed or its savings were reset;
    /// cached day logs must be dropped.
    Reset,
    /// A different wishlist is now current; per-day gating must be re-derived.
    SelectionChanged,
}

impl Notification {
    pub fn deposit(date: NaiveDate, amount: u64) -> Self {
        Notification::Deposit {
            day: date.day(),
            month: date.month(),
            year: date.year(),
            amount,
        }
    }

    /// Date carried by a deposit notification.
    #[must_use]
    pub fn deposit_date(&self) -> Option<NaiveDate> {
        match *self {
            Notification::Deposit {
                day, month, year, ..
            } => NaiveDate::from_ymd_opt(year, month, day),
            _ => None,
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::Deposit {
                day,
                month,
                year,
                amount,
            } => write!(f, "Deposit({amount} on {year}-{month:02}-{day:02})"),
            Notification::Reset => write!(f, "Reset"),
            Notification::SelectionChanged => write!(f, "SelectionChanged"),
        }
    }
}
