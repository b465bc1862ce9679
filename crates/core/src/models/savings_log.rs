use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-deposit history line shown in the checklist.
///
/// Informational only: the authoritative total is `WishlistRecord::saved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub amount: u64,
    pub note: String,
    pub completed: bool,
}

impl SavingsLogEntry {
    pub fn new(timestamp: DateTime<Utc>, amount: u64, note: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            amount,
            note: note.into(),
            completed: true,
        }
    }
}

/// Amount saved on one calendar day (month is 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDay {
    pub day: u32,
    pub month: u32,
    pub year: i32,
    pub amount: u64,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, amount: u64) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
            amount,
        }
    }

    /// The day as a date, or `None` if the stored triple is not a real date.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    #[must_use]
    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.day == date.day() && self.month == date.month() && self.year == date.year()
    }
}
