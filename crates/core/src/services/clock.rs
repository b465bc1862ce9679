use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now" for timestamps and the calendar day of a deposit.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Calendar day in the user's local time zone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }
}

/// Wall-clock time of the machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a given instant. Handy for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
