use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of "now" and of the calendar date that "Hoy" labels refer to
///
/// Harvesting reads the clock twice per candidate: once for the date a
/// relative label is anchored to, once for the age comparison.
pub trait Clock: Send + Sync {
    /// Current instant
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used to anchor "today" labels
    fn today(&self) -> NaiveDate;
}

/// Host clock; the date is the host's local calendar date
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen at one instant, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self { now, today }
    }

    /// Frozen at `now`, with the UTC date of `now` as "today"
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now,
            today: now.date_naive(),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
