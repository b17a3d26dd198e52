//! Time normalization for forum labels
//!
//! The forum prints post times as wall-clock `HH:MM` in its own timezone,
//! relative to "today". This module anchors those times to a calendar date,
//! converts them to UTC, renders them in the item timestamp format, and
//! decides whether they fall inside the max-age window.

mod clock;
mod zone;

pub use clock::{Clock, FixedClock, SystemClock};
pub use zone::SourceZone;

use crate::ScrapeError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Layout of [`crate::Item::created_at`]
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.00Z";

static HHMM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}:\d{2}$").expect("valid HH:MM regex"));

/// Parses a strict two-digit `HH:MM` label
///
/// Returns `None` for anything else, including well-shaped but impossible
/// times such as `25:10`.
pub fn parse_hhmm(label: &str) -> Option<NaiveTime> {
    if !HHMM.is_match(label) {
        return None;
    }
    let hours = label[..2].parse().ok()?;
    let minutes = label[3..].parse().ok()?;
    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Converts an `HH:MM` label on `today` in `zone` to an absolute UTC instant
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use forocoches_feed::timestamp::{format_created_at, to_utc, SourceZone};
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
/// let utc = to_utc("14:30", today, SourceZone::utc_plus_one()).unwrap();
/// assert_eq!(format_created_at(&utc), "2024-01-10T13:30:00.00Z");
/// ```
pub fn to_utc(
    hhmm: &str,
    today: NaiveDate,
    zone: SourceZone,
) -> Result<DateTime<Utc>, ScrapeError> {
    let time = parse_hhmm(hhmm).ok_or_else(|| ScrapeError::InvalidTimestamp(hhmm.to_string()))?;
    Ok(zone.to_utc(NaiveDateTime::new(today, time)))
}

/// Renders a UTC instant as `YYYY-MM-DDTHH:MM:SS.00Z`
pub fn format_created_at(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(CREATED_AT_FORMAT).to_string()
}

/// Parses a timestamp previously rendered by [`format_created_at`]
pub fn parse_created_at(created_at: &str) -> Result<DateTime<Utc>, ScrapeError> {
    NaiveDateTime::parse_from_str(created_at, CREATED_AT_FORMAT)
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| ScrapeError::InvalidTimestamp(created_at.to_string()))
}

/// Outcome of comparing a timestamp against the max-age window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeCheck {
    /// `elapsed_seconds <= max_age`
    pub within: bool,

    /// Whole seconds between the timestamp and now; negative for future times
    pub elapsed_seconds: i64,
}

/// Compares `now - timestamp` against `max_age_seconds`
pub fn check_age(
    timestamp: &DateTime<Utc>,
    now: &DateTime<Utc>,
    max_age_seconds: u64,
) -> AgeCheck {
    let elapsed_seconds = (*now - *timestamp).num_seconds();
    let limit = i64::try_from(max_age_seconds).unwrap_or(i64::MAX);
    AgeCheck {
        within: elapsed_seconds <= limit,
        elapsed_seconds,
    }
}

/// String form of [`check_age`], for timestamps already in item format
pub fn is_within_max_age(
    created_at: &str,
    now: &DateTime<Utc>,
    max_age_seconds: u64,
) -> Result<bool, ScrapeError> {
    let timestamp = parse_created_at(created_at)?;
    Ok(check_age(&timestamp, now, max_age_seconds).within)
}

/// Everything needed to place an `HH:MM` label and judge its age
///
/// Captured once per page so every candidate on the page is measured
/// against the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeWindow {
    pub now: DateTime<Utc>,
    pub today: NaiveDate,
    pub zone: SourceZone,
    pub max_age_seconds: u64,
}

impl AgeWindow {
    pub fn from_clock(clock: &dyn Clock, zone: SourceZone, max_age_seconds: u64) -> Self {
        Self {
            now: clock.now(),
            today: clock.today(),
            zone,
            max_age_seconds,
        }
    }

    /// Anchors `hhmm` to today and checks it against the window
    ///
    /// Returns `None` when the label is not a strict `HH:MM` time.
    pub fn place(&self, hhmm: &str) -> Option<(DateTime<Utc>, AgeCheck)> {
        let timestamp = to_utc(hhmm, self.today, self.zone).ok()?;
        let check = check_age(&timestamp, &self.now, self.max_age_seconds);
        Some((timestamp, check))
    }
}
