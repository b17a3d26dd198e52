use crate::ConfigError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt;
use std::str::FromStr;

/// The timezone the forum renders its wall-clock times in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceZone {
    /// A constant offset from UTC
    Fixed(FixedOffset),

    /// An IANA zone with its daylight-saving rules (`Europe/Madrid`)
    Named(Tz),
}

impl SourceZone {
    /// UTC+1 with no daylight saving
    pub fn utc_plus_one() -> Self {
        Self::Fixed(FixedOffset::east_opt(3600).unwrap_or(Utc.fix()))
    }

    /// The forum's own zone
    pub fn madrid() -> Self {
        Self::Named(chrono_tz::Europe::Madrid)
    }

    /// Converts a wall-clock time in this zone to UTC
    ///
    /// Local times that fall in the autumn overlap resolve to the earlier
    /// (summer time) instant; times inside the spring gap are read with the
    /// offset in force just before the gap.
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        match self {
            Self::Fixed(offset) => {
                let naive = local - Duration::seconds(offset.local_minus_utc() as i64);
                Utc.from_utc_datetime(&naive)
            }
            Self::Named(tz) => {
                let resolved = tz.from_local_datetime(&local).earliest().or_else(|| {
                    tz.from_local_datetime(&(local - Duration::hours(1)))
                        .earliest()
                        .map(|before_gap| before_gap + Duration::hours(1))
                });
                match resolved {
                    Some(dt) => dt.with_timezone(&Utc),
                    None => Utc.from_utc_datetime(&local),
                }
            }
        }
    }
}

impl FromStr for SourceZone {
    type Err = ConfigError;

    /// Accepts IANA names (`Europe/Madrid`, `CET`), `UTC`, and offsets such as
    /// `+01:00`, `-03`, `+0530`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || ConfigError::InvalidTimezone(s.to_string());

        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::Fixed(Utc.fix()));
        }

        let (sign, rest) = match trimmed.chars().next() {
            Some('+') => (1, &trimmed[1..]),
            Some('-') => (-1, &trimmed[1..]),
            _ => return trimmed.parse::<Tz>().map(Self::Named).map_err(|_| invalid()),
        };

        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) || !(digits.len() == 2 || digits.len() == 4)
        {
            return Err(invalid());
        }

        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = if digits.len() == 4 {
            digits[2..].parse().map_err(|_| invalid())?
        } else {
            0
        };
        if minutes >= 60 {
            return Err(invalid());
        }

        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(Self::Fixed)
            .ok_or_else(invalid)
    }
}

impl fmt::Display for SourceZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(offset) => write!(f, "{}", offset),
            Self::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}
