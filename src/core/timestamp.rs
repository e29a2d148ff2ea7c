//! Timestamp resolver.
//!
//! Turns a raw modification instant into calendar fields in the configured
//! time basis. Local time uses the offset that was in effect at the instant
//! itself, so files from before and after a daylight-saving change each get
//! their own offset.

use crate::models::config::TimeBasis;
use crate::Result;
use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Calendar decomposition of a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarTimestamp {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// Week of the year, Monday as first day (`strftime` `%W`, 0-53).
    pub week: u32,
}

impl CalendarTimestamp {
    /// Decompose a zoned date-time.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        let weekday = dt.weekday().num_days_from_monday();
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
            week: (dt.ordinal0() + 7 - weekday) / 7,
        }
    }
}

/// Convert a `SystemTime` to a UTC date-time.
///
/// Instants before the epoch are supported; instants outside chrono's
/// range yield [`crate::Error::Timestamp`].
pub fn to_utc(instant: SystemTime) -> Result<DateTime<Utc>> {
    let converted = match instant.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs())
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, after.subsec_nanos())),
        Err(e) => {
            let before = e.duration();
            i64::try_from(before.as_secs()).ok().and_then(|secs| {
                // Borrow one second when there is a fractional part.
                if before.subsec_nanos() == 0 {
                    DateTime::from_timestamp(-secs, 0)
                } else {
                    DateTime::from_timestamp(-secs - 1, 1_000_000_000 - before.subsec_nanos())
                }
            })
        }
    };

    converted.ok_or_else(|| crate::Error::Timestamp(format!("{:?}", instant)))
}

/// Resolve an instant in the given time basis.
pub fn resolve(instant: SystemTime, basis: TimeBasis) -> Result<CalendarTimestamp> {
    match basis {
        TimeBasis::Utc => resolve_in(instant, &Utc),
        TimeBasis::Local => resolve_in(instant, &Local),
    }
}

/// Resolve an instant in an arbitrary time zone.
pub fn resolve_in<Tz: TimeZone>(instant: SystemTime, tz: &Tz) -> Result<CalendarTimestamp> {
    let utc = to_utc(instant)?;
    Ok(CalendarTimestamp::from_datetime(&utc.with_timezone(tz)))
}
