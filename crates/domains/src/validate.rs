//! Field validation helpers shared by the service layer.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::models::{MAX_REMINDER_THRESHOLD_HOURS, MIN_REMINDER_THRESHOLD_HOURS};

/// Rejects empty or whitespace-only values, naming the field.
pub fn not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_field(field, "bad value"));
    }
    Ok(())
}

/// Parses an IANA zone name ("America/New_York", "Etc/UTC", ...).
pub fn parse_timezone(field: &str, value: &str) -> Result<Tz> {
    value
        .parse::<Tz>()
        .map_err(|_| Error::invalid_field(field, "unrecognized timezone"))
}

/// Rejects a start time at or before the Unix epoch, the sentinel for an
/// unset timestamp.
pub fn start_time_set(field: &str, value: DateTime<Utc>) -> Result<()> {
    if value <= Utc.timestamp_opt(0, 0).unwrap() {
        return Err(Error::invalid_field(field, "bad value"));
    }
    Ok(())
}

/// Reminder lead time must fall within [2, 168] hours.
pub fn reminder_threshold(field: &str, hours: u8) -> Result<()> {
    if !(MIN_REMINDER_THRESHOLD_HOURS..=MAX_REMINDER_THRESHOLD_HOURS).contains(&hours) {
        return Err(Error::invalid_field(field, "value outside constraints"));
    }
    Ok(())
}
