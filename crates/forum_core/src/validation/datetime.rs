//! Timestamp parsing for `YYYY-MM-DD HH:MM:SS` wall-clock values.

use super::{RawValue, ValidationError, ValidationResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mockable::Clock;
use once_cell::sync::Lazy;
use regex::Regex;

/// Storage and display format for every persisted timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2}) (\d{2}):(\d{2}):(\d{2})$")
        .expect("valid timestamp regex")
});

/// Normalizes a timestamp, substituting the clock's current local time for
/// `RawValue::Null`.
pub fn timestamp_or_now(raw: &RawValue, clock: &dyn Clock) -> ValidationResult<NaiveDateTime> {
    if raw.is_null() {
        return Ok(truncate_to_seconds(clock.local().naive_local()));
    }
    timestamp(raw)
}

/// Normalizes a required timestamp.
///
/// Structured timestamps pass through unchanged. Text must match
/// `YYYY-MM-DD HH:MM:SS` and name a real date and wall-clock time.
///
/// # Errors
/// - `InvalidType` for null, numeric and binary values.
/// - `InvalidFormat` when text does not match the pattern.
/// - `InvalidCalendarDate` when the year is 0 or month/day do not exist for
///   the year.
/// - `InvalidTime` when hour/minute/second are out of range.
pub fn timestamp(raw: &RawValue) -> ValidationResult<NaiveDateTime> {
    let text = match raw {
        RawValue::Timestamp(value) => return Ok(*value),
        RawValue::Text(text) => text.trim(),
        RawValue::Null | RawValue::Integer(_) | RawValue::Float(_) | RawValue::Bytes(_) => {
            return Err(ValidationError::InvalidType {
                expected: "timestamp",
                found: raw.describe(),
            });
        }
    };

    let captures = TIMESTAMP_PATTERN
        .captures(text)
        .ok_or_else(|| ValidationError::InvalidFormat(text.to_string()))?;
    let component = |index: usize| -> ValidationResult<u32> {
        captures
            .get(index)
            .and_then(|found| found.as_str().parse::<u32>().ok())
            .ok_or_else(|| ValidationError::InvalidFormat(text.to_string()))
    };

    let year = i32::try_from(component(1)?)
        .map_err(|_| ValidationError::InvalidFormat(text.to_string()))?;
    let (month, day) = (component(2)?, component(3)?);
    // Gregorian years start at 1; chrono alone would accept year 0.
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .filter(|_| year >= 1)
        .ok_or_else(|| ValidationError::InvalidCalendarDate(text.to_string()))?;
    let time = NaiveTime::from_hms_opt(component(4)?, component(5)?, component(6)?)
        .ok_or_else(|| ValidationError::InvalidTime(text.to_string()))?;

    Ok(NaiveDateTime::new(date, time))
}

/// Formats a timestamp the way it is bound into SQL statements.
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

// Storage keeps whole seconds; dropping the fraction keeps an inserted record
// equal to the row read back.
fn truncate_to_seconds(value: NaiveDateTime) -> NaiveDateTime {
    value.with_nanosecond(0).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp, timestamp};
    use crate::validation::{RawValue, ValidationError};

    #[test]
    fn leap_day_is_accepted_only_in_leap_years() {
        assert!(timestamp(&RawValue::from("2024-02-29 00:00:00")).is_ok());
        let err = timestamp(&RawValue::from("2023-02-29 00:00:00")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCalendarDate(_)));
    }

    #[test]
    fn year_zero_is_not_a_calendar_date() {
        let err = timestamp(&RawValue::from("0000-01-01 00:00:00")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCalendarDate(_)));
        assert!(timestamp(&RawValue::from("0001-01-01 00:00:00")).is_ok());
    }

    #[test]
    fn pattern_requires_single_space_separator() {
        let err = timestamp(&RawValue::from("2024-01-01T10:00:00")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat(_)));
        let err = timestamp(&RawValue::from("2024-1-01 10:00:00")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat(_)));
    }

    #[test]
    fn minute_sixty_is_an_invalid_time() {
        let err = timestamp(&RawValue::from("2024-01-01 10:60:00")).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTime(_)));
    }

    #[test]
    fn formatting_matches_the_accepted_pattern() {
        let parsed = timestamp(&RawValue::from(" 2024-03-05 07:08:09 ")).unwrap();
        assert_eq!(format_timestamp(&parsed), "2024-03-05 07:08:09");
    }
}
