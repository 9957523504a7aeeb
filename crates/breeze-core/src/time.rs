//! Date and duration wire formats.
//!
//! Every date-bearing field in every payload uses [`WIRE_DATE_FORMAT`], in
//! both directions. Durations travel as whole minutes.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::wire::ValueError;

/// The fixed date-time pattern used for every date on the wire.
///
/// Example: `2024-03-01T10:00:00.000+00:00`.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

/// Formats a UTC datetime using [`WIRE_DATE_FORMAT`].
pub fn format_wire_date(dt: &DateTime<Utc>) -> String {
    dt.format(WIRE_DATE_FORMAT).to_string()
}

/// Parses a wire date into UTC.
///
/// Accepts anything RFC 3339 understands (which covers [`WIRE_DATE_FORMAT`])
/// and falls back to an offset-less timestamp, read as UTC.
pub fn parse_wire_date(raw: &str) -> Result<DateTime<Utc>, ValueError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| ValueError::new("date", raw))
}

/// Formats a duration as total whole minutes.
pub fn format_minutes(duration: &TimeDelta) -> String {
    duration.num_minutes().to_string()
}

/// Parses a duration given either as whole minutes or as `HH:MM:SS[.fff]`.
///
/// Values outside the range `TimeDelta` can hold are rejected.
pub fn parse_minutes(raw: &str) -> Result<TimeDelta, ValueError> {
    let raw = raw.trim();
    let invalid = || ValueError::new("duration", raw);

    if let Ok(minutes) = raw.parse::<i64>() {
        return TimeDelta::try_minutes(minutes).ok_or_else(invalid);
    }

    let parts: Vec<&str> = raw.split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(invalid());
    };
    let hours: i64 = hours.parse().map_err(|_| invalid())?;
    let minutes: i64 = minutes.parse().map_err(|_| invalid())?;
    let seconds: f64 = seconds.parse().map_err(|_| invalid())?;
    let millis = (seconds * 1000.0).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return Err(invalid());
    }
    let millis = millis as i64;

    TimeDelta::try_hours(hours)
        .zip(TimeDelta::try_minutes(minutes))
        .and_then(|(h, m)| h.checked_add(&m))
        .zip(TimeDelta::try_milliseconds(millis))
        .and_then(|(hm, ms)| hm.checked_add(&ms))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_uses_fixed_pattern() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(format_wire_date(&dt), "2024-03-01T10:00:00.000+00:00");
    }

    #[test]
    fn parse_round_trips_formatted_value() {
        let dt = Utc.with_ymd_and_hms(2025, 2, 5, 14, 30, 15).unwrap();
        assert_eq!(parse_wire_date(&format_wire_date(&dt)).unwrap(), dt);
    }

    #[test]
    fn parse_normalizes_offset_to_utc() {
        let parsed = parse_wire_date("2006-04-20T14:30:00.000-07:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2006, 4, 20, 21, 30, 0).unwrap());
    }

    #[test]
    fn parse_accepts_offsetless_timestamp() {
        let parsed = parse_wire_date("2024-01-02T03:04:05").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_wire_date("yesterday").unwrap_err();
        assert_eq!(err.kind(), "date");
        assert_eq!(err.raw(), "yesterday");
    }

    #[test]
    fn minutes_round_trip() {
        let duration = TimeDelta::minutes(90);
        assert_eq!(format_minutes(&duration), "90");
        assert_eq!(parse_minutes("90").unwrap(), duration);
    }

    #[test]
    fn minutes_accept_clock_notation() {
        assert_eq!(parse_minutes("01:30:00.000").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_minutes("00:00:30").unwrap(), TimeDelta::seconds(30));
        assert!(parse_minutes("1:2").is_err());
    }

    #[test]
    fn out_of_range_minutes_are_rejected() {
        let err = parse_minutes("99999999999999999").unwrap_err();
        assert_eq!(err.kind(), "duration");
        assert_eq!(err.raw(), "99999999999999999");

        assert!(parse_minutes("9223372036854775807:00:00").is_err());
        assert!(parse_minutes("2562047788015:59:59").is_err());
        assert!(parse_minutes("00:00:1e300").is_err());
        assert!(parse_minutes("00:00:NaN").is_err());
    }
}
