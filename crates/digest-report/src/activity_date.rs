use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};

pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 9;
pub const DEFAULT_DAY_ROLLOVER_HOUR: u32 = 4;

/// The calendar day a run reports on.
///
/// `now` is shifted into the channel's local time; before `rollover_hour`
/// the previous day is still considered active, since the scheduled run fires
/// shortly after midnight.
pub fn activity_date(now: DateTime<Utc>, utc_offset_hours: i32, rollover_hour: u32) -> NaiveDate {
    let local = now.naive_utc() + Duration::hours(i64::from(utc_offset_hours));
    if local.hour() < rollover_hour {
        (local - Duration::days(1)).date()
    } else {
        local.date()
    }
}

/// Strict `YYYY-MM-DD` check: fixed width and a real calendar day.
pub fn is_iso_date(candidate: &str) -> bool {
    let bytes = candidate.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit());
    digits_ok && NaiveDate::parse_from_str(candidate, "%Y-%m-%d").is_ok()
}
