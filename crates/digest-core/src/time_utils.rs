use chrono::{SecondsFormat, Utc};

/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Current UTC time as `2025-01-03T04:05:06.789Z`.
pub fn rfc3339_millis_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
