use std::cmp::Ordering;

/// First millisecond of 2015, the zero point of Discord snowflake ids.
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Creation time encoded in a snowflake id, or `None` when `id` is not one.
pub fn snowflake_timestamp_ms(id: &str) -> Option<u64> {
    let raw = id.trim().parse::<u64>().ok()?;
    Some((raw >> 22).saturating_add(DISCORD_EPOCH_MS))
}

/// Orders ids numerically; non-numeric ids sort by length then lexically.
pub fn compare_snowflakes(left: &str, right: &str) -> Ordering {
    match (left.trim().parse::<u64>(), right.trim().parse::<u64>()) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        _ => left.len().cmp(&right.len()).then_with(|| left.cmp(right)),
    }
}
