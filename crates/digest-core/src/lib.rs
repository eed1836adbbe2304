//! Low-level utilities shared across the channel digest crates: atomic
//! artifact writes and wall-clock helpers.

pub mod atomic_io;
pub mod time_utils;

pub use atomic_io::{write_json_pretty_atomic, write_text_atomic};
pub use time_utils::{current_unix_timestamp_ms, rfc3339_millis_utc};
