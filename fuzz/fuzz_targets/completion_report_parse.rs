#![no_main]

use digest_report::{is_iso_date, parse_report};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    if let Ok(report) = parse_report(&raw) {
        assert!(is_iso_date(&report.date));
        assert!(!report.date.contains('/'));
        for user in report.users.values() {
            assert!(!user.progress.trim().is_empty());
            assert!(!user.interests_and_questions.trim().is_empty());
        }
    }
});
