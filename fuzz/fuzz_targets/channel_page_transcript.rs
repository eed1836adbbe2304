#![no_main]

use digest_discord::{compare_snowflakes, snowflake_timestamp_ms, ChannelMessage};
use digest_report::{format_transcript, UserDirectory};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(page) = serde_json::from_slice::<Vec<ChannelMessage>>(data) else {
        return;
    };
    for pair in page.windows(2) {
        let _ = compare_snowflakes(&pair[0].id, &pair[1].id);
    }
    for message in &page {
        let _ = snowflake_timestamp_ms(&message.id);
    }

    let non_empty = page
        .iter()
        .filter(|message| !message.content.trim().is_empty())
        .count();
    match format_transcript(&page, &UserDirectory::default()) {
        Some(transcript) => {
            assert_eq!(transcript.line_count(), non_empty);
            assert!(transcript.line_count() > 0);
        }
        None => assert_eq!(non_empty, 0),
    }
});
