use digest_discord::ChannelMessage;

use crate::UserDirectory;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Chronological `"{name} ({role}): {content}"` lines ready for the prompt.
pub struct Transcript {
    text: String,
    line_count: usize,
}

impl Transcript {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }
}

/// Formats newest-first `messages` into a chronological transcript.
///
/// Returns `None` when no message carries text, which ends the run without
/// contacting the completion service.
pub fn format_transcript(
    messages: &[ChannelMessage],
    directory: &UserDirectory,
) -> Option<Transcript> {
    let lines = messages
        .iter()
        .rev()
        .filter(|message| !message.content.trim().is_empty())
        .filter(|message| !directory.is_excluded(message.author_id()))
        .map(|message| {
            let identity = directory.resolve(message.author_id(), message.author_display_name());
            format!("{} ({}): {}", identity.name, identity.role, message.content)
        })
        .collect::<Vec<_>>();

    if lines.is_empty() {
        return None;
    }
    Some(Transcript {
        line_count: lines.len(),
        text: lines.join("\n"),
    })
}
