use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageAuthor {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A channel message as returned by `GET /channels/{id}/messages`.
///
/// Unknown fields (embeds, attachments, reactions) are ignored; attachment-only
/// messages arrive with an empty `content`.
pub struct ChannelMessage {
    pub id: String,
    #[serde(default)]
    pub content: String,
    pub author: MessageAuthor,
}

impl ChannelMessage {
    pub fn author_id(&self) -> &str {
        &self.author.id
    }

    /// Display name shown in the client: global name when set, else username.
    pub fn author_display_name(&self) -> &str {
        self.author
            .global_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.author.username.as_str())
    }
}
