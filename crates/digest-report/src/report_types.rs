//! Report and index artifacts as they are persisted on disk.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder for per-user fields the conversation gave nothing for.
pub const NONE_SENTINEL: &str = "none";
/// Role assigned to authors missing from the user directory.
pub const DEFAULT_ROLE: &str = "participant";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// `YYYY-MM-DD`; also the artifact file stem.
    pub date: String,
    pub channel_summary: String,
    /// Keyed by platform user id, in the order the model produced them.
    pub users: IndexMap<String, UserReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub name: String,
    pub role: String,
    #[serde(default = "none_sentinel", deserialize_with = "null_as_sentinel")]
    pub progress: String,
    #[serde(default = "none_sentinel", deserialize_with = "null_as_sentinel")]
    pub interests_and_questions: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub advice_received: Vec<AdviceEntry>,
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub projects: Vec<ProjectProgress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceEntry {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProgress {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "none_sentinel", deserialize_with = "null_as_sentinel")]
    pub progress: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Manifest of every persisted report date, newest first.
pub struct ReportIndex {
    pub dates: Vec<String>,
    pub updated_at: String,
}

impl Report {
    /// Trims per-user free text and replaces blank values with the sentinel.
    pub(crate) fn normalize_free_text(&mut self) {
        for user in self.users.values_mut() {
            user.progress = normalize_text(&user.progress);
            user.interests_and_questions = normalize_text(&user.interests_and_questions);
            for project in &mut user.projects {
                project.progress = normalize_text(&project.progress);
            }
        }
    }
}

fn none_sentinel() -> String {
    NONE_SENTINEL.to_string()
}

fn null_as_sentinel<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(none_sentinel))
}

/// Trimmed `text`, or the sentinel when nothing is left.
fn normalize_text(text: &str) -> String {
    match text.trim() {
        "" => none_sentinel(),
        trimmed => trimmed.to_string(),
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
