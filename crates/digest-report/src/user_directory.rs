use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::warn;

use crate::report_types::DEFAULT_ROLE;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnownProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryUser {
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub projects: Vec<KnownProject>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Read-only identity lookup, mirroring the `user-mapping.json` layout.
pub struct UserDirectory {
    /// Kept in file order so known projects are listed as written.
    #[serde(default)]
    users: IndexMap<String, DirectoryUser>,
    #[serde(default)]
    excluded_bots: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub name: String,
    pub role: String,
}

fn default_role() -> String {
    DEFAULT_ROLE.to_string()
}

impl UserDirectory {
    /// Loads the directory file. A missing file yields an empty directory so
    /// every author falls back to display name and default role.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "user directory not found, using display names");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read user directory {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse user directory {}", path.display()))
    }

    pub fn from_parts(
        users: impl IntoIterator<Item = (String, DirectoryUser)>,
        excluded_bots: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            users: users.into_iter().collect(),
            excluded_bots: excluded_bots.into_iter().collect(),
        }
    }

    pub fn resolve(&self, author_id: &str, display_name: &str) -> ResolvedIdentity {
        match self.users.get(author_id) {
            Some(user) => ResolvedIdentity {
                name: user.name.clone(),
                role: user.role.clone(),
            },
            None => ResolvedIdentity {
                name: display_name.to_string(),
                role: DEFAULT_ROLE.to_string(),
            },
        }
    }

    pub fn is_excluded(&self, author_id: &str) -> bool {
        self.excluded_bots.contains(author_id)
    }

    /// Known projects per user, as prompt lines; empty when none are listed.
    pub fn known_projects_text(&self) -> String {
        let mut sections = Vec::new();
        for (id, user) in &self.users {
            if self.is_excluded(id) || user.projects.is_empty() {
                continue;
            }
            let mut lines = vec![format!("- {} (ID: {})", user.name, id)];
            for project in &user.projects {
                lines.push(format!("    - {}: {}", project.name, project.description));
            }
            sections.push(lines.join("\n"));
        }
        sections.join("\n")
    }
}
