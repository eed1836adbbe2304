use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use digest_report::{CommitStatus, VersionControl};
use tokio::process::Command;
use tracing::info;

const PUSH_BRANCH: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PushRemote {
    Origin,
    /// HTTPS remote authenticated with a token, for `owner/name` on GitHub.
    GitHubToken { token: String, repo: String },
}

impl PushRemote {
    pub(crate) fn from_options(token: Option<&str>, repo: Option<&str>) -> Self {
        let token = token.map(str::trim).filter(|value| !value.is_empty());
        let repo = repo.map(str::trim).filter(|value| !value.is_empty());
        match (token, repo) {
            (Some(token), Some(repo)) => Self::GitHubToken {
                token: token.to_string(),
                repo: repo.to_string(),
            },
            _ => Self::Origin,
        }
    }

    fn push_args(&self) -> Vec<String> {
        match self {
            Self::Origin => vec!["push".to_string(), "origin".to_string(), PUSH_BRANCH.to_string()],
            Self::GitHubToken { token, repo } => vec![
                "push".to_string(),
                format!("https://{token}@github.com/{repo}.git"),
                PUSH_BRANCH.to_string(),
            ],
        }
    }

    fn secret(&self) -> Option<&str> {
        match self {
            Self::Origin => None,
            Self::GitHubToken { token, .. } => Some(token),
        }
    }
}

/// Commits the working tree with the `git` binary and pushes `main`.
pub(crate) struct GitPublisher {
    repo_dir: PathBuf,
    remote: PushRemote,
}

impl GitPublisher {
    pub(crate) fn new(repo_dir: impl Into<PathBuf>, remote: PushRemote) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote,
        }
    }

    async fn git(&self, args: &[String]) -> Result<String> {
        run_git(&self.repo_dir, args, self.remote.secret()).await
    }
}

#[async_trait]
impl VersionControl for GitPublisher {
    async fn commit_and_push(&self, message: &str) -> Result<CommitStatus> {
        self.git(&["add".to_string(), ".".to_string()]).await?;
        let status = self
            .git(&["status".to_string(), "--porcelain".to_string()])
            .await?;
        if status.trim().is_empty() {
            return Ok(CommitStatus::NoChanges);
        }
        self.git(&["commit".to_string(), "-m".to_string(), message.to_string()])
            .await?;
        self.git(&self.remote.push_args()).await?;
        info!(repo_dir = %self.repo_dir.display(), "pushed report commit");
        Ok(CommitStatus::Pushed)
    }
}

async fn run_git(repo_dir: &Path, args: &[String], secret: Option<&str>) -> Result<String> {
    let label = redact(&args.join(" "), secret);
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .output()
        .await
        .with_context(|| format!("failed to spawn git {label}"))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git {label} exited with {}: {}",
            output.status,
            redact(stderr.trim(), secret)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn redact(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.is_empty() => text.replace(secret, "***"),
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use digest_report::VersionControl;

    use super::{redact, GitPublisher, PushRemote};

    #[test]
    fn unit_push_remote_requires_token_and_repo() {
        assert_eq!(PushRemote::from_options(None, Some("o/r")), PushRemote::Origin);
        assert_eq!(PushRemote::from_options(Some(" "), Some("o/r")), PushRemote::Origin);
        assert_eq!(PushRemote::from_options(Some("t"), None), PushRemote::Origin);
        assert_eq!(
            PushRemote::from_options(Some("tok"), Some("owner/reports")).push_args(),
            vec![
                "push".to_string(),
                "https://tok@github.com/owner/reports.git".to_string(),
                "main".to_string()
            ]
        );
        assert_eq!(
            PushRemote::Origin.push_args(),
            vec!["push".to_string(), "origin".to_string(), "main".to_string()]
        );
    }

    #[test]
    fn regression_git_errors_never_echo_the_token() {
        assert_eq!(
            redact("push https://s3cret@github.com/o/r.git main", Some("s3cret")),
            "push https://***@github.com/o/r.git main"
        );
        assert_eq!(redact("status", None), "status");
    }

    #[tokio::test]
    async fn regression_missing_repo_dir_is_an_error_not_a_panic() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let publisher = GitPublisher::new(tempdir.path().join("missing"), PushRemote::Origin);
        let error = publisher
            .commit_and_push("chore: add daily report for 2025-01-03")
            .await
            .expect_err("missing working tree");
        assert!(format!("{error:#}").contains("git add ."));
    }
}
