//! Version and self-update via the deployed git checkout.

use std::io;
use std::path::Path;
use std::process::Output;

use thiserror::Error;
use tokio::process::Command;

/// Git invocation failures.
#[derive(Debug, Error)]
pub enum GitError {
    /// `git` could not be started.
    #[error("failed to run git: {0}")]
    Spawn(#[from] io::Error),

    /// `git` exited non-zero.
    #[error("git {command} failed: {stderr}")]
    Failed {
        /// Subcommand that failed
        command: &'static str,
        /// Trimmed standard error
        stderr: String,
    },

    /// `git rev-parse` printed something that is not a commit hash.
    #[error("unexpected git output: {0:?}")]
    InvalidOutput(String),
}

async fn git(repo: &Path, command: &'static str, args: &[&str]) -> Result<Output, GitError> {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .arg(command)
        .args(args)
        .output()
        .await?;

    if !output.status.success() {
        return Err(GitError::Failed {
            command,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Validate `git rev-parse HEAD` output.
pub fn parse_commit_hash(stdout: &[u8]) -> Result<String, GitError> {
    let text = String::from_utf8_lossy(stdout);
    let hash = text.trim();
    let valid = matches!(hash.len(), 40 | 64) && hash.chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(hash.to_ascii_lowercase())
    } else {
        Err(GitError::InvalidOutput(hash.to_string()))
    }
}

/// `HEAD` commit of the checkout at `repo`.
pub async fn commit_hash(repo: &Path) -> Result<String, GitError> {
    let output = git(repo, "rev-parse", &["HEAD"]).await?;
    parse_commit_hash(&output.stdout)
}

/// Fast-forward the checkout at `repo` and return the new `HEAD`.
///
/// The running process is not restarted; the new code takes effect on the
/// next start.
pub async fn update(repo: &Path) -> Result<String, GitError> {
    git(repo, "pull", &["--ff-only"]).await?;
    let hash = commit_hash(repo).await?;
    log::info!("checkout at {} updated to {}", repo.display(), hash);
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sha1_with_newline() {
        let out = b"3F786850E387550FDAB836ED7E6DC881DE23001B\n";
        assert_eq!(
            parse_commit_hash(out).unwrap(),
            "3f786850e387550fdab836ed7e6dc881de23001b"
        );
    }

    #[test]
    fn parses_sha256() {
        let out = "a".repeat(64);
        assert!(parse_commit_hash(out.as_bytes()).is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_commit_hash(b"").is_err());
        assert!(parse_commit_hash(b"HEAD").is_err());
        assert!(parse_commit_hash(b"fatal: not a git repository").is_err());
        assert!(parse_commit_hash("g".repeat(40).as_bytes()).is_err());
    }
}
