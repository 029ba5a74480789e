use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Read the pull request number from a GitHub Actions event payload file.
pub fn pull_request_number_from_file(path: &Path) -> Result<u64> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read event payload {}", path.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse event payload {}", path.display()))?;

    pull_request_number(&payload).ok_or_else(|| ConfigError::NotPullRequestEvent.into())
}

/// `pull_request` / `pull_request_target` carry the PR directly; comment events
/// on a PR carry it on the issue.
pub fn pull_request_number(payload: &serde_json::Value) -> Option<u64> {
    payload
        .get("pull_request")
        .and_then(|pr| pr.get("number"))
        .and_then(|n| n.as_u64())
        .or_else(|| {
            let issue = payload.get("issue")?;
            issue.get("pull_request")?;
            issue.get("number")?.as_u64()
        })
}
