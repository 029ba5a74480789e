use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Title, description and head commit of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrMetadata {
    pub title: String,
    pub body: String,
    pub head_sha: String,
}

/// Full text of a changed file at the head commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub sha: String,
    pub message: String,
}

/// Everything fetched about a pull request for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrData {
    pub metadata: PrMetadata,
    pub diff: String,
    pub changed_files: Vec<FileContent>,
    pub file_tree: Vec<String>,
    pub commits: Vec<CommitInfo>,
}

/// An `owner/repo` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoRef {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => Err(ConfigError::InvalidRepository(trimmed.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
