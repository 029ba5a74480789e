//! GitHub REST API access: pull request data in, managed comment out.

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::pr::{CommitInfo, FileContent, PrMetadata, RepoRef};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.diff";

/// Read-only view of a pull request.
pub trait PullRequestSource: Send + Sync {
    fn get_metadata(&self, repo: &RepoRef, number: u64) -> Result<PrMetadata>;

    /// Unified diff of the whole PR.
    fn get_diff(&self, repo: &RepoRef, number: u64) -> Result<String>;

    /// Contents of every non-removed changed file at `head_sha`. Files whose
    /// content cannot be fetched are skipped with a warning.
    fn get_changed_files(
        &self,
        repo: &RepoRef,
        number: u64,
        head_sha: &str,
    ) -> Result<Vec<FileContent>>;

    /// Every path in the repository at `head_sha`.
    fn get_file_tree(&self, repo: &RepoRef, head_sha: &str) -> Result<Vec<String>>;

    fn get_commits(&self, repo: &RepoRef, number: u64) -> Result<Vec<CommitInfo>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

/// Comments on an issue or pull request.
pub trait CommentStore {
    /// All comments, oldest first.
    fn list_comments(&self, repo: &RepoRef, issue_number: u64) -> Result<Vec<IssueComment>>;
    fn create_comment(&self, repo: &RepoRef, issue_number: u64, body: &str) -> Result<()>;
    fn update_comment(&self, repo: &RepoRef, comment_id: u64, body: &str) -> Result<()>;
}

#[derive(Deserialize)]
struct PullResponse {
    title: String,
    body: Option<String>,
    head: PullHead,
}

#[derive(Deserialize)]
struct PullHead {
    sha: String,
}

#[derive(Deserialize)]
struct PullFile {
    filename: String,
    status: String,
}

/// Entry from the contents API. Only `type == "file"` carries `content`.
#[derive(Deserialize)]
struct ContentEntry {
    #[serde(rename = "type")]
    kind: String,
    content: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: Option<String>,
}

#[derive(Deserialize)]
struct PullCommit {
    sha: String,
    commit: CommitDetail,
}

#[derive(Deserialize)]
struct CommitDetail {
    message: String,
}

/// Blocking client for the GitHub REST API.
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(token: &str, api_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("qa-instructions/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .context("invalid github authorization header")?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to create github api client")?;

        Ok(GitHubClient {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, repo: &RepoRef, rest: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.api_url, repo.owner, repo.name, rest)
    }

    fn send(&self, operation: &str, request: RequestBuilder) -> Result<Response> {
        let resp = request
            .send()
            .with_context(|| format!("github api {operation} request failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            bail!(
                "github api {operation} failed with status {}: {}",
                status.as_u16(),
                body.trim()
            );
        }

        Ok(resp)
    }

    fn get_json<T: DeserializeOwned>(&self, operation: &str, url: &str) -> Result<T> {
        log::trace!("GET {url}");
        self.send(operation, self.http.get(url))?
            .json::<T>()
            .with_context(|| format!("failed to decode github {operation}"))
    }

    fn get_text(&self, operation: &str, url: &str, accept: &'static str) -> Result<String> {
        log::trace!("GET {url} ({accept})");
        self.send(operation, self.http.get(url).header(header::ACCEPT, accept))?
            .text()
            .with_context(|| format!("failed to read github {operation}"))
    }

    /// Follow `page=N` until a short page comes back.
    fn get_paginated<T: DeserializeOwned>(&self, operation: &str, url: &str) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        let mut page = 1u32;
        loop {
            let chunk: Vec<T> =
                self.get_json(operation, &format!("{url}?per_page={PER_PAGE}&page={page}"))?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(rows)
    }

    fn contents_url(&self, repo: &RepoRef, path: &str, head_sha: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_url)
            .with_context(|| format!("invalid github api url {}", self.api_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("github api url {} cannot take a path", self.api_url))?
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "contents"])
            .extend(path.split('/'));
        url.query_pairs_mut().append_pair("ref", head_sha);
        Ok(url)
    }

    /// `None` for entries without file content (submodules, symlinks, directories).
    fn get_file_content(
        &self,
        repo: &RepoRef,
        path: &str,
        head_sha: &str,
    ) -> Result<Option<String>> {
        let url = self.contents_url(repo, path, head_sha)?;
        let entry: ContentEntry = self.get_json("get file content", url.as_str())?;

        match (entry.kind.as_str(), entry.content) {
            ("file", Some(encoded)) => {
                let compact: String = encoded.split_whitespace().collect();
                let bytes = STANDARD
                    .decode(compact)
                    .with_context(|| format!("invalid base64 content for {path}"))?;
                Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
            }
            (kind, _) => {
                log::debug!("Skipping {path}: contents entry is a {kind}");
                Ok(None)
            }
        }
    }
}

impl PullRequestSource for GitHubClient {
    fn get_metadata(&self, repo: &RepoRef, number: u64) -> Result<PrMetadata> {
        let pull: PullResponse =
            self.get_json("get pull request", &self.repo_url(repo, &format!("pulls/{number}")))?;

        Ok(PrMetadata {
            title: pull.title,
            body: pull.body.unwrap_or_default(),
            head_sha: pull.head.sha,
        })
    }

    fn get_diff(&self, repo: &RepoRef, number: u64) -> Result<String> {
        self.get_text(
            "get pull request diff",
            &self.repo_url(repo, &format!("pulls/{number}")),
            DIFF_MEDIA_TYPE,
        )
    }

    fn get_changed_files(
        &self,
        repo: &RepoRef,
        number: u64,
        head_sha: &str,
    ) -> Result<Vec<FileContent>> {
        let files: Vec<PullFile> = self.get_paginated(
            "list pull request files",
            &self.repo_url(repo, &format!("pulls/{number}/files")),
        )?;

        let mut results = Vec::new();
        for file in files {
            if file.status == "removed" {
                continue;
            }

            match self.get_file_content(repo, &file.filename, head_sha) {
                Ok(Some(content)) => results.push(FileContent {
                    filename: file.filename,
                    content,
                }),
                Ok(None) => {}
                Err(err) => {
                    log::debug!("{err:#}");
                    log::warn!("Could not fetch content for {}, skipping", file.filename);
                }
            }
        }

        Ok(results)
    }

    fn get_file_tree(&self, repo: &RepoRef, head_sha: &str) -> Result<Vec<String>> {
        let tree: TreeResponse = self.get_json(
            "get file tree",
            &self.repo_url(repo, &format!("git/trees/{head_sha}?recursive=1")),
        )?;

        if tree.truncated {
            log::warn!("File tree was truncated by the GitHub API");
        }

        Ok(tree.tree.into_iter().filter_map(|entry| entry.path).collect())
    }

    fn get_commits(&self, repo: &RepoRef, number: u64) -> Result<Vec<CommitInfo>> {
        let commits: Vec<PullCommit> = self.get_paginated(
            "list pull request commits",
            &self.repo_url(repo, &format!("pulls/{number}/commits")),
        )?;

        Ok(commits
            .into_iter()
            .map(|c| CommitInfo {
                sha: c.sha,
                message: c.commit.message,
            })
            .collect())
    }
}

impl CommentStore for GitHubClient {
    fn list_comments(&self, repo: &RepoRef, issue_number: u64) -> Result<Vec<IssueComment>> {
        self.get_paginated(
            "list issue comments",
            &self.repo_url(repo, &format!("issues/{issue_number}/comments")),
        )
    }

    fn create_comment(&self, repo: &RepoRef, issue_number: u64, body: &str) -> Result<()> {
        let url = self.repo_url(repo, &format!("issues/{issue_number}/comments"));
        self.send("create issue comment", self.http.post(url).json(&json!({ "body": body })))?;
        Ok(())
    }

    fn update_comment(&self, repo: &RepoRef, comment_id: u64, body: &str) -> Result<()> {
        let url = self.repo_url(repo, &format!("issues/comments/{comment_id}"));
        self.send("update issue comment", self.http.patch(url).json(&json!({ "body": body })))?;
        Ok(())
    }
}
