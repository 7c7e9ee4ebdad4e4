//! The per-shard content API seam.
//!
//! The store only needs four calls from the upstream service. They sit behind
//! a trait so placement and aggregation logic can be exercised against an
//! in-memory double, while production traffic goes through `GithubContentApi`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::ShardConfig;

/// Failure of one upstream call. `status` is None for transport failures and
/// timeouts, which callers treat the same as any other upstream error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn http(status: u16, message: impl Into<String>) -> Self { Self { status: Some(status), message: message.into() } }
    pub fn transport(message: impl Into<String>) -> Self { Self { status: None, message: message.into() } }
    pub fn is_not_found(&self) -> bool { self.status == Some(404) }
}

/// Repository metadata. `size` is the aggregate repository size in kilobytes.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct RepoInfo {
    #[serde(default)]
    pub size: u64,
}

/// The `content` part of a create-or-update response.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
pub struct CommittedContent {
    pub sha: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl DirEntry {
    pub fn is_file(&self) -> bool { self.entry_type == "file" }
}

/// Calls a shard's content API. Every call is scoped to exactly one shard and
/// authenticates with that shard's own credential.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// `GET /repos/{owner}/{repo}`
    async fn repo_info(&self, shard: &ShardConfig) -> Result<RepoInfo, ApiError>;

    /// `PUT /repos/{owner}/{repo}/contents/{path}` on the shard's branch.
    async fn put_content(&self, shard: &ShardConfig, path: &str, message: &str, content_base64: &str) -> Result<CommittedContent, ApiError>;

    /// `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}` as raw bytes.
    async fn get_raw(&self, shard: &ShardConfig, path: &str) -> Result<Vec<u8>, ApiError>;

    /// `GET /repos/{owner}/{repo}/contents/{path}?ref={branch}` as a directory listing.
    async fn list_dir(&self, shard: &ShardConfig, path: &str) -> Result<Vec<DirEntry>, ApiError>;
}
