//! reqwest-backed implementation of `ContentApi` for the GitHub REST API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::config::{ShardConfig, StoreConfig, Timeouts};
use crate::error::{AppError, AppResult};

use super::content_api::{ApiError, CommittedContent, ContentApi, DirEntry, RepoInfo};

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

#[derive(Clone)]
pub struct GithubContentApi {
    client: Client,
    api_base: String,
    timeouts: Timeouts,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: CommittedContent,
}

#[derive(Debug, Deserialize)]
struct UpstreamMessage {
    #[serde(default)]
    message: Option<String>,
}

impl GithubContentApi {
    pub fn new(cfg: &StoreConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| AppError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client, api_base: cfg.api_base.trim_end_matches('/').to_string(), timeouts: cfg.timeouts })
    }

    fn repo_url(&self, shard: &ShardConfig) -> String {
        format!("{}/repos/{}/{}", self.api_base, urlencoding::encode(&shard.owner), urlencoding::encode(&shard.repo))
    }

    fn contents_url(&self, shard: &ShardConfig, path: &str) -> String {
        let encoded: Vec<String> = path.split('/').map(|seg| urlencoding::encode(seg).into_owned()).collect();
        format!("{}/contents/{}", self.repo_url(shard), encoded.join("/"))
    }

    fn headers(shard: &ShardConfig, accept: &'static str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", shard.token))
            .map_err(|_| ApiError::transport(format!("credential for {} is not a valid header value", shard.repo)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        Ok(headers)
    }

    async fn send(req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() { ApiError::transport(format!("request timed out: {}", e)) } else { ApiError::transport(e.to_string()) }
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        Err(Self::status_error(status, resp).await)
    }

    // Prefer the upstream's own `message` field so callers see why it refused.
    async fn status_error(status: StatusCode, resp: reqwest::Response) -> ApiError {
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<UpstreamMessage>(&body)
            .ok()
            .and_then(|m| m.message)
            .unwrap_or_else(|| format!("HTTP {}", status));
        ApiError::http(status.as_u16(), message)
    }
}

#[async_trait]
impl ContentApi for GithubContentApi {
    async fn repo_info(&self, shard: &ShardConfig) -> Result<RepoInfo, ApiError> {
        let req = self.client.get(self.repo_url(shard))
            .headers(Self::headers(shard, ACCEPT_JSON)?)
            .timeout(self.timeouts.probe);
        let resp = Self::send(req).await?;
        resp.json::<RepoInfo>().await.map_err(|e| ApiError::transport(format!("invalid repository metadata: {}", e)))
    }

    async fn put_content(&self, shard: &ShardConfig, path: &str, message: &str, content_base64: &str) -> Result<CommittedContent, ApiError> {
        let url = self.contents_url(shard, path);
        debug!(target: "shardstore::github", repo = %shard.repo, path = %path, "PUT contents");
        let mut headers = Self::headers(shard, ACCEPT_JSON)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let req = self.client.put(url)
            .headers(headers)
            .json(&serde_json::json!({
                "message": message,
                "content": content_base64,
                "branch": shard.branch,
            }))
            .timeout(self.timeouts.write);
        let resp = Self::send(req).await?;
        let body: PutResponse = resp.json().await.map_err(|e| ApiError::transport(format!("invalid commit response: {}", e)))?;
        Ok(body.content)
    }

    async fn get_raw(&self, shard: &ShardConfig, path: &str) -> Result<Vec<u8>, ApiError> {
        let req = self.client.get(self.contents_url(shard, path))
            .query(&[("ref", shard.branch.as_str())])
            .headers(Self::headers(shard, ACCEPT_RAW)?)
            .timeout(self.timeouts.read);
        let resp = Self::send(req).await?;
        let bytes = resp.bytes().await.map_err(|e| ApiError::transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn list_dir(&self, shard: &ShardConfig, path: &str) -> Result<Vec<DirEntry>, ApiError> {
        let req = self.client.get(self.contents_url(shard, path))
            .query(&[("ref", shard.branch.as_str())])
            .headers(Self::headers(shard, ACCEPT_JSON)?)
            .timeout(self.timeouts.list);
        let resp = Self::send(req).await?;
        // A file at `path` comes back as a single object rather than an array.
        let value: serde_json::Value = resp.json().await.map_err(|e| ApiError::transport(format!("invalid listing: {}", e)))?;
        if !value.is_array() {
            return Err(ApiError::transport(format!("{} is not a directory", path)));
        }
        serde_json::from_value(value).map_err(|e| ApiError::transport(format!("invalid listing: {}", e)))
    }
}
