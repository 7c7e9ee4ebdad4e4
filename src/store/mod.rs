//! Sharded object store over fixed-capacity content repositories.
//!
//! Writes go identifier -> capacity probes -> first-fit shard -> commit.
//! Reads go straight to the caller-named shard. Listing and search rebuild
//! the logical catalog from every shard on each call.

pub mod ident;
pub mod mime;
pub mod types;
pub mod content_api;
pub mod github;
pub mod capacity;
pub mod selector;
pub mod ops;
pub mod catalog;
pub mod locator;


use std::sync::Arc;

pub use content_api::{ApiError, CommittedContent, ContentApi, DirEntry, RepoInfo};
pub use github::GithubContentApi;
pub use ident::generate_id;
pub use locator::{public_url, RequestContext};
pub use types::{CapacityInfo, FetchedObject, ObjectRecord, ObjectSummary, ShardSelection, ShardStats, StoreStats};

use crate::config::{ShardConfig, StoreConfig};
use crate::error::{AppError, AppResult};

/// Entry point used by the HTTP layer. Holds the validated, read-only shard
/// list and the content API client; no other state survives between calls.
#[derive(Clone)]
pub struct ShardStore {
    api: Arc<dyn ContentApi>,
    config: StoreConfig,
}

impl ShardStore {
    pub fn new(config: StoreConfig, api: Arc<dyn ContentApi>) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    /// Store backed by the GitHub REST API at `config.api_base`.
    pub fn github(config: StoreConfig) -> AppResult<Self> {
        let api = GithubContentApi::new(&config)?;
        Self::new(config, Arc::new(api))
    }

    pub fn config(&self) -> &StoreConfig { &self.config }
    pub fn shards(&self) -> &[ShardConfig] { &self.config.shards }

    pub async fn probe(&self, shard_index: usize) -> AppResult<CapacityInfo> {
        let shard = ops::shard_at(self.shards(), shard_index)?;
        capacity::probe(self.api.as_ref(), shard, self.config.capacity_bytes)
            .await
            .map_err(|e| AppError::upstream(e.message))
    }

    pub async fn select_writable(&self) -> AppResult<ShardSelection> {
        selector::select_writable(self.api.as_ref(), self.shards(), self.config.capacity_bytes, self.config.high_water_percent).await
    }

    pub async fn upload(&self, file_name: &str, bytes: &[u8], custom_name: Option<&str>) -> AppResult<ObjectRecord> {
        ops::write_object(self.api.as_ref(), &self.config, file_name, bytes, custom_name).await
    }

    pub async fn fetch_object(&self, file_name: &str, shard_index: usize) -> AppResult<FetchedObject> {
        ops::read_object(self.api.as_ref(), self.shards(), file_name, shard_index).await
    }

    pub async fn list_objects(&self) -> Vec<ObjectSummary> {
        catalog::list_all(self.api.as_ref(), self.shards()).await
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<ObjectSummary>> {
        catalog::search(self.api.as_ref(), self.shards(), query).await
    }

    pub async fn file_info(&self, file_name: &str, shard_index: usize) -> AppResult<ObjectSummary> {
        catalog::file_info(self.api.as_ref(), self.shards(), file_name, shard_index).await
    }

    pub async fn stats(&self) -> StoreStats {
        catalog::stats(self.api.as_ref(), &self.config).await
    }
}
