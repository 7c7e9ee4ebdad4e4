//! Logical catalog: scatter-gather listing over every shard's `uploads/` directory.
//!
//! Nothing here is persisted; each call rebuilds the catalog from the shards.
//! One unreachable shard never fails the whole listing.

use futures_util::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{ShardConfig, StoreConfig, UPLOADS_DIR};
use crate::error::{AppError, AppResult};

use super::capacity::probe;
use super::content_api::{ApiError, ContentApi, DirEntry};
use super::mime::media_type_for;
use super::ops::shard_at;
use super::types::{ObjectSummary, ShardStats, StoreStats};

static LABELLED_STEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)_[A-Za-z0-9]{6}$").expect("static regex"));

/// Recover the display name from a stored file name: `myphoto_Ab3dE9.png`
/// lists as `myphoto.png`, an unlabelled `Ab3dE9.png` stays as it is.
pub fn display_name(file_name: &str) -> String {
    let (stem, ext) = match file_name.rfind('.') {
        Some(i) if i > 0 => (&file_name[..i], &file_name[i..]),
        _ => (file_name, ""),
    };
    match LABELLED_STEM.captures(stem) {
        Some(caps) => format!("{}{}", caps.get(1).map(|m| m.as_str()).unwrap_or(""), ext),
        None => file_name.to_string(),
    }
}

pub fn summarize(entry: &DirEntry, index: usize, shard: &ShardConfig) -> ObjectSummary {
    ObjectSummary {
        original_name: entry.name.clone(),
        custom_name: display_name(&entry.name),
        file_name: entry.name.clone(),
        url: entry.download_url.clone(),
        size: entry.size,
        media_type: media_type_for(&entry.name).to_string(),
        uploaded_at: entry.created_at.clone(),
        repo_index: index,
        repo_name: shard.repo.clone(),
    }
}

/// List one shard. A missing `uploads/` directory means an empty shard.
pub async fn list_shard(api: &dyn ContentApi, index: usize, shard: &ShardConfig) -> Result<Vec<ObjectSummary>, ApiError> {
    match api.list_dir(shard, UPLOADS_DIR).await {
        Ok(entries) => Ok(entries.iter().filter(|e| e.is_file()).map(|e| summarize(e, index, shard)).collect()),
        Err(e) if e.is_not_found() => {
            debug!(target: "shardstore::catalog", index, repo = %shard.repo, "no uploads directory yet");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Aggregate all shards concurrently. Failed shards are logged and skipped.
/// Output is ordered by shard index, then file name.
pub async fn list_all(api: &dyn ContentApi, shards: &[ShardConfig]) -> Vec<ObjectSummary> {
    let results = join_all(shards.iter().enumerate().map(|(i, s)| list_shard(api, i, s))).await;
    let mut all = Vec::new();
    for (index, res) in results.into_iter().enumerate() {
        match res {
            Ok(mut items) => all.append(&mut items),
            Err(e) => warn!(target: "shardstore::catalog", index, repo = %shards[index].repo, status = ?e.status, error = %e, "listing failed, skipping shard"),
        }
    }
    all.sort_by(|a, b| a.repo_index.cmp(&b.repo_index).then_with(|| a.file_name.cmp(&b.file_name)));
    all
}

/// Case-insensitive substring filter over display, original and stored names.
pub fn filter_catalog(items: Vec<ObjectSummary>, query: &str) -> Vec<ObjectSummary> {
    let needle = query.trim().to_lowercase();
    items
        .into_iter()
        .filter(|o| {
            o.custom_name.to_lowercase().contains(&needle)
                || o.original_name.to_lowercase().contains(&needle)
                || o.file_name.to_lowercase().contains(&needle)
        })
        .collect()
}

pub async fn search(api: &dyn ContentApi, shards: &[ShardConfig], query: &str) -> AppResult<Vec<ObjectSummary>> {
    if query.trim().is_empty() {
        return Err(AppError::user("search query must not be empty"));
    }
    Ok(filter_catalog(list_all(api, shards).await, query))
}

/// Catalog entry for one object, looked up on its own shard only.
pub async fn file_info(api: &dyn ContentApi, shards: &[ShardConfig], file_name: &str, shard_index: usize) -> AppResult<ObjectSummary> {
    let shard = shard_at(shards, shard_index)?;
    let items = list_shard(api, shard_index, shard).await.map_err(|e| AppError::upstream(e.message))?;
    items
        .into_iter()
        .find(|o| o.file_name == file_name)
        .ok_or_else(|| AppError::not_found(format!("File {} not found in repo {}", file_name, shard_index)))
}

/// Per-shard object counts and occupancy alongside the catalog totals.
pub async fn stats(api: &dyn ContentApi, cfg: &StoreConfig) -> StoreStats {
    let (catalog, probes) = futures_util::join!(
        list_all(api, &cfg.shards),
        join_all(cfg.shards.iter().map(|s| probe(api, s, cfg.capacity_bytes)))
    );
    let shards = cfg
        .shards
        .iter()
        .zip(probes)
        .enumerate()
        .map(|(index, (shard, probed))| {
            let mine = catalog.iter().filter(|o| o.repo_index == index);
            let (files, bytes) = mine.fold((0usize, 0u64), |(n, b), o| (n + 1, b + o.size));
            let capacity = match probed {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(target: "shardstore::stats", index, repo = %shard.repo, error = %e, "capacity probe failed");
                    None
                }
            };
            ShardStats { index, repo_name: shard.repo.clone(), files, bytes, capacity }
        })
        .collect();
    StoreStats { total_files: catalog.len(), total_size: catalog.iter().map(|o| o.size).sum(), shards }
}
