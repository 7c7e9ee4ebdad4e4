//! Store data contracts returned to callers.
//! Keep this module purely about types/serde and light helpers.

use serde::{Deserialize, Serialize};

use crate::config::ShardConfig;

/// Occupancy of one shard as reported by the content API.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CapacityInfo {
    pub occupied_bytes: u64,
    pub capacity_bytes: u64,
    pub available_bytes: u64,
    pub percent_used: f64,
}

impl CapacityInfo {
    pub fn from_occupied(occupied_bytes: u64, capacity_bytes: u64) -> Self {
        let percent_used = if capacity_bytes == 0 { 100.0 } else { occupied_bytes as f64 / capacity_bytes as f64 * 100.0 };
        Self {
            occupied_bytes,
            capacity_bytes,
            available_bytes: capacity_bytes.saturating_sub(occupied_bytes),
            percent_used,
        }
    }

    /// Placeholder reported when no shard could be confirmed writable.
    pub fn exhausted(capacity_bytes: u64) -> Self {
        Self { occupied_bytes: capacity_bytes, capacity_bytes, available_bytes: 0, percent_used: 100.0 }
    }
}

/// Outcome of first-fit shard selection.
#[derive(Debug, Clone)]
pub struct ShardSelection {
    pub index: usize,
    pub shard: ShardConfig,
    pub capacity: CapacityInfo,
    /// Set when every shard read as full or failed to answer; the write is
    /// still attempted against shard 0.
    pub exhausted: bool,
}

/// A successfully committed object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectRecord {
    pub original_name: String,
    pub custom_name: String,
    pub file_name: String,
    pub git_path: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub media_type: String,
    pub repo_index: usize,
    pub repo_name: String,
    pub sha: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    pub uploaded_at: String,
}

/// One entry of the logical catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectSummary {
    pub original_name: String,
    pub custom_name: String,
    pub file_name: String,
    /// Upstream raw download URL; the HTTP layer replaces it with the public locator.
    #[serde(default)]
    pub url: Option<String>,
    pub size: u64,
    #[serde(rename = "type")]
    pub media_type: String,
    #[serde(default)]
    pub uploaded_at: Option<String>,
    pub repo_index: usize,
    pub repo_name: String,
}

/// Raw object bytes plus the media type guessed from the file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShardStats {
    pub index: usize,
    pub repo_name: String,
    pub files: usize,
    pub bytes: u64,
    /// None when the capacity probe failed.
    pub capacity: Option<CapacityInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreStats {
    pub total_files: usize,
    pub total_size: u64,
    pub shards: Vec<ShardStats>,
}
