//! First-fit shard selection.
//!
//! Shards are probed one at a time in configured order and the first one under
//! the high-water mark wins. Nothing is cached between calls.

use tracing::{info, warn};

use crate::config::ShardConfig;
use crate::error::{AppError, AppResult};

use super::capacity::probe;
use super::content_api::ContentApi;
use super::types::{CapacityInfo, ShardSelection};

pub async fn select_writable(
    api: &dyn ContentApi,
    shards: &[ShardConfig],
    capacity_bytes: u64,
    high_water_percent: f64,
) -> AppResult<ShardSelection> {
    let Some(first) = shards.first() else {
        return Err(AppError::config("no shards configured"));
    };
    for (index, shard) in shards.iter().enumerate() {
        match probe(api, shard, capacity_bytes).await {
            Ok(capacity) if capacity.percent_used < high_water_percent => {
                info!(target: "shardstore::select", index, repo = %shard.repo, percent_used = capacity.percent_used, available = capacity.available_bytes, "selected shard");
                return Ok(ShardSelection { index, shard: shard.clone(), capacity, exhausted: false });
            }
            Ok(capacity) => {
                info!(target: "shardstore::select", index, repo = %shard.repo, percent_used = capacity.percent_used, "shard above high-water mark, skipping");
            }
            Err(e) => {
                warn!(target: "shardstore::select", index, repo = %shard.repo, error = %e, "capacity probe failed, skipping shard");
            }
        }
    }
    // Local estimates may be stale: fall back to shard 0 and let the upstream decide.
    warn!(target: "shardstore::select", shards = shards.len(), "no shard confirmed writable, falling back to shard 0");
    Ok(ShardSelection { index: 0, shard: first.clone(), capacity: CapacityInfo::exhausted(capacity_bytes), exhausted: true })
}
