//! Shard occupancy probing.

use crate::config::ShardConfig;

use super::content_api::{ApiError, ContentApi};
use super::types::CapacityInfo;

/// Ask the content API how large `shard` is and express it against the fixed ceiling.
///
/// A failed probe is returned as an error, never as a full shard; the caller
/// decides what a missing answer means.
pub async fn probe(api: &dyn ContentApi, shard: &ShardConfig, capacity_bytes: u64) -> Result<CapacityInfo, ApiError> {
    let info = api.repo_info(shard).await?;
    // Repository size is reported in kilobytes.
    let occupied = info.size.saturating_mul(1024);
    Ok(CapacityInfo::from_occupied(occupied, capacity_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::mock::MockContentApi;

    #[tokio::test]
    async fn converts_kilobytes_and_surfaces_errors() {
        let api = MockContentApi::new();
        let shard = ShardConfig::new("o", "r0", "main", "t");
        api.set_size_kb("r0", 512);
        let c = probe(&api, &shard, 1024 * 1024).await.unwrap();
        assert_eq!(c.occupied_bytes, 512 * 1024);
        assert!((c.percent_used - 50.0).abs() < 1e-9);

        api.fail_probe("r0", ApiError::transport("connection reset"));
        let e = probe(&api, &shard, 1024 * 1024).await.unwrap_err();
        assert_eq!(e.status, None);
    }
}
