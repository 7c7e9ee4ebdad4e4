//! Shard and service configuration.
//!
//! Shards are an ordered, explicit list loaded once at startup and validated
//! before any request is served. The order is significant: placement is
//! first-fit over this list.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Fixed capacity ceiling per shard (100 MiB).
pub const SHARD_CAPACITY_BYTES: u64 = 100 * 1024 * 1024;
/// Percent-used threshold at or above which a shard is skipped for new writes.
pub const HIGH_WATER_PERCENT: f64 = 95.0;
/// Hard ceiling on a single object (5 MiB), checked before any network call.
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;
pub const DEFAULT_ID_LENGTH: usize = 6;
pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "shardstore";
pub const DEFAULT_BRANCH: &str = "main";
/// Directory inside every shard that holds stored objects.
pub const UPLOADS_DIR: &str = "uploads";

fn default_branch() -> String { DEFAULT_BRANCH.to_string() }

/// One backing repository.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShardConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    pub token: String,
}

impl ShardConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>, token: impl Into<String>) -> Self {
        Self { owner: owner.into(), repo: repo.into(), branch: branch.into(), token: token.into() }
    }
}

// Never print credentials, even at debug level.
impl std::fmt::Debug for ShardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Per-operation bounds on outbound content API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub probe: Duration,
    pub list: Duration,
    pub write: Duration,
    pub read: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            probe: Duration::from_secs(10),
            list: Duration::from_secs(15),
            write: Duration::from_secs(30),
            read: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub shards: Vec<ShardConfig>,
    pub api_base: String,
    pub user_agent: String,
    pub capacity_bytes: u64,
    pub high_water_percent: f64,
    pub max_file_size: usize,
    pub id_length: usize,
    pub timeouts: Timeouts,
}

impl StoreConfig {
    /// Build a config with the fixed limits for the given shard list.
    pub fn new(shards: Vec<ShardConfig>) -> Self {
        Self {
            shards,
            api_base: DEFAULT_API_BASE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            capacity_bytes: SHARD_CAPACITY_BYTES,
            high_water_percent: HIGH_WATER_PERCENT,
            max_file_size: MAX_FILE_SIZE,
            id_length: DEFAULT_ID_LENGTH,
            timeouts: Timeouts::default(),
        }
    }

    /// Reject configurations that cannot serve requests.
    pub fn validate(&self) -> AppResult<()> {
        if self.shards.is_empty() {
            return Err(AppError::config("at least one shard must be configured"));
        }
        for (i, s) in self.shards.iter().enumerate() {
            let missing = [("owner", &s.owner), ("repo", &s.repo), ("branch", &s.branch), ("token", &s.token)]
                .into_iter()
                .find(|(_, v)| v.trim().is_empty())
                .map(|(k, _)| k);
            if let Some(field) = missing {
                return Err(AppError::config(format!("shard {} is missing required field '{}'", i, field)));
            }
        }
        if self.id_length == 0 {
            return Err(AppError::config("identifier length must be positive"));
        }
        Ok(())
    }

    /// Parse a JSON array of shard objects.
    pub fn parse_shards(json: &str) -> AppResult<Vec<ShardConfig>> {
        serde_json::from_str::<Vec<ShardConfig>>(json)
            .map_err(|e| AppError::config(format!("invalid shard configuration: {}", e)))
    }

    /// Load from `SHARDSTORE_SHARDS_FILE` (or the explicit override) or inline `SHARDSTORE_SHARDS`.
    pub fn from_env(shards_file: Option<&str>) -> AppResult<Self> {
        Self::from_lookup(shards_file, |k| std::env::var(k).ok())
    }

    /// Same as [`StoreConfig::from_env`] over an arbitrary variable source.
    /// A shards file (flag first, then variable) wins over inline JSON.
    pub fn from_lookup(shards_file: Option<&str>, var: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let file = shards_file.map(|s| s.to_string()).or_else(|| var("SHARDSTORE_SHARDS_FILE"));
        let raw = match file {
            Some(path) => std::fs::read_to_string(&path)
                .map_err(|e| AppError::config(format!("cannot read shards file {}: {}", path, e)))?,
            None => var("SHARDSTORE_SHARDS").ok_or_else(|| AppError::config("set SHARDSTORE_SHARDS_FILE or SHARDSTORE_SHARDS"))?,
        };
        let mut cfg = Self::new(Self::parse_shards(&raw)?);
        if let Some(base) = var("SHARDSTORE_API_BASE") {
            let base = base.trim();
            if !base.is_empty() { cfg.api_base = base.trim_end_matches('/').to_string(); }
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self { Self { bind: "0.0.0.0".to_string(), http_port: 7878 } }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        if let Some(p) = var("SHARDSTORE_HTTP_PORT").and_then(|v| v.trim().parse::<u16>().ok()) {
            cfg.http_port = p;
        }
        if let Some(b) = var("SHARDSTORE_BIND") {
            if !b.trim().is_empty() { cfg.bind = b.trim().to_string(); }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_defaults_branch() {
        let shards = StoreConfig::parse_shards(r#"[{"owner":"o","repo":"r1","token":"t"},{"owner":"o","repo":"r2","branch":"data","token":"t"}]"#).unwrap();
        assert_eq!(shards[0].branch, "main");
        assert_eq!(shards[1].branch, "data");
        let cfg = StoreConfig::new(shards);
        cfg.validate().unwrap();
        assert_eq!(cfg.capacity_bytes, 100 * 1024 * 1024);
        assert_eq!(cfg.max_file_size, 5 * 1024 * 1024);
    }

    #[test]
    fn rejects_missing_fields() {
        let err = StoreConfig::parse_shards(r#"[{"owner":"o","token":"t"}]"#).unwrap_err();
        assert_eq!(err.code_str(), "CONFIG_ERROR");

        let cfg = StoreConfig::new(vec![ShardConfig::new("o", "r", "main", "  ")]);
        let err = cfg.validate().unwrap_err();
        assert!(err.message().contains("token"));

        assert!(StoreConfig::new(vec![]).validate().is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let s = ShardConfig::new("o", "r", "main", "ghp_secret");
        let dbg = format!("{:?}", s);
        assert!(!dbg.contains("ghp_secret"));
        assert!(dbg.contains("redacted"));
    }

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: std::collections::HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    fn write_shards_file(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("shardstore-{}-{}.json", name, std::process::id()));
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn shards_file_wins_over_inline_json() {
        let path = write_shards_file("precedence", r#"[{"owner":"o","repo":"from_file","token":"t"}]"#);
        let p = path.to_str().unwrap();
        let inline = r#"[{"owner":"o","repo":"inline","token":"t"}]"#;

        let cfg = StoreConfig::from_lookup(None, vars(&[("SHARDSTORE_SHARDS_FILE", p), ("SHARDSTORE_SHARDS", inline)])).unwrap();
        assert_eq!(cfg.shards[0].repo, "from_file");

        let cfg = StoreConfig::from_lookup(None, vars(&[("SHARDSTORE_SHARDS", inline)])).unwrap();
        assert_eq!(cfg.shards[0].repo, "inline");
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);

        // --shards-file overrides the variable
        let other = write_shards_file("flag", r#"[{"owner":"o","repo":"from_flag","token":"t"}]"#);
        let cfg = StoreConfig::from_lookup(other.to_str(), vars(&[("SHARDSTORE_SHARDS_FILE", p)])).unwrap();
        assert_eq!(cfg.shards[0].repo, "from_flag");

        let _ = std::fs::remove_file(path);
        let _ = std::fs::remove_file(other);
    }

    #[test]
    fn env_loading_errors_and_api_base_trimming() {
        let inline = r#"[{"owner":"o","repo":"r","token":"t"}]"#;
        let cfg = StoreConfig::from_lookup(None, vars(&[("SHARDSTORE_SHARDS", inline), ("SHARDSTORE_API_BASE", "  http://127.0.0.1:9000/ ")])).unwrap();
        assert_eq!(cfg.api_base, "http://127.0.0.1:9000");

        let cfg = StoreConfig::from_lookup(None, vars(&[("SHARDSTORE_SHARDS", inline), ("SHARDSTORE_API_BASE", "   ")])).unwrap();
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);

        assert_eq!(StoreConfig::from_lookup(None, vars(&[])).unwrap_err().code_str(), "CONFIG_ERROR");
        let missing = std::env::temp_dir().join("shardstore-does-not-exist.json");
        let err = StoreConfig::from_lookup(missing.to_str(), vars(&[])).unwrap_err();
        assert!(err.message().contains("cannot read shards file"));
        assert_eq!(StoreConfig::from_lookup(None, vars(&[("SHARDSTORE_SHARDS", "[]")])).unwrap_err().code_str(), "CONFIG_ERROR");
    }

    #[test]
    fn server_config_from_variables() {
        assert_eq!(ServerConfig::from_lookup(vars(&[])), ServerConfig::default());
        let cfg = ServerConfig::from_lookup(vars(&[("SHARDSTORE_HTTP_PORT", "9090"), ("SHARDSTORE_BIND", "127.0.0.1")]));
        assert_eq!(cfg.http_port, 9090);
        assert_eq!(cfg.bind, "127.0.0.1");
        let cfg = ServerConfig::from_lookup(vars(&[("SHARDSTORE_HTTP_PORT", "not-a-port"), ("SHARDSTORE_BIND", " ")]));
        assert_eq!(cfg, ServerConfig::default());
    }
}
