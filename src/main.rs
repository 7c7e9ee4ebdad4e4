//!
//! shardstore server binary
//! ------------------------
//! Loads and validates the shard list, then serves the HTTP API.
//! Configuration comes from environment variables; CLI flags override them.

use std::env;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use shardstore::config::{ServerConfig, StoreConfig};
use shardstore::store::ShardStore;

fn parse_port_arg(args: &[String], flag: &str) -> Option<u16> {
    let mut i = 0;
    while i < args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return args[i + 1].parse::<u16>().ok();
        }
        i += 1;
    }
    None
}

fn parse_string_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("shardstore\n\nUSAGE:\n  shardstore [--http-port N] [--shards-file PATH]\n\nOPTIONS:\n  --http-port N        HTTP port (env: SHARDSTORE_HTTP_PORT, default 7878)\n  --shards-file PATH   JSON array of {{owner, repo, branch, token}} (env: SHARDSTORE_SHARDS_FILE,\n                       or inline JSON in SHARDSTORE_SHARDS)\n\nENV:\n  SHARDSTORE_BIND      bind address (default 0.0.0.0)\n  SHARDSTORE_API_BASE  content API base URL (default https://api.github.com)\n  RUST_LOG             log filter (default info)\n");
        return Ok(());
    }

    let mut server = ServerConfig::from_env();
    if let Some(p) = parse_port_arg(&args, "--http-port") {
        server.http_port = p;
    }
    let shards_file = parse_string_arg(&args, "--shards-file");

    // Reject bad shard definitions before binding anything
    let store_cfg = StoreConfig::from_env(shards_file.as_deref())?;
    info!(
        target: "startup",
        "shardstore starting: http_port={}, bind={}, shards={}, api_base={}",
        server.http_port, server.bind, store_cfg.shards.len(), store_cfg.api_base
    );
    for (i, s) in store_cfg.shards.iter().enumerate() {
        info!(target: "startup", "shard {}: {}/{}@{}", i, s.owner, s.repo, s.branch);
    }

    let store = Arc::new(ShardStore::github(store_cfg)?);
    shardstore::server::run(&server, store).await
}
