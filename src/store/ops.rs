//! Object write and read paths.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::{SecondsFormat, Utc};
use tracing::{error, info};

use crate::config::{ShardConfig, StoreConfig, UPLOADS_DIR};
use crate::error::{AppError, AppResult};

use super::content_api::ContentApi;
use super::ident::generate_id;
use super::mime::{media_type_for, storage_extension};
use super::selector::select_writable;
use super::types::{FetchedObject, ObjectRecord};

/// Human-readable byte count (`1.5 MB`), used in size-limit messages.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 { return "0 Bytes".to_string(); }
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Trim a caller-supplied label and replace anything outside `[A-Za-z0-9._-]`.
/// Returns None when nothing usable remains.
pub fn sanitize_label(label: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() { return None; }
    Some(trimmed.chars().map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' }).collect())
}

/// `{label}_{token}.{ext}` with a label, `{token}.{ext}` without.
pub fn storage_file_name(label: Option<&str>, token: &str, ext: &str) -> String {
    match label {
        Some(l) => format!("{}_{}.{}", l, token, ext),
        None => format!("{}.{}", token, ext),
    }
}

pub fn storage_path(file_name: &str) -> String {
    format!("{}/{}", UPLOADS_DIR, file_name)
}

/// Names addressed by callers must stay inside the uploads directory.
pub fn validate_object_name(file_name: &str) -> AppResult<()> {
    if file_name.is_empty() || file_name == "." || file_name == ".." || file_name.contains('/') || file_name.contains('\\') || file_name.contains('\0') {
        return Err(AppError::user(format!("invalid file name '{}'", file_name)));
    }
    Ok(())
}

pub fn shard_at(shards: &[ShardConfig], index: usize) -> AppResult<&ShardConfig> {
    shards.get(index).ok_or_else(|| AppError::invalid_shard(format!("Invalid repo index {} (configured: {})", index, shards.len())))
}

/// Place and commit one object. The size ceiling is enforced before any
/// network call; everything after that is exactly one probe sweep and one
/// commit to one shard. Failures are returned, never retried.
pub async fn write_object(
    api: &dyn ContentApi,
    cfg: &StoreConfig,
    original_name: &str,
    bytes: &[u8],
    custom_label: Option<&str>,
) -> AppResult<ObjectRecord> {
    let size = bytes.len() as u64;
    if bytes.len() > cfg.max_file_size {
        return Err(AppError::size_limit(format!(
            "File size exceeds {} limit ({})",
            format_file_size(cfg.max_file_size as u64).replace(' ', ""),
            format_file_size(size)
        )));
    }

    let selection = select_writable(api, &cfg.shards, cfg.capacity_bytes, cfg.high_water_percent).await?;
    let media_type = media_type_for(original_name);
    let ext = storage_extension(original_name);
    let token = generate_id(cfg.id_length)?;
    let label = custom_label.and_then(sanitize_label);
    let file_name = storage_file_name(label.as_deref(), &token, &ext);
    let git_path = storage_path(&file_name);
    let content = STANDARD.encode(bytes);
    let message = format!("Upload file {}", file_name);

    let committed = api.put_content(&selection.shard, &git_path, &message, &content).await.map_err(|e| {
        error!(target: "shardstore::write", index = selection.index, repo = %selection.shard.repo, status = ?e.status, error = %e, "commit failed");
        AppError::upstream(e.message)
    })?;

    info!(target: "shardstore::write", index = selection.index, repo = %selection.shard.repo, path = %git_path, size, exhausted = selection.exhausted, "object committed");

    let custom_name = custom_label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| original_name.to_string());

    Ok(ObjectRecord {
        original_name: original_name.to_string(),
        custom_name,
        file_name,
        git_path,
        size,
        media_type: media_type.to_string(),
        repo_index: selection.index,
        repo_name: selection.shard.repo.clone(),
        sha: committed.sha,
        download_url: committed.download_url,
        html_url: committed.html_url,
        uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Fetch raw bytes from the shard the caller names. There is no fallback scan.
pub async fn read_object(api: &dyn ContentApi, shards: &[ShardConfig], file_name: &str, shard_index: usize) -> AppResult<FetchedObject> {
    let shard = shard_at(shards, shard_index)?;
    validate_object_name(file_name)?;
    let bytes = api.get_raw(shard, &storage_path(file_name)).await.map_err(|e| {
        if e.is_not_found() {
            AppError::not_found(format!("File {} not found in repo {}", file_name, shard_index))
        } else {
            error!(target: "shardstore::read", index = shard_index, repo = %shard.repo, error = %e, "raw read failed");
            AppError::upstream(e.message)
        }
    })?;
    Ok(FetchedObject { bytes, content_type: media_type_for(file_name).to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_format_like_the_upload_page() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5 MB");
        assert_eq!(format_file_size(6 * 1024 * 1024 + 300 * 1024), "6.29 MB");
    }

    #[test]
    fn labels_are_sanitized() {
        assert_eq!(sanitize_label("  my photo!.v2 "), Some("my_photo_.v2".to_string()));
        assert_eq!(sanitize_label("ok-name_1"), Some("ok-name_1".to_string()));
        assert_eq!(sanitize_label("   "), None);
        assert_eq!(sanitize_label("ünï"), Some("___".to_string()));
    }

    #[test]
    fn storage_names() {
        assert_eq!(storage_file_name(Some("myphoto"), "Ab3dE9", "png"), "myphoto_Ab3dE9.png");
        assert_eq!(storage_file_name(None, "Ab3dE9", "png"), "Ab3dE9.png");
        assert_eq!(storage_path("Ab3dE9.png"), "uploads/Ab3dE9.png");
    }

    #[test]
    fn object_names_stay_in_uploads() {
        assert!(validate_object_name("a.png").is_ok());
        assert!(validate_object_name("../secret").is_err());
        assert!(validate_object_name("a/b.png").is_err());
        assert!(validate_object_name("").is_err());
    }
}
