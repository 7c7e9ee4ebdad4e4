//! Unified application error model and mapping helpers.
//! Every store operation returns one of these as a typed value; the HTTP layer
//! maps them onto status codes and the `{success:false, error, code}` body.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppError {
    SizeLimit { code: String, message: String },
    Upstream { code: String, message: String },
    InvalidShard { code: String, message: String },
    NotFound { code: String, message: String },
    UserInput { code: String, message: String },
    Config { code: String, message: String },
    Internal { code: String, message: String },
}

pub const SIZE_LIMIT: &str = "SIZE_LIMIT";
pub const GITHUB_ERROR: &str = "GITHUB_ERROR";
pub const INVALID_SHARD: &str = "INVALID_SHARD";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const BAD_REQUEST: &str = "BAD_REQUEST";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const INTERNAL: &str = "INTERNAL";

impl AppError {
    pub fn code_str(&self) -> &str {
        match self {
            AppError::SizeLimit { code, .. }
            | AppError::Upstream { code, .. }
            | AppError::InvalidShard { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::UserInput { code, .. }
            | AppError::Config { code, .. }
            | AppError::Internal { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::SizeLimit { message, .. }
            | AppError::Upstream { message, .. }
            | AppError::InvalidShard { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::UserInput { message, .. }
            | AppError::Config { message, .. }
            | AppError::Internal { message, .. } => message.as_str(),
        }
    }

    pub fn size_limit<S: Into<String>>(msg: S) -> Self { AppError::SizeLimit { code: SIZE_LIMIT.into(), message: msg.into() } }
    pub fn upstream<S: Into<String>>(msg: S) -> Self { AppError::Upstream { code: GITHUB_ERROR.into(), message: msg.into() } }
    pub fn invalid_shard<S: Into<String>>(msg: S) -> Self { AppError::InvalidShard { code: INVALID_SHARD.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(msg: S) -> Self { AppError::NotFound { code: NOT_FOUND.into(), message: msg.into() } }
    pub fn user<S: Into<String>>(msg: S) -> Self { AppError::UserInput { code: BAD_REQUEST.into(), message: msg.into() } }
    pub fn config<S: Into<String>>(msg: S) -> Self { AppError::Config { code: CONFIG_ERROR.into(), message: msg.into() } }
    pub fn internal<S: Into<String>>(msg: S) -> Self { AppError::Internal { code: INTERNAL.into(), message: msg.into() } }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AppError::SizeLimit { .. } => 413,
            AppError::Upstream { .. } => 502,
            AppError::InvalidShard { .. } => 400,
            AppError::NotFound { .. } => 404,
            AppError::UserInput { .. } => 400,
            AppError::Config { .. } => 500,
            AppError::Internal { .. } => 500,
        }
    }

    /// Caller-facing failure body: `{success:false, error, code}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "error": self.message(),
            "code": self.code_str(),
        })
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AppError {}

pub type AppResult<T> = Result<T, AppError>;

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        // Pass through a wrapped AppError untouched; anything else is internal
        match err.downcast::<AppError>() {
            Ok(app) => app,
            Err(other) => AppError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AppError::size_limit("too big").http_status(), 413);
        assert_eq!(AppError::upstream("bad gateway").http_status(), 502);
        assert_eq!(AppError::invalid_shard("nope").http_status(), 400);
        assert_eq!(AppError::not_found("missing").http_status(), 404);
        assert_eq!(AppError::user("oops").http_status(), 400);
        assert_eq!(AppError::config("no shards").http_status(), 500);
        assert_eq!(AppError::internal("panic").http_status(), 500);
    }

    #[test]
    fn codes_are_distinct_per_kind() {
        assert_eq!(AppError::size_limit("x").code_str(), "SIZE_LIMIT");
        assert_eq!(AppError::upstream("x").code_str(), "GITHUB_ERROR");
        assert_eq!(AppError::invalid_shard("x").code_str(), "INVALID_SHARD");
        assert_eq!(AppError::not_found("x").code_str(), "NOT_FOUND");
    }

    #[test]
    fn json_body_shape() {
        let v = AppError::size_limit("File size exceeds 5MB limit").to_json();
        assert_eq!(v["success"], false);
        assert_eq!(v["code"], "SIZE_LIMIT");
        assert_eq!(v["error"], "File size exceeds 5MB limit");
    }

    #[test]
    fn anyhow_roundtrip_keeps_kind() {
        let e: anyhow::Error = AppError::not_found("gone").into();
        let back: AppError = e.into();
        assert_eq!(back, AppError::not_found("gone"));
        let other: AppError = anyhow::anyhow!("boom").into();
        assert_eq!(other.code_str(), "INTERNAL");
    }
}
