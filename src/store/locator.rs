//! Public, externally resolvable URLs for stored objects.
//!
//! URLs point back at this service's `/files/{shard}/{name}` route rather than
//! at the upstream content API, so upstream credentials and locations never
//! leave the process.

use axum::http::HeaderMap;

/// What the locator needs to know about the inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub forwarded_proto: Option<String>,
    pub forwarded_host: Option<String>,
    pub host: Option<String>,
    pub transport_scheme: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self { forwarded_proto: None, forwarded_host: None, host: None, transport_scheme: "http".to_string() }
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap, transport_scheme: &str) -> Self {
        Self {
            forwarded_proto: header_str(headers, "x-forwarded-proto"),
            forwarded_host: header_str(headers, "x-forwarded-host"),
            host: header_str(headers, "host"),
            transport_scheme: transport_scheme.to_string(),
        }
    }

    /// First value of `X-Forwarded-Proto` when present, else the transport scheme.
    pub fn scheme(&self) -> String {
        self.forwarded_proto
            .as_deref()
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.transport_scheme.clone())
    }

    pub fn host(&self) -> String {
        self.forwarded_host
            .as_deref()
            .and_then(|v| v.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| self.host.clone())
            .unwrap_or_else(|| "localhost".to_string())
    }
}

pub fn public_url(ctx: &RequestContext, file_name: &str, shard_index: usize) -> String {
    format!("{}://{}/files/{}/{}", ctx.scheme(), ctx.host(), shard_index, urlencoding::encode(file_name))
}
