//! File host client
//!
//! The video backend is a bot-style file hosting API: a metadata lookup
//! exchanges an opaque file handle for a short-lived signed URL, and the
//! blob is then fetched from that URL (optionally with a Range header).
//! Signed URLs are never cached, so every stream/download request pays one
//! lookup round trip before the first byte.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Connect timeout for upstream requests. No total timeout is set: media
/// streams legitimately stay open for the length of a feature film.
const CONNECT_TIMEOUT_SECS: u64 = 10;

lazy_static! {
    static ref HANDLE_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

/// File host API errors
#[derive(Debug, Error)]
pub enum FileHostError {
    #[error("file not found on host")]
    NotFound,
    #[error("file host API error: {0}")]
    Api(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("upstream HTTP error: {0}")]
    Http(u16),
}

/// Metadata envelope returned by the lookup endpoint
#[derive(Debug, Deserialize)]
struct LookupEnvelope {
    ok: bool,
    description: Option<String>,
    result: Option<RemoteFileInfo>,
}

/// File metadata from the host
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteFileInfo {
    pub file_id: String,
    pub file_unique_id: Option<String>,
    pub file_size: Option<u64>,
    pub file_path: Option<String>,
}

/// A handle resolved to a fetchable signed URL
#[derive(Debug, Clone)]
pub struct ResolvedFile {
    pub url: String,
    pub size: Option<u64>,
}

/// Outcome of an admin-side handle validation
#[derive(Debug, Clone)]
pub struct HandleValidation {
    pub valid: bool,
    pub size: Option<u64>,
    pub error: Option<String>,
}

/// Client for the file host metadata + blob API
#[derive(Clone)]
pub struct FileHostClient {
    http: Client,
    api_base: String,
    token: String,
    lookup_timeout: Duration,
}

impl FileHostClient {
    pub fn new(api_base: &str, token: &str, lookup_timeout_ms: u64) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            lookup_timeout: Duration::from_millis(lookup_timeout_ms),
        }
    }

    /// Shallow format check for a file handle: allow-listed character
    /// class plus a minimum length. Not a structural or cryptographic
    /// guarantee.
    pub fn is_valid_handle(handle: &str) -> bool {
        handle.len() > 10 && HANDLE_RE.is_match(handle)
    }

    /// Exchange a handle for a signed blob URL via the metadata endpoint.
    /// The lookup itself is latency-bounded; nothing is cached.
    pub async fn resolve(&self, handle: &str) -> Result<ResolvedFile, FileHostError> {
        let url = format!(
            "{}/bot{}/getFile?file_id={}",
            self.api_base,
            self.token,
            urlencoding::encode(handle)
        );

        debug!("File host lookup for handle {}", handle);

        let response = self
            .http
            .get(&url)
            .timeout(self.lookup_timeout)
            .send()
            .await
            .map_err(|e| FileHostError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            // The host answers 400/404 for unknown or revoked handles
            return Err(FileHostError::NotFound);
        }
        if !status.is_success() {
            return Err(FileHostError::Http(status.as_u16()));
        }

        let envelope: LookupEnvelope = response
            .json()
            .await
            .map_err(|e| FileHostError::Api(e.to_string()))?;

        if !envelope.ok {
            return Err(FileHostError::Api(
                envelope
                    .description
                    .unwrap_or_else(|| "lookup rejected".to_string()),
            ));
        }

        let info = envelope.result.ok_or(FileHostError::NotFound)?;
        let path = info.file_path.ok_or(FileHostError::NotFound)?;

        Ok(ResolvedFile {
            url: self.blob_url(&path),
            size: info.file_size,
        })
    }

    /// Fetch a resolved blob URL, forwarding an optional Range header.
    /// Returns the raw response so the caller can relay the body stream.
    pub async fn fetch(
        &self,
        url: &str,
        range: Option<&str>,
    ) -> Result<reqwest::Response, FileHostError> {
        let mut request = self.http.get(url);
        if let Some(range) = range {
            request = request.header(reqwest::header::RANGE, range);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FileHostError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FileHostError::Http(status.as_u16()));
        }

        Ok(response)
    }

    /// Admin-side check that a handle exists and is fetchable
    pub async fn validate(&self, handle: &str) -> HandleValidation {
        if !Self::is_valid_handle(handle) {
            return HandleValidation {
                valid: false,
                size: None,
                error: Some("Invalid file handle format".to_string()),
            };
        }

        match self.resolve(handle).await {
            Ok(resolved) => HandleValidation {
                valid: true,
                size: resolved.size,
                error: None,
            },
            Err(e) => HandleValidation {
                valid: false,
                size: None,
                error: Some(e.to_string()),
            },
        }
    }

    fn blob_url(&self, path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_validation_accepts_opaque_ids() {
        assert!(FileHostClient::is_valid_handle(
            "BAACAgUAAxkBAAIBcWXr0example"
        ));
        assert!(FileHostClient::is_valid_handle("abc_DEF-0123456789"));
    }

    #[test]
    fn handle_validation_rejects_short_or_dirty_input() {
        assert!(!FileHostClient::is_valid_handle("short"));
        assert!(!FileHostClient::is_valid_handle(""));
        assert!(!FileHostClient::is_valid_handle("has space in it here"));
        assert!(!FileHostClient::is_valid_handle("../../etc/passwd"));
        assert!(!FileHostClient::is_valid_handle("slash/inside/path"));
    }

    #[test]
    fn blob_url_construction() {
        let client = FileHostClient::new("https://files.example.com/", "123:token", 5000);
        assert_eq!(
            client.blob_url("videos/file_42.mp4"),
            "https://files.example.com/file/bot123:token/videos/file_42.mp4"
        );
        // Trailing slash on the base must not produce a double slash
        assert!(!client.blob_url("x").contains(".com//"));
    }
}
