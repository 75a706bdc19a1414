//! HTTP client for a Supabase-compatible storage API.
//!
//! Objects live at `{base}/storage/v1/object/{bucket}/{path}`; public reads go
//! through `{base}/storage/v1/object/public/{bucket}/{path}`. Every write sends
//! the service key both as a bearer token and as the `apikey` header.

use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::{header, Client, Response, Url};

use crate::error::StorageError;

const OBJECT_SEGMENTS: [&str; 3] = ["storage", "v1", "object"];
const PUBLIC_SEGMENT: &str = "public";

/// Client for one storage bucket.
///
/// Use [`StorageClient::new`] with the deployment's base URL; tests point it
/// at a wiremock server the same way.
pub struct StorageClient {
    client: Client,
    base_url: Url,
    service_key: String,
    bucket: String,
}

impl std::fmt::Debug for StorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageClient")
            .field("base_url", &self.base_url.as_str())
            .field("service_key", &"[redacted]")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl StorageClient {
    /// Creates a client for `bucket` under `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StorageError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute http(s) URL.
    pub fn new(
        base_url: &str,
        service_key: &str,
        bucket: &str,
        timeout_secs: u64,
    ) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("akaun/0.1 (feedback-images)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised)
            .map_err(|_| StorageError::InvalidBaseUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(StorageError::InvalidBaseUrl(base_url.to_string()));
        }

        Ok(Self {
            client,
            base_url: parsed,
            service_key: service_key.to_owned(),
            bucket: bucket.to_owned(),
        })
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Uploads `bytes` to `path` and returns the object's public URL.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Api`] if the storage API rejects the upload (for
    ///   example because the object already exists).
    /// - [`StorageError::Http`] on network failure.
    pub async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let url = self.object_url(&[], path);
        let size = bytes.len();
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check_status(response).await?;

        tracing::debug!(bucket = %self.bucket, path, size, "uploaded object");
        Ok(self.public_url(path))
    }

    /// Deletes the object at `path`.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Api`] if the storage API rejects the delete,
    ///   including when the object does not exist.
    /// - [`StorageError::Http`] on network failure.
    pub async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let url = self.object_url(&[], path);
        let response = self
            .client
            .delete(url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .send()
            .await?;
        Self::check_status(response).await?;

        tracing::debug!(bucket = %self.bucket, path, "removed object");
        Ok(())
    }

    /// Public download URL for `path`.
    #[must_use]
    pub fn public_url(&self, path: &str) -> String {
        self.object_url(&[PUBLIC_SEGMENT], path).to_string()
    }

    /// Recovers the object path from a URL produced by [`Self::public_url`].
    ///
    /// Returns `None` for URLs on another host, in another bucket, or that
    /// do not point at an object.
    #[must_use]
    pub fn object_path_from_public_url(&self, url: &str) -> Option<String> {
        let url = Url::parse(url).ok()?;
        if url.scheme() != self.base_url.scheme()
            || url.host_str() != self.base_url.host_str()
            || url.port_or_known_default() != self.base_url.port_or_known_default()
        {
            return None;
        }

        let prefix = self.public_prefix_segments();
        let segments: Vec<&str> = url.path_segments()?.collect();
        if segments.len() <= prefix.len() || segments[..prefix.len()] != prefix[..] {
            return None;
        }

        let decoded: Vec<String> = segments[prefix.len()..]
            .iter()
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        if decoded.iter().any(String::is_empty) {
            return None;
        }
        Some(decoded.join("/"))
    }

    /// Segments from the host root up to and including the bucket of a public URL.
    fn public_prefix_segments(&self) -> Vec<&str> {
        let mut prefix: Vec<&str> = self
            .base_url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        prefix.extend(OBJECT_SEGMENTS);
        prefix.push(PUBLIC_SEGMENT);
        prefix.push(&self.bucket);
        prefix
    }

    /// Builds `{base}/storage/v1/object[/{extra}]/{bucket}/{path}` with each
    /// segment percent-encoded.
    fn object_url(&self, extra: &[&str], path: &str) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are always editable.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(OBJECT_SEGMENTS)
                .extend(extra)
                .push(&self.bucket)
                .extend(path.split('/').filter(|s| !s.is_empty()));
        }
        url
    }

    /// Maps a non-2xx response to [`StorageError::Api`], preferring the
    /// `message` field of a JSON error body.
    async fn check_status(response: Response) -> Result<(), StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.to_string()
                } else {
                    body
                }
            });

        Err(StorageError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
