//! Remote image fetching over HTTP.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{StatusCode, Url};
use std::time::{Duration, Instant};

use crate::config::LimitsConfig;
use crate::error::SourceError;

/// Something that can turn a URL into raw image bytes.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download the body at `url`.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError>;
}

/// Check that `url` is a non-empty absolute http(s) URL.
pub fn validate_url(url: &str) -> Result<Url, SourceError> {
    if url.is_empty() {
        return Err(SourceError::EmptyUrl);
    }

    let parsed = Url::parse(url).map_err(|e| SourceError::InvalidUrl(e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(SourceError::InvalidUrl(
            "scheme must be http or https".to_string(),
        )),
    }
}

/// [`ImageFetcher`] backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
    max_mb: u64,
}

impl HttpFetcher {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(limits.fetch_timeout_ms),
            max_bytes: limits.max_input_bytes(),
            max_mb: limits.max_input_mb,
        }
    }

    fn too_large(&self) -> SourceError {
        SourceError::TooLarge {
            max_mb: self.max_mb,
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let url = validate_url(url)?;
        let start = Instant::now();

        let resp = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SourceError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        if resp.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(self.too_large());
        }

        let mut body = Vec::with_capacity(resp.content_length().unwrap_or(0) as usize);
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| SourceError::Read(e.to_string()))?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(SourceError::EmptyFile);
        }

        tracing::debug!(
            "Fetched {} ({} bytes) in {:?}",
            url,
            body.len(),
            start.elapsed()
        );
        Ok(body)
    }
}
