use anyhow::Context;
use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::artifact::ArtifactType;
use crate::Result;

/// Artifact body as it arrives from the backend
pub type ChunkStream = BoxStream<'static, Result<Vec<u8>>>;

/// Artifact returned by the backend, not yet read
pub struct ArtifactPayload {
    pub chunks: ChunkStream,

    /// Content type reported by the backend, if any
    pub content_type: Option<String>,
}

impl ArtifactPayload {
    /// Payload whose body is already in memory
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self::from_stream(stream::iter(vec![Ok(bytes.into())]).boxed(), None)
    }

    pub fn from_stream(chunks: ChunkStream, content_type: Option<String>) -> Self {
        Self { chunks, content_type }
    }

    /// Read the whole body into memory
    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        self.chunks
            .try_fold(Vec::new(), |mut bytes, chunk| async move {
                bytes.extend_from_slice(&chunk);
                Ok(bytes)
            })
            .await
    }
}

impl fmt::Debug for ArtifactPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactPayload")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Backend that turns a reel URL into an artifact
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactService: Send + Sync {
    /// Request one artifact for the given reel URL
    async fn fetch(&self, artifact: ArtifactType, url: &str) -> Result<ArtifactPayload>;

    /// Human-readable name of the backend, for logs
    fn name(&self) -> String;
}

#[derive(Debug, Serialize)]
struct DownloadRequest<'a> {
    url: &'a str,
}

/// reqwest client for the `/download/{type}` backend
pub struct HttpArtifactService {
    client: Client,
    base_url: String,
}

impl HttpArtifactService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        validate_base_url(base_url)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full endpoint URL for an artifact type
    pub fn endpoint(&self, artifact: ArtifactType) -> Result<Url> {
        let raw = format!("{}/download/{}", self.base_url, artifact.slug());
        Url::parse(&raw).with_context(|| format!("Invalid endpoint URL: {}", raw))
    }
}

#[async_trait]
impl ArtifactService for HttpArtifactService {
    async fn fetch(&self, artifact: ArtifactType, url: &str) -> Result<ArtifactPayload> {
        let endpoint = self.endpoint(artifact)?;
        tracing::debug!("POST {}", endpoint);

        let response = self
            .client
            .post(endpoint)
            .json(&DownloadRequest { url })
            .send()
            .await
            .context("Failed to reach download backend")?;

        if !response.status().is_success() {
            anyhow::bail!("Download backend returned HTTP {}", response.status());
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|s| s.to_string());

        let chunks = response
            .bytes_stream()
            .map(|chunk| {
                chunk
                    .map(|bytes| bytes.to_vec())
                    .context("Failed to read artifact body")
            })
            .boxed();

        Ok(ArtifactPayload::from_stream(chunks, content_type))
    }

    fn name(&self) -> String {
        self.base_url.clone()
    }
}

/// Check that a backend base URL is an absolute http(s) URL
pub fn validate_base_url(base_url: &str) -> Result<Url> {
    let parsed = Url::parse(base_url)
        .map_err(|_| anyhow::anyhow!("Invalid backend URL: {}", base_url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Backend URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed)
}
