//! Blob store implementations - bytes in, durable URL out

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use tracing::instrument;

use thread_common::BlobConfig;
use thread_core::{BlobStore, DomainError, RepoResult};

/// HTTP implementation of BlobStore
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    url: String,
}

impl HttpBlobStore {
    /// Build a blob store client from configuration
    pub fn new(config: &BlobConfig) -> RepoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DomainError::Transient(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    async fn put(&self, path: &str, bytes: Vec<u8>) -> RepoResult<String> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .http
            .put(url)
            .body(bytes)
            .send()
            .await
            .map_err(|e| DomainError::Transient(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DomainError::Transient(format!(
                "blob store returned status {}",
                response.status()
            )));
        }
        let body: PutResponse = response
            .json()
            .await
            .map_err(|e| DomainError::Transient(e.to_string()))?;
        Ok(body.url)
    }
}

/// In-memory blob store for tests and local tooling
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: DashMap<String, Vec<u8>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Snapshot one stored object
    pub fn stored(&self, path: &str) -> Option<Vec<u8>> {
        self.objects.get(path).map(|v| v.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, bytes: Vec<u8>) -> RepoResult<String> {
        self.objects.insert(path.to_string(), bytes);
        Ok(format!("memory://{path}"))
    }
}
