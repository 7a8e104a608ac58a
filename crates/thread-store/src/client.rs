//! HTTP/JSON client for the remote document store
//!
//! Speaks a small REST surface: create, read, patch (field set or atomic
//! increment), filtered/ordered/limited range query with continuation, and
//! count. The engine above never sees HTTP; all failures are mapped into the
//! domain taxonomy here.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

use thread_common::StoreConfig;
use thread_core::{DocumentId, DomainError, RepoResult};

use crate::models::DocumentEnvelope;

/// Client for one document-store deployment
#[derive(Debug, Clone)]
pub struct DocumentClient {
    http: reqwest::Client,
    base_url: String,
}

/// Response to a create: the store assigns id and creation timestamp
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedDocument {
    pub id: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Equality filter on one field
#[derive(Debug, Clone, Serialize)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
}

/// Continuation position: resume strictly after (value, id) in sort order
#[derive(Debug, Clone, Serialize)]
pub struct AfterPosition {
    pub value: i64,
    pub id: String,
}

/// Range query request body
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    pub filter: FieldFilter,
    pub order_by: String,
    pub direction: String,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<AfterPosition>,
}

/// Patch body: either a partial field set or one atomic increment
#[derive(Debug, Clone, Serialize)]
pub struct PatchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub increment: Option<FieldIncrement>,
}

/// Atomic increment of one numeric field
#[derive(Debug, Clone, Serialize)]
pub struct FieldIncrement {
    pub field: String,
    pub by: i64,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: i64,
}

impl DocumentClient {
    /// Build a client from store configuration
    pub fn new(config: &StoreConfig) -> RepoResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(map_transport_error)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a document; the store assigns id and creation timestamp
    #[instrument(skip(self, fields))]
    pub async fn create<B: Serialize + Sync>(
        &self,
        collection: &str,
        fields: &B,
    ) -> RepoResult<CreatedDocument> {
        let url = format!("{}/{collection}", self.base_url);
        let response = self
            .http
            .post(url)
            .json(fields)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response, None)?;
        response.json().await.map_err(map_transport_error)
    }

    /// Fetch one document by id, `None` when it does not exist
    #[instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> RepoResult<Option<DocumentEnvelope<T>>> {
        let url = format!("{}/{collection}/{id}", self.base_url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, None)?;
        let envelope = response.json().await.map_err(map_transport_error)?;
        Ok(Some(envelope))
    }

    /// Apply a patch to one document
    #[instrument(skip(self, patch))]
    pub async fn patch(&self, collection: &str, id: &str, patch: &PatchRequest) -> RepoResult<()> {
        let url = format!("{}/{collection}/{id}", self.base_url);
        let response = self
            .http
            .patch(url)
            .json(patch)
            .send()
            .await
            .map_err(map_transport_error)?;
        check_status(response, Some(id)).map(|_| ())
    }

    /// Run a filtered, ordered, limited range query
    #[instrument(skip(self, query))]
    pub async fn query<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &QueryRequest,
    ) -> RepoResult<Vec<DocumentEnvelope<T>>> {
        let url = format!("{}/{collection}/query", self.base_url);
        let response = self
            .http
            .post(url)
            .json(query)
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response, None)?;
        response.json().await.map_err(map_transport_error)
    }

    /// Count documents matching an equality filter
    #[instrument(skip(self))]
    pub async fn count(&self, collection: &str, field: &str, value: &str) -> RepoResult<i64> {
        let url = format!("{}/{collection}/count", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&[("field", field), ("value", value)])
            .send()
            .await
            .map_err(map_transport_error)?;
        let response = check_status(response, None)?;
        let body: CountResponse = response.json().await.map_err(map_transport_error)?;
        Ok(body.count)
    }
}

/// Map transport-level failures (connect, timeout, decode) into the domain
fn map_transport_error(e: reqwest::Error) -> DomainError {
    DomainError::Transient(e.to_string())
}

/// Map non-success statuses; 404 on a targeted document becomes "not found"
fn check_status(
    response: reqwest::Response,
    document_id: Option<&str>,
) -> RepoResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = document_id {
            return Err(DomainError::CommentNotFound(DocumentId::new(id)));
        }
    }
    Err(DomainError::Transient(format!(
        "store returned status {status}"
    )))
}
