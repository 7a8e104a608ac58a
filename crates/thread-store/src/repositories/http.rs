//! HTTP implementation of CommentRepository

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::json;
use tracing::instrument;

use thread_core::{
    ChildQuery, CommentRecord, CommentRepository, DocumentId, NewComment, ParentId, RepoResult,
};

use crate::client::{
    AfterPosition, DocumentClient, FieldFilter, FieldIncrement, PatchRequest, QueryRequest,
};
use crate::models::{CommentDocument, NewCommentDocument};

/// HTTP implementation of CommentRepository
#[derive(Debug, Clone)]
pub struct HttpCommentRepository {
    client: DocumentClient,
    collection: String,
}

impl HttpCommentRepository {
    /// Create a repository over `client` for one collection
    pub fn new(client: DocumentClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl CommentRepository for HttpCommentRepository {
    #[instrument(skip(self, comment))]
    async fn create(&self, comment: &NewComment) -> RepoResult<DocumentId> {
        let document = NewCommentDocument::from(comment);
        let created = self.client.create(&self.collection, &document).await?;
        Ok(DocumentId::new(created.id))
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &DocumentId) -> RepoResult<Option<CommentRecord>> {
        let envelope = self
            .client
            .get::<CommentDocument>(&self.collection, id.as_str())
            .await?;
        Ok(envelope.map(|e| e.fields.into_record(DocumentId::new(e.id))))
    }

    #[instrument(skip(self))]
    async fn query_children(&self, query: &ChildQuery) -> RepoResult<Vec<CommentRecord>> {
        let after = match &query.after {
            Some(token) => {
                let position = token.decode(query.ordering)?;
                Some(AfterPosition {
                    value: position.sort_value,
                    id: position.doc_id.into_inner(),
                })
            }
            None => None,
        };

        let request = QueryRequest {
            filter: FieldFilter {
                field: "pid".to_string(),
                value: query.parent.as_str().to_string(),
            },
            order_by: query.ordering.sort_field().to_string(),
            direction: "desc".to_string(),
            limit: query.limit,
            after,
        };

        let envelopes = self
            .client
            .query::<CommentDocument>(&self.collection, &request)
            .await?;
        Ok(envelopes
            .into_iter()
            .map(|e| e.fields.into_record(DocumentId::new(e.id)))
            .collect())
    }

    #[instrument(skip(self))]
    async fn count_children(&self, parent: &ParentId) -> RepoResult<i64> {
        self.client
            .count(&self.collection, "pid", parent.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn increment_reaction(&self, id: &DocumentId, symbol: &str, by: i64) -> RepoResult<()> {
        let patch = PatchRequest {
            set: None,
            increment: Some(FieldIncrement {
                field: format!("reactions.{symbol}"),
                by,
            }),
        };
        self.client.patch(&self.collection, id.as_str(), &patch).await
    }

    #[instrument(skip(self, reactions))]
    async fn replace_reactions(
        &self,
        id: &DocumentId,
        reactions: &BTreeMap<String, i64>,
    ) -> RepoResult<()> {
        let patch = PatchRequest {
            set: Some(json!({ "reactions": reactions })),
            increment: None,
        };
        self.client.patch(&self.collection, id.as_str(), &patch).await
    }

    #[instrument(skip(self))]
    async fn increment_reaction_count(&self, id: &DocumentId, by: i64) -> RepoResult<()> {
        let patch = PatchRequest {
            set: None,
            increment: Some(FieldIncrement {
                field: "reactionCount".to_string(),
                by,
            }),
        };
        self.client.patch(&self.collection, id.as_str(), &patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpCommentRepository>();
    }
}
