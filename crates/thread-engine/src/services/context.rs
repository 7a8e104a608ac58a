//! Engine context - dependency container for the engine services
//!
//! Holds the store ports every service needs. Cloning is cheap; the
//! underlying adapters are shared.

use std::sync::Arc;

use thread_core::{BlobStore, CommentRepository};

/// Dependency container passed to all engine services
#[derive(Clone)]
pub struct EngineContext {
    comments: Arc<dyn CommentRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl EngineContext {
    /// Create a new engine context
    pub fn new(comments: Arc<dyn CommentRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { comments, blobs }
    }

    /// Get the comment repository
    pub fn comments(&self) -> &dyn CommentRepository {
        self.comments.as_ref()
    }

    /// Get the blob store
    pub fn blobs(&self) -> &dyn BlobStore {
        self.blobs.as_ref()
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("comments", &"dyn CommentRepository")
            .field("blobs", &"dyn BlobStore")
            .finish()
    }
}
