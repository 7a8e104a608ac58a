//! Test helpers - engine instances wired to in-memory stores

use std::sync::Arc;

use thread_core::{CommentRepository, DocumentId, ParentId};
use thread_engine::{CommentThread, EngineContext};
use thread_store::{MemoryBlobStore, MemoryCommentStore};

use crate::fixtures;

/// An engine wired to fresh in-memory stores, with handles kept for
/// inspection and fault injection
pub struct TestThread {
    pub thread: CommentThread,
    pub comments: Arc<MemoryCommentStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestThread {
    /// Build an engine over empty stores
    pub fn new() -> Self {
        let _ = thread_common::try_init_tracing();
        let comments = Arc::new(MemoryCommentStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let ctx = EngineContext::new(comments.clone(), blobs.clone());
        Self {
            thread: CommentThread::new(ctx),
            comments,
            blobs,
        }
    }

    /// Write one comment straight into the store
    pub async fn seed(&self, text: &str, pid: ParentId) -> DocumentId {
        self.comments
            .create(&fixtures::new_comment(text, pid))
            .await
            .expect("seed comment")
    }

    /// Write `n` top-level comments, returning their ids in write order
    pub async fn seed_top_level(&self, n: usize) -> Vec<DocumentId> {
        let mut ids = Vec::with_capacity(n);
        for i in 0..n {
            ids.push(self.seed(&format!("comment {i}"), ParentId::top_level()).await);
        }
        ids
    }
}

impl Default for TestThread {
    fn default() -> Self {
        Self::new()
    }
}
