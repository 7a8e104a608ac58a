//! Submission - validating and persisting new comments, uploading attachments

use tracing::{info, instrument};
use uuid::Uuid;

use thread_core::{CommentDraft, DocumentId, ParentId, RepoResult, Session};

use super::context::EngineContext;

/// Submission service
pub struct SubmissionService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> SubmissionService<'a> {
    /// Create a new SubmissionService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Validate and persist a draft as a child of `parent`.
    ///
    /// Validation runs before any store write: a draft with neither text nor
    /// attachments never reaches the network. The author fields are stamped
    /// from the session passed in, never from ambient state.
    #[instrument(skip(self, draft, session))]
    pub async fn submit(
        &self,
        parent: &ParentId,
        draft: CommentDraft,
        session: &Session,
    ) -> RepoResult<DocumentId> {
        draft.check()?;
        let comment = draft.into_new_comment(session, parent.clone());
        let id = self.ctx.comments().create(&comment).await?;
        info!(comment_id = %id, parent = %parent, "Comment submitted");
        Ok(id)
    }

    /// Upload one attachment and return its durable URL.
    ///
    /// Uploads happen before submission; a failed upload therefore never
    /// leaves a partially-written comment behind.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload_attachment(&self, filename: &str, bytes: Vec<u8>) -> RepoResult<String> {
        let path = format!("files/{filename}-{}", Uuid::new_v4());
        let url = self.ctx.blobs().put(&path, bytes).await?;
        info!(%path, "Attachment uploaded");
        Ok(url)
    }
}
