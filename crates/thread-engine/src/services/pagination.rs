//! Pagination - cursor-managed page fetches for one (parent, ordering) scope
//!
//! Page boundaries are stable only while no record is inserted or removed
//! ahead of the cursor between fetches. Concurrent writes may surface a
//! record on two adjacent pages or skip one; that is accepted
//! eventual-consistency behavior, not something to paper over here.

use tracing::instrument;

use thread_core::{
    ChildQuery, CommentRecord, DomainError, OrderingMode, PageCursor, ParentId, RepoResult,
};

use super::context::EngineContext;

/// One fetched page and the cursor trailing it
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<CommentRecord>,
    pub cursor: PageCursor,
}

/// Cursor-managed page fetcher
pub struct Pager<'a> {
    ctx: &'a EngineContext,
}

impl<'a> Pager<'a> {
    /// Create a new Pager
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Fetch page 1 of a scope: no continuation token
    #[instrument(skip(self))]
    pub async fn first_page(&self, parent: &ParentId, ordering: OrderingMode) -> RepoResult<Page> {
        let query = ChildQuery::first_page(parent.clone(), ordering);
        let records = self.ctx.comments().query_children(&query).await?;
        let cursor = PageCursor::from_page(parent.clone(), ordering, 1, &records);
        Ok(Page { records, cursor })
    }

    /// Fetch the page after `cursor`.
    ///
    /// Fails with [`DomainError::NoMoreData`] when the cursor is already at
    /// the end. A continuation that comes back empty is a valid empty page
    /// whose cursor is exhausted, not an error.
    #[instrument(skip(self, cursor), fields(page = cursor.page()))]
    pub async fn next_page(&self, cursor: &PageCursor) -> RepoResult<Page> {
        if cursor.is_exhausted() {
            return Err(DomainError::NoMoreData);
        }
        let token = cursor.token().cloned().ok_or(DomainError::NoMoreData)?;
        let query = ChildQuery::continuing(cursor.parent().clone(), cursor.ordering(), token);
        let records = self.ctx.comments().query_children(&query).await?;
        let next = PageCursor::from_page(
            cursor.parent().clone(),
            cursor.ordering(),
            cursor.page() + 1,
            &records,
        );
        Ok(Page {
            records,
            cursor: next,
        })
    }

    /// "Previous page" control: always refetches page 1.
    ///
    /// Backward cursors are not tracked; callers must not assume the result
    /// reflects any prior page beyond the first.
    #[instrument(skip(self))]
    pub async fn previous_page(
        &self,
        parent: &ParentId,
        ordering: OrderingMode,
    ) -> RepoResult<Page> {
        self.first_page(parent, ordering).await
    }
}
