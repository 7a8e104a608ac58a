//! Reaction reconciliation - merging an optimistic local update with the
//! authoritative persisted value
//!
//! The optimistic step is local and synchronous
//! ([`CommentRecord::apply_local_reaction`](thread_core::CommentRecord::apply_local_reaction));
//! this service performs the remote half. The two never roll each other
//! back: a failed reconciliation leaves the optimistic value on screen and
//! the next full refetch corrects it.

use tracing::{info, instrument};

use thread_core::{DocumentId, DomainError, RepoResult};

use super::context::EngineContext;

/// Result of the remote half of a reaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Both mutations landed; callers should bump the generation so sibling
    /// views pick up the server-confirmed state
    Completed,
    /// A mutation failed after the optimistic update was shown. Already
    /// logged; not user-visible.
    Failed,
}

/// Reaction reconciler
pub struct ReactionReconciler<'a> {
    ctx: &'a EngineContext,
}

impl<'a> ReactionReconciler<'a> {
    /// Create a new ReactionReconciler
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Reconcile one reaction click against the store.
    ///
    /// Reads the persisted map; a known symbol gets an atomic increment, a
    /// first-time symbol gets a full-map replacement merging the key at 1.
    /// The replacement is last-writer-wins: two racing first reactions may
    /// lose one increment, an accepted weak-consistency limit. The denormalized
    /// total is then incremented unconditionally.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, id: &DocumentId, symbol: &str) -> RepoResult<()> {
        let record = self
            .ctx
            .comments()
            .get(id)
            .await
            .map_err(|e| partial(id, &e))?
            .ok_or_else(|| partial(id, &DomainError::CommentNotFound(id.clone())))?;

        if record.reactions.contains_key(symbol) {
            self.ctx
                .comments()
                .increment_reaction(id, symbol, 1)
                .await
                .map_err(|e| partial(id, &e))?;
        } else {
            let mut merged = record.reactions.clone();
            merged.insert(symbol.to_string(), 1);
            self.ctx
                .comments()
                .replace_reactions(id, &merged)
                .await
                .map_err(|e| partial(id, &e))?;
        }

        self.ctx
            .comments()
            .increment_reaction_count(id, 1)
            .await
            .map_err(|e| partial(id, &e))?;

        info!(comment_id = %id, symbol = %symbol, "Reaction reconciled");
        Ok(())
    }
}

/// Wrap a step failure: the optimistic value has already been shown, so
/// every failure past that point is a partial reconciliation
fn partial(id: &DocumentId, cause: &DomainError) -> DomainError {
    DomainError::ReconciliationPartial {
        id: id.clone(),
        reason: cause.to_string(),
    }
}
