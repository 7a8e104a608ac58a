//! Ports (adapter traits) - the contracts of the external collaborators
//!
//! The domain layer defines what it needs from the remote document store,
//! the binary object store, and the identity provider; the infrastructure
//! layer provides the implementations. None of these collaborators are
//! managed here, only the queries and mutations issued against them.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::entities::{CommentRecord, NewComment, Profile};
use crate::error::DomainError;
use crate::value_objects::{ChildQuery, DocumentId, ParentId};

/// Result type for adapter operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Comment Repository (remote document store)
// ============================================================================

/// Typed surface over the remote document store's comment collection.
///
/// Timeouts and retries are entirely the implementation's business; callers
/// treat every method as a single at-least-once attempt.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Persist a new comment. The store assigns the id and the creation
    /// timestamp (strictly increasing with write order).
    async fn create(&self, comment: &NewComment) -> RepoResult<DocumentId>;

    /// Fetch a single comment by id
    async fn get(&self, id: &DocumentId) -> RepoResult<Option<CommentRecord>>;

    /// Fetch one page of direct children per the query descriptor.
    ///
    /// Records come back strictly ordered per the query's ordering mode,
    /// document id ascending on ties.
    async fn query_children(&self, query: &ChildQuery) -> RepoResult<Vec<CommentRecord>>;

    /// Count comments under a parent (`pid` equality)
    async fn count_children(&self, parent: &ParentId) -> RepoResult<i64>;

    /// Atomically increment one reaction symbol's count
    async fn increment_reaction(&self, id: &DocumentId, symbol: &str, by: i64) -> RepoResult<()>;

    /// Replace the whole reaction map (last writer wins)
    async fn replace_reactions(
        &self,
        id: &DocumentId,
        reactions: &BTreeMap<String, i64>,
    ) -> RepoResult<()>;

    /// Atomically increment the denormalized reaction total
    async fn increment_reaction_count(&self, id: &DocumentId, by: i64) -> RepoResult<()>;
}

// ============================================================================
// Blob Store (binary object store)
// ============================================================================

/// Byte blobs in, durable URLs out.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path` and return a durable URL for it
    async fn put(&self, path: &str, bytes: Vec<u8>) -> RepoResult<String>;
}

// ============================================================================
// Identity Provider
// ============================================================================

/// Outcome of an interactive sign-in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignIn {
    Completed(Profile),
    Cancelled,
}

/// Callback invoked whenever the signed-in identity changes.
/// `None` means signed out.
pub type AuthCallback = Box<dyn Fn(Option<Profile>) + Send + Sync>;

/// External identity provider: stable display name, email, and avatar URL.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Run the interactive sign-in flow
    async fn sign_in(&self) -> RepoResult<SignIn>;

    /// Drop the current identity
    async fn sign_out(&self) -> RepoResult<()>;

    /// Register a callback for identity changes
    fn on_auth_change(&self, callback: AuthCallback);
}
