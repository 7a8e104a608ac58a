//! Domain errors - the failure taxonomy of the engine

use thiserror::Error;

use crate::value_objects::DocumentId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// A store or network call failed. Retrying is the adapter's business;
    /// the engine never retries on its own.
    #[error("Transient store error: {0}")]
    Transient(String),

    /// A referenced comment no longer exists
    #[error("Comment not found: {0}")]
    CommentNotFound(DocumentId),

    /// Pagination is exhausted. A no-op for callers, not a failure to show.
    #[error("No more pages")]
    NoMoreData,

    /// The submission was rejected before any store write
    #[error("Validation error: {0}")]
    Validation(String),

    /// A reaction mutation failed after the optimistic local update was
    /// already shown. The local value stays; the next full refetch corrects
    /// the display.
    #[error("Reaction reconciliation incomplete for {id}: {reason}")]
    ReconciliationPartial { id: DocumentId, reason: String },
}

impl DomainError {
    /// Get an error code string for logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transient(_) => "TRANSIENT_STORE_ERROR",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",
            Self::NoMoreData => "NO_MORE_DATA",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ReconciliationPartial { .. } => "RECONCILIATION_PARTIAL",
        }
    }

    /// Check if this is a transient store failure
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::CommentNotFound(_))
    }

    /// Check if this is exhausted pagination
    pub fn is_no_more_data(&self) -> bool {
        matches!(self, Self::NoMoreData)
    }

    /// Check if this is a validation error (always user-visible)
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
