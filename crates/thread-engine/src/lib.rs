//! # thread-engine
//!
//! Application layer: the comment tree synchronization and pagination
//! engine. Maintains a recursively nested view of comments keyed by parent
//! identity, paginates each child list by cursor, switches total ordering
//! between latest and popularity, and applies optimistic reaction updates
//! reconciled against the authoritative store.

pub mod services;

// Re-export commonly used types at crate root
pub use services::{
    Applied, CommentNode, CommentThread, EngineContext, FetchTarget, FetchTicket, NodeId,
    NodeState, Page, Pager, ReactionReconciler, ReconcileOutcome, SubmissionService,
};
