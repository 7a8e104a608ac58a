//! # thread-store
//!
//! Infrastructure layer implementing the ports defined in `thread-core`:
//!
//! - An HTTP/JSON client for the remote document store and the
//!   [`CommentRepository`](thread_core::CommentRepository) implementation
//!   built on it
//! - An in-memory store honoring the same contract (monotonic timestamps,
//!   cursor continuation, atomic increments), used by tests and tools
//! - Blob store and identity provider implementations

pub mod blobs;
pub mod client;
pub mod identity;
pub mod models;
pub mod repositories;

// Re-export commonly used types
pub use blobs::{HttpBlobStore, MemoryBlobStore};
pub use client::DocumentClient;
pub use identity::StaticIdentityProvider;
pub use repositories::{HttpCommentRepository, MemoryCommentStore};
