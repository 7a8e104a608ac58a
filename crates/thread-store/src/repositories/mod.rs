//! Repository implementations over the document store

mod http;
mod memory;

pub use http::HttpCommentRepository;
pub use memory::MemoryCommentStore;
