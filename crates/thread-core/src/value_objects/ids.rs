//! Document identifiers assigned by the remote store, and parent references

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque store-assigned document id.
///
/// The store chooses the value on create; it is unique and immutable for the
/// lifetime of the record. Nothing in this crate inspects its contents.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a raw id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw id string
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Parent reference stored on a comment.
///
/// The persisted representation is the `pid` field: the empty string marks a
/// top-level comment, any other value references another comment's id. The
/// store does not enforce the reference; a dangling parent simply has no
/// children to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentId(String);

impl ParentId {
    /// The top-level sentinel (empty `pid`)
    pub fn top_level() -> Self {
        Self(String::new())
    }

    /// Reference an existing comment as parent
    pub fn of(id: &DocumentId) -> Self {
        Self(id.as_str().to_string())
    }

    /// Check whether this is the top-level sentinel
    #[inline]
    pub fn is_top_level(&self) -> bool {
        self.0.is_empty()
    }

    /// The persisted `pid` value
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ParentId {
    fn default() -> Self {
        Self::top_level()
    }
}

impl fmt::Display for ParentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("(top-level)")
        } else {
            f.write_str(&self.0)
        }
    }
}
