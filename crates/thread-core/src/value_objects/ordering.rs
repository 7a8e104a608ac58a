//! Ordering strategy - maps a display ordering to a store query shape

use serde::{Deserialize, Serialize};

use super::cursor::CursorToken;
use super::ids::ParentId;

/// Fixed page size for every child-list fetch
pub const COMMENTS_PER_PAGE: usize = 8;

/// Total ordering applied to a child list.
///
/// Both orderings sort descending on their key, with document id ascending as
/// the tiebreaker so that cursor continuation walks a total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderingMode {
    /// Most recent first (`createdAt` descending)
    #[default]
    Latest,
    /// Highest reaction total first (`reactionCount` descending)
    Popularity,
}

impl OrderingMode {
    /// The persisted field this mode sorts on
    pub fn sort_field(self) -> &'static str {
        match self {
            Self::Latest => "createdAt",
            Self::Popularity => "reactionCount",
        }
    }
}

/// Query descriptor for one page of a comment's direct children.
///
/// Pure data: filter `pid == parent`, sort per [`OrderingMode`], limit
/// [`COMMENTS_PER_PAGE`], optionally continuing strictly after a token. A
/// token minted under one ordering is meaningless under the other; consumers
/// reject the mismatch rather than guessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildQuery {
    pub parent: ParentId,
    pub ordering: OrderingMode,
    pub limit: usize,
    pub after: Option<CursorToken>,
}

impl ChildQuery {
    /// Page-1 query: no continuation token
    pub fn first_page(parent: ParentId, ordering: OrderingMode) -> Self {
        Self {
            parent,
            ordering,
            limit: COMMENTS_PER_PAGE,
            after: None,
        }
    }

    /// Continuation query strictly after `token`
    pub fn continuing(parent: ParentId, ordering: OrderingMode, token: CursorToken) -> Self {
        Self {
            parent,
            ordering,
            limit: COMMENTS_PER_PAGE,
            after: Some(token),
        }
    }
}
