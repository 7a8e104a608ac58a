//! Comment entity - a persisted comment and its reaction state

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::value_objects::{DocumentId, ParentId};

/// A comment as read back from the store.
///
/// `reaction_count` denormalizes the sum of the reaction map; it exists only
/// to serve the popularity ordering and may transiently lag the map while a
/// reconciliation is partially applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    pub id: DocumentId,
    pub name: String,
    pub text: String,
    pub email: String,
    pub pid: ParentId,
    pub reactions: BTreeMap<String, i64>,
    pub picture: String,
    pub attachments_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub reaction_count: i64,
}

impl CommentRecord {
    /// Check if this comment sits at the top level of the thread
    #[inline]
    pub fn is_top_level(&self) -> bool {
        self.pid.is_top_level()
    }

    /// Sum of the reaction map values
    pub fn reaction_total(&self) -> i64 {
        self.reactions.values().sum()
    }

    /// Whether the denormalized total matches the map.
    ///
    /// False is not corruption: a partially failed reconciliation leaves the
    /// two diverged until the next full refetch.
    pub fn totals_consistent(&self) -> bool {
        self.reaction_count == self.reaction_total()
    }

    /// Optimistic local step of a reaction: bump `symbol` in the map,
    /// creating the key at 1 if absent. Returns the new local count.
    ///
    /// Touches only the map; the denormalized total is authoritative on the
    /// store side and refreshed by the next fetch.
    pub fn apply_local_reaction(&mut self, symbol: &str) -> i64 {
        let count = self.reactions.entry(symbol.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Check if this comment carries any attachments
    #[inline]
    pub fn has_attachments(&self) -> bool {
        !self.attachments_urls.is_empty()
    }
}

/// The write shape of a comment.
///
/// The store assigns the id and the creation timestamp; everything else is
/// provided by the submitter. Reactions always start empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub name: String,
    pub text: String,
    pub email: String,
    pub pid: ParentId,
    pub reactions: BTreeMap<String, i64>,
    pub picture: String,
    pub attachments_urls: Vec<String>,
    pub reaction_count: i64,
}

impl NewComment {
    /// Create a new top-level or reply comment with empty reactions
    pub fn new(
        name: String,
        text: String,
        email: String,
        pid: ParentId,
        picture: String,
        attachments_urls: Vec<String>,
    ) -> Self {
        Self {
            name,
            text,
            email,
            pid,
            reactions: BTreeMap::new(),
            picture,
            attachments_urls,
            reaction_count: 0,
        }
    }
}
