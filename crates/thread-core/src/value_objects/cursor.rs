//! Pagination cursors - opaque continuation tokens and per-scope page state

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::entities::CommentRecord;
use crate::error::DomainError;

use super::ids::{DocumentId, ParentId};
use super::ordering::{OrderingMode, COMMENTS_PER_PAGE};

/// Opaque continuation token.
///
/// Encodes the sort position of the last record of a page: the ordering mode
/// it was minted under, the tail record's sort value, and the tail record's
/// document id as tiebreaker. Treated as an uninterpreted string by callers;
/// store implementations decode it to continue strictly after that position.
/// Continuation is forward-only and not snapshot-isolated: writes landing
/// ahead of the token between fetches may shift page boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CursorToken(String);

/// Decoded sort position carried by a [`CursorToken`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPosition {
    /// Ordering the token belongs to
    pub ordering: OrderingMode,
    /// Tail record's sort value: `createdAt` in microseconds for latest,
    /// `reactionCount` for popularity
    pub sort_value: i64,
    /// Tail record's document id
    pub doc_id: DocumentId,
}

impl CursorToken {
    /// Mint a token from the last record of a fetched page
    pub fn from_tail(record: &CommentRecord, ordering: OrderingMode) -> Self {
        let sort_value = match ordering {
            OrderingMode::Latest => record.created_at.timestamp_micros(),
            OrderingMode::Popularity => record.reaction_count,
        };
        let position = CursorPosition {
            ordering,
            sort_value,
            doc_id: record.id.clone(),
        };
        // Position serialization is infallible for these field types
        let json = serde_json::to_vec(&position).unwrap_or_default();
        Self(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode the sort position, rejecting tokens minted under a different
    /// ordering than `expected`
    pub fn decode(&self, expected: OrderingMode) -> Result<CursorPosition, DomainError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|_| DomainError::Validation("malformed cursor token".to_string()))?;
        let position: CursorPosition = serde_json::from_slice(&bytes)
            .map_err(|_| DomainError::Validation("malformed cursor token".to_string()))?;
        if position.ordering != expected {
            return Err(DomainError::Validation(
                "cursor token belongs to a different ordering".to_string(),
            ));
        }
        Ok(position)
    }

    /// The raw encoded token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Page state for one `(parent, ordering)` scope.
///
/// Replaced, never mutated, on every page transition: the successor cursor is
/// derived from the records of the latest fetch. Discarded entirely when the
/// ordering mode changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor {
    parent: ParentId,
    ordering: OrderingMode,
    page: u32,
    token: Option<CursorToken>,
    exhausted: bool,
}

impl PageCursor {
    /// Build the cursor for a freshly fetched page.
    ///
    /// `page` is 1-based. A short page (fewer than [`COMMENTS_PER_PAGE`]
    /// records) marks the scope exhausted; an empty page additionally carries
    /// no token.
    pub fn from_page(
        parent: ParentId,
        ordering: OrderingMode,
        page: u32,
        records: &[CommentRecord],
    ) -> Self {
        Self {
            parent,
            ordering,
            page,
            token: records.last().map(|tail| CursorToken::from_tail(tail, ordering)),
            exhausted: records.len() < COMMENTS_PER_PAGE,
        }
    }

    /// Scope parent
    pub fn parent(&self) -> &ParentId {
        &self.parent
    }

    /// Ordering this cursor was built under
    pub fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    /// 1-based index of the page this cursor trails
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Whether a further page may exist
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Continuation token for the next page, if one can exist
    pub fn token(&self) -> Option<&CursorToken> {
        self.token.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CommentRecord;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, reaction_count: i64, secs: i64) -> CommentRecord {
        CommentRecord {
            id: DocumentId::new(id),
            name: "a".to_string(),
            text: "b".to_string(),
            email: "a@b.c".to_string(),
            pid: ParentId::top_level(),
            reactions: std::collections::BTreeMap::new(),
            picture: String::new(),
            attachments_urls: vec![],
            created_at: Utc.timestamp_opt(secs, 0).unwrap(),
            reaction_count,
        }
    }

    #[test]
    fn test_token_roundtrip_latest() {
        let tail = record("doc9", 3, 1_700_000_000);
        let token = CursorToken::from_tail(&tail, OrderingMode::Latest);
        let position = token.decode(OrderingMode::Latest).unwrap();
        assert_eq!(position.doc_id, DocumentId::new("doc9"));
        assert_eq!(position.sort_value, tail.created_at.timestamp_micros());
    }

    #[test]
    fn test_token_roundtrip_popularity() {
        let tail = record("doc9", 42, 1_700_000_000);
        let token = CursorToken::from_tail(&tail, OrderingMode::Popularity);
        let position = token.decode(OrderingMode::Popularity).unwrap();
        assert_eq!(position.sort_value, 42);
    }

    #[test]
    fn test_token_rejected_across_orderings() {
        let tail = record("doc9", 42, 1_700_000_000);
        let token = CursorToken::from_tail(&tail, OrderingMode::Latest);
        let err = token.decode(OrderingMode::Popularity).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let token = CursorToken("not base64 json!!".to_string());
        assert!(token.decode(OrderingMode::Latest).is_err());
    }

    #[test]
    fn test_full_page_not_exhausted() {
        let records: Vec<_> = (0..COMMENTS_PER_PAGE)
            .map(|i| record(&format!("doc{i}"), 0, 1_700_000_000 + i as i64))
            .collect();
        let cursor =
            PageCursor::from_page(ParentId::top_level(), OrderingMode::Latest, 1, &records);
        assert!(!cursor.is_exhausted());
        assert!(cursor.token().is_some());
        assert_eq!(cursor.page(), 1);
    }

    #[test]
    fn test_short_page_exhausted() {
        let records = vec![record("only", 0, 1_700_000_000)];
        let cursor =
            PageCursor::from_page(ParentId::top_level(), OrderingMode::Latest, 2, &records);
        assert!(cursor.is_exhausted());
        assert!(cursor.token().is_some());
        assert_eq!(cursor.page(), 2);
    }

    #[test]
    fn test_empty_page_has_no_token() {
        let cursor = PageCursor::from_page(ParentId::top_level(), OrderingMode::Latest, 1, &[]);
        assert!(cursor.is_exhausted());
        assert!(cursor.token().is_none());
    }
}
