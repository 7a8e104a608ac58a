//! Sample data constructors shared across integration tests

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use thread_core::{CommentRecord, DocumentId, NewComment, ParentId, Session};

/// Session for the default test author
pub fn ada() -> Session {
    Session::new("Ada", "ada@example.com", "https://example.com/ada.png")
}

/// A plain new comment from Ada
pub fn new_comment(text: &str, pid: ParentId) -> NewComment {
    NewComment::new(
        "Ada".to_string(),
        text.to_string(),
        "ada@example.com".to_string(),
        pid,
        "https://example.com/ada.png".to_string(),
        vec![],
    )
}

/// A fully specified record, for seeding the store with controlled
/// timestamps and reaction totals
pub fn record_at(
    id: &str,
    text: &str,
    pid: ParentId,
    reaction_count: i64,
    created_at: DateTime<Utc>,
) -> CommentRecord {
    let mut reactions = BTreeMap::new();
    if reaction_count > 0 {
        reactions.insert("1f44d".to_string(), reaction_count);
    }
    CommentRecord {
        id: DocumentId::new(id),
        name: "Ada".to_string(),
        text: text.to_string(),
        email: "ada@example.com".to_string(),
        pid,
        reactions,
        picture: "https://example.com/ada.png".to_string(),
        attachments_urls: vec![],
        created_at,
        reaction_count,
    }
}
