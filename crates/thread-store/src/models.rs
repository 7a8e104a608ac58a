//! Wire models for the document store and their entity mappers

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use thread_core::{CommentRecord, DocumentId, NewComment, ParentId};

/// A comment document as persisted in the store.
///
/// Field names here are the wire contract; the store knows nothing else
/// about the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDocument {
    pub name: String,
    pub text: String,
    pub email: String,
    pub pid: String,
    pub reactions: BTreeMap<String, i64>,
    pub picture: String,
    #[serde(rename = "attachmentsURLs")]
    pub attachments_urls: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "reactionCount")]
    pub reaction_count: i64,
}

impl CommentDocument {
    /// Attach the store-assigned id and turn into the domain record
    pub fn into_record(self, id: DocumentId) -> CommentRecord {
        CommentRecord {
            id,
            name: self.name,
            text: self.text,
            email: self.email,
            pid: if self.pid.is_empty() {
                ParentId::top_level()
            } else {
                ParentId::of(&DocumentId::new(self.pid))
            },
            reactions: self.reactions,
            picture: self.picture,
            attachments_urls: self.attachments_urls,
            created_at: self.created_at,
            reaction_count: self.reaction_count,
        }
    }
}

/// The create payload: everything except the store-assigned id and timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCommentDocument {
    pub name: String,
    pub text: String,
    pub email: String,
    pub pid: String,
    pub reactions: BTreeMap<String, i64>,
    pub picture: String,
    #[serde(rename = "attachmentsURLs")]
    pub attachments_urls: Vec<String>,
    #[serde(rename = "reactionCount")]
    pub reaction_count: i64,
}

impl From<&NewComment> for NewCommentDocument {
    fn from(comment: &NewComment) -> Self {
        Self {
            name: comment.name.clone(),
            text: comment.text.clone(),
            email: comment.email.clone(),
            pid: comment.pid.as_str().to_string(),
            reactions: comment.reactions.clone(),
            picture: comment.picture.clone(),
            attachments_urls: comment.attachments_urls.clone(),
            reaction_count: comment.reaction_count,
        }
    }
}

/// A stored document together with its id, as returned by reads and queries
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentEnvelope<T> {
    pub id: String,
    #[serde(flatten)]
    pub fields: T,
}
