//! In-memory implementation of CommentRepository
//!
//! Honors the same contract as the remote store: store-assigned random ids,
//! strictly monotonic creation timestamps, descending sort with id-ascending
//! tiebreak, continuation strictly after a decoded cursor position, and
//! atomic field increments. Used by tests and local tooling.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;

use thread_core::{
    ChildQuery, CommentRecord, CommentRepository, DocumentId, DomainError, NewComment,
    OrderingMode, ParentId, RepoResult,
};

const ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const ID_LEN: usize = 20;

/// In-memory comment store with injectable faults
#[derive(Default)]
pub struct MemoryCommentStore {
    inner: Mutex<Inner>,
    faults: Faults,
}

#[derive(Default)]
struct Inner {
    docs: BTreeMap<String, CommentRecord>,
    last_micros: i64,
}

/// One-shot failure switches; each trips a single matching operation
#[derive(Default)]
struct Faults {
    create: AtomicBool,
    query: AtomicBool,
    replace_reactions: AtomicBool,
    increment_count: AtomicBool,
}

fn tripped(flag: &AtomicBool) -> bool {
    flag.swap(false, Ordering::SeqCst)
}

fn injected() -> DomainError {
    DomainError::Transient("injected store failure".to_string())
}

/// Sort value of a record under an ordering
fn sort_value(record: &CommentRecord, ordering: OrderingMode) -> i64 {
    match ordering {
        OrderingMode::Latest => record.created_at.timestamp_micros(),
        OrderingMode::Popularity => record.reaction_count,
    }
}

/// Whether position `(av, aid)` precedes `(bv, bid)` in the canonical order:
/// sort value descending, document id ascending on ties
fn precedes(av: i64, aid: &str, bv: i64, bid: &str) -> bool {
    av > bv || (av == bv && aid < bid)
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a store-style 20-char alphanumeric document id
    fn random_id(docs: &BTreeMap<String, CommentRecord>) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..ID_LEN)
                .map(|_| ID_CHARSET[rng.gen_range(0..ID_CHARSET.len())] as char)
                .collect();
            if !docs.contains_key(&id) {
                return id;
            }
        }
    }

    /// Next strictly-increasing creation timestamp
    fn next_created_at(inner: &mut Inner) -> DateTime<Utc> {
        let now = Utc::now().timestamp_micros();
        let next = now.max(inner.last_micros + 1);
        inner.last_micros = next;
        DateTime::from_timestamp_micros(next).unwrap_or_else(Utc::now)
    }

    /// Insert a pre-built record, keeping timestamp monotonicity intact.
    /// Test seam for controlling timestamps and counts directly.
    pub fn insert_record(&self, record: CommentRecord) {
        let mut inner = self.inner.lock();
        inner.last_micros = inner.last_micros.max(record.created_at.timestamp_micros());
        inner.docs.insert(record.id.as_str().to_string(), record);
    }

    /// Snapshot one stored record
    pub fn stored(&self, id: &DocumentId) -> Option<CommentRecord> {
        self.inner.lock().docs.get(id.as_str()).cloned()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.inner.lock().docs.len()
    }

    /// Whether the store holds no documents
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail the next `create` call
    pub fn fail_next_create(&self) {
        self.faults.create.store(true, Ordering::SeqCst);
    }

    /// Fail the next `query_children` call
    pub fn fail_next_query(&self) {
        self.faults.query.store(true, Ordering::SeqCst);
    }

    /// Fail the next `replace_reactions` call
    pub fn fail_next_replace_reactions(&self) {
        self.faults.replace_reactions.store(true, Ordering::SeqCst);
    }

    /// Fail the next `increment_reaction_count` call
    pub fn fail_next_count_increment(&self) {
        self.faults.increment_count.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CommentRepository for MemoryCommentStore {
    async fn create(&self, comment: &NewComment) -> RepoResult<DocumentId> {
        if tripped(&self.faults.create) {
            return Err(injected());
        }
        let mut inner = self.inner.lock();
        let id = Self::random_id(&inner.docs);
        let created_at = Self::next_created_at(&mut inner);
        let record = CommentRecord {
            id: DocumentId::new(id.clone()),
            name: comment.name.clone(),
            text: comment.text.clone(),
            email: comment.email.clone(),
            pid: comment.pid.clone(),
            reactions: comment.reactions.clone(),
            picture: comment.picture.clone(),
            attachments_urls: comment.attachments_urls.clone(),
            created_at,
            reaction_count: comment.reaction_count,
        };
        inner.docs.insert(id.clone(), record);
        Ok(DocumentId::new(id))
    }

    async fn get(&self, id: &DocumentId) -> RepoResult<Option<CommentRecord>> {
        Ok(self.inner.lock().docs.get(id.as_str()).cloned())
    }

    async fn query_children(&self, query: &ChildQuery) -> RepoResult<Vec<CommentRecord>> {
        if tripped(&self.faults.query) {
            return Err(injected());
        }
        let after = match &query.after {
            Some(token) => Some(token.decode(query.ordering)?),
            None => None,
        };

        let inner = self.inner.lock();
        let mut matches: Vec<&CommentRecord> = inner
            .docs
            .values()
            .filter(|r| r.pid.as_str() == query.parent.as_str())
            .collect();
        matches.sort_by(|a, b| {
            let (av, bv) = (sort_value(a, query.ordering), sort_value(b, query.ordering));
            bv.cmp(&av).then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });

        let records = matches
            .into_iter()
            .filter(|r| match &after {
                Some(pos) => precedes(
                    pos.sort_value,
                    pos.doc_id.as_str(),
                    sort_value(r, query.ordering),
                    r.id.as_str(),
                ),
                None => true,
            })
            .take(query.limit)
            .cloned()
            .collect();
        Ok(records)
    }

    async fn count_children(&self, parent: &ParentId) -> RepoResult<i64> {
        let inner = self.inner.lock();
        let count = inner
            .docs
            .values()
            .filter(|r| r.pid.as_str() == parent.as_str())
            .count();
        Ok(count as i64)
    }

    async fn increment_reaction(&self, id: &DocumentId, symbol: &str, by: i64) -> RepoResult<()> {
        let mut inner = self.inner.lock();
        let record = inner
            .docs
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::CommentNotFound(id.clone()))?;
        *record.reactions.entry(symbol.to_string()).or_insert(0) += by;
        Ok(())
    }

    async fn replace_reactions(
        &self,
        id: &DocumentId,
        reactions: &BTreeMap<String, i64>,
    ) -> RepoResult<()> {
        if tripped(&self.faults.replace_reactions) {
            return Err(injected());
        }
        let mut inner = self.inner.lock();
        let record = inner
            .docs
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::CommentNotFound(id.clone()))?;
        record.reactions = reactions.clone();
        Ok(())
    }

    async fn increment_reaction_count(&self, id: &DocumentId, by: i64) -> RepoResult<()> {
        if tripped(&self.faults.increment_count) {
            return Err(injected());
        }
        let mut inner = self.inner.lock();
        let record = inner
            .docs
            .get_mut(id.as_str())
            .ok_or_else(|| DomainError::CommentNotFound(id.clone()))?;
        record.reaction_count += by;
        Ok(())
    }
}
