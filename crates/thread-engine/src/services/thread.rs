//! Comment thread - the recursive tree, its refresh cycle, and the root
//! aggregator
//!
//! The tree is an arena: nodes are addressed by [`NodeId`] and own an
//! explicit list of loaded child ids, never nested closures. All
//! cross-node coordination happens through the root's generation counter:
//! any mutation bumps it, every live node observes the bump by re-entering
//! `Loading`, and a fetch that resolves under an older generation is
//! discarded instead of overwriting newer state.
//!
//! The engine is owned by one logical task; store calls are suspension
//! points and nothing here blocks.

use std::collections::{BTreeMap, HashMap};

use tracing::{info, instrument, warn};

use thread_core::{
    CommentDraft, CommentRecord, DocumentId, DomainError, OrderingMode, PageCursor, ParentId,
    RepoResult, Session,
};

use super::context::EngineContext;
use super::pagination::{Page, Pager};
use super::reaction::{ReactionReconciler, ReconcileOutcome};
use super::submission::SubmissionService;

/// Arena handle for one tree node
pub type NodeId = u64;

/// Node lifecycle. `Loading` means a child fetch is wanted or in flight;
/// `Ready` means the current child set (possibly empty, possibly with an
/// error marker) is displayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Loading,
    Ready,
}

/// One comment in the tree: its record, its loaded children, and the cursor
/// for its own child list
#[derive(Debug)]
pub struct CommentNode {
    id: NodeId,
    record: CommentRecord,
    children: Vec<NodeId>,
    cursor: Option<PageCursor>,
    state: NodeState,
    fetch_error: Option<String>,
}

impl CommentNode {
    fn new(id: NodeId, record: CommentRecord) -> Self {
        Self {
            id,
            record,
            children: Vec::new(),
            cursor: None,
            state: NodeState::Loading,
            fetch_error: None,
        }
    }

    /// Arena handle of this node
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The comment this node renders
    pub fn record(&self) -> &CommentRecord {
        &self.record
    }

    /// Loaded direct children, in fetched page order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Cursor for this node's child list, once a page has loaded
    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    /// Current lifecycle state
    pub fn state(&self) -> NodeState {
        self.state
    }

    /// Error marker from the last child fetch, if it failed. Contained to
    /// this node; the parent renders unaffected.
    pub fn fetch_error(&self) -> Option<&str> {
        self.fetch_error.as_deref()
    }
}

/// What a fetch ticket refreshes: the top-level list or one node's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchTarget {
    Root,
    Node(NodeId),
}

/// A first-page fetch stamped with the generation it was issued under.
///
/// Resolving a ticket does not touch the tree; only [`CommentThread::apply`]
/// does, and it discards outcomes whose generation no longer matches.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    target: FetchTarget,
    generation: u64,
    parent: ParentId,
    ordering: OrderingMode,
}

impl FetchTicket {
    /// The target this ticket refreshes
    pub fn target(&self) -> FetchTarget {
        self.target
    }

    /// Generation the fetch was issued under
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of applying a resolved fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The outcome was installed into the tree
    Installed,
    /// The outcome was discarded: the tree moved to a newer generation (or
    /// the target node was unmounted) while the fetch was in flight
    Stale,
}

/// The comment thread: root aggregator plus the node arena.
pub struct CommentThread {
    ctx: EngineContext,
    ordering: OrderingMode,
    generation: u64,
    total_comments: i64,
    nodes: HashMap<NodeId, CommentNode>,
    root_children: Vec<NodeId>,
    root_cursor: Option<PageCursor>,
    root_state: NodeState,
    root_error: Option<String>,
    next_node_id: NodeId,
}

impl CommentThread {
    /// Create an empty thread; the first [`sync`](Self::sync) populates it
    pub fn new(ctx: EngineContext) -> Self {
        Self {
            ctx,
            ordering: OrderingMode::Latest,
            generation: 0,
            total_comments: 0,
            nodes: HashMap::new(),
            root_children: Vec::new(),
            root_cursor: None,
            root_state: NodeState::Loading,
            root_error: None,
            next_node_id: 0,
        }
    }

    // === Root aggregator ===

    /// Active ordering mode
    pub fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Total top-level comment count from the last count fetch
    pub fn total_comments(&self) -> i64 {
        self.total_comments
    }

    /// Top-level children, in fetched page order
    pub fn root_children(&self) -> &[NodeId] {
        &self.root_children
    }

    /// Top-level list state
    pub fn root_state(&self) -> NodeState {
        self.root_state
    }

    /// Root-level error, set when the top-level page or count fetch failed
    pub fn root_error(&self) -> Option<&str> {
        self.root_error.as_deref()
    }

    /// Cursor of the current top-level page
    pub fn root_cursor(&self) -> Option<&PageCursor> {
        self.root_cursor.as_ref()
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&CommentNode> {
        self.nodes.get(&id)
    }

    /// Find the node currently rendering a record
    pub fn node_by_record(&self, record_id: &DocumentId) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|n| &n.record.id == record_id)
            .map(|n| n.id)
    }

    /// Signal that the underlying data changed: every live node and the
    /// top-level list re-enter `Loading` and refetch on the next sync
    pub fn bump_generation(&mut self) {
        self.generation += 1;
        self.root_state = NodeState::Loading;
        for node in self.nodes.values_mut() {
            node.state = NodeState::Loading;
        }
    }

    /// Switch the total ordering. Discards every cursor (continuation
    /// tokens are sort-key-specific) and forces a full refetch from page 1.
    pub fn set_ordering(&mut self, ordering: OrderingMode) {
        if ordering == self.ordering {
            return;
        }
        self.ordering = ordering;
        self.root_cursor = None;
        for node in self.nodes.values_mut() {
            node.cursor = None;
        }
        self.bump_generation();
    }

    // === Generation-guarded refresh cycle ===

    /// Tickets for every target that currently wants a first-page fetch.
    /// The root ticket, when present, comes first.
    pub fn pending_fetches(&self) -> Vec<FetchTicket> {
        let mut tickets = Vec::new();
        if self.root_state == NodeState::Loading {
            tickets.push(FetchTicket {
                target: FetchTarget::Root,
                generation: self.generation,
                parent: ParentId::top_level(),
                ordering: self.ordering,
            });
        }
        for node in self.nodes.values() {
            if node.state == NodeState::Loading {
                tickets.push(FetchTicket {
                    target: FetchTarget::Node(node.id),
                    generation: self.generation,
                    parent: ParentId::of(&node.record.id),
                    ordering: self.ordering,
                });
            }
        }
        tickets
    }

    /// Run a ticket's fetch. Pure read; the tree is untouched until
    /// [`apply`](Self::apply).
    pub async fn resolve(&self, ticket: &FetchTicket) -> RepoResult<Page> {
        Pager::new(&self.ctx)
            .first_page(&ticket.parent, ticket.ordering)
            .await
    }

    /// Install a resolved fetch, or discard it if stale.
    ///
    /// A failure outcome is contained: the target renders empty with an
    /// error marker and nothing bubbles to its parent.
    pub fn apply(&mut self, ticket: &FetchTicket, outcome: RepoResult<Page>) -> Applied {
        if ticket.generation != self.generation {
            return Applied::Stale;
        }
        match ticket.target {
            FetchTarget::Root => {
                match outcome {
                    Ok(page) => {
                        self.replace_root_children(page);
                        self.root_error = None;
                    }
                    Err(e) => {
                        warn!(error = %e, "Top-level page fetch failed");
                        let old = std::mem::take(&mut self.root_children);
                        for child in old {
                            self.remove_subtree(child);
                        }
                        self.root_cursor = None;
                        self.root_error = Some(e.to_string());
                    }
                }
                self.root_state = NodeState::Ready;
                Applied::Installed
            }
            FetchTarget::Node(id) => {
                if !self.nodes.contains_key(&id) {
                    return Applied::Stale;
                }
                match outcome {
                    Ok(page) => {
                        self.replace_children(id, page);
                        if let Some(node) = self.nodes.get_mut(&id) {
                            node.fetch_error = None;
                            node.state = NodeState::Ready;
                        }
                    }
                    Err(e) => {
                        warn!(node = id, error = %e, "Child fetch failed; rendering empty");
                        let old = match self.nodes.get_mut(&id) {
                            Some(node) => std::mem::take(&mut node.children),
                            None => Vec::new(),
                        };
                        for child in old {
                            self.remove_subtree(child);
                        }
                        if let Some(node) = self.nodes.get_mut(&id) {
                            node.cursor = None;
                            node.fetch_error = Some(e.to_string());
                            node.state = NodeState::Ready;
                        }
                    }
                }
                Applied::Installed
            }
        }
    }

    /// Refresh the top-level comment count
    #[instrument(skip(self))]
    pub async fn refresh_count(&mut self) {
        let ctx = self.ctx.clone();
        match ctx.comments().count_children(&ParentId::top_level()).await {
            Ok(count) => self.total_comments = count,
            Err(e) => {
                warn!(error = %e, "Top-level count fetch failed");
                self.root_error = Some(e.to_string());
            }
        }
    }

    /// Drive every pending fetch to completion, hydrating new children as
    /// they appear. Terminates because parent edges are acyclic and each
    /// pass settles every target it found.
    pub async fn sync(&mut self) {
        if self.root_state == NodeState::Loading {
            self.refresh_count().await;
        }
        loop {
            let tickets = self.pending_fetches();
            if tickets.is_empty() {
                break;
            }
            for ticket in tickets {
                let outcome = self.resolve(&ticket).await;
                self.apply(&ticket, outcome);
            }
        }
    }

    // === Pagination ===

    /// Advance the top-level list to its next page.
    /// Errors with `NoMoreData` when pagination is exhausted, which callers
    /// treat as a no-op rather than a failure to display.
    pub async fn root_next_page(&mut self) -> RepoResult<()> {
        let cursor = self.root_cursor.clone().ok_or(DomainError::NoMoreData)?;
        let ctx = self.ctx.clone();
        let page = Pager::new(&ctx).next_page(&cursor).await?;
        self.replace_root_children(page);
        Ok(())
    }

    /// Return the top-level list to page 1
    pub async fn root_previous_page(&mut self) -> RepoResult<()> {
        let ctx = self.ctx.clone();
        let page = Pager::new(&ctx)
            .previous_page(&ParentId::top_level(), self.ordering)
            .await?;
        self.replace_root_children(page);
        Ok(())
    }

    /// Advance one node's child list to its next page
    pub async fn node_next_page(&mut self, id: NodeId) -> RepoResult<()> {
        let cursor = self
            .nodes
            .get(&id)
            .and_then(|n| n.cursor.clone())
            .ok_or(DomainError::NoMoreData)?;
        let ctx = self.ctx.clone();
        let page = Pager::new(&ctx).next_page(&cursor).await?;
        self.replace_children(id, page);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.state = NodeState::Ready;
        }
        Ok(())
    }

    /// Return one node's child list to page 1
    pub async fn node_previous_page(&mut self, id: NodeId) -> RepoResult<()> {
        let parent = match self.nodes.get(&id) {
            Some(node) => ParentId::of(&node.record.id),
            None => return Err(DomainError::Validation("unknown tree node".to_string())),
        };
        let ctx = self.ctx.clone();
        let page = Pager::new(&ctx).previous_page(&parent, self.ordering).await?;
        self.replace_children(id, page);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.state = NodeState::Ready;
        }
        Ok(())
    }

    // === Reactions ===

    /// Phase 1 of a reaction: the optimistic local update, surfaced to the
    /// caller before any network round trip. Returns the new local map.
    pub fn react_optimistic(
        &mut self,
        id: NodeId,
        symbol: &str,
    ) -> RepoResult<BTreeMap<String, i64>> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| DomainError::Validation("unknown tree node".to_string()))?;
        node.record.apply_local_reaction(symbol);
        Ok(node.record.reactions.clone())
    }

    /// Phase 2 of a reaction: reconcile against the store.
    ///
    /// On success the generation is bumped so sibling views refresh to the
    /// server-confirmed state. On failure the optimistic value is NOT
    /// rolled back; the error is logged and callers see only the outcome
    /// flag.
    pub async fn react_reconcile(&mut self, id: NodeId, symbol: &str) -> RepoResult<ReconcileOutcome> {
        let record_id = match self.nodes.get(&id) {
            Some(node) => node.record.id.clone(),
            None => return Err(DomainError::Validation("unknown tree node".to_string())),
        };
        let ctx = self.ctx.clone();
        match ReactionReconciler::new(&ctx).reconcile(&record_id, symbol).await {
            Ok(()) => {
                self.bump_generation();
                Ok(ReconcileOutcome::Completed)
            }
            Err(e) => {
                tracing::error!(comment_id = %record_id, error = %e,
                    "Reaction reconciliation failed; keeping optimistic value");
                Ok(ReconcileOutcome::Failed)
            }
        }
    }

    /// Both reaction phases in order: optimistic map first, then the
    /// reconcile outcome
    pub async fn react(
        &mut self,
        id: NodeId,
        symbol: &str,
    ) -> RepoResult<(BTreeMap<String, i64>, ReconcileOutcome)> {
        let optimistic = self.react_optimistic(id, symbol)?;
        let outcome = self.react_reconcile(id, symbol).await?;
        Ok((optimistic, outcome))
    }

    // === Submission ===

    /// Submit a draft as a reply to `parent` (`None` = top level).
    ///
    /// Validation runs before any store write; on success the generation is
    /// bumped so the parent's child list picks up the new comment on the
    /// next sync.
    pub async fn submit(
        &mut self,
        parent: Option<NodeId>,
        draft: CommentDraft,
        session: &Session,
    ) -> RepoResult<DocumentId> {
        let pid = match parent {
            None => ParentId::top_level(),
            Some(id) => match self.nodes.get(&id) {
                Some(node) => ParentId::of(&node.record.id),
                None => return Err(DomainError::Validation("unknown tree node".to_string())),
            },
        };
        let ctx = self.ctx.clone();
        let id = SubmissionService::new(&ctx).submit(&pid, draft, session).await?;
        self.bump_generation();
        Ok(id)
    }

    // === Arena plumbing ===

    fn insert_node(&mut self, record: CommentRecord) -> NodeId {
        let id = self.next_node_id;
        self.next_node_id += 1;
        self.nodes.insert(id, CommentNode::new(id, record));
        id
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
    }

    fn replace_root_children(&mut self, page: Page) {
        let old = std::mem::take(&mut self.root_children);
        for child in old {
            self.remove_subtree(child);
        }
        let mut children = Vec::with_capacity(page.records.len());
        for record in page.records {
            children.push(self.insert_node(record));
        }
        info!(
            count = children.len(),
            page = page.cursor.page(),
            "Top-level page loaded"
        );
        self.root_children = children;
        self.root_cursor = Some(page.cursor);
    }

    fn replace_children(&mut self, parent: NodeId, page: Page) {
        let old = match self.nodes.get_mut(&parent) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in old {
            self.remove_subtree(child);
        }
        let mut children = Vec::with_capacity(page.records.len());
        for record in page.records {
            children.push(self.insert_node(record));
        }
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children = children;
            node.cursor = Some(page.cursor);
        }
    }
}

impl std::fmt::Debug for CommentThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentThread")
            .field("ordering", &self.ordering)
            .field("generation", &self.generation)
            .field("total_comments", &self.total_comments)
            .field("nodes", &self.nodes.len())
            .field("root_children", &self.root_children.len())
            .finish()
    }
}
