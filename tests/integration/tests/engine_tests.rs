//! End-to-end engine scenarios against the in-memory store

use chrono::{TimeZone, Utc};

use integration_tests::fixtures;
use integration_tests::helpers::TestThread;
use thread_core::{
    CommentDraft, CommentRepository, DocumentId, OrderingMode, ParentId, COMMENTS_PER_PAGE,
};
use thread_engine::{Applied, FetchTarget, NodeState, ReconcileOutcome};

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn nine_comments_paginate_as_eight_then_one_then_exhausted() {
    let mut t = TestThread::new();
    t.seed_top_level(9).await;

    t.thread.sync().await;
    assert_eq!(t.thread.root_children().len(), COMMENTS_PER_PAGE);

    t.thread.root_next_page().await.unwrap();
    t.thread.sync().await;
    assert_eq!(t.thread.root_children().len(), 1);

    let err = t.thread.root_next_page().await.unwrap_err();
    assert!(err.is_no_more_data());
}

#[tokio::test]
async fn latest_ordering_is_non_increasing_by_creation_time() {
    let mut t = TestThread::new();
    t.seed_top_level(10).await;

    t.thread.sync().await;
    let times: Vec<_> = t
        .thread
        .root_children()
        .iter()
        .map(|&id| t.thread.node(id).unwrap().record().created_at)
        .collect();
    for pair in times.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[tokio::test]
async fn popularity_ordering_is_non_increasing_by_reaction_total() {
    let mut t = TestThread::new();
    let counts = [3, 11, 0, 7, 11, 2, 9, 5, 1, 8];
    for (i, count) in counts.iter().enumerate() {
        t.comments.insert_record(fixtures::record_at(
            &format!("doc{i:02}"),
            &format!("comment {i}"),
            ParentId::top_level(),
            *count,
            Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap(),
        ));
    }

    t.thread.set_ordering(OrderingMode::Popularity);
    t.thread.sync().await;

    let totals: Vec<_> = t
        .thread
        .root_children()
        .iter()
        .map(|&id| t.thread.node(id).unwrap().record().reaction_count)
        .collect();
    assert_eq!(totals.len(), COMMENTS_PER_PAGE);
    for pair in totals.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}

#[tokio::test]
async fn next_page_never_repeats_records_absent_concurrent_inserts() {
    let mut t = TestThread::new();
    t.seed_top_level(20).await;
    t.thread.sync().await;

    let mut seen: Vec<DocumentId> = Vec::new();
    let mut collect = |thread: &thread_engine::CommentThread| {
        for &id in thread.root_children() {
            let record_id = thread.node(id).unwrap().record().id.clone();
            assert!(!seen.contains(&record_id), "record repeated across pages");
            seen.push(record_id);
        }
    };

    collect(&t.thread);
    t.thread.root_next_page().await.unwrap();
    collect(&t.thread);
    t.thread.root_next_page().await.unwrap();
    collect(&t.thread);
    assert_eq!(seen.len(), 20);
}

#[tokio::test]
async fn popularity_ties_break_deterministically_across_pages() {
    let mut t = TestThread::new();
    // every record has the same reaction total; id order must carry the walk
    for i in 0..12_i64 {
        t.comments.insert_record(fixtures::record_at(
            &format!("doc{i:02}"),
            &format!("comment {i}"),
            ParentId::top_level(),
            4,
            Utc.timestamp_opt(1_700_000_000 + i, 0).unwrap(),
        ));
    }
    t.thread.set_ordering(OrderingMode::Popularity);
    t.thread.sync().await;

    let mut seen: Vec<DocumentId> = Vec::new();
    for &id in t.thread.root_children() {
        seen.push(t.thread.node(id).unwrap().record().id.clone());
    }
    t.thread.root_next_page().await.unwrap();
    for &id in t.thread.root_children() {
        let record_id = t.thread.node(id).unwrap().record().id.clone();
        assert!(!seen.contains(&record_id));
        seen.push(record_id);
    }
    assert_eq!(seen.len(), 12);
}

#[tokio::test]
async fn previous_page_returns_to_page_one() {
    let mut t = TestThread::new();
    t.seed_top_level(17).await;
    t.thread.sync().await;

    let page_one: Vec<_> = t
        .thread
        .root_children()
        .iter()
        .map(|&id| t.thread.node(id).unwrap().record().id.clone())
        .collect();

    t.thread.root_next_page().await.unwrap();
    t.thread.root_next_page().await.unwrap();
    assert_eq!(t.thread.root_cursor().unwrap().page(), 3);

    t.thread.root_previous_page().await.unwrap();
    assert_eq!(t.thread.root_cursor().unwrap().page(), 1);
    let back: Vec<_> = t
        .thread
        .root_children()
        .iter()
        .map(|&id| t.thread.node(id).unwrap().record().id.clone())
        .collect();
    assert_eq!(page_one, back);
}

// ============================================================================
// Ordering switches
// ============================================================================

#[tokio::test]
async fn switching_ordering_discards_cursors_and_restarts_at_page_one() {
    let mut t = TestThread::new();
    t.seed_top_level(12).await;
    t.thread.sync().await;
    t.thread.root_next_page().await.unwrap();
    assert_eq!(t.thread.root_cursor().unwrap().page(), 2);

    t.thread.set_ordering(OrderingMode::Popularity);
    assert!(t.thread.root_cursor().is_none());

    t.thread.sync().await;
    let cursor = t.thread.root_cursor().unwrap();
    assert_eq!(cursor.page(), 1);
    assert_eq!(cursor.ordering(), OrderingMode::Popularity);
}

// ============================================================================
// Generation guard
// ============================================================================

#[tokio::test]
async fn stale_fetch_does_not_overwrite_newer_generation() {
    let mut t = TestThread::new();
    t.seed_top_level(1).await;

    let ticket = t
        .thread
        .pending_fetches()
        .into_iter()
        .find(|ticket| ticket.target() == FetchTarget::Root)
        .unwrap();
    let slow_outcome = t.thread.resolve(&ticket).await;

    // a submission lands while the fetch is still in flight
    t.thread
        .submit(None, CommentDraft::text("newer"), &fixtures::ada())
        .await
        .unwrap();
    assert!(ticket.generation() < t.thread.generation());

    assert_eq!(t.thread.apply(&ticket, slow_outcome), Applied::Stale);
    assert!(t.thread.root_children().is_empty());

    // the current generation still loads cleanly
    t.thread.sync().await;
    assert_eq!(t.thread.root_children().len(), 2);
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn reply_with_attachment_and_no_text_is_accepted() {
    let mut t = TestThread::new();
    let parent = t.seed("parent", ParentId::top_level()).await;
    t.thread.sync().await;
    let parent_node = t.thread.node_by_record(&parent).unwrap();

    let draft = CommentDraft::text("").with_attachment("https://example.com/cat.png");
    let id = t
        .thread
        .submit(Some(parent_node), draft, &fixtures::ada())
        .await
        .unwrap();

    let stored = t.comments.stored(&id).unwrap();
    assert_eq!(stored.pid.as_str(), parent.as_str());
    assert_eq!(stored.attachments_urls.len(), 1);

    t.thread.sync().await;
    let parent_node = t.thread.node_by_record(&parent).unwrap();
    assert_eq!(t.thread.node(parent_node).unwrap().children().len(), 1);
}

#[tokio::test]
async fn reply_with_no_text_and_no_attachment_is_rejected_before_any_write() {
    let mut t = TestThread::new();
    let parent = t.seed("parent", ParentId::top_level()).await;
    t.thread.sync().await;
    let parent_node = t.thread.node_by_record(&parent).unwrap();
    let stored_before = t.comments.len();

    let err = t
        .thread
        .submit(Some(parent_node), CommentDraft::text(""), &fixtures::ada())
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(t.comments.len(), stored_before);
}

#[tokio::test]
async fn styled_submission_persists_inline_markers() {
    let mut t = TestThread::new();
    t.thread.sync().await;

    let mut draft = CommentDraft::text("hello");
    draft.style.bold = true;
    draft.style.underline = true;
    let id = t.thread.submit(None, draft, &fixtures::ada()).await.unwrap();

    let stored = t.comments.stored(&id).unwrap();
    assert_eq!(stored.text, "**__hello__**");
}

#[tokio::test]
async fn total_count_covers_only_top_level_comments() {
    let mut t = TestThread::new();
    let ids = t.seed_top_level(3).await;
    t.seed("reply a", ParentId::of(&ids[0])).await;
    t.seed("reply b", ParentId::of(&ids[1])).await;

    t.thread.sync().await;
    assert_eq!(t.thread.total_comments(), 3);
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn sequential_reactions_accumulate_idempotently() {
    let mut t = TestThread::new();
    let id = t.seed("target", ParentId::top_level()).await;
    t.thread.sync().await;
    let node = t.thread.node_by_record(&id).unwrap();

    for _ in 0..5 {
        let (_, outcome) = t.thread.react(node, "1f44d").await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Completed);
    }

    let stored = t.comments.stored(&id).unwrap();
    assert_eq!(stored.reactions.get("1f44d"), Some(&5));
    assert_eq!(stored.reaction_count, 5);
    assert!(stored.totals_consistent());
}

#[tokio::test]
async fn failed_reconciliation_keeps_optimistic_value_until_refetch() {
    let mut t = TestThread::new();
    let id = t.seed("target", ParentId::top_level()).await;
    t.thread.sync().await;
    let node = t.thread.node_by_record(&id).unwrap();

    t.comments.fail_next_count_increment();
    let (optimistic, outcome) = t.thread.react(node, "1f44d").await.unwrap();
    assert_eq!(optimistic.get("1f44d"), Some(&1));
    assert_eq!(outcome, ReconcileOutcome::Failed);

    // the map landed but the denormalized total is behind
    let stored = t.comments.stored(&id).unwrap();
    assert_eq!(stored.reactions.get("1f44d"), Some(&1));
    assert_eq!(stored.reaction_count, 0);

    // no rollback locally; the next full refetch re-reads the store
    assert_eq!(
        t.thread
            .node(node)
            .unwrap()
            .record()
            .reactions
            .get("1f44d"),
        Some(&1)
    );
    t.thread.bump_generation();
    t.thread.sync().await;
    let node = t.thread.node_by_record(&id).unwrap();
    let displayed = t.thread.node(node).unwrap().record();
    assert_eq!(displayed.reactions.get("1f44d"), Some(&1));
    assert_eq!(displayed.reaction_count, 0);
}

#[tokio::test]
async fn successful_reaction_bumps_generation_for_siblings() {
    let mut t = TestThread::new();
    let id = t.seed("target", ParentId::top_level()).await;
    t.thread.sync().await;
    let node = t.thread.node_by_record(&id).unwrap();
    let generation = t.thread.generation();

    t.thread.react(node, "1f44d").await.unwrap();
    assert_eq!(t.thread.generation(), generation + 1);
    assert_eq!(t.thread.root_state(), NodeState::Loading);

    t.thread.sync().await;
    let node = t.thread.node_by_record(&id).unwrap();
    assert_eq!(
        t.thread.node(node).unwrap().record().reactions.get("1f44d"),
        Some(&1)
    );
}

#[tokio::test]
async fn racing_first_reactions_may_lose_a_map_increment_but_count_all_writes() {
    let t = TestThread::new();
    let id = t.seed("target", ParentId::top_level()).await;

    // two viewers interleave the first-reaction path: both read an empty
    // map, both issue the full-map replacement, both bump the total
    let viewer_a = t.comments.get(&id).await.unwrap().unwrap();
    let viewer_b = t.comments.get(&id).await.unwrap().unwrap();
    assert!(viewer_a.reactions.is_empty() && viewer_b.reactions.is_empty());

    let mut merged_a = viewer_a.reactions.clone();
    merged_a.insert("1f44d".to_string(), 1);
    t.comments.replace_reactions(&id, &merged_a).await.unwrap();
    let mut merged_b = viewer_b.reactions.clone();
    merged_b.insert("1f44d".to_string(), 1);
    t.comments.replace_reactions(&id, &merged_b).await.unwrap();

    t.comments.increment_reaction_count(&id, 1).await.unwrap();
    t.comments.increment_reaction_count(&id, 1).await.unwrap();

    let stored = t.comments.stored(&id).unwrap();
    // last writer wins on the map; the total counts both completed writes
    assert_eq!(stored.reactions.get("1f44d"), Some(&1));
    assert_eq!(stored.reaction_count, 2);
}

// ============================================================================
// Failure containment
// ============================================================================

#[tokio::test]
async fn vanished_parent_renders_empty_child_set() {
    let mut t = TestThread::new();
    let top = t.seed("top", ParentId::top_level()).await;
    // a reply referencing a parent that no longer exists anywhere
    t.seed("orphan", ParentId::of(&DocumentId::new("vanished")))
        .await;

    t.thread.sync().await;
    let top_node = t.thread.node_by_record(&top).unwrap();
    let node = t.thread.node(top_node).unwrap();
    assert_eq!(node.state(), NodeState::Ready);
    assert!(node.children().is_empty());
    assert!(node.fetch_error().is_none());
}

#[tokio::test]
async fn root_page_failure_is_page_level_and_recoverable() {
    let mut t = TestThread::new();
    t.seed_top_level(2).await;

    t.comments.fail_next_query();
    t.thread.sync().await;
    assert!(t.thread.root_error().is_some());
    assert!(t.thread.root_children().is_empty());

    // the next generation refetches cleanly
    t.thread.bump_generation();
    t.thread.sync().await;
    assert!(t.thread.root_error().is_none());
    assert_eq!(t.thread.root_children().len(), 2);
}
