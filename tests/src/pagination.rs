use forum_client::{
    api::{self, Cursor, SortDirection, SortField},
    Backend, Error, MemoryPreferences, Preferences, ThreadView,
};
use forum_mock_server::{Failure, Request};

use crate::fixtures::*;

fn five_roots() -> forum_mock_server::MockServer {
    let s = server();
    for i in 1..=5 {
        put(&s, &format!("r{i}"), None, i, "alice");
    }
    s
}

fn last_after(s: &forum_mock_server::MockServer) -> Option<Cursor> {
    s.requests().into_iter().rev().find_map(|r| match r {
        Request::ListComments { query, .. } => Some(query.after),
        _ => None,
    })?
}

#[tokio::test]
async fn roots_only_until_expanded() {
    let s = server();
    put(&s, "A", None, 1, "alice");
    put(&s, "B", Some("A"), 2, "bob");
    put(&s, "C", None, 3, "carol");
    let mut v = view(&s, "alice", 10);
    v.set_sort(oldest_first()).await.unwrap();

    assert_eq!(ids(v.roots()), vec!["A", "C"]);
    let a = v.find(&id("A")).unwrap();
    assert_eq!(a.reply_count, 1);
    assert!(a.children.is_empty());
    assert!(!a.children_loaded);

    v.expand(&id("A")).await.unwrap();
    assert_eq!(ids(&v.find(&id("A")).unwrap().children), vec!["B"]);
}

#[tokio::test]
async fn walk_forward_then_back() {
    let s = five_roots();
    let mut v = view(&s, "alice", 2);
    v.set_sort(oldest_first()).await.unwrap();
    assert_eq!(ids(v.roots()), vec!["r1", "r2"]);
    assert!(v.cursors().has_more());
    assert!(!v.cursors().can_go_back());

    v.next_page().await.unwrap();
    assert_eq!(ids(v.roots()), vec!["r3", "r4"]);
    let page2_cursor = last_after(&s);
    assert!(page2_cursor.is_some());

    v.next_page().await.unwrap();
    assert_eq!(ids(v.roots()), vec!["r5"]);
    assert!(!v.cursors().has_more());
    assert!(matches!(v.next_page().await, Err(Error::NoMorePages)));

    v.previous_page().await.unwrap();
    assert_eq!(ids(v.roots()), vec!["r3", "r4"]);
    assert_eq!(last_after(&s), page2_cursor);
    assert!(v.cursors().has_more());

    v.previous_page().await.unwrap();
    assert_eq!(ids(v.roots()), vec!["r1", "r2"]);
    assert_eq!(last_after(&s), None);
    assert_eq!(v.cursors().history().len(), 3);
    assert!(matches!(v.previous_page().await, Err(Error::NoPreviousPage)));

    // forward history is reused
    v.next_page().await.unwrap();
    assert_eq!(last_after(&s), page2_cursor);
    assert_eq!(v.cursors().history().len(), 3);
}

#[tokio::test]
async fn last_page_then_back_requests_first_page() {
    let s = server();
    put(&s, "r1", None, 1, "alice");
    put(&s, "r2", None, 2, "alice");
    let mut v = view(&s, "alice", 1);
    v.set_sort(oldest_first()).await.unwrap();
    v.next_page().await.unwrap();
    assert!(!v.cursors().has_more());
    assert!(v.cursors().can_go_back());
    v.previous_page().await.unwrap();
    assert_eq!(last_after(&s), None);
    assert_eq!(ids(v.roots()), vec!["r1"]);
}

#[tokio::test]
async fn reload_keeps_position() {
    let s = five_roots();
    let mut v = view(&s, "alice", 2);
    v.set_sort(oldest_first()).await.unwrap();
    v.next_page().await.unwrap();
    let generation = v.generation();

    put(&s, "r3b", None, 3, "alice");
    v.reload().await.unwrap();
    assert_eq!(v.cursors().page_number(), 2);
    assert_eq!(ids(v.roots()), vec!["r3", "r3b"]);
    assert_eq!(v.generation(), generation + 1);

    v.refresh().await.unwrap();
    assert_eq!(v.cursors().page_number(), 1);
    assert!(!v.cursors().can_go_back());
}

#[tokio::test]
async fn sort_change_goes_back_to_first_page() {
    let s = server();
    put(&s, "a", None, 1, "alice");
    put(&s, "b", None, 2, "bob");
    put(&s, "c", None, 3, "carol");
    let mut v = view(&s, "alice", 2);
    v.load().await.unwrap();
    // newest first by default
    assert_eq!(ids(v.roots()), vec!["c", "b"]);
    v.next_page().await.unwrap();

    let sort = v.select_sort(SortField::UserName).await.unwrap();
    assert_eq!(sort.direction, SortDirection::Desc);
    assert_eq!(v.cursors().page_number(), 1);
    assert_eq!(ids(v.roots()), vec!["c", "b"]);
    assert_eq!(v.preferences().load_sort(), Some(sort));

    let sort = v.select_sort(SortField::UserName).await.unwrap();
    assert_eq!(sort.direction, SortDirection::Asc);
    assert_eq!(ids(v.roots()), vec!["a", "b"]);

    // a new view in the same session starts from the stored sort
    let prefs = MemoryPreferences {
        sort: v.preferences().load_sort(),
    };
    let mut other = ThreadView::new(s.session(api::UserId::from("bob")), prefs, v.thread().clone());
    other.load().await.unwrap();
    assert_eq!(other.sort(), sort);
    assert_eq!(ids(other.roots())[0], "a");
}

#[tokio::test]
async fn setting_the_same_sort_does_not_refetch() {
    let s = five_roots();
    let mut v = view(&s, "alice", 2);
    v.load().await.unwrap();
    s.clear_requests();
    assert!(!v.set_sort(v.sort()).await.unwrap());
    assert!(s.requests().is_empty());
}

#[tokio::test]
async fn failed_fetch_leaves_state_unchanged() {
    let s = five_roots();
    let mut v = view(&s, "alice", 2);
    v.load().await.unwrap();
    let (roots, cursors, generation) = (v.roots().to_vec(), v.cursors().clone(), v.generation());

    s.fail_next(Failure::Transport);
    assert!(v.next_page().await.unwrap_err().is_recoverable());
    s.fail_next(Failure::Api(api::Error::Unknown(String::from("db down"))));
    assert!(v.reload().await.unwrap_err().is_recoverable());

    assert_eq!(v.roots(), &roots[..]);
    assert_eq!(v.cursors(), &cursors);
    assert_eq!(v.generation(), generation);

    v.next_page().await.unwrap();
    assert_eq!(v.cursors().page_number(), 2);
}

#[tokio::test]
async fn cursor_to_a_deleted_comment_is_rejected() {
    let s = five_roots();
    let mut v = view(&s, "alice", 2);
    v.set_sort(oldest_first()).await.unwrap();
    // the continuation points after r2
    s.session(api::UserId::from("alice"))
        .delete_comment(&id("r2"))
        .await
        .unwrap();
    let err = v.next_page().await.unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(api::Error::InvalidCursor(_))
    ));
    assert!(!err.is_recoverable());
    assert_eq!(v.cursors().page_number(), 1);
}

#[tokio::test]
async fn failed_sort_change_keeps_page_and_sort() {
    let s = five_roots();
    let mut v = view(&s, "alice", 2);
    v.set_sort(oldest_first()).await.unwrap();
    v.next_page().await.unwrap();
    let (roots, cursors) = (v.roots().to_vec(), v.cursors().clone());

    s.fail_next(Failure::Transport);
    let err = v.select_sort(SortField::UserName).await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(v.sort(), oldest_first());
    assert_eq!(v.preferences().load_sort(), Some(oldest_first()));
    assert_eq!(v.roots(), &roots[..]);
    assert_eq!(v.cursors(), &cursors);
    assert_eq!(v.cursors().page_number(), 2);
    assert!(v.cursors().has_more());

    v.next_page().await.unwrap();
    assert_eq!(ids(v.roots()), vec!["r5"]);
    assert_eq!(v.cursors().page_number(), 3);
}
