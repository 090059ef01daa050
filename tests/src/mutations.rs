use forum_client::{
    api::{self, Attachment, Sort, SortDirection, SortField},
    Error, Placement,
};
use forum_mock_server::{Failure, RequestKind};

use crate::fixtures::*;

fn by_user_name() -> Sort {
    Sort {
        field: SortField::UserName,
        direction: SortDirection::Asc,
    }
}

fn thread() -> forum_mock_server::MockServer {
    let s = server();
    put(&s, "A", None, 1, "alice");
    put(&s, "A1", Some("A"), 2, "alice");
    put(&s, "A2", Some("A"), 3, "carol");
    put(&s, "A2a", Some("A2"), 4, "carol");
    put(&s, "B", None, 5, "bob");
    s
}

#[tokio::test]
async fn reply_lands_at_its_sorted_position() {
    let s = thread();
    let mut v = view(&s, "bob", 10);
    v.set_sort(by_user_name()).await.unwrap();
    v.expand(&id("A")).await.unwrap();
    assert_eq!(ids(&v.find(&id("A")).unwrap().children), vec!["A1", "A2"]);
    assert_eq!(v.find(&id("A")).unwrap().reply_count, 3);

    s.clear_requests();
    let created = v
        .create(Some(id("A")), String::from("me too"), None)
        .await
        .unwrap();
    assert!(matches!(created.placement, Placement::Inserted));
    let a = v.find(&id("A")).unwrap();
    assert_eq!(a.children[1].id(), &created.comment.id);
    assert_eq!(a.children.len(), 3);
    assert_eq!(a.reply_count, 4);
    // no reload was needed
    assert_eq!(s.requests().len(), 1);
}

#[tokio::test]
async fn nested_reply_bumps_every_ancestor() {
    let s = thread();
    let mut v = view(&s, "bob", 10);
    v.set_sort(by_user_name()).await.unwrap();
    v.expand(&id("A")).await.unwrap();
    v.expand(&id("A2")).await.unwrap();

    v.create(Some(id("A2")), String::from("deep"), None)
        .await
        .unwrap();
    assert_eq!(v.find(&id("A2")).unwrap().reply_count, 2);
    assert_eq!(v.find(&id("A")).unwrap().reply_count, 4);
    assert_eq!(v.find(&id("B")).unwrap().reply_count, 0);
}

#[tokio::test]
async fn root_comment_reloads_the_page() {
    let s = thread();
    let mut v = view(&s, "bob", 10);
    v.load().await.unwrap();
    let generation = v.generation();

    let created = v.create(None, String::from("new topic"), None).await.unwrap();
    assert!(matches!(created.placement, Placement::Reloaded));
    assert_eq!(v.generation(), generation + 1);
    // newest first
    assert_eq!(v.roots()[0].id(), &created.comment.id);
}

#[tokio::test]
async fn reply_to_an_unloaded_parent_reloads() {
    let s = thread();
    let mut v = view(&s, "bob", 10);
    v.load().await.unwrap();
    let created = v
        .create(Some(id("A2")), String::from("hidden"), None)
        .await
        .unwrap();
    assert!(matches!(created.placement, Placement::Reloaded));
    assert_eq!(v.find(&id("A")).unwrap().reply_count, 4);
    assert!(v.find(&created.comment.id).is_none());
}

#[tokio::test]
async fn failed_reload_after_create_is_reported() {
    let s = thread();
    let mut v = view(&s, "bob", 10);
    v.load().await.unwrap();
    let before = s.num_comments();

    s.fail_next_of(RequestKind::ListComments, Failure::Transport);
    let created = v.create(None, String::from("posted"), None).await.unwrap();
    match created.placement {
        Placement::ReloadFailed(e) => assert!(e.is_recoverable()),
        p => panic!("unexpected placement {p:?}"),
    }
    assert_eq!(s.num_comments(), before + 1);
}

#[tokio::test]
async fn attachment_is_uploaded() {
    let s = thread();
    let mut v = view(&s, "bob", 10);
    v.load().await.unwrap();
    let created = v
        .create(
            None,
            String::from("see file"),
            Some(Attachment {
                file_name: String::from("notes.txt"),
                content_type: String::from("text/plain"),
                data: b"hello".to_vec(),
            }),
        )
        .await
        .unwrap();
    assert!(created.comment.file_url.is_some());
    assert_eq!(created.comment.image_url, None);
}

#[tokio::test]
async fn delete_removes_exactly_one_child() {
    let s = thread();
    let mut v = view(&s, "carol", 10);
    v.set_sort(by_user_name()).await.unwrap();
    v.expand(&id("A")).await.unwrap();
    v.expand(&id("A2")).await.unwrap();

    v.delete(&id("A2a")).await.unwrap();
    assert!(v.find(&id("A2")).unwrap().children.is_empty());
    assert_eq!(v.find(&id("A2")).unwrap().reply_count, 0);
    assert_eq!(v.find(&id("A")).unwrap().reply_count, 2);

    v.delete(&id("A2")).await.unwrap();
    let a = v.find(&id("A")).unwrap();
    assert_eq!(ids(&a.children), vec!["A1"]);
    assert_eq!(a.reply_count, 1);
    assert_eq!(ids(v.roots()), vec!["A", "B"]);
}

#[tokio::test]
async fn deleting_a_root_drops_its_subtree() {
    let s = thread();
    let mut v = view(&s, "alice", 10);
    v.load().await.unwrap();
    v.expand(&id("A")).await.unwrap();
    v.delete(&id("A")).await.unwrap();
    assert_eq!(ids(v.roots()), vec!["B"]);
    assert!(v.find(&id("A1")).is_none());
    assert_eq!(s.num_comments(), 1);
}

#[tokio::test]
async fn update_keeps_position() {
    let s = thread();
    let mut v = view(&s, "carol", 10);
    v.set_sort(by_user_name()).await.unwrap();
    v.expand(&id("A")).await.unwrap();
    v.expand(&id("A2")).await.unwrap();

    let updated = v.update(&id("A2"), String::from("changed")).await.unwrap();
    assert!(updated.is_edited());
    let a = v.find(&id("A")).unwrap();
    assert_eq!(ids(&a.children), vec!["A1", "A2"]);
    assert_eq!(a.children[1].comment.content, "changed");
    assert_eq!(ids(&a.children[1].children), vec!["A2a"]);
}

#[tokio::test]
async fn server_refusals_surface_verbatim() {
    let s = thread();
    let mut v = view(&s, "bob", 10);
    v.load().await.unwrap();
    v.expand(&id("A")).await.unwrap();
    let before = v.roots().to_vec();

    let err = v.delete(&id("A1")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(api::Error::PermissionDenied)));
    let err = v.update(&id("A1"), String::from("hijack")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(api::Error::PermissionDenied)));
    let err = v.create(Some(id("A")), String::from(""), None).await.unwrap_err();
    assert!(matches!(err, Error::Validation(api::Error::EmptyContent)));

    assert_eq!(v.roots(), &before[..]);
}
