use std::collections::{HashMap, HashSet};

use forum_client::{
    api::{Comment, CommentId, Cursor, Sort, SortDirection, SortField},
    tree, CommentNode, OrderExt, PageCursorStore,
};

use crate::fixtures::*;

const USERS: [&str; 3] = ["alice", "bob", "carol"];

fn field(f: u8) -> SortField {
    match f % 3 {
        0 => SortField::UserName,
        1 => SortField::Email,
        _ => SortField::CreatedAt,
    }
}

#[test]
fn paging_visits_every_root_once_in_order() {
    bolero::check!()
        .with_type::<(Vec<(u8, u8)>, u8, u8, bool)>()
        .cloned()
        .for_each(|(roots, page_size, f, ascending)| {
            let s = server();
            for (i, (t, u)) in roots.iter().enumerate().take(40) {
                put(&s, &format!("r{i}"), None, i64::from(t % 10), USERS[*u as usize % 3]);
            }
            let page_size = usize::from(page_size % 5) + 1;
            let sort = Sort {
                field: field(f),
                direction: SortDirection::from_ascending(ascending),
            };

            futures::executor::block_on(async {
                let mut v = view(&s, "alice", page_size);
                if !v.set_sort(sort).await.unwrap() {
                    v.load().await.unwrap();
                }

                let mut pages: Vec<Vec<Comment>> = Vec::new();
                loop {
                    assert!(v.roots().len() <= page_size);
                    pages.push(v.roots().iter().map(|n| n.comment.clone()).collect());
                    if !v.cursors().has_more() {
                        break;
                    }
                    v.next_page().await.unwrap();
                }

                let all = pages.iter().flatten().collect::<Vec<_>>();
                let distinct = all.iter().map(|c| c.id.clone()).collect::<HashSet<_>>();
                assert_eq!(all.len(), distinct.len());
                assert_eq!(all.len(), s.num_comments());
                for w in all.windows(2) {
                    assert!(sort.compare(w[0], w[1]).is_lt());
                }

                // walking back shows the very same pages
                for expected in pages.iter().rev().skip(1) {
                    v.previous_page().await.unwrap();
                    let got = v.roots().iter().map(|n| &n.comment).collect::<Vec<_>>();
                    assert_eq!(got, expected.iter().collect::<Vec<_>>());
                }
                assert!(!v.cursors().can_go_back());
            });
        });
}

fn check_level(
    nodes: &[CommentNode],
    parent: Option<&CommentId>,
    first: &HashMap<CommentId, Comment>,
    sort: &Sort,
) {
    for w in nodes.windows(2) {
        assert!(sort.compare(&w[0].comment, &w[1].comment).is_lt());
    }
    for n in nodes {
        match parent {
            Some(p) => {
                assert_eq!(n.comment.parent_comment_id.as_ref(), Some(p));
                assert_ne!(n.id(), p);
            }
            None => {
                let listed = |p: &&CommentId| first.contains_key(*p);
                if n.comment.parent_comment_id.as_ref().filter(listed).is_some() {
                    // promoted off a parent cycle, its chain leads back to it
                    let mut cur = n.comment.parent_comment_id.as_ref();
                    let mut steps = 0;
                    while let Some(p) = cur.filter(listed) {
                        if p == n.id() {
                            break;
                        }
                        assert!(steps <= first.len());
                        cur = first[p].parent_comment_id.as_ref();
                        steps += 1;
                    }
                    assert_eq!(cur, Some(n.id()));
                }
            }
        }
        check_level(&n.children, Some(n.id()), first, sort);
    }
}

#[test]
fn built_forest_places_every_record_once() {
    bolero::check!()
        .with_type::<(Vec<(u8, Option<u8>, u8, u8, Option<u8>)>, u8, bool)>()
        .cloned()
        .for_each(|(records, f, ascending)| {
            let flat = records
                .iter()
                .take(30)
                .map(|(i, parent, t, u, email)| {
                    let parent = parent.map(|p| format!("c{}", p % 16));
                    let mut c = record(
                        &format!("c{}", i % 16),
                        parent.as_deref(),
                        i64::from(t % 8),
                        USERS[*u as usize % 3],
                    );
                    c.email = email.map(|e| format!("u{}@example.org", e % 4));
                    c
                })
                .collect::<Vec<_>>();
            let sort = Sort {
                field: field(f),
                direction: SortDirection::from_ascending(ascending),
            };

            let mut first = HashMap::new();
            for c in &flat {
                first.entry(c.id.clone()).or_insert_with(|| c.clone());
            }

            let forest = tree::build(flat, &sort);
            let mut seen = Vec::new();
            CommentNode::walk(&forest, &mut |n| seen.push(n.comment.clone()));
            assert_eq!(seen.len(), first.len());
            for c in &seen {
                assert_eq!(Some(c), first.get(&c.id));
            }
            check_level(&forest, None, &first, &sort);
        });
}

#[derive(Clone, Debug)]
enum CursorOp {
    Advance(Option<u8>, bool),
    Retreat,
    Record(Option<u8>, bool),
    Reset,
}

fn cursor_op(op: (u8, u8, bool)) -> CursorOp {
    let cursor = |c: u8| (c % 4 != 0).then_some(c % 4);
    match op.0 % 5 {
        0 | 1 => CursorOp::Advance(cursor(op.1), op.2),
        2 => CursorOp::Retreat,
        3 => CursorOp::Record(cursor(op.1), op.2),
        _ => CursorOp::Reset,
    }
}

#[test]
fn cursor_history_keeps_forward_pages() {
    bolero::check!()
        .with_type::<Vec<(u8, u8, bool)>>()
        .cloned()
        .for_each(|ops| {
            let cursor = |c: Option<u8>| c.map(|c| Cursor(format!("k{c}")));
            let mut store = PageCursorStore::new();
            let mut history: Vec<Option<Cursor>> = vec![None];
            let mut index = 0;

            for op in ops.into_iter().map(cursor_op) {
                match op {
                    CursorOp::Advance(used, more) => {
                        let used = cursor(used);
                        store.advance(used.clone(), Some(Cursor::from("next")), more);
                        if history.get(index + 1) != Some(&used) {
                            history.truncate(index + 1);
                            history.push(used);
                        }
                        index += 1;
                        assert_eq!(store.has_more(), more);
                    }
                    CursorOp::Retreat => match index {
                        0 => assert!(store.retreat().is_err()),
                        _ => {
                            let len = store.history().len();
                            index -= 1;
                            assert_eq!(store.retreat().unwrap(), history[index]);
                            assert_eq!(store.history().len(), len);
                        }
                    },
                    CursorOp::Record(next, more) => {
                        let next = cursor(next);
                        store.record(next.clone(), more);
                        assert_eq!(store.has_more(), more && next.is_some());
                    }
                    CursorOp::Reset => {
                        store.reset();
                        history = vec![None];
                        index = 0;
                    }
                }

                assert_eq!(store.history(), &history[..]);
                assert_eq!(store.history()[0], None);
                assert_eq!(store.current_index(), index);
                assert_eq!(store.current_cursor(), history[index].as_ref());
                assert_eq!(store.can_go_back(), index > 0);
                assert_eq!(store.page_number(), index + 1);
            }
        });
}
