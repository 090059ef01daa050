//! Turns a flat page of comments into a sorted forest.

use std::collections::HashMap;

use crate::{
    api::{Comment, CommentId, Sort},
    CommentNode, OrderExt,
};

/// Builds the forest for one flat listing.
///
/// A comment is attached under its parent when the parent is part of the
/// same listing. Otherwise it is promoted to a root, so nothing is dropped.
/// Self-parented comments and comments that would close a parent cycle are
/// promoted too. When an id appears twice the first record wins.
///
/// Every level of the result is ordered by `sort`.
pub fn build(flat: Vec<Comment>, sort: &Sort) -> Vec<CommentNode> {
    let mut order = Vec::with_capacity(flat.len());
    let mut nodes = HashMap::with_capacity(flat.len());
    for c in flat {
        if nodes.contains_key(&c.id) {
            tracing::debug!(comment = %c.id, "ignoring duplicate comment in listing");
            continue;
        }
        order.push(c.id.clone());
        nodes.insert(c.id.clone(), CommentNode::new(c));
    }

    let mut parent_of: HashMap<CommentId, CommentId> = HashMap::new();
    let mut children_of: HashMap<CommentId, Vec<CommentId>> = HashMap::new();
    let mut roots = Vec::new();
    for id in &order {
        let parent = nodes[id].comment.parent_comment_id.as_ref();
        match parent {
            Some(p) if p == id => {
                tracing::warn!(comment = %id, "comment is its own parent, promoting to root");
                roots.push(id.clone());
            }
            Some(p) if nodes.contains_key(p) => {
                if is_ancestor_or_self(&parent_of, p, id) {
                    tracing::warn!(comment = %id, parent = %p, "parent cycle, promoting to root");
                    roots.push(id.clone());
                } else {
                    parent_of.insert(id.clone(), p.clone());
                    children_of.entry(p.clone()).or_default().push(id.clone());
                }
            }
            _ => roots.push(id.clone()),
        }
    }

    let mut res = roots
        .iter()
        .filter_map(|id| assemble(id, &mut nodes, &mut children_of, sort))
        .collect::<Vec<_>>();
    sort.sort(&mut res);
    res
}

/// Whether `candidate` is `start` or one of the ancestors assigned so far
fn is_ancestor_or_self(
    parent_of: &HashMap<CommentId, CommentId>,
    start: &CommentId,
    candidate: &CommentId,
) -> bool {
    let mut cur = Some(start);
    while let Some(c) = cur {
        if c == candidate {
            return true;
        }
        cur = parent_of.get(c);
    }
    false
}

fn assemble(
    id: &CommentId,
    nodes: &mut HashMap<CommentId, CommentNode>,
    children_of: &mut HashMap<CommentId, Vec<CommentId>>,
    sort: &Sort,
) -> Option<CommentNode> {
    let mut node = nodes.remove(id)?;
    if let Some(children) = children_of.remove(id) {
        node.children = children
            .iter()
            .filter_map(|c| assemble(c, nodes, children_of, sort))
            .collect();
        sort.sort(&mut node.children);
    }
    Some(node)
}
