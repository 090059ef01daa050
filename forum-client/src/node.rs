use std::collections::HashSet;

use crate::{
    api::{Comment, CommentId, Cursor, Sort},
    ConsistencyWarning, OrderExt,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommentNode {
    pub comment: Comment,

    /// Reply count hint, starts as the server's count and follows local
    /// creations and deletions. The received `Comment` is never modified.
    pub reply_count: u64,

    /// Replies loaded so far, in the active sort order
    pub children: Vec<CommentNode>,

    /// Cursor for the next page of replies, only meaningful once
    /// `children_loaded` is set
    pub child_cursor: Option<Cursor>,
    pub children_loaded: bool,
    pub children_has_more: bool,

    /// Whether the replies are currently shown. Collapsing keeps them.
    pub expanded: bool,
}

impl CommentNode {
    pub fn new(comment: Comment) -> CommentNode {
        CommentNode {
            reply_count: comment.reply_count,
            comment,
            children: Vec::new(),
            child_cursor: None,
            children_loaded: false,
            children_has_more: false,
            expanded: false,
        }
    }

    pub fn id(&self) -> &CommentId {
        &self.comment.id
    }

    /// Number of replies the server knows of that are not loaded yet
    pub fn remaining_replies(&self) -> u64 {
        self.reply_count.saturating_sub(self.children.len() as u64)
    }

    /// Whether `load_next` would fetch anything for this node
    pub fn can_load_more(&self) -> bool {
        !self.children_loaded || self.children_has_more
    }

    pub fn consistency(&self) -> Option<ConsistencyWarning> {
        if self.children.len() as u64 > self.reply_count {
            Some(ConsistencyWarning {
                comment: self.comment.id.clone(),
                reported: self.reply_count,
                loaded: self.children.len(),
            })
        } else {
            None
        }
    }

    /// Appends replies that are not already present, then restores the sort
    /// order. Self references and duplicate ids are dropped. Returns the ids
    /// that were actually added, in the order they were received.
    pub fn merge_children(&mut self, incoming: Vec<Comment>, sort: &Sort) -> Vec<CommentId> {
        let mut seen = self
            .children
            .iter()
            .map(|c| c.comment.id.clone())
            .collect::<HashSet<_>>();
        let mut added = Vec::new();
        for c in incoming {
            if c.id == self.comment.id {
                tracing::warn!(comment = %c.id, "server returned a comment as its own reply");
                continue;
            }
            if !seen.insert(c.id.clone()) {
                continue;
            }
            added.push(c.id.clone());
            self.children.push(CommentNode::new(c));
        }
        if !added.is_empty() {
            sort.sort(&mut self.children);
        }
        added
    }

    /// Replaces the comment with a newer version received from the server,
    /// keeping the node's position and loaded replies
    pub fn replace_comment(&mut self, comment: Comment) {
        self.reply_count = comment.reply_count;
        self.comment = comment;
    }

    /// Inserts one reply at its sorted position. Returns false if it was
    /// already present or refers to this node itself.
    pub fn insert_child(&mut self, child: CommentNode, sort: &Sort) -> bool {
        if child.comment.id == self.comment.id
            || self.children.iter().any(|c| c.comment.id == child.comment.id)
        {
            return false;
        }
        let idx = self
            .children
            .partition_point(|c| sort.compare(&c.comment, &child.comment).is_lt());
        self.children.insert(idx, child);
        true
    }

    pub fn find<'a>(nodes: &'a [CommentNode], id: &CommentId) -> Option<&'a CommentNode> {
        for c in nodes {
            if c.comment.id == *id {
                return Some(c);
            }
            if let Some(res) = CommentNode::find(&c.children, id) {
                return Some(res);
            }
        }
        None
    }

    pub fn find_mut<'a>(
        nodes: &'a mut [CommentNode],
        id: &CommentId,
    ) -> Option<&'a mut CommentNode> {
        for c in nodes.iter_mut() {
            if c.comment.id == *id {
                return Some(c);
            }
            if let Some(res) = CommentNode::find_mut(&mut c.children, id) {
                return Some(res);
            }
        }
        None
    }

    /// Indices leading from the forest root down to the node with this id
    pub fn path_to(nodes: &[CommentNode], id: &CommentId) -> Option<Vec<usize>> {
        for (i, c) in nodes.iter().enumerate() {
            if c.comment.id == *id {
                return Some(vec![i]);
            }
            if let Some(mut path) = CommentNode::path_to(&c.children, id) {
                path.insert(0, i);
                return Some(path);
            }
        }
        None
    }

    pub fn at_path_mut<'a>(
        nodes: &'a mut [CommentNode],
        path: &[usize],
    ) -> Option<&'a mut CommentNode> {
        let (first, rest) = path.split_first()?;
        let node = nodes.get_mut(*first)?;
        match rest.is_empty() {
            true => Some(node),
            false => CommentNode::at_path_mut(&mut node.children, rest),
        }
    }

    /// Re-sorts every loaded level of the forest
    pub fn sort_all(nodes: &mut [CommentNode], sort: &Sort) {
        sort.sort(nodes);
        for n in nodes.iter_mut() {
            CommentNode::sort_all(&mut n.children, sort);
        }
    }

    /// Calls `f` on every node of the forest, parents before children
    pub fn walk<'a>(nodes: &'a [CommentNode], f: &mut impl FnMut(&'a CommentNode)) {
        for n in nodes {
            f(n);
            CommentNode::walk(&n.children, f);
        }
    }
}
