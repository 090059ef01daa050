use std::collections::{HashMap, HashSet};

use crate::{
    api::{
        Comment, CommentId, CommentsQuery, Cursor, Page, Sort, SortField, ThreadId,
        DEFAULT_PAGE_SIZE,
    },
    tree, Backend, CommentNode, Error, PageCursorStore, Preferences, SortController,
};

/// Client-side state of one thread's comment listing.
///
/// Root pages replace each other. Replies loaded under a comment survive a
/// root reload for as long as that comment is part of the new page.
pub struct ThreadView<B, P> {
    pub(crate) backend: B,
    pub(crate) thread: ThreadId,
    pub(crate) roots: Vec<CommentNode>,
    pub(crate) cursors: PageCursorStore,
    pub(crate) sort: SortController<P>,

    /// Bumped on every root reload, replies fetched under an older
    /// generation are discarded
    pub(crate) generation: u64,

    pub(crate) page_size: usize,
    pub(crate) reply_page_size: usize,
}

// Loader state of a node from the previous root page, children by id
struct Detached {
    comment: Comment,
    reply_count: u64,
    children: Vec<CommentId>,
    child_cursor: Option<Cursor>,
    children_loaded: bool,
    children_has_more: bool,
    expanded: bool,
}

fn detach(nodes: Vec<CommentNode>, into: &mut HashMap<CommentId, Detached>) {
    for n in nodes {
        let children = n.children.iter().map(|c| c.comment.id.clone()).collect();
        detach(n.children, into);
        into.insert(
            n.comment.id.clone(),
            Detached {
                comment: n.comment,
                reply_count: n.reply_count,
                children,
                child_cursor: n.child_cursor,
                children_loaded: n.children_loaded,
                children_has_more: n.children_has_more,
                expanded: n.expanded,
            },
        );
    }
}

/// Gives nodes of the new page back the replies that were loaded for them.
/// Nodes placed by the new page itself take precedence over old replies.
fn carry_over(
    nodes: &mut [CommentNode],
    old: &mut HashMap<CommentId, Detached>,
    placed: &mut HashSet<CommentId>,
    sort: &Sort,
) {
    for n in nodes.iter_mut() {
        if let Some(prev) = old.remove(n.id()) {
            n.expanded = prev.expanded;
            if prev.children_loaded {
                n.children_loaded = true;
                n.child_cursor = prev.child_cursor;
                n.children_has_more = prev.children_has_more;
                for child in prev.children {
                    if !placed.insert(child.clone()) {
                        continue;
                    }
                    if let Some(c) = old.get(&child) {
                        let mut node = CommentNode::new(c.comment.clone());
                        node.reply_count = c.reply_count;
                        n.children.push(node);
                    }
                }
                crate::OrderExt::sort(sort, &mut n.children);
            }
        }
        carry_over(&mut n.children, old, placed, sort);
    }
}

impl<B: Backend, P: Preferences> ThreadView<B, P> {
    pub fn new(backend: B, prefs: P, thread: ThreadId) -> ThreadView<B, P> {
        ThreadView {
            backend,
            thread,
            roots: Vec::new(),
            cursors: PageCursorStore::new(),
            sort: SortController::new(prefs),
            generation: 0,
            page_size: DEFAULT_PAGE_SIZE,
            reply_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, roots: usize, replies: usize) -> ThreadView<B, P> {
        self.page_size = roots;
        self.reply_page_size = replies;
        self
    }

    pub fn thread(&self) -> &ThreadId {
        &self.thread
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn preferences(&self) -> &P {
        self.sort.preferences()
    }

    /// Comments of the current root page
    pub fn roots(&self) -> &[CommentNode] {
        &self.roots
    }

    pub fn find(&self, id: &CommentId) -> Option<&CommentNode> {
        CommentNode::find(&self.roots, id)
    }

    pub fn cursors(&self) -> &PageCursorStore {
        &self.cursors
    }

    pub fn sort(&self) -> Sort {
        self.sort.current()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    async fn fetch_page(&self, sort: Sort, after: Option<Cursor>) -> Result<Page<Comment>, Error> {
        let query = CommentsQuery::new(sort, after, self.page_size);
        tracing::debug!(
            thread = %self.thread,
            sort_by = query.sort_by.as_query(),
            ascending = query.ascending,
            after = ?query.after,
            "fetching comment page"
        );
        self.backend.list_comments(&self.thread, &query).await
    }

    pub(crate) fn install_page(&mut self, items: Vec<Comment>) {
        self.generation += 1;
        let sort = self.sort.current();
        let mut fresh = tree::build(items, &sort);

        let mut placed = HashSet::new();
        CommentNode::walk(&fresh, &mut |n| {
            placed.insert(n.id().clone());
        });
        let mut old = HashMap::new();
        detach(std::mem::take(&mut self.roots), &mut old);
        carry_over(&mut fresh, &mut old, &mut placed, &sort);

        tracing::info!(
            thread = %self.thread,
            generation = self.generation,
            page = self.cursors.page_number(),
            roots = fresh.len(),
            discarded = old.len(),
            "installed comment page"
        );
        self.roots = fresh;
    }

    /// Fetches the first page with the current sort
    pub async fn load(&mut self) -> Result<(), Error> {
        self.refresh().await
    }

    /// Goes back to the first page, dropping the cursor history
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let page = self.fetch_page(self.sort.current(), None).await?;
        self.cursors.reset();
        self.cursors.record(page.next_cursor, page.has_more);
        self.install_page(page.items);
        Ok(())
    }

    /// Re-fetches the current page, keeping the pagination position
    pub async fn reload(&mut self) -> Result<(), Error> {
        let page = self
            .fetch_page(self.sort.current(), self.cursors.current_cursor().cloned())
            .await?;
        self.cursors.record(page.next_cursor, page.has_more);
        self.install_page(page.items);
        Ok(())
    }

    pub async fn next_page(&mut self) -> Result<(), Error> {
        if !self.cursors.has_more() {
            return Err(Error::NoMorePages);
        }
        let used = self.cursors.next_cursor().cloned();
        let page = self.fetch_page(self.sort.current(), used.clone()).await?;
        self.cursors.advance(used, page.next_cursor, page.has_more);
        self.install_page(page.items);
        Ok(())
    }

    pub async fn previous_page(&mut self) -> Result<(), Error> {
        let cursor = self
            .cursors
            .previous_cursor()
            .ok_or(Error::NoPreviousPage)?
            .cloned();
        let page = self.fetch_page(self.sort.current(), cursor).await?;
        self.cursors.retreat()?;
        self.cursors.record(page.next_cursor, page.has_more);
        self.install_page(page.items);
        Ok(())
    }

    /// Sets the sort explicitly. Returns whether it changed, in which case
    /// the first page was re-fetched.
    pub async fn set_sort(&mut self, sort: Sort) -> Result<bool, Error> {
        if sort == self.sort.current() {
            return Ok(false);
        }
        self.apply_sort(sort).await?;
        Ok(true)
    }

    /// Applies the toggle policy of `SortController::select`
    pub async fn select_sort(&mut self, field: SortField) -> Result<Sort, Error> {
        let sort = self.sort.toggled(field);
        self.apply_sort(sort).await?;
        Ok(sort)
    }

    /// Nothing changes, stored preference included, unless the first page
    /// under `sort` could be fetched
    async fn apply_sort(&mut self, sort: Sort) -> Result<(), Error> {
        let page = self.fetch_page(sort, None).await?;
        self.sort.set(sort);
        // replies are not re-fetched on a sort change, only re-ordered
        CommentNode::sort_all(&mut self.roots, &sort);
        self.cursors.reset();
        self.cursors.record(page.next_cursor, page.has_more);
        self.install_page(page.items);
        Ok(())
    }
}
