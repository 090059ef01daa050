use crate::{
    api::{Comment, CommentId, Cursor, Page, RepliesQuery},
    Backend, CommentNode, ConsistencyWarning, Error, Preferences, ThreadView,
};

/// A pending fetch of the next page of one comment's replies.
///
/// Captures what the node looked like when the request was made, so that
/// a response arriving after a reload or a concurrent load of the same node
/// can be recognized and dropped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplyRequest {
    pub comment: CommentId,
    pub after: Option<Cursor>,
    pub first: bool,
    pub generation: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoadOutcome {
    /// Replies that were not loaded before, in the order the server sent them
    pub added: Vec<CommentId>,
    pub child_cursor: Option<Cursor>,
    pub has_more: bool,
    pub warning: Option<ConsistencyWarning>,
}

impl<B: Backend, P: Preferences> ThreadView<B, P> {
    /// Prepares the fetch of the next page of replies under `id`
    pub fn reply_request(&self, id: &CommentId) -> Result<ReplyRequest, Error> {
        let node = self
            .find(id)
            .ok_or_else(|| Error::UnknownComment(id.clone()))?;
        if !node.can_load_more() {
            return Err(Error::NoMorePages);
        }
        Ok(ReplyRequest {
            comment: id.clone(),
            after: match node.children_loaded {
                true => node.child_cursor.clone(),
                false => None,
            },
            first: !node.children_loaded,
            generation: self.generation,
        })
    }

    /// Only borrows the view, so fetches for different nodes can be joined
    pub async fn fetch_replies(&self, req: &ReplyRequest) -> Result<Page<Comment>, Error> {
        tracing::debug!(
            comment = %req.comment,
            after = ?req.after,
            generation = req.generation,
            "fetching replies"
        );
        let query = RepliesQuery::new(req.after.clone(), self.reply_page_size);
        self.backend.list_replies(&req.comment, &query).await
    }

    /// Merges a page of replies into the node it was requested for
    pub fn apply_replies(
        &mut self,
        req: ReplyRequest,
        page: Page<Comment>,
    ) -> Result<LoadOutcome, Error> {
        let stale = Error::StaleResponse {
            request: req.generation,
            current: self.generation,
        };
        if req.generation != self.generation {
            tracing::debug!(comment = %req.comment, %stale, "dropping replies");
            return Err(stale);
        }
        let sort = self.sort.current();
        let node = CommentNode::find_mut(&mut self.roots, &req.comment)
            .ok_or_else(|| Error::UnknownComment(req.comment.clone()))?;
        let unchanged = match req.first {
            true => !node.children_loaded,
            false => node.children_loaded && node.child_cursor == req.after,
        };
        if !unchanged {
            tracing::debug!(comment = %req.comment, "node changed while fetching, dropping replies");
            return Err(stale);
        }

        let added = node.merge_children(page.items, &sort);
        node.children_loaded = true;
        node.children_has_more = page.has_more && page.next_cursor.is_some();
        node.child_cursor = match node.children_has_more {
            true => page.next_cursor,
            false => None,
        };
        let warning = node.consistency();
        if let Some(w) = &warning {
            tracing::warn!(comment = %w.comment, reported = w.reported, loaded = w.loaded, "reply count lower than loaded replies");
        }
        Ok(LoadOutcome {
            added,
            child_cursor: node.child_cursor.clone(),
            has_more: node.children_has_more,
            warning,
        })
    }

    /// Loads the next page of replies under `id`
    pub async fn load_next(&mut self, id: &CommentId) -> Result<LoadOutcome, Error> {
        let req = self.reply_request(id)?;
        let page = self.fetch_replies(&req).await?;
        self.apply_replies(req, page)
    }

    /// Loads the next page of replies for several nodes at once. Results
    /// are reported per node, in the order of `ids`.
    pub async fn load_next_all(
        &mut self,
        ids: &[CommentId],
    ) -> Vec<(CommentId, Result<LoadOutcome, Error>)> {
        let mut requests = Vec::with_capacity(ids.len());
        let mut res = Vec::with_capacity(ids.len());
        for id in ids {
            match self.reply_request(id) {
                Ok(req) => requests.push(req),
                Err(e) => res.push((id.clone(), Err(e))),
            }
        }
        let pages = {
            let this = &*self;
            futures::future::join_all(requests.iter().map(|r| this.fetch_replies(r))).await
        };
        for (req, page) in requests.into_iter().zip(pages) {
            let id = req.comment.clone();
            let outcome = page.and_then(|p| self.apply_replies(req, p));
            res.push((id, outcome));
        }
        res.sort_by_key(|(id, _)| ids.iter().position(|i| i == id));
        res
    }

    /// Shows the replies of `id`, loading the first page if none was loaded
    /// yet. The node only becomes expanded once its replies are available.
    pub async fn expand(&mut self, id: &CommentId) -> Result<Option<LoadOutcome>, Error> {
        let loaded = self
            .find(id)
            .ok_or_else(|| Error::UnknownComment(id.clone()))?
            .children_loaded;
        let outcome = match loaded {
            true => None,
            false => Some(self.load_next(id).await?),
        };
        if let Some(n) = CommentNode::find_mut(&mut self.roots, id) {
            n.expanded = true;
        }
        Ok(outcome)
    }

    /// Hides the replies of `id` without forgetting them
    pub fn collapse(&mut self, id: &CommentId) -> Result<(), Error> {
        let node = CommentNode::find_mut(&mut self.roots, id)
            .ok_or_else(|| Error::UnknownComment(id.clone()))?;
        node.expanded = false;
        Ok(())
    }

    pub fn is_expanded(&self, id: &CommentId) -> bool {
        self.find(id).map(|n| n.expanded).unwrap_or(false)
    }
}
