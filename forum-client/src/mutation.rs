use crate::{
    api::{Attachment, Comment, CommentId, CommentUpdate, NewComment},
    Backend, CommentNode, Error, Preferences, ThreadView,
};

/// How a newly created comment made it into the view
#[derive(Debug)]
pub enum Placement {
    /// Inserted under its already loaded parent
    Inserted,

    /// Its parent already holds a reply with that id, for instance one
    /// brought in by a concurrent reply load. Reply counts are untouched.
    AlreadyLoaded,

    /// The current root page was reloaded to pick it up
    Reloaded,

    /// The comment exists on the server but reloading the page failed.
    /// It must not be submitted again.
    ReloadFailed(Error),
}

#[derive(Debug)]
pub struct Created {
    pub comment: Comment,
    pub placement: Placement,
}

impl<B: Backend, P: Preferences> ThreadView<B, P> {
    fn adjust_ancestors(&mut self, path: &[usize], f: impl Fn(u64) -> u64) {
        for depth in 1..=path.len() {
            if let Some(n) = CommentNode::at_path_mut(&mut self.roots, &path[..depth]) {
                n.reply_count = f(n.reply_count);
            }
        }
    }

    /// Posts a new comment, as a reply to `parent` if set.
    ///
    /// A reply to a loaded comment is inserted in place. Anything else
    /// reloads the current root page.
    pub async fn create(
        &mut self,
        parent: Option<CommentId>,
        content: String,
        attachment: Option<Attachment>,
    ) -> Result<Created, Error> {
        let new = NewComment {
            content,
            thread_id: self.thread.clone(),
            parent_comment_id: parent.clone(),
            attachment,
        };
        new.validate()?;
        let comment = self.backend.create_comment(new).await?;
        tracing::info!(comment = %comment.id, parent = ?parent, "created comment");

        let path = parent
            .as_ref()
            .and_then(|p| CommentNode::path_to(&self.roots, p));
        let placement = match path {
            Some(path) => {
                let sort = self.sort.current();
                let inserted = CommentNode::at_path_mut(&mut self.roots, &path)
                    .map(|n| n.insert_child(CommentNode::new(comment.clone()), &sort))
                    .unwrap_or(false);
                match inserted {
                    true => {
                        self.adjust_ancestors(&path, |c| c.saturating_add(1));
                        Placement::Inserted
                    }
                    false => {
                        tracing::debug!(comment = %comment.id, "created comment is already loaded");
                        Placement::AlreadyLoaded
                    }
                }
            }
            None => match self.reload().await {
                Ok(()) => Placement::Reloaded,
                Err(err) => {
                    tracing::error!(comment = %comment.id, %err, "comment created but reloading the page failed");
                    Placement::ReloadFailed(err)
                }
            },
        };
        Ok(Created { comment, placement })
    }

    /// Edits a comment's content, keeping its position and loaded replies
    pub async fn update(&mut self, id: &CommentId, content: String) -> Result<Comment, Error> {
        let update = CommentUpdate {
            comment_id: id.clone(),
            content,
        };
        update.validate()?;
        let comment = self.backend.update_comment(update).await?;
        tracing::info!(comment = %comment.id, "updated comment");
        match CommentNode::find_mut(&mut self.roots, id) {
            Some(n) => n.replace_comment(comment.clone()),
            None => tracing::debug!(comment = %id, "updated comment is not loaded"),
        }
        Ok(comment)
    }

    /// Deletes a comment. Its loaded replies leave the view along with it.
    pub async fn delete(&mut self, id: &CommentId) -> Result<(), Error> {
        self.backend.delete_comment(id).await?;
        tracing::info!(comment = %id, "deleted comment");
        let Some(path) = CommentNode::path_to(&self.roots, id) else {
            tracing::debug!(comment = %id, "deleted comment is not loaded");
            return Ok(());
        };
        let (last, parent) = match path.split_last() {
            Some(split) => split,
            None => return Ok(()),
        };
        match parent.is_empty() {
            true => {
                self.roots.remove(*last);
            }
            false => {
                if let Some(p) = CommentNode::at_path_mut(&mut self.roots, parent) {
                    p.children.remove(*last);
                }
                self.adjust_ancestors(parent, |c| c.saturating_sub(1));
            }
        }
        Ok(())
    }
}
