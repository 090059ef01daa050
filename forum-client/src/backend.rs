use async_trait::async_trait;

use crate::{
    api::{Comment, CommentId, CommentUpdate, CommentsQuery, NewComment, Page, RepliesQuery, ThreadId},
    Error,
};

/// The forum's HTTP API, as seen by the client.
///
/// Methods take `&self` so that fetches for different comments may be in
/// flight at the same time.
#[async_trait]
pub trait Backend {
    /// `GET thread/{id}/comments`
    async fn list_comments(
        &self,
        thread: &ThreadId,
        query: &CommentsQuery,
    ) -> Result<Page<Comment>, Error>;

    /// `GET comments/{id}/replies`, one level only
    async fn list_replies(
        &self,
        comment: &CommentId,
        query: &RepliesQuery,
    ) -> Result<Page<Comment>, Error>;

    /// `POST comments`
    async fn create_comment(&self, new: NewComment) -> Result<Comment, Error>;

    /// `PUT comments/{id}`
    async fn update_comment(&self, update: CommentUpdate) -> Result<Comment, Error>;

    /// `DELETE comments/{id}`
    async fn delete_comment(&self, comment: &CommentId) -> Result<(), Error>;
}

#[async_trait]
impl<B: Backend + Send + Sync + ?Sized> Backend for std::sync::Arc<B> {
    async fn list_comments(
        &self,
        thread: &ThreadId,
        query: &CommentsQuery,
    ) -> Result<Page<Comment>, Error> {
        (**self).list_comments(thread, query).await
    }

    async fn list_replies(
        &self,
        comment: &CommentId,
        query: &RepliesQuery,
    ) -> Result<Page<Comment>, Error> {
        (**self).list_replies(comment, query).await
    }

    async fn create_comment(&self, new: NewComment) -> Result<Comment, Error> {
        (**self).create_comment(new).await
    }

    async fn update_comment(&self, update: CommentUpdate) -> Result<Comment, Error> {
        (**self).update_comment(update).await
    }

    async fn delete_comment(&self, comment: &CommentId) -> Result<(), Error> {
        (**self).delete_comment(comment).await
    }
}
