use async_trait::async_trait;
use forum_client::{
    api::{
        Comment, CommentId, CommentUpdate, CommentsQuery, NewComment, Page, RepliesQuery, ThreadId,
        UserId,
    },
    Backend, Error,
};

use crate::{Db, Failure, MockServer, Request};

/// One user's connection to a `MockServer`
#[derive(Clone, Debug)]
pub struct MockBackend {
    server: MockServer,
    user: UserId,
}

impl MockBackend {
    pub fn new(server: MockServer, user: UserId) -> MockBackend {
        MockBackend { server, user }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    fn run<T>(
        &self,
        req: Request,
        f: impl FnOnce(&mut Db) -> Result<T, forum_client::api::Error>,
    ) -> Result<T, Error> {
        let mut db = self.server.0.lock();
        tracing::trace!(user = %self.user, ?req, "mock server request");
        let kind = req.kind();
        db.log(req);
        match db.take_failure(kind) {
            Some(Failure::Transport) => Err(Error::transport(anyhow::anyhow!(
                "injected transport failure"
            ))),
            Some(Failure::Api(e)) => Err(Error::from_api(e)),
            None => f(&mut db).map_err(Error::from_api),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn list_comments(
        &self,
        thread: &ThreadId,
        query: &CommentsQuery,
    ) -> Result<Page<Comment>, Error> {
        let req = Request::ListComments {
            thread: thread.clone(),
            query: query.clone(),
        };
        self.run(req, |db| db.list_comments(thread, query))
    }

    async fn list_replies(
        &self,
        comment: &CommentId,
        query: &RepliesQuery,
    ) -> Result<Page<Comment>, Error> {
        let req = Request::ListReplies {
            comment: comment.clone(),
            query: query.clone(),
        };
        self.run(req, |db| db.list_replies(comment, query))
    }

    async fn create_comment(&self, new: NewComment) -> Result<Comment, Error> {
        let req = Request::Create {
            user: self.user.clone(),
            new: new.clone(),
        };
        self.run(req, |db| db.create(&self.user, new))
    }

    async fn update_comment(&self, update: CommentUpdate) -> Result<Comment, Error> {
        let req = Request::Update {
            user: self.user.clone(),
            update: update.clone(),
        };
        self.run(req, |db| db.update(&self.user, update))
    }

    async fn delete_comment(&self, comment: &CommentId) -> Result<(), Error> {
        let req = Request::Delete {
            user: self.user.clone(),
            comment: comment.clone(),
        };
        self.run(req, |db| db.delete(&self.user, comment))
    }
}
