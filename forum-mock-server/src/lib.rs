use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use forum_client::{
    api::{
        Comment, CommentId, CommentUpdate, CommentsQuery, Cursor, Error, NewComment, Page,
        RepliesQuery, Sort, SortDirection, SortField, ThreadId, Time, UserId,
    },
    OrderExt,
};
use parking_lot::Mutex;

mod seed;
pub use seed::{Seed, SeedComment, SeedUser};

mod session;
pub use session::MockBackend;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RequestKind {
    ListComments,
    ListReplies,
    Create,
    Update,
    Delete,
}

/// A request as received by the mock server, in arrival order
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Request {
    ListComments {
        thread: ThreadId,
        query: CommentsQuery,
    },
    ListReplies {
        comment: CommentId,
        query: RepliesQuery,
    },
    Create {
        user: UserId,
        new: NewComment,
    },
    Update {
        user: UserId,
        update: CommentUpdate,
    },
    Delete {
        user: UserId,
        comment: CommentId,
    },
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::ListComments { .. } => RequestKind::ListComments,
            Request::ListReplies { .. } => RequestKind::ListReplies,
            Request::Create { .. } => RequestKind::Create,
            Request::Update { .. } => RequestKind::Update,
            Request::Delete { .. } => RequestKind::Delete,
        }
    }
}

/// Injected failure, returned instead of running the request
#[derive(Clone, Debug)]
pub enum Failure {
    /// The request never reached the server
    Transport,
    Api(Error),
}

#[derive(Debug)]
struct User {
    name: String,
    email: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Db {
    users: BTreeMap<UserId, User>,
    threads: BTreeSet<ThreadId>,
    comments: HashMap<CommentId, Comment>,
    clock: Time,
    next_id: u64,
    failures: Vec<(Option<RequestKind>, Failure)>,
    log: Vec<Request>,
}

/// In-memory forum backend. Clones share the same state.
#[derive(Clone, Debug)]
pub struct MockServer(pub(crate) Arc<Mutex<Db>>);

impl Default for MockServer {
    fn default() -> MockServer {
        MockServer::new()
    }
}

fn encode_cursor(id: &CommentId) -> Cursor {
    Cursor(base64::encode_config(id.as_str(), base64::URL_SAFE_NO_PAD))
}

fn decode_cursor(c: &Cursor) -> Result<CommentId, Error> {
    let invalid = || Error::InvalidCursor(c.to_string());
    let bytes = base64::decode_config(c.as_str(), base64::URL_SAFE_NO_PAD).map_err(|_| invalid())?;
    let id = String::from_utf8(bytes).map_err(|_| invalid())?;
    Ok(CommentId(id))
}

// 2023-01-01, start of the mock server's clock
const EPOCH: u64 = 1_672_531_200;

/// Replies come back oldest first
const REPLY_ORDER: Sort = Sort {
    field: SortField::CreatedAt,
    direction: SortDirection::Asc,
};

impl Db {
    fn tick(&mut self) -> Time {
        self.clock = self.clock + chrono::Duration::seconds(1);
        self.clock
    }

    fn fresh_id(&mut self) -> CommentId {
        loop {
            self.next_id += 1;
            let id = CommentId(format!("c{:04}", self.next_id));
            if !self.comments.contains_key(&id) {
                return id;
            }
        }
    }

    fn descendants(&self, id: &CommentId) -> Vec<CommentId> {
        let mut res = Vec::new();
        let mut todo = vec![id.clone()];
        while let Some(cur) = todo.pop() {
            for c in self.comments.values() {
                if c.parent_comment_id.as_ref() == Some(&cur) && c.id != cur {
                    res.push(c.id.clone());
                    todo.push(c.id.clone());
                }
            }
        }
        res
    }

    /// The stored comment with its reply count filled in
    fn render(&self, c: &Comment) -> Comment {
        Comment {
            reply_count: self.descendants(&c.id).len() as u64,
            ..c.clone()
        }
    }

    fn get(&self, id: &CommentId) -> Result<&Comment, Error> {
        self.comments
            .get(id)
            .ok_or_else(|| Error::NotFound(format!("comment {id}")))
    }

    fn paginate(
        &self,
        mut items: Vec<&Comment>,
        sort: &Sort,
        after: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page<Comment>, Error> {
        items.sort_by(|a, b| sort.compare(a, b));
        let start = match after {
            None => 0,
            Some(c) => {
                let after = decode_cursor(c)?;
                let pos = items
                    .iter()
                    .position(|i| i.id == after)
                    .ok_or_else(|| Error::InvalidCursor(c.to_string()))?;
                pos + 1
            }
        };
        let rest = items.get(start..).unwrap_or(&[]);
        let page = &rest[..rest.len().min(limit.max(1))];
        let has_more = page.len() < rest.len();
        Ok(Page {
            items: page.iter().map(|c| self.render(c)).collect(),
            next_cursor: match has_more {
                true => page.last().map(|c| encode_cursor(&c.id)),
                false => None,
            },
            has_more,
        })
    }

    pub(crate) fn list_comments(
        &self,
        thread: &ThreadId,
        query: &CommentsQuery,
    ) -> Result<Page<Comment>, Error> {
        if !self.threads.contains(thread) {
            return Err(Error::NotFound(format!("thread {thread}")));
        }
        let roots = self
            .comments
            .values()
            .filter(|c| c.thread_id == *thread && c.parent_comment_id.is_none())
            .collect();
        self.paginate(roots, &query.sort(), query.after.as_ref(), query.limit)
    }

    pub(crate) fn list_replies(
        &self,
        comment: &CommentId,
        query: &RepliesQuery,
    ) -> Result<Page<Comment>, Error> {
        self.get(comment)?;
        let replies = self
            .comments
            .values()
            .filter(|c| c.parent_comment_id.as_ref() == Some(comment) && c.id != *comment)
            .collect();
        self.paginate(replies, &REPLY_ORDER, query.after.as_ref(), query.limit)
    }

    pub(crate) fn create(&mut self, user: &UserId, new: NewComment) -> Result<Comment, Error> {
        let author = self.users.get(user).ok_or(Error::Unauthenticated)?;
        let (user_name, email) = (author.name.clone(), author.email.clone());
        new.validate()?;
        if !self.threads.contains(&new.thread_id) {
            return Err(Error::NotFound(format!("thread {}", new.thread_id)));
        }
        if let Some(p) = &new.parent_comment_id {
            if self.get(p)?.thread_id != new.thread_id {
                return Err(Error::invalid_field(
                    "ParentCommentId",
                    "Parent comment belongs to another thread",
                ));
            }
        }

        let id = self.fresh_id();
        let now = self.tick();
        let mut comment = Comment {
            id: id.clone(),
            content: new.content,
            created_at: now,
            updated_at: None,
            thread_id: new.thread_id,
            parent_comment_id: new.parent_comment_id,
            user_id: user.clone(),
            user_name,
            email,
            avatar_thumbnail_url: None,
            image_url: None,
            image_thumbnail_url: None,
            file_url: None,
            reply_count: 0,
        };
        if let Some(a) = new.attachment {
            let url = format!("/files/{id}/{}", a.file_name);
            match a.content_type.starts_with("image/") {
                true => {
                    comment.image_thumbnail_url = Some(format!("{url}?thumbnail"));
                    comment.image_url = Some(url);
                }
                false => comment.file_url = Some(url),
            }
        }
        tracing::debug!(comment = %id, "mock server stored comment");
        self.comments.insert(id, comment.clone());
        Ok(comment)
    }

    fn check_author(&self, user: &UserId, id: &CommentId) -> Result<(), Error> {
        if !self.users.contains_key(user) {
            return Err(Error::Unauthenticated);
        }
        match self.get(id)?.user_id == *user {
            true => Ok(()),
            false => Err(Error::PermissionDenied),
        }
    }

    pub(crate) fn update(&mut self, user: &UserId, update: CommentUpdate) -> Result<Comment, Error> {
        self.check_author(user, &update.comment_id)?;
        update.validate()?;
        let now = self.tick();
        let c = self
            .comments
            .get_mut(&update.comment_id)
            .ok_or_else(|| Error::NotFound(format!("comment {}", update.comment_id)))?;
        c.content = update.content;
        c.updated_at = Some(now);
        let c = c.clone();
        Ok(self.render(&c))
    }

    /// Deletes the comment along with all of its replies
    pub(crate) fn delete(&mut self, user: &UserId, id: &CommentId) -> Result<(), Error> {
        self.check_author(user, id)?;
        for d in self.descendants(id) {
            self.comments.remove(&d);
        }
        self.comments.remove(id);
        Ok(())
    }

    pub(crate) fn take_failure(&mut self, kind: RequestKind) -> Option<Failure> {
        let idx = self
            .failures
            .iter()
            .position(|(k, _)| k.map(|k| k == kind).unwrap_or(true))?;
        Some(self.failures.remove(idx).1)
    }

    pub(crate) fn log(&mut self, r: Request) {
        self.log.push(r);
    }
}

impl MockServer {
    pub fn new() -> MockServer {
        MockServer(Arc::new(Mutex::new(Db {
            users: BTreeMap::new(),
            threads: BTreeSet::new(),
            comments: HashMap::new(),
            clock: Time::from(std::time::UNIX_EPOCH + std::time::Duration::from_secs(EPOCH)),
            next_id: 0,
            failures: Vec::new(),
            log: Vec::new(),
        })))
    }

    pub fn add_user(&self, id: UserId, name: &str, email: Option<&str>) {
        self.0.lock().users.insert(
            id,
            User {
                name: String::from(name),
                email: email.map(String::from),
            },
        );
    }

    pub fn add_thread(&self, id: ThreadId) {
        self.0.lock().threads.insert(id);
    }

    /// Stores a comment as is, bypassing validation. Its thread is created
    /// if needed and its reply count is ignored.
    pub fn insert(&self, comment: Comment) {
        let mut db = self.0.lock();
        db.threads.insert(comment.thread_id.clone());
        if comment.created_at > db.clock {
            db.clock = comment.created_at;
        }
        db.comments.insert(comment.id.clone(), comment);
    }

    pub fn comment(&self, id: &CommentId) -> Option<Comment> {
        let db = self.0.lock();
        db.comments.get(id).map(|c| db.render(c))
    }

    pub fn num_comments(&self) -> usize {
        self.0.lock().comments.len()
    }

    /// Fails the next request, whatever it is.
    ///
    /// Injected failures form one queue with those of `fail_next_of`: a
    /// request consumes the oldest queued failure that applies to it.
    pub fn fail_next(&self, failure: Failure) {
        self.0.lock().failures.push((None, failure));
    }

    /// Fails the next request of the given kind. Shares its queue with
    /// `fail_next`, so an untargeted failure queued earlier is used first.
    pub fn fail_next_of(&self, kind: RequestKind, failure: Failure) {
        self.0.lock().failures.push((Some(kind), failure));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.0.lock().log.clone()
    }

    pub fn clear_requests(&self) {
        self.0.lock().log.clear();
    }

    /// A client connection authenticated as `user`
    pub fn session(&self, user: UserId) -> MockBackend {
        MockBackend::new(self.clone(), user)
    }
}
