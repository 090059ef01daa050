use async_trait::async_trait;
use forum_client::{
    api::{
        self, Comment, CommentId, CommentUpdate, CommentsQuery, NewComment, Page, RepliesQuery,
        ThreadId,
    },
    Backend, Error,
};

/// `Backend` over the forum's HTTP API
pub struct HttpBackend {
    client: reqwest::Client,
    host: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(host: &str, token: Option<String>) -> HttpBackend {
        HttpBackend {
            client: reqwest::Client::new(),
            host: String::from(host.trim_end_matches('/')),
            token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.client.request(method, format!("{}/{path}", self.host));
        match &self.token {
            Some(tok) => req.bearer_auth(tok),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, Error> {
        let resp = req.send().await.map_err(Error::transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.bytes().await.map_err(Error::transport)?;
        let err = match api::Error::parse(status, &body) {
            Ok(err) => err,
            Err(_) => {
                tracing::debug!(%status, body = %String::from_utf8_lossy(&body), "unparseable error body");
                match status.is_server_error() {
                    true => api::Error::Unknown(format!("server returned {status}")),
                    false => api::Error::Invalid {
                        message: format!("server returned {status}"),
                        errors: Vec::new(),
                    },
                }
            }
        };
        Err(Error::from_api(err))
    }

    async fn json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        self.send(req)
            .await?
            .json::<T>()
            .await
            .map_err(Error::transport)
    }
}

fn new_comment_form(new: NewComment) -> Result<reqwest::multipart::Form, Error> {
    let mut form = reqwest::multipart::Form::new()
        .text("Content", new.content)
        .text("ThreadId", new.thread_id.0);
    if let Some(p) = new.parent_comment_id {
        form = form.text("ParentCommentId", p.0);
    }
    if let Some(a) = new.attachment {
        let part = reqwest::multipart::Part::bytes(a.data)
            .file_name(a.file_name)
            .mime_str(&a.content_type)
            .map_err(|_| {
                api::Error::invalid_field("FormFile", "attached file has an invalid content type")
            })?;
        form = form.part("FormFile", part);
    }
    Ok(form)
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_comments(
        &self,
        thread: &ThreadId,
        query: &CommentsQuery,
    ) -> Result<Page<Comment>, Error> {
        let req = self
            .request(reqwest::Method::GET, &format!("thread/{thread}/comments"))
            .query(query);
        self.json(req).await
    }

    async fn list_replies(
        &self,
        comment: &CommentId,
        query: &RepliesQuery,
    ) -> Result<Page<Comment>, Error> {
        let req = self
            .request(reqwest::Method::GET, &format!("comments/{comment}/replies"))
            .query(query);
        self.json(req).await
    }

    async fn create_comment(&self, new: NewComment) -> Result<Comment, Error> {
        let req = self
            .request(reqwest::Method::POST, "comments")
            .multipart(new_comment_form(new)?);
        self.json(req).await
    }

    async fn update_comment(&self, update: CommentUpdate) -> Result<Comment, Error> {
        let req = self
            .request(
                reqwest::Method::PUT,
                &format!("comments/{}", update.comment_id),
            )
            .json(&update);
        self.json(req).await
    }

    async fn delete_comment(&self, comment: &CommentId) -> Result<(), Error> {
        let req = self.request(reqwest::Method::DELETE, &format!("comments/{comment}"));
        self.send(req).await?;
        Ok(())
    }
}
