use anyhow::Context;
use forum_client::api::{Comment, CommentId, Error, ThreadId, Time, UserId};

use crate::MockServer;

/// Initial content of a mock server, as read from a JSON file
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Seed {
    #[serde(default)]
    pub users: Vec<SeedUser>,
    #[serde(default)]
    pub threads: Vec<ThreadId>,
    #[serde(default)]
    pub comments: Vec<SeedComment>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct SeedUser {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedComment {
    pub id: CommentId,
    pub thread_id: ThreadId,
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,
    pub user_id: UserId,
    pub content: String,
    pub created_at: Time,
    #[serde(default)]
    pub updated_at: Option<Time>,
}

impl Seed {
    pub fn from_json(s: &str) -> anyhow::Result<Seed> {
        serde_json::from_str(s).context("parsing mock server seed")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing mock server seed")
    }
}

impl MockServer {
    /// Fails if a comment refers to an unknown user
    pub fn from_seed(seed: Seed) -> Result<MockServer, Error> {
        let res = MockServer::new();
        for u in &seed.users {
            res.add_user(u.id.clone(), &u.name, u.email.as_deref());
        }
        for t in seed.threads {
            res.add_thread(t);
        }
        for c in seed.comments {
            let user = seed
                .users
                .iter()
                .find(|u| u.id == c.user_id)
                .ok_or_else(|| Error::NotFound(format!("user {}", c.user_id)))?;
            res.insert(Comment {
                id: c.id,
                content: c.content,
                created_at: c.created_at,
                updated_at: c.updated_at,
                thread_id: c.thread_id,
                parent_comment_id: c.parent_comment_id,
                user_id: c.user_id,
                user_name: user.name.clone(),
                email: user.email.clone(),
                avatar_thumbnail_url: None,
                image_url: None,
                image_thumbnail_url: None,
                file_url: None,
                reply_count: 0,
            });
        }
        tracing::info!(
            users = seed.users.len(),
            comments = res.num_comments(),
            "loaded mock server seed"
        );
        Ok(res)
    }
}
