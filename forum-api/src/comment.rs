use crate::{CommentId, Error, ThreadId, Time, UserId};

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,

    /// Formatted text, never interpreted by the client
    pub content: String,

    pub created_at: Time,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Time>,

    pub thread_id: ThreadId,

    /// None for a top-level comment
    #[serde(default)]
    pub parent_comment_id: Option<CommentId>,

    pub user_id: UserId,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        alias = "avatarTumbnailUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_thumbnail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(
        default,
        alias = "imageTumbnailUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,

    /// Server-reported number of descendant replies. This is a hint for
    /// display, it may disagree with what is currently loaded.
    #[serde(default, alias = "commentCount")]
    pub reply_count: u64,
}

impl Comment {
    pub fn is_root(&self) -> bool {
        self.parent_comment_id.is_none()
    }

    pub fn has_self_parent(&self) -> bool {
        self.parent_comment_id.as_ref() == Some(&self.id)
    }

    pub fn is_edited(&self) -> bool {
        matches!(self.updated_at, Some(u) if u != self.created_at)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
    pub thread_id: ThreadId,
    pub parent_comment_id: Option<CommentId>,
    pub attachment: Option<Attachment>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_content(&self.content)?;
        crate::validate_string(self.thread_id.as_str())?;
        if let Some(parent) = &self.parent_comment_id {
            crate::validate_string(parent.as_str())?;
        }
        if let Some(a) = &self.attachment {
            crate::validate_string(&a.file_name)?;
            crate::validate_string(&a.content_type)?;
            if a.file_name.trim().is_empty() {
                return Err(Error::invalid_field(
                    "FormFile",
                    "attached file must have a name",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentUpdate {
    pub comment_id: CommentId,
    pub content: String,
}

impl CommentUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(self.comment_id.as_str())?;
        crate::validate_content(&self.content)
    }
}
