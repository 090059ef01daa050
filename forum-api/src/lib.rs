use chrono::Utc;

mod comment;
pub use comment::{Attachment, Comment, CommentUpdate, NewComment};

mod error;
pub use error::{Error, FieldError};

mod page;
pub use page::{CommentsQuery, Page, RepliesQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

mod sort;
pub use sort::{Sort, SortDirection, SortField};

pub type Time = chrono::DateTime<Utc>;

macro_rules! string_id {
    ($name:ident) => {
        #[derive(
            Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> $name {
                $name(String::from(s))
            }
        }
    };
}

string_id!(CommentId);
string_id!(ThreadId);
string_id!(UserId);

// Opaque server-issued position in a sorted listing
string_id!(Cursor);

pub fn validate_string(s: &str) -> Result<(), Error> {
    match s.contains('\0') {
        true => Err(Error::NullByteInString(String::from(s))),
        false => Ok(()),
    }
}

pub fn validate_content(s: &str) -> Result<(), Error> {
    validate_string(s)?;
    match s.trim().is_empty() {
        true => Err(Error::EmptyContent),
        false => Ok(()),
    }
}
