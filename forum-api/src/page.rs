use crate::{Cursor, SortField};

pub const DEFAULT_PAGE_SIZE: usize = 25;
pub const MAX_PAGE_SIZE: usize = 100;

/// One page of a cursor-paginated listing
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    // a plain `default` would require `T: Default`
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<Cursor>,
    #[serde(default)]
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Page<T> {
        Page {
            items: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}

/// Query for a thread's top-level listing
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentsQuery {
    pub sort_by: SortField,
    pub ascending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Cursor>,
    pub limit: usize,
}

/// Query for one level of a comment's replies
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepliesQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Cursor>,
    pub limit: usize,
}

pub(crate) fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_PAGE_SIZE)
}

impl CommentsQuery {
    pub fn new(sort: crate::Sort, after: Option<Cursor>, limit: usize) -> CommentsQuery {
        CommentsQuery {
            sort_by: sort.field,
            ascending: sort.direction.is_ascending(),
            after,
            limit: clamp_limit(limit),
        }
    }

    pub fn sort(&self) -> crate::Sort {
        crate::Sort {
            field: self.sort_by,
            direction: crate::SortDirection::from_ascending(self.ascending),
        }
    }
}

impl RepliesQuery {
    pub fn new(after: Option<Cursor>, limit: usize) -> RepliesQuery {
        RepliesQuery {
            after,
            limit: clamp_limit(limit),
        }
    }
}
