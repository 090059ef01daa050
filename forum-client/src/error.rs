use crate::api::{self, CommentId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network failure or server-side (5xx) error, the request may be retried
    #[error("transport error: {0:#}")]
    Transport(anyhow::Error),

    /// The server refused the request (4xx), retrying will not help
    #[error(transparent)]
    Validation(#[from] api::Error),

    /// A response arrived for a listing or node that has changed since the
    /// request was made
    #[error("stale response discarded (generation {request}, current {current})")]
    StaleResponse { request: u64, current: u64 },

    #[error("comment {0} is not currently loaded")]
    UnknownComment(CommentId),

    #[error("already on the first page")]
    NoPreviousPage,

    #[error("no further page to load")]
    NoMorePages,
}

impl Error {
    pub fn transport(err: impl Into<anyhow::Error>) -> Error {
        Error::Transport(err.into())
    }

    /// Sorts an error reported by the server: 5xx errors are transport
    /// failures, everything else is surfaced as is
    pub fn from_api(err: api::Error) -> Error {
        match err.status_code().is_server_error() {
            true => Error::Transport(err.into()),
            false => Error::Validation(err),
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleResponse { .. })
    }
}

/// The server's reply count for a comment is lower than the number of
/// replies currently loaded under it. Display uses the loaded count.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsistencyWarning {
    pub comment: CommentId,
    pub reported: u64,
    pub loaded: usize,
}

impl std::fmt::Display for ConsistencyWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "comment {} reports {} replies but {} are loaded",
            self.comment, self.reported, self.loaded
        )
    }
}
