use anyhow::{anyhow, Context};
use serde_json::json;

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub property_name: String,
    pub error_message: String,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid pagination cursor {0:?}")]
    InvalidCursor(String),

    #[error("Comment content is empty")]
    EmptyContent,

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("{message}")]
    Invalid {
        message: String,
        errors: Vec<FieldError>,
    },
}

impl Error {
    pub fn invalid_field(property: &str, message: &str) -> Error {
        Error::Invalid {
            message: String::from(message),
            errors: vec![FieldError {
                property_name: String::from(property),
                error_message: String::from(message),
            }],
        }
    }

    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InvalidCursor(_) => StatusCode::BAD_REQUEST,
            Error::EmptyContent => StatusCode::BAD_REQUEST,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::Invalid { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::Unauthenticated => json!({
                "message": "not authenticated",
                "type": "unauthenticated",
            }),
            Error::NotFound(what) => json!({
                "message": "not found",
                "type": "not-found",
                "what": what,
            }),
            Error::InvalidCursor(c) => json!({
                "message": "invalid pagination cursor",
                "type": "invalid-cursor",
                "cursor": c,
            }),
            Error::EmptyContent => json!({
                "message": "comment content is empty",
                "type": "empty-content",
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::Invalid { message, errors } => json!({
                "message": message,
                "type": "invalid",
                "errors": errors,
            }),
        })
        .expect("serializing error contents")
    }

    /// Parses an error body. Bodies without a `type` are read in the
    /// `{ message, errors }` shape and mapped from the status code.
    pub fn parse(status: http::StatusCode, body: &[u8]) -> anyhow::Result<Error> {
        use http::StatusCode;
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        let message = || {
            String::from(
                data.get("message")
                    .and_then(|msg| msg.as_str())
                    .unwrap_or(""),
            )
        };
        let Some(ty) = data.get("type").and_then(|t| t.as_str()) else {
            return Ok(match status {
                StatusCode::UNAUTHORIZED => Error::Unauthenticated,
                StatusCode::FORBIDDEN => Error::PermissionDenied,
                StatusCode::NOT_FOUND => Error::NotFound(message()),
                s if s.is_client_error() => Error::Invalid {
                    message: message(),
                    errors: match data.get("errors") {
                        Some(e) => serde_json::from_value(e.clone())
                            .context("parsing field errors")?,
                        None => Vec::new(),
                    },
                },
                _ => Error::Unknown(message()),
            });
        };
        Ok(match ty {
            "unknown" => Error::Unknown(message()),
            "permission-denied" => Error::PermissionDenied,
            "unauthenticated" => Error::Unauthenticated,
            "not-found" => Error::NotFound(String::from(
                data.get("what").and_then(|w| w.as_str()).unwrap_or(""),
            )),
            "invalid-cursor" => Error::InvalidCursor(String::from(
                data.get("cursor")
                    .and_then(|c| c.as_str())
                    .ok_or_else(|| anyhow!("error is an invalid cursor without a cursor"))?,
            )),
            "empty-content" => Error::EmptyContent,
            "null-byte" => Error::NullByteInString(String::from(
                data.get("string")
                    .and_then(|s| s.as_str())
                    .ok_or_else(|| anyhow!("error is a null-byte-in-string without a string"))?,
            )),
            "invalid" => Error::Invalid {
                message: message(),
                errors: match data.get("errors") {
                    Some(e) => {
                        serde_json::from_value(e.clone()).context("parsing field errors")?
                    }
                    None => Vec::new(),
                },
            },
            _ => return Err(anyhow!("error contents has unknown type")),
        })
    }
}
