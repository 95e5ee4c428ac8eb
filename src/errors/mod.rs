use std::fmt;
use std::io;
use std::path::PathBuf;

use axum::{http::StatusCode, response::{IntoResponse, Response}};

/// Custom error types for the wiki application
#[derive(Debug)]
pub enum WikiError {
    /// Bad path shape, unknown operation or malformed title
    NotFound,
    /// No file exists for an otherwise valid title
    PageMissing(String),
    /// Storage directory could not be created
    StorageDir { path: PathBuf, source: io::Error },
    /// Page file could not be written
    Persistence { path: PathBuf, source: io::Error },
    /// Save request whose form could not be read in full
    BadForm { status: StatusCode, message: String },
    /// A template could not be filled
    Render(String),
    Io(io::Error),
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::NotFound => write!(f, "404 page not found"),
            WikiError::PageMissing(title) => write!(f, "page {} does not exist", title),
            WikiError::StorageDir { path, source } => {
                write!(f, "mkdir {}: {}", path.display(), source)
            }
            WikiError::Persistence { path, source } => {
                write!(f, "write {}: {}", path.display(), source)
            }
            WikiError::BadForm { message, .. } => write!(f, "invalid form: {}", message),
            WikiError::Render(msg) => write!(f, "template error: {}", msg),
            WikiError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for WikiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WikiError::StorageDir { source, .. } | WikiError::Persistence { source, .. } => {
                Some(source)
            }
            WikiError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        WikiError::Io(err)
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::NotFound | WikiError::PageMissing(_) => {
                (StatusCode::NOT_FOUND, "404 page not found").into_response()
            }
            WikiError::BadForm { status, .. } => (status, self.to_string()).into_response(),
            WikiError::StorageDir { .. }
            | WikiError::Persistence { .. }
            | WikiError::Render(_)
            | WikiError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}
