//! Error handling for the provisioning tool

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Tagged kind for backend API failures.
///
/// Only `AlreadyExists` is ever recovered from, and only on identity
/// creation; the orchestrator branches on this tag instead of on message
/// strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The resource (identity or document) already exists
    AlreadyExists,
    /// The resource was expected to exist but does not
    NotFound,
    /// Anything else: permission denial, malformed request, backend outage
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::AlreadyExists => "already-exists",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Unified error type for the provisioning tool
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT signing errors from the service-account assertion
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Credential loading or token exchange errors
    #[error("Credential error: {0}")]
    Credential(String),

    /// Client configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Identity provider API errors
    #[error("Identity provider error ({kind}): {message}")]
    Identity { kind: ErrorKind, message: String },

    /// Document store API errors
    #[error("Document store error ({kind}): {message}")]
    Document { kind: ErrorKind, message: String },

    /// A value could not be converted to or from its typed wire form
    #[error("Value codec error: {0}")]
    Codec(String),

    /// The post-write read-back failed or disagreed with the identity
    #[error("Verification failed: {0}")]
    Verification(String),
}

impl Error {
    /// Create a new identity provider error
    pub fn identity<T: fmt::Display>(kind: ErrorKind, msg: T) -> Self {
        Error::Identity {
            kind,
            message: msg.to_string(),
        }
    }

    /// Create a new document store error
    pub fn document<T: fmt::Display>(kind: ErrorKind, msg: T) -> Self {
        Error::Document {
            kind,
            message: msg.to_string(),
        }
    }

    /// Create a new credential error
    pub fn credential<T: fmt::Display>(msg: T) -> Self {
        Error::Credential(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Create a new value codec error
    pub fn codec<T: fmt::Display>(msg: T) -> Self {
        Error::Codec(msg.to_string())
    }

    /// The tagged kind, when this error carries one
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Identity { kind, .. } | Error::Document { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Google-style error envelope: `{"error": {"code", "message", "status"}}`.
/// Both backends wrap failures in this shape.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorPayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorPayload {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub status: Option<String>,
}
