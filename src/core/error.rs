//! Custom error types for the application.
//!
//! Provides structured error handling with meaningful error messages
//! and proper error categorization for each domain:
//!
//! - [`FetchError`] - Network failures below the HTTP status level
//! - [`AdapterError`] - One listing protocol failing for one directory
//! - [`ListingError`] - Every listing protocol failing for one directory
//! - [`MutationError`] - Create, delete, move, copy and upload failures
//! - [`PreviewError`] - Reading a file for the preview pane

use thiserror::Error;

use crate::models::ProtocolMode;

/// Network/fetch-related errors for HTTP requests.
///
/// A response with a non-2xx status is not a `FetchError`; callers inspect
/// the status themselves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Browser window not available
    #[error("Browser window not available")]
    NoWindow,
    /// Failed to create HTTP request
    #[error("Failed to create request")]
    RequestCreationFailed,
    /// Network request failed (CORS, connection reset, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Failed to read response body
    #[error("Failed to read response")]
    ResponseReadFailed,
    /// Invalid response object
    #[error("Invalid response content")]
    InvalidContent,
}

/// Failure of a single listing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("HTTP {0}")]
    Http(u16),
    #[error(transparent)]
    Network(#[from] FetchError),
    #[error("unparsable response: {0}")]
    Parse(String),
    #[error("not an HTML index (content type {0:?})")]
    NotHtml(String),
}

/// Failure of a whole directory load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListingError {
    /// Every protocol in the fallback chain was tried and failed.
    #[error("Could not list {path}: {}", describe_attempts(.attempts))]
    AllAdaptersFailed {
        path: String,
        attempts: Vec<(ProtocolMode, AdapterError)>,
    },
}

fn describe_attempts(attempts: &[(ProtocolMode, AdapterError)]) -> String {
    attempts
        .iter()
        .map(|(mode, err)| format!("{} ({})", mode, err))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of a mutation against the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The server answered with a non-2xx status.
    #[error("{op} failed: HTTP {status}")]
    Http { op: &'static str, status: u16 },
    /// MOVE/COPY refused with 412 because `Overwrite: F` was sent.
    #[error("destination already exists")]
    DestinationExists,
    /// The server does not advertise the method this operation needs.
    #[error("server does not support {0}")]
    Unsupported(&'static str),
    /// The new name is empty or contains a path separator.
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    #[error(transparent)]
    Network(#[from] FetchError),
}

impl MutationError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::DestinationExists => Some(412),
            _ => None,
        }
    }
}

/// Failure loading a file preview.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("HTTP {0}")]
    Http(u16),
    #[error("{0} cannot be previewed")]
    NotPreviewable(String),
    #[error(transparent)]
    Network(#[from] FetchError),
}
