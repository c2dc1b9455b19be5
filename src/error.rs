//! Domain error types for the management console.
//!
//! Uses thiserror for ergonomic error handling with automatic Display
//! implementations. Nothing here is fatal to the process: every variant is
//! meant to be caught at the call site and shown as an inline message while
//! the surrounding list or dialog stays interactive.

/// Ingest error lines shown before the list is elided for display.
const INGEST_ERRORS_SHOWN: usize = 3;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure or an unreadable response body
    #[error(
        "Unable to reach the catalog API. Check that the backend server is running and accessible."
    )]
    Connectivity { detail: String },

    /// 2xx response whose body did not match the expected schema
    #[error(
        "Unexpected response from the catalog API ({0}). Check that the backend server is running."
    )]
    InvalidResponse(String),

    /// Error reported by the catalog API
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Login rejected by the catalog API with a human-readable reason
    #[error("{0}")]
    LoginFailed(String),

    /// Operation requires an authenticated session
    #[error("Not logged in: {0}")]
    Unauthorized(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Review attempted on a record that already left the pending state
    #[error("Upload {0} has already been reviewed")]
    AlreadyReviewed(i64),

    /// A review submission is already outstanding for this workflow
    #[error("Another review is still being processed")]
    ReviewInFlight,

    /// Approve call succeeded but no rows made it into the catalog
    #[error("{}", ingest_summary(.message, .errors))]
    IngestRejected {
        message: String,
        errors: Vec<String>,
    },

    /// Configuration problem
    #[error("Configuration error: {0}")]
    Config(String),

    /// Local I/O failure (session file, upload file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results with ClientError.
pub type ClientResult<T> = Result<T, ClientError>;

/// Summarize an ingest failure: the message plus a bounded slice of the
/// per-row errors, with the remainder elided.
fn ingest_summary(message: &str, errors: &[String]) -> String {
    if errors.is_empty() {
        return message.to_string();
    }
    let shown = errors
        .iter()
        .take(INGEST_ERRORS_SHOWN)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ");
    if errors.len() > INGEST_ERRORS_SHOWN {
        format!(
            "{message}: {shown} (+{} more)",
            errors.len() - INGEST_ERRORS_SHOWN
        )
    } else {
        format!("{message}: {shown}")
    }
}

// Conversion implementations for common error types

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Connectivity {
                detail: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}
