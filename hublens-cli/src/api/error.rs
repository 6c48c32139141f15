//! Typed errors for API and cache operations
//!
//! Callers that need to branch on a failure class downcast through
//! `anyhow::Error::downcast_ref::<ApiError>()`; everything else just
//! surfaces the message.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No usable token: never connected, token expired and refresh failed,
    /// or the API rejected the credentials outright.
    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    /// The token endpoint rejected the refresh attempt. The stored token is
    /// left untouched; callers escalate to `AuthenticationRequired`.
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Non-2xx from the CRM API. `message` carries the upstream error body's
    /// message when one could be parsed, otherwise a synthesized
    /// "HTTP <status>: <status text>" string.
    #[error("{message}")]
    UpstreamRequestFailed { status: u16, message: String },

    /// Cache lookup miss
    #[error("not found: {0}")]
    NotFound(String),

    /// A saved query with this name already exists
    #[error("a saved query named \"{0}\" already exists")]
    DuplicateName(String),

    /// The query descriptor is not executable as given
    #[error("invalid query: {0}")]
    ValidationError(String),
}
