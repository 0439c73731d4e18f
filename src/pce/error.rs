//! Error types for the PCE REST client.
//!
//! [`PceError`] covers what can go wrong for a single page or job: a
//! non-success HTTP status, a transport failure, an unparseable body and the
//! two ways a deferred job can end without data.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PceError {
    /// The PCE answered with a non-success status (401 bad credentials,
    /// 404 unknown org, 5xx).
    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    /// Transport failure (DNS, refused connection, TLS, timeout).
    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A paginated body whose `results` is not an array.
    #[error("page `results` is a JSON {found}, expected an array")]
    MalformedPage { found: &'static str },

    /// HTTP 202 with nothing to poll.
    #[error("deferred response carried no Location header")]
    MissingLocation,

    #[error("job {0} is done but reports no result href")]
    MissingResult(String),

    #[error("job {location} not done after {attempts} attempts")]
    JobNotDone { location: String, attempts: u32 },
}
