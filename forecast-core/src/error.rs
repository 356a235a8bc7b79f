use std::time::Duration;

use thiserror::Error;

/// Failure modes of device location resolution.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The location capability is switched off on the device. The caller is
    /// expected to prompt the user to enable it.
    #[error("location services are disabled on this device")]
    Disabled,

    #[error("location permission was not granted")]
    PermissionDenied,

    /// No fix arrived within the resolver's deadline.
    #[error("timed out after {0:?} waiting for a location fix")]
    Timeout(Duration),

    /// The underlying provider failed for a platform-specific reason.
    #[error("location provider failure: {0}")]
    Provider(String),
}

/// Failure modes of a single forecast fetch. Every failure is terminal for
/// that attempt; nothing is retried and nothing partial is ever produced.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status. Malformed location
    /// queries surface here, not as parse errors.
    #[error("forecast API returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid request URL: {0}")]
    Url(#[from] url::ParseError),

    /// The response body was not valid JSON or a required field was missing
    /// or of the wrong shape.
    #[error("malformed forecast payload: {0}")]
    Parse(String),

    /// The response decoded cleanly but carried an empty `forecastday`
    /// array, so there is no day 0 for the current record to borrow from.
    #[error("forecast payload contained no forecast days")]
    EmptyForecast,
}
