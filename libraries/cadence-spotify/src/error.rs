//! Error types for the Spotify client.

use thiserror::Error;

/// Errors that can occur when talking to the Spotify Web API.
#[derive(Error, Debug)]
pub enum SpotifyClientError {
    /// HTTP transport failed, no response received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-success status (other than 401-with-refresh and 204)
    #[error("request failed with status {status}")]
    RequestFailed { status: u16 },

    /// No access token is stored
    #[error("authentication required")]
    NotAuthenticated,

    /// The provider rejected the authorization code exchange
    #[error("authorization code exchange rejected: {0}")]
    AuthExchange(String),

    /// A token refresh was attempted and exhausted
    #[error("token refresh failed: {0}")]
    RefreshFailed(String),

    /// Invalid endpoint URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse a provider response
    #[error("failed to parse response: {0}")]
    ParseError(String),
}

/// Result type for Spotify client operations.
pub type Result<T> = std::result::Result<T, SpotifyClientError>;
