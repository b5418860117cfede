//! Error types for the dashboard and its Spotify client.

use thiserror::Error;

/// Main error type for all dashboard operations.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The artist search returned no results.
    #[error("Artist not found: {0}")]
    ArtistNotFound(String),

    /// Client id / secret were rejected, or the access token expired.
    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    /// No client id / secret were configured.
    #[error("Missing credentials: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET")]
    MissingCredentials,

    /// Too many requests - rate limited.
    #[error("Quota exceeded: too many requests")]
    QuotaExceeded,

    /// Spotify answered with a non-success status.
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    /// No usable data was returned.
    #[error("No data from API: {0}")]
    NoData(String),

    /// HTTP request failed.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DashboardError {
    /// Whether the error means "nothing to show" rather than "something broke".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ArtistNotFound(_) | Self::NoData(_))
    }
}

/// Result type alias for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;
