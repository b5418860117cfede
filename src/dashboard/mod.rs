//! Web dashboard served with axum.

pub mod page;
pub mod routes;
pub mod server;

use crate::config::DashboardConfig;
use crate::discography::ArtistSummarizer;

pub use server::{router, run};

/// Application state shared across handlers.
pub struct AppState {
    /// Spotify pipeline used by every handler.
    pub summarizer: ArtistSummarizer,
    /// Page and server settings.
    pub config: DashboardConfig,
}

impl AppState {
    pub fn new(summarizer: ArtistSummarizer, config: DashboardConfig) -> Self {
        Self { summarizer, config }
    }

    /// Requested artist, or the configured default when blank.
    pub fn artist_or_default<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        match requested.map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => &self.config.default_artist,
        }
    }
}
