//! # Artist Dashboard
//!
//! Career overview of a music act built from the Spotify Web API.
//!
//! ## Quick Start
//!
//! The [`ArtistSummarizer`] runs the whole pipeline:
//!
//! ```rust,no_run
//! use artist_dashboard::{ArtistSummarizer, SpotifyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads SPOTIFY_CLIENT_ID / SPOTIFY_CLIENT_SECRET
//!     let summarizer = ArtistSummarizer::from_config(SpotifyConfig::from_env()?)?;
//!
//!     let today = chrono::Local::now().date_naive();
//!     let discography = summarizer.get_artist_discography("The Japanese House", today).await?;
//!     println!("{} tracks", discography.tracks.len());
//!     println!("active: {}", discography.summary.active);
//!
//!     let rankings = summarizer.compare_to_peers("The Japanese House", 100, 20).await?;
//!     println!("followers rank: {}", rankings.spot_followers_ranking);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Layers
//!
//! - [`SpotifyApi`] - thin Web API client with client-credentials auth
//! - [`converters`] - API responses to flat album / track rows
//! - [`analysis`] - joins, derived fields, summary and plot data
//! - [`charts`] - Plotly figure specs
//! - [`dashboard`] - axum web UI

pub mod analysis;
pub mod api;
pub mod charts;
pub mod config;
pub mod converters;
pub mod dashboard;
pub mod discography;
pub mod error;
pub mod html;
pub mod models;

#[cfg(test)]
mod test_support;

// Main interface (recommended)
pub use discography::{ArtistSummarizer, BatchLimits, Discography};

// Building blocks
pub use analysis::{ArtistSummary, PeerRankings, TrackRecord};
pub use api::SpotifyApi;
pub use config::{DashboardConfig, SpotifyConfig};
pub use error::DashboardError;
pub use models::{Album, Artist, Track};
