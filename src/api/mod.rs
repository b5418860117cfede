//! Spotify Web API access.
//!
//! - [`TokenProvider`]: client-credentials token fetching and caching
//! - [`SpotifyApi`]: the catalog endpoints (search, artists, albums, tracks)

pub mod auth;
pub mod client;

pub use auth::TokenProvider;
pub use client::SpotifyApi;
