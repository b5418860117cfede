//! Data models for Spotify Web API responses.
//!
//! Only the fields the dashboard reads are modelled; everything else in the
//! payloads is ignored during deserialization.

pub mod album;
pub mod artist;
pub mod common;
pub mod track;

// Re-exports for convenience
pub use album::{Album, SeveralAlbums, SimplifiedAlbum};
pub use artist::{Artist, ArtistSearch, RelatedArtists, SimplifiedArtist};
pub use common::{Followers, Paging, ReleaseDate};
pub use track::{SeveralTracks, SimplifiedTrack, Track};
