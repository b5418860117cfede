//! Album-related models.
//!
//! Spotify returns albums in two shapes: the simplified form listed under an
//! artist, and the full form from `GET /albums` with label, popularity and
//! the first page of tracks.

use serde::{Deserialize, Serialize};

use super::artist::SimplifiedArtist;
use super::common::{Paging, ReleaseDate};
use super::track::SimplifiedTrack;

/// Album as listed by `GET /artists/{id}/albums`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedAlbum {
    /// Spotify album id.
    pub id: String,

    /// Album title.
    #[serde(default)]
    pub name: String,

    /// Album type: "album", "single", or "compilation".
    #[serde(default)]
    pub album_type: String,

    /// Relationship to the artist: "album", "single", "compilation", "appears_on".
    #[serde(default)]
    pub album_group: String,

    /// Release date as reported ("YYYY", "YYYY-MM" or "YYYY-MM-DD").
    #[serde(default)]
    pub release_date: String,

    /// Precision of `release_date`.
    #[serde(default)]
    pub release_date_precision: String,

    /// Number of tracks on the release.
    #[serde(default)]
    pub total_tracks: u32,

    /// Album artists.
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
}

impl SimplifiedAlbum {
    /// Parsed release date.
    pub fn release(&self) -> ReleaseDate {
        ReleaseDate::parse(&self.release_date)
    }
}

/// Full album from `GET /albums?ids=`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Album {
    /// Spotify album id.
    pub id: String,

    /// Album title.
    #[serde(default)]
    pub name: String,

    /// Album type: "album", "single", or "compilation".
    #[serde(default)]
    pub album_type: String,

    /// Release date as reported.
    #[serde(default)]
    pub release_date: String,

    /// Number of tracks on the release.
    #[serde(default)]
    pub total_tracks: u32,

    /// Record label.
    #[serde(default)]
    pub label: String,

    /// Album popularity score, 0-100.
    #[serde(default)]
    pub popularity: u32,

    /// First page of the album's tracks.
    #[serde(default)]
    pub tracks: Paging<SimplifiedTrack>,
}

/// Response of `GET /albums?ids=`; unknown ids come back as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeveralAlbums {
    /// One entry per requested id, in request order.
    #[serde(default)]
    pub albums: Vec<Option<Album>>,
}
