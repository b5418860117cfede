//! Artist-related models.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::common::{Followers, Paging};

/// A full artist object from `GET /artists/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Artist {
    /// Spotify artist id.
    pub id: String,

    /// Artist name.
    pub name: String,

    /// Follower count.
    #[serde(default)]
    pub followers: Followers,

    /// Popularity score, 0-100.
    #[serde(default)]
    pub popularity: u32,

    /// Genres associated with the artist.
    #[serde(default)]
    pub genres: Vec<String>,
}

impl Artist {
    /// Create an artist with the given id and name.
    pub fn new<S1: Into<String>, S2: Into<String>>(id: S1, name: S2) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Total number of followers.
    pub fn follower_count(&self) -> u64 {
        self.followers.total
    }

    /// Genres joined into a single display string.
    pub fn genres_string(&self) -> String {
        self.genres.join(", ")
    }
}

impl fmt::Display for Artist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Artist reference embedded in albums and tracks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedArtist {
    /// Spotify artist id.
    #[serde(default)]
    pub id: String,

    /// Artist name.
    pub name: String,
}

/// Response of `GET /search?type=artist`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistSearch {
    /// Matching artists.
    #[serde(default)]
    pub artists: Paging<Artist>,
}

/// Response of `GET /artists/{id}/related-artists`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelatedArtists {
    /// Related acts, at most 20.
    #[serde(default)]
    pub artists: Vec<Artist>,
}
