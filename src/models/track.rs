//! Track-related models.

use serde::{Deserialize, Serialize};

use super::artist::SimplifiedArtist;

/// Track as embedded in an album's track listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimplifiedTrack {
    /// Spotify track id.
    #[serde(default)]
    pub id: String,

    /// Track title.
    #[serde(default)]
    pub name: String,

    /// Duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,

    /// Position on the disc (1-indexed).
    #[serde(default)]
    pub track_number: u32,

    /// Artists who performed this track.
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
}

impl SimplifiedTrack {
    /// Get all artist names joined by a separator.
    pub fn artists_string(&self, separator: &str) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Get all artist ids joined by a separator.
    pub fn artist_ids_string(&self, separator: &str) -> String {
        self.artists
            .iter()
            .map(|a| a.id.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// Full track from `GET /tracks?ids=`; only the popularity is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Track {
    /// Spotify track id.
    #[serde(default)]
    pub id: String,

    /// Track popularity score, 0-100.
    #[serde(default)]
    pub popularity: u32,
}

/// Response of `GET /tracks?ids=`; unknown ids come back as `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeveralTracks {
    /// One entry per requested id, in request order.
    #[serde(default)]
    pub tracks: Vec<Option<Track>>,
}
