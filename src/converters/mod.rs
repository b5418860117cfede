//! Flattening of nested API responses into table rows.
//!
//! The Spotify payloads nest tracks inside albums and artists inside tracks.
//! The dashboard works on flat rows, one per album and one per track, keyed
//! by album id so the two tables can be joined.

use serde::{Deserialize, Serialize};

use crate::models::{Album, ReleaseDate, SimplifiedAlbum, SimplifiedTrack};

/// Separator used for multi-valued cells (performer names and ids).
pub const LIST_SEPARATOR: &str = ",";

/// One release of the artist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlbumRow {
    /// Release date.
    pub release_date: ReleaseDate,
    /// Number of tracks on the release.
    pub album_tracks: u32,
    /// "album", "single" or "compilation".
    pub album_type: String,
    /// Relationship of the release to the artist.
    pub album_group: String,
    /// Spotify album id.
    pub album_id: String,
    /// Id of the artist whose discography this row belongs to.
    pub artist_spot_id: String,
}

/// One track on a release.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TrackRow {
    /// Track title.
    pub track_title: String,
    /// Title of the release the track appears on.
    pub album_title: String,
    /// Performer names, comma-joined.
    pub performer_names: String,
    /// Record label of the release.
    pub label: String,
    /// Popularity of the release.
    pub album_pop: u32,
    /// Track length in seconds, two decimals.
    pub track_secs: f64,
    /// Position on the release.
    pub track_position: u32,
    /// Spotify track id.
    pub track_id: String,
    /// Spotify album id.
    pub album_id: String,
    /// Performer ids, comma-joined.
    pub all_performer_ids: String,
    /// Id of the artist whose discography this row belongs to.
    pub artist_spot_id: String,
}

impl TrackRow {
    /// Number of credited performers.
    pub fn performer_count(&self) -> usize {
        self.performer_names
            .split(LIST_SEPARATOR)
            .filter(|name| !name.trim().is_empty())
            .count()
    }

    /// Whether the discography's artist is credited on this track.
    pub fn performs_on(&self) -> bool {
        self.all_performer_ids
            .split(LIST_SEPARATOR)
            .any(|id| id == self.artist_spot_id)
    }
}

/// Convert milliseconds to seconds rounded to two decimals.
pub fn millis_to_secs(duration_ms: u64) -> f64 {
    (duration_ms as f64 * 0.001 * 100.0).round() / 100.0
}

/// Flatten a page of an artist's releases.
pub fn album_rows(albums: &[SimplifiedAlbum], artist_id: &str) -> Vec<AlbumRow> {
    albums
        .iter()
        .map(|album| AlbumRow {
            release_date: album.release(),
            album_tracks: album.total_tracks,
            album_type: album.album_type.clone(),
            album_group: album.album_group.clone(),
            album_id: album.id.clone(),
            artist_spot_id: artist_id.to_string(),
        })
        .collect()
}

/// Flatten one album's track listing.
///
/// `tracks` is the complete listing; it may extend the album's embedded
/// first page.
pub fn track_rows(album: &Album, tracks: &[SimplifiedTrack], artist_id: &str) -> Vec<TrackRow> {
    tracks
        .iter()
        .map(|track| TrackRow {
            track_title: track.name.clone(),
            album_title: album.name.clone(),
            performer_names: track.artists_string(LIST_SEPARATOR),
            label: album.label.clone(),
            album_pop: album.popularity,
            track_secs: millis_to_secs(track.duration_ms),
            track_position: track.track_number,
            track_id: track.id.clone(),
            album_id: album.id.clone(),
            all_performer_ids: track.artist_ids_string(LIST_SEPARATOR),
            artist_spot_id: artist_id.to_string(),
        })
        .collect()
}
