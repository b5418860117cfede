//! High-level discography and peer-network retrieval.
//!
//! [`ArtistSummarizer`] strings the individual API calls together: it pages
//! through an artist's releases, batches album and track lookups, and hands
//! the flattened rows to [`crate::analysis`].

use std::collections::HashSet;

use chrono::NaiveDate;
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::{self, ArtistSummary, PeerRankings, TrackRecord};
use crate::api::client::{MAX_ALBUMS_PER_REQUEST, MAX_ALBUM_PAGE, MAX_TRACKS_PER_REQUEST};
use crate::api::SpotifyApi;
use crate::config::SpotifyConfig;
use crate::converters::{self, AlbumRow, TrackRow};
use crate::error::{DashboardError, Result};
use crate::models::{Album, Artist, SimplifiedTrack};

/// Release groups that make up an artist's own discography.
pub const DISCOGRAPHY_GROUPS: &str = "album,single";

/// Page and batch sizes used while collecting a discography.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    /// Releases requested per page of `GET /artists/{id}/albums`.
    pub album_page: u32,
    /// Album ids per `GET /albums` call.
    pub albums_per_batch: usize,
    /// Track ids per `GET /tracks` call.
    pub tracks_per_batch: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            album_page: MAX_ALBUM_PAGE,
            albums_per_batch: MAX_ALBUMS_PER_REQUEST,
            tracks_per_batch: MAX_TRACKS_PER_REQUEST,
        }
    }
}

impl BatchLimits {
    /// Clamp every size into the range the API accepts.
    fn clamped(self) -> Self {
        Self {
            album_page: self.album_page.clamp(1, MAX_ALBUM_PAGE),
            albums_per_batch: self.albums_per_batch.clamp(1, MAX_ALBUMS_PER_REQUEST),
            tracks_per_batch: self.tracks_per_batch.clamp(1, MAX_TRACKS_PER_REQUEST),
        }
    }
}

/// Everything the dashboard shows about one artist.
#[derive(Debug, Clone, Serialize)]
pub struct Discography {
    /// Profile of the searched artist.
    pub artist: Artist,
    /// One-row career overview.
    pub summary: ArtistSummary,
    /// Every track the artist performs on, joined with its release.
    pub tracks: Vec<TrackRecord>,
}

/// Retrieves and summarizes an artist's career.
///
/// # Example
///
/// ```rust,no_run
/// use artist_dashboard::{ArtistSummarizer, SpotifyConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let summarizer = ArtistSummarizer::from_config(SpotifyConfig::from_env()?)?;
///     let today = chrono::Local::now().date_naive();
///     let discography = summarizer.get_artist_discography("The Japanese House", today).await?;
///     println!("{} tracks", discography.tracks.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ArtistSummarizer {
    api: SpotifyApi,
    limits: BatchLimits,
}

impl ArtistSummarizer {
    /// Wrap an existing API client.
    pub fn new(api: SpotifyApi) -> Self {
        Self {
            api,
            limits: BatchLimits::default(),
        }
    }

    /// Build the API client from configuration.
    pub fn from_config(config: SpotifyConfig) -> Result<Self> {
        Ok(Self::new(SpotifyApi::new(config)?))
    }

    /// Override page and batch sizes.
    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits.clamped();
        self
    }

    /// The underlying API client.
    pub fn api(&self) -> &SpotifyApi {
        &self.api
    }

    fn in_flight(&self) -> usize {
        self.api.config().max_in_flight.max(1)
    }

    /// Retrieve every album and single released by an artist.
    pub async fn get_all_albums(&self, artist: &Artist) -> Result<Vec<AlbumRow>> {
        info!("Grabbing album data for {}", artist.name);

        let mut rows = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut offset = 0u32;
        loop {
            let page = self
                .api
                .get_artist_albums(&artist.id, offset, self.limits.album_page, DISCOGRAPHY_GROUPS)
                .await?;

            let fetched = page.items.len();
            for row in converters::album_rows(&page.items, &artist.id) {
                if seen.insert(row.album_id.clone()) {
                    rows.push(row);
                }
            }
            offset += self.limits.album_page;
            debug!("Fetched {} releases, {} listed", rows.len(), page.total);

            if fetched == 0 || offset >= page.total {
                break;
            }
        }

        Ok(rows)
    }

    /// Retrieve every track on the given releases.
    ///
    /// Albums are looked up in batches; rows come back in release order.
    pub async fn get_all_tracks(&self, albums: &[AlbumRow]) -> Result<Vec<TrackRow>> {
        info!("Artist has {} total albums/release events to process", albums.len());

        let owned: Vec<Vec<AlbumRow>> = albums
            .chunks(self.limits.albums_per_batch)
            .map(<[AlbumRow]>::to_vec)
            .collect();

        let batches: Vec<Vec<TrackRow>> = stream::iter(owned)
            .map(|batch| async move { self.batch_track_rows(&batch).await })
            .buffered(self.in_flight())
            .try_collect()
            .await?;

        info!("Finished collecting track data from the {} albums", albums.len());
        Ok(batches.into_iter().flatten().collect())
    }

    async fn batch_track_rows(&self, batch: &[AlbumRow]) -> Result<Vec<TrackRow>> {
        let ids: Vec<String> = batch.iter().map(|row| row.album_id.clone()).collect();
        let albums = self.api.get_albums(&ids).await?;

        let mut rows = Vec::new();
        for (row, album) in batch.iter().zip(albums) {
            let Some(album) = album else {
                warn!("Album {} was not returned by the API", row.album_id);
                continue;
            };
            let tracks = self.complete_track_listing(&album).await?;
            rows.extend(converters::track_rows(&album, &tracks, &row.artist_spot_id));
        }
        Ok(rows)
    }

    /// Fetch the pages of an album's track listing beyond the embedded one.
    async fn complete_track_listing(&self, album: &Album) -> Result<Vec<SimplifiedTrack>> {
        let mut tracks = album.tracks.items.clone();
        let total = album.tracks.total as usize;

        while tracks.len() < total {
            let page = self
                .api
                .get_album_tracks(&album.id, tracks.len() as u32, MAX_ALBUM_PAGE)
                .await?;
            if page.items.is_empty() {
                warn!(
                    "Album {} listed {} tracks but only {} were returned",
                    album.id,
                    total,
                    tracks.len()
                );
                break;
            }
            tracks.extend(page.items);
        }

        Ok(tracks)
    }

    /// Get popularity scores for a list of tracks, in input order.
    ///
    /// Tracks the API does not return score 0.
    pub async fn get_track_popularity(&self, track_ids: &[String]) -> Result<Vec<u32>> {
        let owned: Vec<Vec<String>> = track_ids
            .chunks(self.limits.tracks_per_batch)
            .map(<[String]>::to_vec)
            .collect();

        let batches: Vec<Vec<u32>> = stream::iter(owned)
            .map(|batch| async move {
                let tracks = self.api.get_tracks(&batch).await?;
                let scores: Vec<u32> = (0..batch.len())
                    .map(|i| match tracks.get(i) {
                        Some(Some(track)) => track.popularity,
                        _ => {
                            warn!("No popularity returned for track {}", batch[i]);
                            0
                        }
                    })
                    .collect();
                Ok::<_, DashboardError>(scores)
            })
            .buffered(self.in_flight())
            .try_collect()
            .await?;

        info!("Collected popularity scores for all {} tracks.", track_ids.len());
        Ok(batches.into_iter().flatten().collect())
    }

    /// Build the complete picture of an artist's career.
    ///
    /// Keeps only tracks the artist performs on, joins them with their
    /// releases, attaches popularity and summarizes. `today` anchors every
    /// "days since" figure.
    pub async fn get_artist_discography(
        &self,
        artist_name: &str,
        today: NaiveDate,
    ) -> Result<Discography> {
        let artist = self.api.get_artist_info(artist_name).await?;

        let albums = self.get_all_albums(&artist).await?;
        let tracks: Vec<TrackRow> = self
            .get_all_tracks(&albums)
            .await?
            .into_iter()
            .filter(TrackRow::performs_on)
            .collect();

        let mut records = analysis::join_tracks(&albums, &tracks, today);
        let track_ids: Vec<String> = records.iter().map(|r| r.track_id.clone()).collect();
        let scores = self.get_track_popularity(&track_ids).await?;
        analysis::apply_popularity(&mut records, &scores);

        let summary = analysis::summarize(&artist, &records, today)
            .ok_or_else(|| DashboardError::NoData(format!("{} has no releases", artist.name)))?;

        Ok(Discography {
            artist,
            summary,
            tracks: records,
        })
    }

    /// Grow a network of similar acts, breadth-first from a seed artist.
    ///
    /// The seed is always the first element. Growth stops at `total_acts`
    /// or when no artist in the network has unseen related acts left.
    pub async fn build_related_artist_network(
        &self,
        seed_act: &str,
        total_acts: usize,
        related_act_count: usize,
    ) -> Result<Vec<Artist>> {
        let seed = self.api.get_artist_info(seed_act).await?;

        let mut seen: HashSet<String> = HashSet::from([seed.id.clone()]);
        let mut network = vec![seed];
        let mut next = 0;

        while network.len() < total_acts && next < network.len() {
            let current_id = network[next].id.clone();
            let related = self
                .api
                .get_related_artists(&current_id, related_act_count)
                .await?;

            for act in related {
                if network.len() >= total_acts {
                    break;
                }
                if seen.insert(act.id.clone()) {
                    network.push(act);
                }
            }
            next += 1;
        }

        if network.len() < total_acts {
            warn!(
                "Related-artist network for {} ran out at {} of {} acts",
                seed_act,
                network.len(),
                total_acts
            );
        }
        info!(
            "Comparing {}'s metrics to those of {} similar artists",
            seed_act,
            network.len()
        );

        Ok(network)
    }

    /// Rank an artist's followers and popularity against similar acts.
    pub async fn compare_to_peers(
        &self,
        artist_name: &str,
        network_size: usize,
        related_act_count: usize,
    ) -> Result<PeerRankings> {
        let network = self
            .build_related_artist_network(artist_name, network_size, related_act_count)
            .await?;
        PeerRankings::compute(&network)
            .ok_or_else(|| DashboardError::NoData(format!("no peers for {}", artist_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mock_config, spawn_mock_spotify, TEST_ARTIST_ID};
    use tokio_test::assert_ok;

    fn small_batches() -> BatchLimits {
        BatchLimits {
            album_page: 2,
            albums_per_batch: 2,
            tracks_per_batch: 2,
        }
    }

    async fn summarizer() -> ArtistSummarizer {
        let base = spawn_mock_spotify().await;
        ArtistSummarizer::from_config(mock_config(&base))
            .unwrap()
            .with_limits(small_batches())
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_limits_are_clamped() {
        let limits = BatchLimits {
            album_page: 500,
            albums_per_batch: 0,
            tracks_per_batch: 99,
        }
        .clamped();
        assert_eq!(limits.album_page, 50);
        assert_eq!(limits.albums_per_batch, 1);
        assert_eq!(limits.tracks_per_batch, 50);
    }

    #[tokio::test]
    async fn test_get_all_albums_pages_through() {
        let summarizer = summarizer().await;
        let artist = Artist::new(TEST_ARTIST_ID, "Test Act");

        let albums = assert_ok!(summarizer.get_all_albums(&artist).await);
        let ids: Vec<_> = albums.iter().map(|a| a.album_id.as_str()).collect();
        assert_eq!(ids, vec!["alb1", "alb2", "alb3"]);
        assert!(albums.iter().all(|a| a.artist_spot_id == TEST_ARTIST_ID));
    }

    #[tokio::test]
    async fn test_get_all_albums_short_page_no_repeats() {
        let summarizer = summarizer().await;
        let artist = Artist::new("s1", "Filtered Act");

        let albums = assert_ok!(summarizer.get_all_albums(&artist).await);
        let ids: Vec<_> = albums.iter().map(|a| a.album_id.as_str()).collect();
        assert_eq!(ids, vec!["alb1", "alb2", "alb3"]);
    }

    #[tokio::test]
    async fn test_get_all_tracks_completes_long_albums() {
        let summarizer = summarizer().await;
        let artist = Artist::new(TEST_ARTIST_ID, "Test Act");
        let albums = summarizer.get_all_albums(&artist).await.unwrap();

        let tracks = assert_ok!(summarizer.get_all_tracks(&albums).await);
        let ids: Vec<_> = tracks.iter().map(|t| t.track_id.as_str()).collect();
        // t3 lives on the second page of alb1's listing
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t5", "t6"]);
        assert_eq!(tracks[0].label, "Label A");
        assert_eq!(tracks[3].performer_names, "Test Act,DJ");
    }

    #[tokio::test]
    async fn test_track_popularity_in_order() {
        let summarizer = summarizer().await;
        let ids: Vec<String> = ["t6", "t1", "nope", "t4", "t2"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let scores = assert_ok!(summarizer.get_track_popularity(&ids).await);
        assert_eq!(scores, vec![70, 70, 0, 45, 55]);
    }

    #[tokio::test]
    async fn test_artist_discography_end_to_end() {
        let summarizer = summarizer().await;
        let today = day(2021, 12, 31);

        let discography = assert_ok!(summarizer.get_artist_discography("Test Act", today).await);

        let ids: Vec<_> = discography
            .tracks
            .iter()
            .map(|t| t.track_id.as_str())
            .collect();
        // t5 is by another performer only
        assert_eq!(ids, vec!["t1", "t2", "t3", "t4", "t6"]);

        let summary = &discography.summary;
        assert_eq!(summary.artist_name, "Test Act");
        assert_eq!(summary.active, "yes");
        assert_eq!(summary.days_since_last_release, 350);
        assert_eq!(summary.total_release_events, 3);
        assert_eq!(summary.total_original_releases, 5);
        assert_eq!(summary.track_pop_max, 70);
        assert_eq!(summary.track_pop_mean, 54.0);
        assert_eq!(summary.most_pop_release_event, 2);
        assert_eq!(summary.total_collabs, 2);
        assert_eq!(summary.total_remixes, 1);
    }

    #[tokio::test]
    async fn test_discography_unknown_artist() {
        let summarizer = summarizer().await;
        let err = summarizer
            .get_artist_discography("Nobody At All", day(2021, 12, 31))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_related_network_stops_at_total() {
        let summarizer = summarizer().await;

        let network = assert_ok!(summarizer.build_related_artist_network("Test Act", 4, 20).await);
        let ids: Vec<_> = network.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec![TEST_ARTIST_ID, "p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_related_network_exhausts_frontier() {
        let summarizer = summarizer().await;

        let network = assert_ok!(summarizer.build_related_artist_network("Test Act", 100, 20).await);
        assert_eq!(network.len(), 5);

        let rankings = assert_ok!(summarizer.compare_to_peers("Test Act", 100, 20).await);
        assert_eq!(rankings.spot_followers_ranking, "3/5");
        assert_eq!(rankings.spot_popularity_ranking, "3/5");
    }
}
