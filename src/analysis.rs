//! Reshaping of flattened rows into the dashboard's tables and plot data.
//!
//! Everything here is pure: the caller supplies "today" so derived ages are
//! deterministic.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::converters::{AlbumRow, TrackRow};
use crate::models::Artist;

/// An artist whose last release is at most this old counts as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 730;

/// Bins used for the popularity histogram.
pub const HISTOGRAM_BINS: usize = 30;

/// One track joined with its release, plus derived fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackRecord {
    /// First day of the release's date period.
    pub release_date: NaiveDate,
    /// Number of tracks on the release.
    pub album_tracks: u32,
    /// `album`, `single` or `compilation`.
    pub album_type: String,
    /// Relationship of the release to the artist.
    pub album_group: String,
    /// Spotify release id.
    pub album_id: String,
    /// Track title.
    pub track_title: String,
    /// Release title.
    pub album_title: String,
    /// Comma-separated performer names.
    pub performer_names: String,
    /// Record label of the release.
    pub label: String,
    /// Release popularity, 0-100.
    pub album_pop: u32,
    /// Duration in seconds.
    pub track_secs: f64,
    /// Position on the release.
    pub track_position: u32,
    /// Spotify track id.
    pub track_id: String,
    /// Comma-separated performer ids.
    pub all_performer_ids: String,
    /// Id of the artist the discography belongs to.
    pub artist_spot_id: String,
    /// Track popularity, 0-100.
    pub track_pop: u32,
    /// Days between the release date and "today".
    pub days_since_release: i64,
    /// Dense rank of the release date, oldest release is 1.
    pub release_event_num: u32,
    /// Title mentions a remix.
    pub remix: bool,
    /// More than one performer.
    pub collab: bool,
}

/// One-row overview of an artist's career.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistSummary {
    /// Artist name as Spotify spells it.
    pub artist_name: String,
    /// "yes" or "no".
    pub active: String,
    /// Years between first and last release, 2 dp.
    pub years_releasing: f64,
    /// Age of the latest release in days.
    pub days_since_last_release: i64,
    /// Spotify follower count.
    pub spotify_followers: u64,
    /// Spotify artist popularity, 0-100.
    pub spotify_popularity: u32,
    /// Release event holding the first most popular track.
    pub most_pop_release_event: u32,
    /// Distinct release dates.
    pub total_release_events: u32,
    /// Distinct track titles.
    pub total_original_releases: usize,
    /// Highest track popularity.
    pub track_pop_max: u32,
    /// Mean track popularity, 2 dp.
    pub track_pop_mean: f64,
    /// Tracks with more than one performer.
    pub total_collabs: usize,
    /// Tracks whose title mentions a remix.
    pub total_remixes: usize,
}

impl ArtistSummary {
    /// Column headers in display order.
    pub const COLUMNS: [&'static str; 13] = [
        "artist_name",
        "active",
        "years_releasing",
        "days_since_last_release",
        "spotify_followers",
        "spotify_popularity",
        "most_pop_release_event",
        "total_release_events",
        "total_original_releases",
        "track_pop_max",
        "track_pop_mean",
        "total_collabs",
        "total_remixes",
    ];

    /// Cell values in the same order as [`Self::COLUMNS`].
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.artist_name.clone(),
            self.active.clone(),
            format!("{:.2}", self.years_releasing),
            self.days_since_last_release.to_string(),
            self.spotify_followers.to_string(),
            self.spotify_popularity.to_string(),
            self.most_pop_release_event.to_string(),
            self.total_release_events.to_string(),
            self.total_original_releases.to_string(),
            self.track_pop_max.to_string(),
            format!("{:.2}", self.track_pop_mean),
            self.total_collabs.to_string(),
            self.total_remixes.to_string(),
        ]
    }
}

impl TrackRecord {
    /// Column headers of the discography table.
    pub const COLUMNS: [&'static str; 11] = [
        "track_title",
        "album_title",
        "performer_names",
        "label",
        "release_date",
        "track_pop",
        "track_position",
        "album_tracks",
        "remix",
        "collab",
        "release_event_num",
    ];

    /// Cell values in the same order as [`Self::COLUMNS`].
    pub fn cells(&self) -> Vec<String> {
        vec![
            self.track_title.clone(),
            self.album_title.clone(),
            self.performer_names.clone(),
            self.label.clone(),
            self.release_date.to_string(),
            self.track_pop.to_string(),
            self.track_position.to_string(),
            self.album_tracks.to_string(),
            flag(self.remix).to_string(),
            flag(self.collab).to_string(),
            self.release_event_num.to_string(),
        ]
    }
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// Whether a title marks the track as a remix.
pub fn is_remix(title: &str) -> bool {
    title.to_lowercase().contains("remix")
}

/// Dense rank of each date among the distinct dates, oldest first, from 1.
pub fn dense_rank(dates: &[NaiveDate]) -> Vec<u32> {
    let distinct: Vec<NaiveDate> = dates
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    dates
        .iter()
        .map(|date| match distinct.binary_search(date) {
            Ok(idx) => idx as u32 + 1,
            Err(_) => 0,
        })
        .collect()
}

/// Inner-join tracks with their releases on album id and derive per-track
/// fields. Track popularity starts at 0; see [`apply_popularity`].
///
/// Rows keep the release order of `albums`, then the track order within
/// each release. Releases without a usable date are dropped.
pub fn join_tracks(albums: &[AlbumRow], tracks: &[TrackRow], today: NaiveDate) -> Vec<TrackRecord> {
    let mut by_album: HashMap<&str, Vec<&TrackRow>> = HashMap::new();
    for track in tracks {
        by_album.entry(track.album_id.as_str()).or_default().push(track);
    }

    let mut records = Vec::new();
    for album in albums {
        let Some(album_tracks) = by_album.get(album.album_id.as_str()) else {
            continue;
        };
        let Some(release_date) = album.release_date.to_naive_date() else {
            warn!(
                "Skipping album {} with unusable release date {}",
                album.album_id, album.release_date
            );
            continue;
        };

        for track in album_tracks {
            records.push(TrackRecord {
                release_date,
                album_tracks: album.album_tracks,
                album_type: album.album_type.clone(),
                album_group: album.album_group.clone(),
                album_id: album.album_id.clone(),
                track_title: track.track_title.clone(),
                album_title: track.album_title.clone(),
                performer_names: track.performer_names.clone(),
                label: track.label.clone(),
                album_pop: track.album_pop,
                track_secs: track.track_secs,
                track_position: track.track_position,
                track_id: track.track_id.clone(),
                all_performer_ids: track.all_performer_ids.clone(),
                artist_spot_id: track.artist_spot_id.clone(),
                track_pop: 0,
                days_since_release: (today - release_date).num_days(),
                release_event_num: 0,
                remix: is_remix(&track.track_title),
                collab: track.performer_count() > 1,
            });
        }
    }

    let dates: Vec<NaiveDate> = records.iter().map(|r| r.release_date).collect();
    for (record, rank) in records.iter_mut().zip(dense_rank(&dates)) {
        record.release_event_num = rank;
    }

    records
}

/// Attach popularity scores, given in record order.
pub fn apply_popularity(records: &mut [TrackRecord], scores: &[u32]) {
    for (record, score) in records.iter_mut().zip(scores) {
        record.track_pop = *score;
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarize an artist's release history. `None` when there are no records.
pub fn summarize(artist: &Artist, records: &[TrackRecord], today: NaiveDate) -> Option<ArtistSummary> {
    let first = records.iter().map(|r| r.release_date).min()?;
    let last = records.iter().map(|r| r.release_date).max()?;

    let track_pop_max = records.iter().map(|r| r.track_pop).max().unwrap_or(0);
    let most_pop_release_event = records
        .iter()
        .find(|r| r.track_pop == track_pop_max)
        .map(|r| r.release_event_num)
        .unwrap_or(0);
    let pop_total: u64 = records.iter().map(|r| u64::from(r.track_pop)).sum();
    let track_pop_mean = round2(pop_total as f64 / records.len() as f64);

    let release_window = (last - first).num_days();
    let days_since_last_release = (today - last).num_days();
    let titles: HashSet<&str> = records.iter().map(|r| r.track_title.as_str()).collect();
    let active = if days_since_last_release <= ACTIVE_WINDOW_DAYS {
        "yes"
    } else {
        "no"
    };

    Some(ArtistSummary {
        artist_name: artist.name.clone(),
        active: active.to_string(),
        years_releasing: round2(release_window as f64 / 365.0),
        days_since_last_release,
        spotify_followers: artist.follower_count(),
        spotify_popularity: artist.popularity,
        most_pop_release_event,
        total_release_events: records.iter().map(|r| r.release_event_num).max().unwrap_or(0),
        total_original_releases: titles.len(),
        track_pop_max,
        track_pop_mean,
        total_collabs: records.iter().filter(|r| r.collab).count(),
        total_remixes: records.iter().filter(|r| r.remix).count(),
    })
}

/// Where the seed artist stands within a network of similar acts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeerRankings {
    /// Acts with at least as many followers as the seed, over network size.
    pub spot_followers_ranking: String,
    /// Acts with at least the seed's popularity, over network size.
    pub spot_popularity_ranking: String,
    /// Number of acts compared, seed included.
    pub network_size: usize,
}

impl PeerRankings {
    /// Rank the first artist of `network` against the whole network.
    pub fn compute(network: &[Artist]) -> Option<Self> {
        let seed = network.first()?;
        let size = network.len();

        let follower_rank = network
            .iter()
            .filter(|a| a.follower_count() >= seed.follower_count())
            .count();
        let popularity_rank = network
            .iter()
            .filter(|a| a.popularity >= seed.popularity)
            .count();

        Some(Self {
            spot_followers_ranking: format!("{}/{}", follower_rank, size),
            spot_popularity_ranking: format!("{}/{}", popularity_rank, size),
            network_size: size,
        })
    }
}

/// A track placed on the career timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePoint {
    /// Horizontal position.
    pub days_since_first_release: i64,
    /// Vertical position.
    pub track_pop: u32,
    /// Hover text fields below.
    pub track_title: String,
    pub album_title: String,
    pub release_date: NaiveDate,
    pub label: String,
}

/// Career timeline: every track, plus the best track of each release day.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    /// Every track, in release order.
    pub points: Vec<TimelinePoint>,
    /// (days since first release, maximum popularity), ascending by day.
    pub max_line: Vec<(i64, u32)>,
}

/// Records sorted by release date; ties keep their table order.
fn by_release_date(records: &[TrackRecord]) -> Vec<&TrackRecord> {
    let mut sorted: Vec<&TrackRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.release_date);
    sorted
}

/// Build the release timeline.
pub fn timeline(records: &[TrackRecord]) -> Timeline {
    let sorted = by_release_date(records);
    let Some(first) = sorted.first().map(|r| r.release_date) else {
        return Timeline::default();
    };

    let points: Vec<TimelinePoint> = sorted
        .iter()
        .map(|r| TimelinePoint {
            days_since_first_release: (r.release_date - first).num_days(),
            track_pop: r.track_pop,
            track_title: r.track_title.clone(),
            album_title: r.album_title.clone(),
            release_date: r.release_date,
            label: r.label.clone(),
        })
        .collect();

    let mut best: BTreeMap<i64, u32> = BTreeMap::new();
    for point in &points {
        let entry = best.entry(point.days_since_first_release).or_insert(0);
        *entry = (*entry).max(point.track_pop);
    }

    Timeline {
        points,
        max_line: best.into_iter().collect(),
    }
}

/// One histogram bar covering `[start, end)` (the last bin includes `end`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    /// Lower edge.
    pub start: f64,
    /// Upper edge.
    pub end: f64,
    /// Values that fall in the bin.
    pub count: usize,
}

/// Equal-width histogram of `values` with `bins` bins spanning min..=max.
pub fn histogram(values: &[u32], bins: usize) -> Vec<HistogramBin> {
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Vec::new();
    };
    let bins = bins.max(1);
    let min = f64::from(min);
    let span = (f64::from(max) - min).max(1.0);
    let width = span / bins as f64;

    let mut counts = vec![0usize; bins];
    for &value in values {
        let idx = ((f64::from(value) - min) / width).floor() as usize;
        counts[idx.min(bins - 1)] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Number of tracks released per calendar year, ascending by year.
pub fn releases_per_year(records: &[TrackRecord]) -> Vec<(i32, usize)> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for record in records {
        *years.entry(record.release_date.year()).or_default() += 1;
    }
    years.into_iter().collect()
}

/// Five-number summary of track popularity for one year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearBox {
    /// Calendar year of release.
    pub year: i32,
    pub min: f64,
    /// First quartile.
    pub q1: f64,
    pub median: f64,
    /// Third quartile.
    pub q3: f64,
    pub max: f64,
    /// Tracks released that year.
    pub count: usize,
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Popularity distribution per release year, ascending by year.
pub fn popularity_by_year(records: &[TrackRecord]) -> Vec<YearBox> {
    let mut years: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for record in records {
        years
            .entry(record.release_date.year())
            .or_default()
            .push(f64::from(record.track_pop));
    }

    years
        .into_iter()
        .map(|(year, mut scores)| {
            scores.sort_by(|a, b| a.total_cmp(b));
            YearBox {
                year,
                min: scores[0],
                q1: quantile(&scores, 0.25),
                median: quantile(&scores, 0.5),
                q3: quantile(&scores, 0.75),
                max: scores[scores.len() - 1],
                count: scores.len(),
            }
        })
        .collect()
}

/// Track count per record label, fewest first; ties by label name.
pub fn label_counts(records: &[TrackRecord]) -> Vec<(String, usize)> {
    let mut labels: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *labels.entry(record.label.as_str()).or_default() += 1;
    }

    let mut counts: Vec<(String, usize)> = labels
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    counts.sort_by_key(|(_, count)| *count);
    counts
}
