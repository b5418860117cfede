//! Spotify Web API client.
//!
//! Wraps the handful of catalog endpoints the dashboard needs. Every call is
//! authenticated with a client-credentials bearer token from
//! [`TokenProvider`].

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::auth::TokenProvider;
use crate::config::SpotifyConfig;
use crate::error::{DashboardError, Result};
use crate::models::{
    Album, Artist, ArtistSearch, Paging, RelatedArtists, SeveralAlbums, SeveralTracks,
    SimplifiedAlbum, SimplifiedTrack, Track,
};

/// Most albums `GET /artists/{id}/albums` returns per page.
pub const MAX_ALBUM_PAGE: u32 = 50;

/// Most ids `GET /albums` accepts.
pub const MAX_ALBUMS_PER_REQUEST: usize = 20;

/// Most ids `GET /tracks` accepts.
pub const MAX_TRACKS_PER_REQUEST: usize = 50;

/// Most related acts Spotify returns for one artist.
pub const MAX_RELATED_ARTISTS: usize = 20;

/// Spotify Web API client.
///
/// # Example
///
/// ```rust,no_run
/// use artist_dashboard::{SpotifyApi, SpotifyConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let api = SpotifyApi::new(SpotifyConfig::from_env()?)?;
///     let artist = api.get_artist_info("The Japanese House").await?;
///     println!("{} has {} followers", artist.name, artist.follower_count());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SpotifyApi {
    client: Client,
    config: SpotifyConfig,
    auth: TokenProvider,
}

impl SpotifyApi {
    /// Create a new client. The first token is requested lazily.
    pub fn new(config: SpotifyConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(concat!("artist-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let auth = TokenProvider::new(client.clone(), &config);

        Ok(Self {
            client,
            config,
            auth,
        })
    }

    /// Create a client and fail fast if the credentials are rejected.
    pub async fn connect(config: SpotifyConfig) -> Result<Self> {
        let api = Self::new(config)?;
        api.auth.bearer().await?;
        Ok(api)
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    /// Make an authenticated GET request and decode the JSON body.
    ///
    /// A 401 is retried once with a fresh token.
    async fn get_api<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}{}", self.config.api_url, endpoint);
        debug!("GET {} with params: {:?}", url, params);

        let mut retried = false;
        loop {
            let token = self.auth.bearer().await?;
            let response = self
                .client
                .get(&url)
                .bearer_auth(&token)
                .query(params)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED && !retried {
                warn!("Access token rejected, refreshing");
                self.auth.invalidate().await;
                retried = true;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(api_error(status, &body, endpoint));
            }

            return Ok(response.json::<T>().await?);
        }
    }

    /// Find the Spotify id of the best match for an artist name.
    pub async fn search_artist_id(&self, artist_name: &str) -> Result<String> {
        let response: ArtistSearch = self
            .get_api(
                "search",
                &[("q", artist_name), ("type", "artist"), ("limit", "1")],
            )
            .await?;

        response
            .artists
            .items
            .into_iter()
            .next()
            .map(|artist| artist.id)
            .ok_or_else(|| DashboardError::ArtistNotFound(artist_name.to_string()))
    }

    /// Get an artist by id.
    pub async fn get_artist(&self, artist_id: &str) -> Result<Artist> {
        self.get_api(&format!("artists/{}", artist_id), &[]).await
    }

    /// Search an artist by name and return their full profile.
    pub async fn get_artist_info(&self, artist_name: &str) -> Result<Artist> {
        let artist_id = self.search_artist_id(artist_name).await?;
        self.get_artist(&artist_id).await
    }

    /// Get up to `count` acts Spotify lists as similar to this artist.
    pub async fn get_related_artists(&self, artist_id: &str, count: usize) -> Result<Vec<Artist>> {
        let response: RelatedArtists = self
            .get_api(&format!("artists/{}/related-artists", artist_id), &[])
            .await?;

        let mut artists = response.artists;
        artists.truncate(count.min(MAX_RELATED_ARTISTS));
        Ok(artists)
    }

    /// Get one page of an artist's releases.
    ///
    /// `groups` is a comma-separated list of `album`, `single`,
    /// `appears_on` and `compilation`.
    pub async fn get_artist_albums(
        &self,
        artist_id: &str,
        offset: u32,
        limit: u32,
        groups: &str,
    ) -> Result<Paging<SimplifiedAlbum>> {
        let limit = limit.clamp(1, MAX_ALBUM_PAGE).to_string();
        let offset = offset.to_string();

        self.get_api(
            &format!("artists/{}/albums", artist_id),
            &[
                ("include_groups", groups),
                ("market", self.config.market.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ],
        )
        .await
    }

    /// Get full album objects for up to 20 ids.
    ///
    /// The result has one entry per id; unknown ids are `None`.
    pub async fn get_albums(&self, album_ids: &[String]) -> Result<Vec<Option<Album>>> {
        if album_ids.is_empty() {
            return Ok(Vec::new());
        }
        if album_ids.len() > MAX_ALBUMS_PER_REQUEST {
            error!("Requested {} albums in one call", album_ids.len());
            return Err(DashboardError::ApiError {
                status: StatusCode::BAD_REQUEST.as_u16(),
                message: format!("at most {} album ids per request", MAX_ALBUMS_PER_REQUEST),
            });
        }

        let ids = album_ids.join(",");
        let response: SeveralAlbums = self
            .get_api("albums", &[("ids", ids.as_str()), ("market", self.config.market.as_str())])
            .await?;
        Ok(response.albums)
    }

    /// Get one page of an album's tracks.
    pub async fn get_album_tracks(
        &self,
        album_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Paging<SimplifiedTrack>> {
        let limit = limit.clamp(1, MAX_ALBUM_PAGE).to_string();
        let offset = offset.to_string();

        self.get_api(
            &format!("albums/{}/tracks", album_id),
            &[
                ("market", self.config.market.as_str()),
                ("limit", limit.as_str()),
                ("offset", offset.as_str()),
            ],
        )
        .await
    }

    /// Get full track objects for up to 50 ids.
    ///
    /// The result has one entry per id; unknown ids are `None`.
    pub async fn get_tracks(&self, track_ids: &[String]) -> Result<Vec<Option<Track>>> {
        if track_ids.is_empty() {
            return Ok(Vec::new());
        }
        if track_ids.len() > MAX_TRACKS_PER_REQUEST {
            error!("Requested {} tracks in one call", track_ids.len());
            return Err(DashboardError::ApiError {
                status: StatusCode::BAD_REQUEST.as_u16(),
                message: format!("at most {} track ids per request", MAX_TRACKS_PER_REQUEST),
            });
        }

        let ids = track_ids.join(",");
        let response: SeveralTracks = self
            .get_api("tracks", &[("ids", ids.as_str()), ("market", self.config.market.as_str())])
            .await?;
        Ok(response.tracks)
    }
}

/// Map a failed response onto the error enum, keeping Spotify's message.
fn api_error(status: StatusCode, body: &str, endpoint: &str) -> DashboardError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    error!("Spotify API error on {}: {} {}", endpoint, status, message);

    match status {
        StatusCode::UNAUTHORIZED => DashboardError::BadCredentials(message),
        StatusCode::NOT_FOUND => DashboardError::NoData(format!("{}: {}", endpoint, message)),
        StatusCode::TOO_MANY_REQUESTS => DashboardError::QuotaExceeded,
        _ => DashboardError::ApiError {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        mock_config, spawn_mock_spotify, spawn_mock_spotify_with_stats, TEST_ARTIST_ID,
    };
    use std::sync::atomic::Ordering;

    #[test]
    fn test_api_error_mapping() {
        let body = r#"{"error": {"status": 429, "message": "API rate limit exceeded"}}"#;
        assert!(matches!(
            api_error(StatusCode::TOO_MANY_REQUESTS, body, "search"),
            DashboardError::QuotaExceeded
        ));

        let body = r#"{"error": {"status": 404, "message": "Resource not found"}}"#;
        match api_error(StatusCode::NOT_FOUND, body, "artists/x") {
            DashboardError::NoData(msg) => assert!(msg.contains("Resource not found")),
            other => panic!("unexpected error: {other:?}"),
        }

        match api_error(StatusCode::BAD_GATEWAY, "", "albums") {
            DashboardError::ApiError { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let result = SpotifyApi::new(SpotifyConfig::new("", ""));
        assert!(matches!(result, Err(DashboardError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_search_and_get_artist() {
        let base = spawn_mock_spotify().await;
        let api = SpotifyApi::new(mock_config(&base)).unwrap();

        let artist = api.get_artist_info("test act").await.unwrap();
        assert_eq!(artist.id, TEST_ARTIST_ID);
        assert_eq!(artist.name, "Test Act");
        assert_eq!(artist.follower_count(), 1000);
    }

    #[tokio::test]
    async fn test_search_unknown_artist() {
        let base = spawn_mock_spotify().await;
        let api = SpotifyApi::new(mock_config(&base)).unwrap();

        let err = api.search_artist_id("Nobody At All").await.unwrap_err();
        assert!(matches!(err, DashboardError::ArtistNotFound(name) if name == "Nobody At All"));
    }

    #[tokio::test]
    async fn test_connect_with_bad_secret() {
        let base = spawn_mock_spotify().await;
        let mut config = mock_config(&base);
        config.client_secret = "wrong".to_string();

        let err = SpotifyApi::connect(config).await.unwrap_err();
        assert!(matches!(err, DashboardError::BadCredentials(_)));
    }

    #[tokio::test]
    async fn test_album_page_and_batches() {
        let base = spawn_mock_spotify().await;
        let api = SpotifyApi::new(mock_config(&base)).unwrap();

        let page = api
            .get_artist_albums(TEST_ARTIST_ID, 0, 2, "album,single")
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert!(page.has_more());

        let albums = api
            .get_albums(&["alb1".to_string(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(albums.len(), 2);
        assert_eq!(albums[0].as_ref().map(|a| a.label.as_str()), Some("Label A"));
        assert!(albums[1].is_none());

        let tracks = api
            .get_tracks(&["t1".to_string(), "t4".to_string()])
            .await
            .unwrap();
        let scores: Vec<_> = tracks.iter().map(|t| t.as_ref().map(|t| t.popularity)).collect();
        assert_eq!(scores, vec![Some(70), Some(45)]);
    }

    #[tokio::test]
    async fn test_oversized_batches_rejected() {
        let base = spawn_mock_spotify().await;
        let api = SpotifyApi::new(mock_config(&base)).unwrap();

        let ids: Vec<String> = (0..21).map(|i| format!("a{i}")).collect();
        assert!(api.get_albums(&ids).await.is_err());

        let ids: Vec<String> = (0..51).map(|i| format!("t{i}")).collect();
        assert!(api.get_tracks(&ids).await.is_err());
    }

    #[tokio::test]
    async fn test_related_artists_truncated() {
        let base = spawn_mock_spotify().await;
        let api = SpotifyApi::new(mock_config(&base)).unwrap();

        let related = api.get_related_artists(TEST_ARTIST_ID, 1).await.unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, "p1");
    }

    #[tokio::test]
    async fn test_token_reused_across_calls() {
        let (base, stats) = spawn_mock_spotify_with_stats().await;
        let api = SpotifyApi::new(mock_config(&base)).unwrap();

        api.get_artist_info("test act").await.unwrap();
        api.get_related_artists(TEST_ARTIST_ID, 20).await.unwrap();
        api.get_tracks(&["t1".to_string()]).await.unwrap();

        assert_eq!(stats.tokens_issued(), 1);
    }

    #[tokio::test]
    async fn test_rejected_token_refreshed_and_retried() {
        let (base, stats) = spawn_mock_spotify_with_stats().await;
        let api = SpotifyApi::connect(mock_config(&base)).await.unwrap();
        assert_eq!(stats.tokens_issued(), 1);

        stats.reject_next_artist.store(true, Ordering::SeqCst);
        let artist = api.get_artist(TEST_ARTIST_ID).await.unwrap();

        assert_eq!(artist.name, "Test Act");
        assert_eq!(stats.tokens_issued(), 2);
        assert!(!stats.reject_next_artist.load(Ordering::SeqCst));
    }
}
