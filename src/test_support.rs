//! In-process stand-in for the Spotify accounts service and Web API.
//!
//! Serves a small fixed catalog:
//!
//! - artist `a1` "Test Act" with releases `alb1` (album, 2020-05-01),
//!   `alb2` (single, 2021-01-15) and `alb3` (single, 2019);
//! - `alb1` embeds only the first two of its three tracks;
//! - `t5` on `alb2` is performed by someone else;
//! - related acts `a1 -> p1, p2`, `p1 -> p3`, `p2 -> p4`;
//! - artist `s1` whose second release is hidden by market filtering, so its
//!   first page of releases comes back short.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::SpotifyConfig;

pub const TEST_ARTIST_ID: &str = "a1";

const ACCESS_TOKEN: &str = "test-token";

/// `Basic base64("test-id:test-secret")`
const BASIC_AUTH: &str = "Basic dGVzdC1pZDp0ZXN0LXNlY3JldA==";

type Reply = (StatusCode, Json<Value>);

/// Counters and switches shared with a running mock.
#[derive(Debug, Default)]
pub struct MockStats {
    /// Token requests that were answered with a token.
    pub tokens_issued: AtomicUsize,
    /// When set, the next `GET artists/{id}` is answered with 401.
    pub reject_next_artist: AtomicBool,
}

impl MockStats {
    pub fn tokens_issued(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
    }
}

/// Client configuration pointing at a mock started with [`spawn_mock_spotify`].
pub fn mock_config(base: &str) -> SpotifyConfig {
    SpotifyConfig::new("test-id", "test-secret").with_base_urls(base, format!("{base}v1/"))
}

/// Start the mock on an ephemeral port and return its base URL.
pub async fn spawn_mock_spotify() -> String {
    spawn_mock_spotify_with_stats().await.0
}

/// Like [`spawn_mock_spotify`], also returning the mock's counters.
pub async fn spawn_mock_spotify_with_stats() -> (String, Arc<MockStats>) {
    let stats = Arc::new(MockStats::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = mock_router(stats.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), stats)
}

fn mock_router(stats: Arc<MockStats>) -> Router {
    Router::new()
        .route("/api/token", post(token))
        .route("/v1/search", get(search))
        .route("/v1/artists/:id", get(artist))
        .route("/v1/artists/:id/albums", get(artist_albums))
        .route("/v1/artists/:id/related-artists", get(related_artists))
        .route("/v1/albums", get(several_albums))
        .route("/v1/albums/:id/tracks", get(album_tracks))
        .route("/v1/tracks", get(several_tracks))
        .with_state(stats)
}

fn error_reply(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({"error": {"status": status.as_u16(), "message": message}})),
    )
}

fn authorize(headers: &HeaderMap) -> Result<(), Reply> {
    let expected = format!("Bearer {ACCESS_TOKEN}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(error_reply(StatusCode::UNAUTHORIZED, "Invalid access token")),
    }
}

fn page(items: Vec<Value>, params: &HashMap<String, String>, default_limit: usize) -> Value {
    let offset: usize = params.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0);
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(default_limit);
    let total = items.len();
    let slice: Vec<Value> = items.into_iter().skip(offset).take(limit).collect();
    let next = (offset + slice.len() < total).then(|| format!("mock://next?offset={}", offset + limit));

    json!({"items": slice, "total": total, "limit": limit, "offset": offset, "next": next})
}

fn ids_param(params: &HashMap<String, String>) -> Vec<String> {
    params
        .get("ids")
        .map(|ids| ids.split(',').map(str::to_string).collect())
        .unwrap_or_default()
}

fn artist_json(id: &str) -> Option<Value> {
    let (name, followers, popularity) = match id {
        "a1" => ("Test Act", 1000, 50),
        "p1" => ("Peer One", 2000, 60),
        "p2" => ("Peer Two", 500, 40),
        "p3" => ("Peer Three", 1000, 50),
        "p4" => ("Peer Four", 10, 10),
        _ => return None,
    };
    Some(json!({
        "id": id,
        "name": name,
        "type": "artist",
        "followers": {"href": null, "total": followers},
        "popularity": popularity,
        "genres": ["indie pop"],
    }))
}

fn related_ids(id: &str) -> &'static [&'static str] {
    match id {
        "a1" => &["p1", "p2", "a1"],
        "p1" => &["p3", "p2"],
        "p2" => &["p4"],
        _ => &[],
    }
}

fn simplified_album(id: &str) -> Value {
    let (name, album_type, release_date, precision, total_tracks) = match id {
        "alb1" => ("Debut", "album", "2020-05-01", "day", 3),
        "alb2" => ("Remixes", "single", "2021-01-15", "day", 2),
        _ => ("Early", "single", "2019", "year", 1),
    };
    json!({
        "id": id,
        "name": name,
        "album_type": album_type,
        "album_group": album_type,
        "release_date": release_date,
        "release_date_precision": precision,
        "total_tracks": total_tracks,
        "artists": [{"id": "a1", "name": "Test Act"}],
    })
}

fn track_json(id: &str, name: &str, duration_ms: u64, number: u32, artists: &[(&str, &str)]) -> Value {
    let artists: Vec<Value> = artists
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "type": "artist"}))
        .collect();
    json!({
        "id": id,
        "name": name,
        "duration_ms": duration_ms,
        "track_number": number,
        "artists": artists,
    })
}

fn listing(album_id: &str) -> Vec<Value> {
    let me = ("a1", "Test Act");
    match album_id {
        "alb1" => vec![
            track_json("t1", "Opening", 200_000, 1, &[me]),
            track_json("t2", "Duet", 180_500, 2, &[me, ("x9", "Guest")]),
            track_json("t3", "Closing", 240_000, 3, &[me]),
        ],
        "alb2" => vec![
            track_json("t4", "Opening (Remix)", 210_000, 1, &[me, ("x8", "DJ")]),
            track_json("t5", "Feature", 190_000, 2, &[("x7", "Someone Else")]),
        ],
        "alb3" => vec![track_json("t6", "Early Song", 150_000, 1, &[me])],
        _ => Vec::new(),
    }
}

fn full_album(id: &str) -> Option<Value> {
    let (label, popularity) = match id {
        "alb1" => ("Label A", 40),
        "alb2" => ("Label B", 30),
        "alb3" => ("Label A", 20),
        _ => return None,
    };
    let mut album = simplified_album(id);
    // alb1 only embeds its first two tracks
    let embedded_limit = if id == "alb1" { 2 } else { 50 };
    let mut params = HashMap::new();
    params.insert("limit".to_string(), embedded_limit.to_string());

    album["label"] = json!(label);
    album["popularity"] = json!(popularity);
    album["tracks"] = page(listing(id), &params, 50);
    Some(album)
}

fn track_popularity(id: &str) -> Option<u32> {
    match id {
        "t1" => Some(70),
        "t2" => Some(55),
        "t3" => Some(30),
        "t4" => Some(45),
        "t5" => Some(10),
        "t6" => Some(70),
        _ => None,
    }
}

async fn token(State(stats): State<Arc<MockStats>>, headers: HeaderMap, body: String) -> Reply {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == BASIC_AUTH);

    if !authorized || !body.contains("grant_type=client_credentials") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_client", "error_description": "Invalid client secret"})),
        );
    }

    stats.tokens_issued.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        Json(json!({"access_token": ACCESS_TOKEN, "token_type": "Bearer", "expires_in": 3600})),
    )
}

async fn search(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    let hits: Vec<Value> = match params.get("q") {
        Some(q) if q.eq_ignore_ascii_case("test act") => artist_json("a1").into_iter().collect(),
        _ => Vec::new(),
    };
    (StatusCode::OK, Json(json!({"artists": page(hits, &params, 1)})))
}

async fn artist(
    State(stats): State<Arc<MockStats>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    if stats.reject_next_artist.swap(false, Ordering::SeqCst) {
        return error_reply(StatusCode::UNAUTHORIZED, "The access token expired");
    }
    match artist_json(&id) {
        Some(artist) => (StatusCode::OK, Json(artist)),
        None => error_reply(StatusCode::NOT_FOUND, "non existing id"),
    }
}

async fn artist_albums(
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    let ids: &[&str] = match id.as_str() {
        "a1" => &["alb1", "alb2", "alb3"],
        "s1" => &["alb1", "hidden", "alb2", "alb3"],
        _ => &[],
    };
    let albums = ids.iter().map(|a| simplified_album(a)).collect();
    let mut body = page(albums, &params, 20);
    // filtered releases still count toward `total`
    if let Some(items) = body["items"].as_array_mut() {
        items.retain(|item| item["id"] != "hidden");
    }
    (StatusCode::OK, Json(body))
}

async fn related_artists(headers: HeaderMap, Path(id): Path<String>) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    let artists: Vec<Value> = related_ids(&id)
        .iter()
        .filter_map(|id| artist_json(id))
        .collect();
    (StatusCode::OK, Json(json!({"artists": artists})))
}

async fn several_albums(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    let albums: Vec<Value> = ids_param(&params)
        .iter()
        .map(|id| full_album(id).unwrap_or(Value::Null))
        .collect();
    (StatusCode::OK, Json(json!({"albums": albums})))
}

async fn album_tracks(
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    (StatusCode::OK, Json(page(listing(&id), &params, 20)))
}

async fn several_tracks(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Reply {
    if let Err(reply) = authorize(&headers) {
        return reply;
    }
    let tracks: Vec<Value> = ids_param(&params)
        .iter()
        .map(|id| match track_popularity(id) {
            Some(popularity) => json!({"id": id, "name": id, "popularity": popularity}),
            None => Value::Null,
        })
        .collect();
    (StatusCode::OK, Json(json!({"tracks": tracks})))
}
