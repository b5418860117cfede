//! Request handlers for the dashboard page and its JSON endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use super::page::{self, PageContext};
use super::AppState;
use crate::analysis::PeerRankings;
use crate::charts::DashboardFigures;
use crate::discography::Discography;
use crate::error::DashboardError;

type SharedState = Arc<AppState>;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub artist: Option<String>,
    pub peers: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistQuery {
    pub artist: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeersQuery {
    pub artist: Option<String>,
    pub size: Option<usize>,
}

/// Handler error mapped onto an HTTP status and a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct AppError(DashboardError);

impl From<DashboardError> for AppError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::BAD_GATEWAY
        }
    }

    /// Text safe to show to the visitor.
    pub fn message(&self) -> String {
        if self.0.is_not_found() {
            self.0.to_string()
        } else {
            "Spotify request failed, try again later".to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.0.is_not_found() {
            warn!("{}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `GET /`
pub async fn index(
    State(state): State<SharedState>,
    Query(query): Query<DashboardQuery>,
) -> (StatusCode, Html<String>) {
    let artist = state.artist_or_default(query.artist.as_deref());
    let ctx = PageContext {
        artist,
        peers: state.config.peer_size_or_default(query.peers),
        peer_sizes: &state.config.peer_sizes,
        refresh_secs: state.config.refresh_interval.as_secs(),
    };
    info!("Rendering dashboard for {}", artist);

    match state.summarizer.get_artist_discography(artist, today()).await {
        Ok(discography) => {
            let figures = DashboardFigures::from_records(&discography.tracks);
            (
                StatusCode::OK,
                Html(page::render_dashboard(&ctx, &discography, &figures)),
            )
        }
        Err(err) => {
            let err = AppError::from(err);
            if err.status() == StatusCode::NOT_FOUND {
                warn!("{}", err.0);
            } else {
                error!("Dashboard for {} failed: {}", artist, err.0);
            }
            (err.status(), Html(page::render_error(&ctx, &err.message())))
        }
    }
}

/// `GET /api/discography`
pub async fn api_discography(
    State(state): State<SharedState>,
    Query(query): Query<ArtistQuery>,
) -> Result<Json<Discography>, AppError> {
    let artist = state.artist_or_default(query.artist.as_deref());
    let discography = state.summarizer.get_artist_discography(artist, today()).await?;
    Ok(Json(discography))
}

/// `GET /api/figures`
pub async fn api_figures(
    State(state): State<SharedState>,
    Query(query): Query<ArtistQuery>,
) -> Result<Json<DashboardFigures>, AppError> {
    let artist = state.artist_or_default(query.artist.as_deref());
    let discography = state.summarizer.get_artist_discography(artist, today()).await?;
    Ok(Json(DashboardFigures::from_records(&discography.tracks)))
}

/// `GET /api/peers`
pub async fn api_peers(
    State(state): State<SharedState>,
    Query(query): Query<PeersQuery>,
) -> Result<Json<PeerRankings>, AppError> {
    let artist = state.artist_or_default(query.artist.as_deref());
    let size = state.config.peer_size_or_default(query.size);
    let rankings = state
        .summarizer
        .compare_to_peers(artist, size, state.config.related_per_artist)
        .await?;
    Ok(Json(rankings))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
