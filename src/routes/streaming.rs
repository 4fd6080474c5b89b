//! Streaming, download, ad-gate and analytics endpoints
//!
//! The media relay forwards byte-range requests from the browser's
//! `<video>` element to the file host and streams the partial response
//! back. Bodies are passed through chunk by chunk; the full file is never
//! buffered, and a client disconnect drops the upstream fetch with it.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use lazy_static::lazy_static;
use prometheus::{register_int_counter, IntCounter};
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::models::{NewAdInteraction, NewAnalyticsEvent};
use crate::db::repository::{analytics, movies, sessions};
use crate::db::SessionRow;
use crate::middleware::{client_ip, user_agent};
use crate::models::session::{
    AdCheckResponse, InteractionKind, TrackAdRequest, TrackAdResponse, TrackEventRequest,
};
use crate::services::ad_gate;
use crate::services::file_host::{FileHostClient, FileHostError};
use crate::AppState;

// Re-export reqwest header constants to avoid http version conflicts
mod reqwest_header {
    pub use reqwest::header::{CONTENT_LENGTH, CONTENT_RANGE};
}

lazy_static! {
    static ref RANGE_RE: Regex = Regex::new(r"^bytes=(\d+)-(\d*)$").unwrap();
    static ref STREAM_REQUESTS: IntCounter = register_int_counter!(
        "cinegate_stream_requests_total",
        "Media relay requests served"
    )
    .unwrap();
    static ref AD_COMPLETIONS: IntCounter = register_int_counter!(
        "cinegate_ad_completions_total",
        "Client-reported ad completions"
    )
    .unwrap();
}

/// Byte range requested by a client. `end` is inclusive; absent means
/// "to end of file".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RangeSpec {
    start: u64,
    end: Option<u64>,
}

impl RangeSpec {
    /// Equivalent Range header to forward upstream
    fn upstream_header(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

/// Parse a Range header value.
///
/// Ok(None) when no header was sent, Err when the value does not match
/// `bytes=<digits>-<digits>?`. Multi-range requests are rejected.
fn parse_range(value: Option<&str>) -> Result<Option<RangeSpec>, ()> {
    let Some(value) = value else {
        return Ok(None);
    };

    let caps = RANGE_RE.captures(value.trim()).ok_or(())?;
    let start = caps[1].parse().map_err(|_| ())?;
    let end = if caps[2].is_empty() {
        None
    } else {
        Some(caps[2].parse().map_err(|_| ())?)
    };

    Ok(Some(RangeSpec { start, end }))
}

/// GET /api/stream/:handle - relay media bytes from the file host
///
/// No Range header relays the full body as 200; a Range header is
/// forwarded upstream and the reply is forced to 206. Content-Type is
/// always video/mp4 regardless of what the host reports.
pub async fn stream_media(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !FileHostClient::is_valid_handle(&handle) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid file handle");
    }

    // Malformed ranges are rejected before any upstream call is made
    let range_header = headers.get(header::RANGE).and_then(|v| v.to_str().ok());
    let range = match parse_range(range_header) {
        Ok(range) => range,
        Err(()) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid Range header");
        }
    };

    let resolved = match state.file_host.resolve(&handle).await {
        Ok(resolved) => resolved,
        Err(FileHostError::NotFound) => {
            return error_response(StatusCode::NOT_FOUND, "File not found");
        }
        Err(e) => {
            tracing::error!("File host lookup failed for {}: {}", handle, e);
            return error_response(StatusCode::BAD_GATEWAY, "File host unavailable");
        }
    };

    let upstream_range = range.map(|r| r.upstream_header());
    let upstream = match state
        .file_host
        .fetch(&resolved.url, upstream_range.as_deref())
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Media fetch failed for {}: {}", handle, e);
            return error_response(StatusCode::BAD_GATEWAY, "Streaming failed");
        }
    };

    STREAM_REQUESTS.inc();
    relay_media(upstream, range.is_some())
}

/// GET /api/download/:handle?filename= - attachment download
pub async fn download_media(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    if !FileHostClient::is_valid_handle(&handle) {
        return error_response(StatusCode::BAD_REQUEST, "Invalid file handle");
    }

    let resolved = match state.file_host.resolve(&handle).await {
        Ok(resolved) => resolved,
        Err(FileHostError::NotFound) => {
            return error_response(StatusCode::NOT_FOUND, "Download not available");
        }
        Err(e) => {
            tracing::error!("File host lookup failed for {}: {}", handle, e);
            return error_response(StatusCode::BAD_GATEWAY, "File host unavailable");
        }
    };

    let upstream = match state.file_host.fetch(&resolved.url, None).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Download fetch failed for {}: {}", handle, e);
            return error_response(StatusCode::BAD_GATEWAY, "Download failed");
        }
    };

    let filename = query.filename.unwrap_or_else(|| "movie.mp4".to_string());
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename));

    if let Some(length) = upstream
        .headers()
        .get(reqwest_header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
    {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    match builder.body(Body::from_stream(upstream.bytes_stream())) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to build download response: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Download failed")
        }
    }
}

/// Query parameters for the download endpoint
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub filename: Option<String>,
}

/// POST /api/check-ads/:movieId - ad-gate access check (no side effect)
pub async fn check_ads(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Extension(session): Extension<SessionRow>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let movie = movies::find_by_id(&state.pool, movie_id)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load movie {}: {}", movie_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Database error" })),
            )
        })?;

    if !movie.map(|m| m.is_active).unwrap_or(false) {
        return Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Movie not found" })),
        ));
    }

    let access = ad_gate::check_access(session.ads_watched, &session.unlocked_ids(), movie_id);

    Ok(Json(AdCheckResponse {
        success: true,
        can_watch: access.can_watch,
        ads_watched: access.ads_watched,
        ads_needed: access.ads_needed,
        is_unlocked: access.is_unlocked,
    }))
}

/// POST /api/track-ad - log an ad interaction; completions advance the gate
pub async fn track_ad(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRow>,
    Json(payload): Json<TrackAdRequest>,
) -> Result<Response, (StatusCode, Json<serde_json::Value>)> {
    analytics::insert_ad_interaction(
        &state.pool,
        &NewAdInteraction {
            session_id: session.session_id.clone(),
            movie_id: payload.movie_id,
            ad_type: payload.ad_type.clone(),
            ad_network: payload.ad_network.clone(),
            interaction_type: payload.interaction_type.to_string(),
        },
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to record ad interaction: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to track ad" })),
        )
    })?;

    if payload.interaction_type != InteractionKind::Completion {
        return Ok(Json(serde_json::json!({ "success": true })).into_response());
    }

    // Completion is client-reported; the counter trusts one call per
    // genuine ad view.
    AD_COMPLETIONS.inc();
    let outcome = ad_gate::record_completion(
        session.ads_watched,
        &session.unlocked_ids(),
        payload.movie_id,
    );

    sessions::update_ad_state(
        &state.pool,
        &session.session_id,
        outcome.ads_watched,
        &outcome.unlocked,
    )
    .await
    .map_err(|e| {
        tracing::error!("Failed to persist ad-gate state: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to track ad" })),
        )
    })?;

    if outcome.movie_unlocked {
        tracing::info!(
            "Session {} unlocked movie {:?} after {} ads",
            session.session_id,
            payload.movie_id,
            outcome.ads_watched
        );
    }

    Ok(Json(TrackAdResponse {
        success: true,
        ads_watched: outcome.ads_watched,
        movie_unlocked: outcome.movie_unlocked,
    })
    .into_response())
}

/// POST /api/analytics/track - append an analytics event
pub async fn track_event(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionRow>,
    headers: HeaderMap,
    Json(payload): Json<TrackEventRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let event = NewAnalyticsEvent {
        event_type: payload.event_type.clone(),
        entity_type: payload.entity_type.clone(),
        entity_id: payload.entity_id,
        session_id: Some(session.session_id.clone()),
        ip_address: Some(client_ip(&headers)),
        user_agent: user_agent(&headers),
        referrer: headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        additional_data: payload.additional_data.clone(),
    };

    analytics::insert_event(&state.pool, &event).await.map_err(|e| {
        tracing::error!("Failed to record analytics event: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to track analytics" })),
        )
    })?;

    // Denormalized movie counters ride along with the matching events
    if let Some(movie_id) = payload.entity_id {
        let result = match payload.event_type.as_str() {
            "movie_view" => movies::increment_views(&state.pool, movie_id).await,
            "download" => movies::increment_downloads(&state.pool, movie_id).await,
            _ => Ok(()),
        };
        if let Err(e) = result {
            tracing::warn!("Failed to bump movie counter: {}", e);
        }
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// Relay an upstream media response. The status is forced (200 full /
/// 206 partial) regardless of what upstream returned.
fn relay_media(upstream: reqwest::Response, partial: bool) -> Response {
    let status = if partial {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Range");

    if let Some(length) = upstream
        .headers()
        .get(reqwest_header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
    {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    if let Some(content_range) = upstream
        .headers()
        .get(reqwest_header::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
    {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }

    match builder.body(Body::from_stream(upstream.bytes_stream())) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Failed to build relay response: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Streaming failed")
        }
    }
}

/// Content-Disposition for an attachment, with quotes stripped from the
/// plain filename and a percent-encoded UTF-8 variant alongside
fn content_disposition(filename: &str) -> String {
    let plain: String = filename
        .chars()
        .filter(|c| !matches!(c, '"' | '\r' | '\n' | '\\'))
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        plain,
        urlencoding::encode(filename)
    )
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_range_header_is_not_an_error() {
        assert_eq!(parse_range(None), Ok(None));
    }

    #[test]
    fn bounded_range_parses() {
        let spec = parse_range(Some("bytes=0-99")).unwrap().unwrap();
        assert_eq!(spec.start, 0);
        assert_eq!(spec.end, Some(99));
        assert_eq!(spec.upstream_header(), "bytes=0-99");
    }

    #[test]
    fn open_ended_range_parses() {
        let spec = parse_range(Some("bytes=1048576-")).unwrap().unwrap();
        assert_eq!(spec.start, 1_048_576);
        assert_eq!(spec.end, None);
        assert_eq!(spec.upstream_header(), "bytes=1048576-");
    }

    #[test]
    fn malformed_ranges_are_rejected() {
        assert!(parse_range(Some("bytes=abc-")).is_err());
        assert!(parse_range(Some("bytes=")).is_err());
        assert!(parse_range(Some("0-99")).is_err());
        assert!(parse_range(Some("bytes=1-2-3")).is_err());
        assert!(parse_range(Some("bytes=0-99, 200-299")).is_err());
        assert!(parse_range(Some("chunks=0-99")).is_err());
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let spec = parse_range(Some(" bytes=5-10 ")).unwrap().unwrap();
        assert_eq!(spec.start, 5);
        assert_eq!(spec.end, Some(10));
    }

    #[test]
    fn content_disposition_strips_quotes() {
        let value = content_disposition("my \"movie\".mp4");
        assert!(value.starts_with("attachment; filename=\"my movie.mp4\""));
        assert!(value.contains("filename*=UTF-8''my%20%22movie%22.mp4"));
    }
}
