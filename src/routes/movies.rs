//! Public movie and blog API endpoints

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;

use crate::db::models::{BlogRow, MovieRow, NewAnalyticsEvent};
use crate::db::repository::{analytics, blogs, movies};
use crate::db::SessionRow;
use crate::middleware::{client_ip, user_agent};
use crate::models::blog::BlogPayload;
use crate::models::movie::MoviePayload;
use crate::AppState;

/// GET /api/movies - list active movies
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let rows = movies::list(&state.pool, true).await.map_err(|e| {
        tracing::error!("Failed to list movies: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to fetch movies" })),
        )
    })?;

    let payloads: Vec<MoviePayload> = rows.into_iter().map(MoviePayload::from).collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "movies": payloads
    })))
}

/// GET /api/movies/:id - single movie, records a movie_view event
pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Extension(session): Extension<SessionRow>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let movie = find_active_movie(&state, movie_id).await?;

    let event = NewAnalyticsEvent {
        event_type: "movie_view".to_string(),
        entity_type: Some("movie".to_string()),
        entity_id: Some(movie.id),
        session_id: Some(session.session_id.clone()),
        ip_address: Some(client_ip(&headers)),
        user_agent: user_agent(&headers),
        referrer: referrer(&headers),
        additional_data: None,
    };
    if let Err(e) = analytics::insert_event(&state.pool, &event).await {
        tracing::warn!("Failed to record movie view: {}", e);
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "movie": MoviePayload::from(movie)
    })))
}

/// GET /api/movies/:id/blog - blog for a movie, generated on first access
pub async fn get_movie_blog(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Extension(session): Extension<SessionRow>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let movie = find_active_movie(&state, movie_id).await?;

    let blog = ensure_blog(&state, &movie).await.map_err(|e| {
        tracing::error!("Failed to load blog for movie {}: {}", movie_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Blog not available" })),
        )
    })?;

    let event = NewAnalyticsEvent {
        event_type: "blog_view".to_string(),
        entity_type: Some("blog".to_string()),
        entity_id: Some(blog.id),
        session_id: Some(session.session_id.clone()),
        ip_address: Some(client_ip(&headers)),
        user_agent: user_agent(&headers),
        referrer: referrer(&headers),
        additional_data: None,
    };
    if let Err(e) = analytics::insert_event(&state.pool, &event).await {
        tracing::warn!("Failed to record blog view: {}", e);
    }
    if let Err(e) = blogs::increment_views(&state.pool, blog.id).await {
        tracing::warn!("Failed to bump blog views: {}", e);
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "blog": BlogPayload::from(blog),
        "movie": {
            "id": movie.id,
            "title": movie.title,
            "year": movie.year,
            "characters": movie.characters_list(),
            "ottAvailability": movie.ott_list(),
        }
    })))
}

/// Load the published blog for a movie, generating and storing one when
/// missing. Generation itself cannot fail (the writer falls back to a
/// canned body); only the store can error here.
pub async fn ensure_blog(state: &AppState, movie: &MovieRow) -> Result<BlogRow, sqlx::Error> {
    if let Some(existing) = blogs::find_published_by_movie(&state.pool, movie.id).await? {
        return Ok(existing);
    }

    tracing::info!("Generating blog for movie {} ('{}')", movie.id, movie.title);
    let generated = state.blog_writer.generate(movie).await;
    blogs::upsert(&state.pool, movie.id, &generated, state.blog_writer.model()).await
}

/// Look up a movie and hide inactive titles behind 404
pub async fn find_active_movie(
    state: &AppState,
    movie_id: i32,
) -> Result<MovieRow, (StatusCode, Json<serde_json::Value>)> {
    let movie = movies::find_by_id(&state.pool, movie_id).await.map_err(|e| {
        tracing::error!("Failed to load movie {}: {}", movie_id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Database error" })),
        )
    })?;

    match movie {
        Some(movie) if movie.is_active => Ok(movie),
        _ => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Movie not found" })),
        )),
    }
}

fn referrer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
