//! Admin/Management endpoints for content and account operations
//!
//! Everything here runs behind the bearer-token middleware, which loads
//! the acting AdminRow into request extensions. Role checks beyond
//! "active admin" happen per handler.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::models::{AdminRow, NewAdmin, NewMovie};
use crate::db::repository::{admins, blogs, movies, sessions};
use crate::models::auth::{AdminUserPayload, CreateAdminRequest};
use crate::models::blog::BlogPayload;
use crate::models::movie::{CatalogStats, CreateMovieRequest, MoviePayload, UpdateMovieRequest};
use crate::routes::movies::ensure_blog;
use crate::services::cleanup::{run_cleanup, CleanupConfig};
use crate::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn db_error(context: &str, e: sqlx::Error) -> ApiError {
    tracing::error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Database error" })),
    )
}

fn not_found(message: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
}

fn require_superadmin(admin: &AdminRow) -> Result<(), ApiError> {
    if admin.is_superadmin() {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({ "error": "Superadmin access required" })),
        ))
    }
}

/// GET /api/admin/stats - catalog totals for the dashboard
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let totals = movies::totals(&state.pool)
        .await
        .map_err(|e| db_error("Failed to aggregate stats", e))?;
    let recent = movies::recent(&state.pool, 5)
        .await
        .map_err(|e| db_error("Failed to load recent movies", e))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "stats": CatalogStats {
            total_movies: totals.total_movies,
            active_movies: totals.active_movies,
            total_views: totals.total_views,
            total_downloads: totals.total_downloads,
            recent_movies: recent.into_iter().map(MoviePayload::from).collect(),
        }
    })))
}

/// GET /api/admin/movies - full catalog including soft-deleted titles
pub async fn list_movies(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = movies::list(&state.pool, false)
        .await
        .map_err(|e| db_error("Failed to list movies", e))?;

    let payloads: Vec<MoviePayload> = rows.into_iter().map(MoviePayload::from).collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "movies": payloads
    })))
}

/// POST /api/admin/movies - create a movie
pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminRow>,
    Json(payload): Json<CreateMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.title.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Movie title is required" })),
        ));
    }

    // A bad handle is caught at entry rather than at first playback
    if let Some(handle) = payload.file_handle.as_deref() {
        check_file_handle(&state, handle).await?;
    }

    let new_movie = NewMovie {
        title: payload.title.trim().to_string(),
        year: payload.year,
        description: payload.description,
        characters: payload.characters,
        thumbnail_url: payload.thumbnail_url,
        file_handle: payload.file_handle,
        source_url: payload.source_url,
        ott_availability: payload.ott_availability,
        genre: payload.genre.unwrap_or_else(|| "Animation".to_string()),
        duration_minutes: payload.duration_minutes,
        rating: payload.rating,
        created_by: Some(admin.id),
    };

    let movie = movies::insert(&state.pool, &new_movie)
        .await
        .map_err(|e| db_error("Failed to create movie", e))?;

    tracing::info!("Admin '{}' created movie {} ('{}')", admin.username, movie.id, movie.title);

    Ok(Json(serde_json::json!({
        "success": true,
        "movie": MoviePayload::from(movie)
    })))
}

/// PUT /api/admin/movies/:id - partial update
pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Extension(admin): Extension<AdminRow>,
    Json(payload): Json<UpdateMovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(handle) = payload.file_handle.as_deref() {
        check_file_handle(&state, handle).await?;
    }

    let changes = movies::MovieChanges {
        title: payload.title,
        year: payload.year,
        description: payload.description,
        characters: payload.characters,
        thumbnail_url: payload.thumbnail_url,
        file_handle: payload.file_handle,
        source_url: payload.source_url,
        ott_availability: payload.ott_availability,
        genre: payload.genre,
        duration_minutes: payload.duration_minutes,
        rating: payload.rating,
        is_active: payload.is_active,
    };

    let movie = movies::update(&state.pool, movie_id, &changes)
        .await
        .map_err(|e| db_error("Failed to update movie", e))?
        .ok_or_else(|| not_found("Movie not found"))?;

    tracing::info!("Admin '{}' updated movie {}", admin.username, movie.id);

    Ok(Json(serde_json::json!({
        "success": true,
        "movie": MoviePayload::from(movie)
    })))
}

/// DELETE /api/admin/movies/:id - soft delete
pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Extension(admin): Extension<AdminRow>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = movies::deactivate(&state.pool, movie_id)
        .await
        .map_err(|e| db_error("Failed to delete movie", e))?;

    if !removed {
        return Err(not_found("Movie not found"));
    }

    tracing::info!("Admin '{}' deactivated movie {}", admin.username, movie_id);

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Movie deleted successfully"
    })))
}

/// POST /api/admin/movies/:id/generate-blog - force (re)generation
pub async fn generate_blog(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Extension(admin): Extension<AdminRow>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = movies::find_by_id(&state.pool, movie_id)
        .await
        .map_err(|e| db_error("Failed to load movie", e))?
        .ok_or_else(|| not_found("Movie not found"))?;

    let generated = state.blog_writer.generate(&movie).await;
    let blog = blogs::upsert(&state.pool, movie.id, &generated, state.blog_writer.model())
        .await
        .map_err(|e| db_error("Failed to store blog", e))?;

    tracing::info!(
        "Admin '{}' regenerated blog for movie {}",
        admin.username,
        movie.id
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "blog": BlogPayload::from(blog),
        "message": "Blog generated successfully"
    })))
}

/// Request body for POST /api/admin/validate-file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidateFileRequest {
    pub file_handle: String,
}

/// POST /api/admin/validate-file - check a handle against the file host
pub async fn validate_file(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ValidateFileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.file_handle.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "File handle is required" })),
        ));
    }

    let validation = state.file_host.validate(&payload.file_handle).await;

    Ok(Json(serde_json::json!({
        "success": validation.valid,
        "valid": validation.valid,
        "size": validation.size,
        "error": validation.error,
    })))
}

/// POST /api/admin/cron/:job - run a maintenance job by hand (superadmin)
pub async fn run_cron_job(
    State(state): State<Arc<AppState>>,
    Path(job): Path<String>,
    Extension(admin): Extension<AdminRow>,
) -> Result<impl IntoResponse, ApiError> {
    require_superadmin(&admin)?;

    match job.as_str() {
        "generate_blogs" => {
            let pending = blogs::movies_without_blog(&state.pool)
                .await
                .map_err(|e| db_error("Failed to find movies without blogs", e))?;

            let mut generated = 0;
            for movie_id in pending {
                let movie = match movies::find_by_id(&state.pool, movie_id).await {
                    Ok(Some(movie)) => movie,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::error!("Failed to load movie {}: {}", movie_id, e);
                        continue;
                    }
                };
                match ensure_blog(&state, &movie).await {
                    Ok(_) => generated += 1,
                    Err(e) => {
                        tracing::error!("Failed to generate blog for movie {}: {}", movie_id, e)
                    }
                }
            }

            tracing::info!("Cron generate_blogs: {} new blogs", generated);

            Ok(Json(serde_json::json!({
                "success": true,
                "message": format!("Generated {} new blogs", generated)
            })))
        }
        "cleanup_sessions" => {
            let deleted = sessions::delete_expired(&state.pool)
                .await
                .map_err(|e| db_error("Failed to cleanup sessions", e))?;

            Ok(Json(serde_json::json!({
                "success": true,
                "message": format!("Cleaned up {} expired sessions", deleted)
            })))
        }
        "cleanup_analytics" => {
            let result = run_cleanup(
                &state.pool,
                &CleanupConfig {
                    interval_secs: 0,
                    analytics_retention_days: state.config.analytics_retention_days,
                },
            )
            .await;

            Ok(Json(serde_json::json!({
                "success": result.is_success(),
                "message": format!(
                    "Cleaned up {} sessions and {} analytics events",
                    result.sessions_deleted, result.analytics_deleted
                )
            })))
        }
        _ => Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Unknown cron job" })),
        )),
    }
}

/// GET /api/admin/users - list admin accounts (superadmin)
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminRow>,
) -> Result<impl IntoResponse, ApiError> {
    require_superadmin(&admin)?;

    let rows = admins::list_active(&state.pool)
        .await
        .map_err(|e| db_error("Failed to list admins", e))?;

    let users: Vec<AdminUserPayload> = rows.into_iter().map(AdminUserPayload::from).collect();

    Ok(Json(serde_json::json!({
        "success": true,
        "admins": users
    })))
}

/// POST /api/admin/users - create an admin account (superadmin)
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminRow>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_superadmin(&admin)?;

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Username and password required" })),
        ));
    }

    let existing = admins::find_active_by_username(&state.pool, payload.username.trim())
        .await
        .map_err(|e| db_error("Failed to check username", e))?;
    if existing.is_some() {
        return Err((
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": "Username already exists" })),
        ));
    }

    let password_hash = crate::services::auth::hash_password(&payload.password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Failed to create admin" })),
        )
    })?;

    let new_admin = NewAdmin {
        username: payload.username.trim().to_string(),
        password_hash,
        role: payload.role,
        created_by: Some(admin.id),
    };

    let created = admins::insert(&state.pool, &new_admin)
        .await
        .map_err(|e| db_error("Failed to create admin", e))?;

    tracing::info!(
        "Superadmin '{}' created {} account '{}'",
        admin.username,
        created.role,
        created.username
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "user": AdminUserPayload::from(created)
    })))
}

/// DELETE /api/admin/users/:username - deactivate an account (superadmin)
pub async fn delete_admin(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Extension(admin): Extension<AdminRow>,
) -> Result<impl IntoResponse, ApiError> {
    require_superadmin(&admin)?;

    if username == admin.username {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Cannot deactivate your own account" })),
        ));
    }

    let removed = admins::deactivate(&state.pool, &username)
        .await
        .map_err(|e| db_error("Failed to deactivate admin", e))?;

    if !removed {
        return Err(not_found("Admin not found"));
    }

    tracing::info!(
        "Superadmin '{}' deactivated account '{}'",
        admin.username,
        username
    );

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Admin deactivated successfully"
    })))
}

/// Validate a handle at admin time so broken entries never reach playback
async fn check_file_handle(state: &AppState, handle: &str) -> Result<(), ApiError> {
    let validation = state.file_host.validate(handle).await;
    if validation.valid {
        Ok(())
    } else {
        Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": format!(
                    "Invalid file handle: {}",
                    validation.error.unwrap_or_else(|| "unknown error".to_string())
                )
            })),
        ))
    }
}
