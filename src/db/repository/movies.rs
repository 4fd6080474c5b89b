//! Movie repository for database operations

use sqlx::PgPool;

use crate::db::models::{MovieRow, NewMovie};

const MOVIE_COLUMNS: &str = r#"
    id, title, year, description, characters, thumbnail_url, file_handle,
    source_url, ott_availability, genre, duration_minutes, rating,
    view_count, download_count, is_active, created_by, created_at, updated_at
"#;

/// List movies, newest release first. `active_only` hides soft-deleted titles.
pub async fn list(pool: &PgPool, active_only: bool) -> Result<Vec<MovieRow>, sqlx::Error> {
    let query = if active_only {
        format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE is_active = TRUE ORDER BY year DESC NULLS LAST, title ASC"
        )
    } else {
        format!("SELECT {MOVIE_COLUMNS} FROM movies ORDER BY year DESC NULLS LAST, title ASC")
    };

    sqlx::query_as::<_, MovieRow>(&query).fetch_all(pool).await
}

/// Find a movie by id (active or not; callers decide on visibility)
pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<MovieRow>, sqlx::Error> {
    sqlx::query_as::<_, MovieRow>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Insert a new movie and return the stored row
pub async fn insert(pool: &PgPool, movie: &NewMovie) -> Result<MovieRow, sqlx::Error> {
    sqlx::query_as::<_, MovieRow>(&format!(
        r#"
        INSERT INTO movies (
            title, year, description, characters, thumbnail_url, file_handle,
            source_url, ott_availability, genre, duration_minutes, rating, created_by
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {MOVIE_COLUMNS}
        "#
    ))
    .bind(&movie.title)
    .bind(movie.year)
    .bind(&movie.description)
    .bind(serde_json::json!(movie.characters))
    .bind(&movie.thumbnail_url)
    .bind(&movie.file_handle)
    .bind(&movie.source_url)
    .bind(serde_json::json!(movie.ott_availability))
    .bind(&movie.genre)
    .bind(movie.duration_minutes)
    .bind(movie.rating)
    .bind(movie.created_by)
    .fetch_one(pool)
    .await
}

/// Field set for a partial update: absent fields keep their current values.
///
/// JSONB lists (characters, ott_availability) are replaced wholesale when
/// provided; there is no element-level merge.
#[derive(Debug, Clone, Default)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub year: Option<i16>,
    pub description: Option<String>,
    pub characters: Option<Vec<String>>,
    pub thumbnail_url: Option<String>,
    pub file_handle: Option<String>,
    pub source_url: Option<String>,
    pub ott_availability: Option<Vec<String>>,
    pub genre: Option<String>,
    pub duration_minutes: Option<i16>,
    pub rating: Option<f64>,
    pub is_active: Option<bool>,
}

/// Apply a partial update and return the stored row, or None when the id is unknown
pub async fn update(
    pool: &PgPool,
    id: i32,
    changes: &MovieChanges,
) -> Result<Option<MovieRow>, sqlx::Error> {
    sqlx::query_as::<_, MovieRow>(&format!(
        r#"
        UPDATE movies SET
            title = COALESCE($2, title),
            year = COALESCE($3, year),
            description = COALESCE($4, description),
            characters = COALESCE($5, characters),
            thumbnail_url = COALESCE($6, thumbnail_url),
            file_handle = COALESCE($7, file_handle),
            source_url = COALESCE($8, source_url),
            ott_availability = COALESCE($9, ott_availability),
            genre = COALESCE($10, genre),
            duration_minutes = COALESCE($11, duration_minutes),
            rating = COALESCE($12, rating),
            is_active = COALESCE($13, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {MOVIE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&changes.title)
    .bind(changes.year)
    .bind(&changes.description)
    .bind(changes.characters.as_ref().map(|c| serde_json::json!(c)))
    .bind(&changes.thumbnail_url)
    .bind(&changes.file_handle)
    .bind(&changes.source_url)
    .bind(changes.ott_availability.as_ref().map(|o| serde_json::json!(o)))
    .bind(&changes.genre)
    .bind(changes.duration_minutes)
    .bind(changes.rating)
    .bind(changes.is_active)
    .fetch_optional(pool)
    .await
}

/// Soft delete: the title disappears from public listings but keeps its data
pub async fn deactivate(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE movies SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Increment the view counter
pub async fn increment_views(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE movies SET view_count = view_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Increment the download counter
pub async fn increment_downloads(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE movies SET download_count = download_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Aggregate catalog counters for the admin dashboard
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct CatalogTotals {
    pub total_movies: i64,
    pub active_movies: i64,
    pub total_views: i64,
    pub total_downloads: i64,
}

pub async fn totals(pool: &PgPool) -> Result<CatalogTotals, sqlx::Error> {
    sqlx::query_as::<_, CatalogTotals>(
        r#"
        SELECT
            COUNT(*) AS total_movies,
            COUNT(*) FILTER (WHERE is_active) AS active_movies,
            COALESCE(SUM(view_count), 0)::BIGINT AS total_views,
            COALESCE(SUM(download_count), 0)::BIGINT AS total_downloads
        FROM movies
        "#,
    )
    .fetch_one(pool)
    .await
}

/// Most recently added movies (for the admin dashboard)
pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<MovieRow>, sqlx::Error> {
    sqlx::query_as::<_, MovieRow>(&format!(
        "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at DESC LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await
}
