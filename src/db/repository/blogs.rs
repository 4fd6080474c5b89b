//! Movie blog repository for database operations
//!
//! One published blog per movie; regeneration replaces the stored text
//! in place (ON CONFLICT upsert keyed by movie_id).

use sqlx::PgPool;

use crate::db::models::BlogRow;
use crate::models::blog::GeneratedBlog;

const BLOG_COLUMNS: &str = r#"
    id, movie_id, title, content, summary, keywords, view_count,
    is_published, generated_by_ai, model, generated_at, updated_at
"#;

/// Find the published blog for a movie
pub async fn find_published_by_movie(
    pool: &PgPool,
    movie_id: i32,
) -> Result<Option<BlogRow>, sqlx::Error> {
    sqlx::query_as::<_, BlogRow>(&format!(
        "SELECT {BLOG_COLUMNS} FROM movie_blogs WHERE movie_id = $1 AND is_published = TRUE"
    ))
    .bind(movie_id)
    .fetch_optional(pool)
    .await
}

/// Insert or replace the blog for a movie and return the stored row
pub async fn upsert(
    pool: &PgPool,
    movie_id: i32,
    blog: &GeneratedBlog,
    model: &str,
) -> Result<BlogRow, sqlx::Error> {
    sqlx::query_as::<_, BlogRow>(&format!(
        r#"
        INSERT INTO movie_blogs (movie_id, title, content, summary, keywords, model)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (movie_id) DO UPDATE SET
            title = EXCLUDED.title,
            content = EXCLUDED.content,
            summary = EXCLUDED.summary,
            keywords = EXCLUDED.keywords,
            model = EXCLUDED.model,
            updated_at = NOW()
        RETURNING {BLOG_COLUMNS}
        "#
    ))
    .bind(movie_id)
    .bind(&blog.title)
    .bind(&blog.content)
    .bind(&blog.summary)
    .bind(&blog.keywords)
    .bind(model)
    .fetch_one(pool)
    .await
}

/// Increment the blog view counter
pub async fn increment_views(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE movie_blogs SET view_count = view_count + 1 WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Ids of active movies that have no blog yet (for the generate_blogs job)
pub async fn movies_without_blog(pool: &PgPool) -> Result<Vec<i32>, sqlx::Error> {
    let rows: Vec<(i32,)> = sqlx::query_as(
        r#"
        SELECT m.id FROM movies m
        LEFT JOIN movie_blogs b ON b.movie_id = m.id
        WHERE m.is_active = TRUE AND b.id IS NULL
        ORDER BY m.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.0).collect())
}
