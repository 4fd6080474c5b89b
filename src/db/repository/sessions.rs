//! Visitor session repository for database operations
//!
//! Sessions hold the denormalized ad-gate state (ads_watched counter and
//! the unlocked movie list). Every mutation is a synchronous write-through;
//! there is no in-memory cache in front of this table.

use sqlx::PgPool;

use crate::db::models::{NewSession, SessionRow};

const SESSION_COLUMNS: &str = r#"
    id, session_id, ip_address, user_agent, ads_watched, movies_unlocked,
    created_at, last_activity, expires_at
"#;

/// Find a session that has not expired yet
pub async fn find_live(pool: &PgPool, session_id: &str) -> Result<Option<SessionRow>, sqlx::Error> {
    sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM user_sessions WHERE session_id = $1 AND expires_at > NOW()"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await
}

/// Insert a fresh session and return the stored row
pub async fn insert(pool: &PgPool, session: &NewSession) -> Result<SessionRow, sqlx::Error> {
    sqlx::query_as::<_, SessionRow>(&format!(
        r#"
        INSERT INTO user_sessions (session_id, ip_address, user_agent, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING {SESSION_COLUMNS}
        "#
    ))
    .bind(&session.session_id)
    .bind(&session.ip_address)
    .bind(&session.user_agent)
    .bind(session.expires_at)
    .fetch_one(pool)
    .await
}

/// Write back the ad-gate state after a completed ad view.
///
/// The store serializes conflicting writes; concurrent completions for the
/// same session resolve last-write-wins, which at worst costs the visitor
/// one extra ad.
pub async fn update_ad_state(
    pool: &PgPool,
    session_id: &str,
    ads_watched: i32,
    unlocked: &[i32],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE user_sessions
        SET ads_watched = $2, movies_unlocked = $3, last_activity = NOW()
        WHERE session_id = $1
        "#,
    )
    .bind(session_id)
    .bind(ads_watched)
    .bind(serde_json::json!(unlocked))
    .execute(pool)
    .await?;

    Ok(())
}

/// Bump last_activity without touching gate state
pub async fn touch(pool: &PgPool, session_id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE user_sessions SET last_activity = NOW() WHERE session_id = $1")
        .bind(session_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete sessions past their expiry. Returns the number deleted.
pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
