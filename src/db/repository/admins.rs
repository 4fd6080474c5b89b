//! Admin account repository for database operations

use sqlx::PgPool;

use crate::db::models::{AdminRow, NewAdmin};

const ADMIN_COLUMNS: &str =
    "id, username, password_hash, role, is_active, created_by, created_at, last_login";

/// Find an active admin by username
pub async fn find_active_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<AdminRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin_users WHERE username = $1 AND is_active = TRUE"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// Insert a new admin account and return the stored row
pub async fn insert(pool: &PgPool, admin: &NewAdmin) -> Result<AdminRow, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>(&format!(
        r#"
        INSERT INTO admin_users (username, password_hash, role, created_by)
        VALUES ($1, $2, $3, $4)
        RETURNING {ADMIN_COLUMNS}
        "#
    ))
    .bind(&admin.username)
    .bind(&admin.password_hash)
    .bind(admin.role.to_string())
    .bind(admin.created_by)
    .fetch_one(pool)
    .await
}

/// Record a successful login
pub async fn touch_last_login(pool: &PgPool, id: i32) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE admin_users SET last_login = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// List all active admin accounts, oldest first
pub async fn list_active(pool: &PgPool) -> Result<Vec<AdminRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin_users WHERE is_active = TRUE ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await
}

/// Deactivate an admin account by username. Returns false when no active
/// account matched.
pub async fn deactivate(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE admin_users SET is_active = FALSE WHERE username = $1 AND is_active = TRUE")
            .bind(username)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Count all admin accounts (active or not), used for first-run seeding
pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
