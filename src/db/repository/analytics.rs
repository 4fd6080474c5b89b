//! Analytics and ad-interaction repositories
//!
//! Both tables are append-only logs; rows are never mutated. Ad
//! interactions are not consulted at unlock-decision time (the counter
//! lives on user_sessions), they exist for offline reporting.

use sqlx::PgPool;

use crate::db::models::{NewAdInteraction, NewAnalyticsEvent};

/// Append an analytics event
pub async fn insert_event(pool: &PgPool, event: &NewAnalyticsEvent) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO analytics_events (
            event_type, entity_type, entity_id, session_id,
            ip_address, user_agent, referrer, additional_data
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&event.event_type)
    .bind(&event.entity_type)
    .bind(event.entity_id)
    .bind(&event.session_id)
    .bind(&event.ip_address)
    .bind(&event.user_agent)
    .bind(&event.referrer)
    .bind(&event.additional_data)
    .execute(pool)
    .await?;

    Ok(())
}

/// Append an ad interaction
pub async fn insert_ad_interaction(
    pool: &PgPool,
    interaction: &NewAdInteraction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO ad_interactions (session_id, movie_id, ad_type, ad_network, interaction_type)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(&interaction.session_id)
    .bind(interaction.movie_id)
    .bind(&interaction.ad_type)
    .bind(&interaction.ad_network)
    .bind(&interaction.interaction_type)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete analytics events older than the retention window. Returns the
/// number deleted.
pub async fn delete_older_than_days(pool: &PgPool, days: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM analytics_events WHERE created_at < NOW() - make_interval(days => $1::int)",
    )
    .bind(days)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
