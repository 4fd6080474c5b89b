//! Database row types for PostgreSQL
//!
//! These types map directly to database rows and can be converted
//! to the API response types in models/.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::auth::{AdminRole, AdminUserPayload};
use crate::models::blog::BlogPayload;
use crate::models::movie::MoviePayload;

// ============================================================================
// Database Row Types
// ============================================================================

/// Admin account row from database
#[derive(Debug, Clone, FromRow)]
pub struct AdminRow {
    pub id: i32,
    pub username: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminRow {
    pub fn role(&self) -> AdminRole {
        parse_admin_role(&self.role)
    }

    pub fn is_superadmin(&self) -> bool {
        matches!(self.role(), AdminRole::Superadmin)
    }
}

impl From<AdminRow> for AdminUserPayload {
    fn from(row: AdminRow) -> Self {
        AdminUserPayload {
            id: row.id,
            username: row.username.clone(),
            role: parse_admin_role(&row.role),
            created_at: row.created_at,
            last_login: row.last_login,
            is_active: row.is_active,
        }
    }
}

/// Movie row from database
#[derive(Debug, Clone, FromRow)]
pub struct MovieRow {
    pub id: i32,
    pub title: String,
    pub year: Option<i16>,
    pub description: Option<String>,
    pub characters: serde_json::Value,
    pub thumbnail_url: Option<String>,
    pub file_handle: Option<String>,
    pub source_url: Option<String>,
    pub ott_availability: serde_json::Value,
    pub genre: String,
    pub duration_minutes: Option<i16>,
    pub rating: Option<f64>,
    pub view_count: i32,
    pub download_count: i32,
    pub is_active: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MovieRow {
    /// Characters as a plain list (stored as a JSONB array)
    pub fn characters_list(&self) -> Vec<String> {
        string_list(&self.characters)
    }

    /// OTT platforms as a plain list
    pub fn ott_list(&self) -> Vec<String> {
        string_list(&self.ott_availability)
    }
}

impl From<MovieRow> for MoviePayload {
    fn from(row: MovieRow) -> Self {
        let characters = row.characters_list();
        let ott_availability = row.ott_list();
        MoviePayload {
            id: row.id,
            title: row.title,
            year: row.year,
            description: row.description,
            characters,
            thumbnail_url: row.thumbnail_url,
            file_handle: row.file_handle,
            source_url: row.source_url,
            ott_availability,
            genre: row.genre,
            duration_minutes: row.duration_minutes,
            rating: row.rating,
            view_count: row.view_count,
            download_count: row.download_count,
            is_active: row.is_active,
        }
    }
}

/// Movie blog row from database
#[derive(Debug, Clone, FromRow)]
pub struct BlogRow {
    pub id: i32,
    pub movie_id: i32,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub keywords: Option<String>,
    pub view_count: i32,
    pub is_published: bool,
    pub generated_by_ai: bool,
    pub model: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlogRow> for BlogPayload {
    fn from(row: BlogRow) -> Self {
        BlogPayload {
            id: row.id,
            movie_id: row.movie_id,
            title: row.title,
            content: row.content,
            summary: row.summary,
            keywords: row.keywords,
            view_count: row.view_count,
            generated_by_ai: row.generated_by_ai,
            model: row.model,
            generated_at: row.generated_at,
        }
    }
}

/// Visitor session row from database
///
/// `movies_unlocked` is a JSONB array of movie ids. It only ever grows
/// while the session is alive, and each id appears at most once.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub id: i64,
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub ads_watched: i32,
    pub movies_unlocked: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRow {
    /// Unlocked movie ids as a plain list
    pub fn unlocked_ids(&self) -> Vec<i32> {
        self.movies_unlocked
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_i64().map(|id| id as i32))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Insert/Write Types
// ============================================================================

/// New movie to insert (admin create)
#[derive(Debug, Clone)]
pub struct NewMovie {
    pub title: String,
    pub year: Option<i16>,
    pub description: Option<String>,
    pub characters: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub file_handle: Option<String>,
    pub source_url: Option<String>,
    pub ott_availability: Vec<String>,
    pub genre: String,
    pub duration_minutes: Option<i16>,
    pub rating: Option<f64>,
    pub created_by: Option<i32>,
}

/// New admin account to insert
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub username: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub created_by: Option<i32>,
}

/// New visitor session to insert
#[derive(Debug, Clone)]
pub struct NewSession {
    pub session_id: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// New analytics event to append
#[derive(Debug, Clone)]
pub struct NewAnalyticsEvent {
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub additional_data: Option<serde_json::Value>,
}

/// New ad interaction to append
#[derive(Debug, Clone)]
pub struct NewAdInteraction {
    pub session_id: String,
    pub movie_id: Option<i32>,
    pub ad_type: Option<String>,
    pub ad_network: Option<String>,
    pub interaction_type: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Parse admin role string to enum
pub fn parse_admin_role(s: &str) -> AdminRole {
    match s.to_lowercase().as_str() {
        "superadmin" => AdminRole::Superadmin,
        _ => AdminRole::Admin,
    }
}

/// Extract a string list from a JSONB array value
fn string_list(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
