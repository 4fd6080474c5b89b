use serde::{Deserialize, Serialize};

/// Movie as returned by the public and admin APIs
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePayload {
    pub id: i32,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub characters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub ott_availability: Vec<String>,
    pub genre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub view_count: i32,
    pub download_count: i32,
    pub is_active: bool,
}

/// Request body for creating a movie (admin)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateMovieRequest {
    pub title: String,
    pub year: Option<i16>,
    pub description: Option<String>,
    #[serde(default)]
    pub characters: Vec<String>,
    pub thumbnail_url: Option<String>,
    pub file_handle: Option<String>,
    pub source_url: Option<String>,
    #[serde(default)]
    pub ott_availability: Vec<String>,
    pub genre: Option<String>,
    pub duration_minutes: Option<i16>,
    pub rating: Option<f64>,
}

/// Request body for updating a movie (admin); absent fields are untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateMovieRequest {
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

/// Admin dashboard stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_movies: i64,
    pub active_movies: i64,
    pub total_views: i64,
    pub total_downloads: i64,
    pub recent_movies: Vec<MoviePayload>,
}
