use chrono::{DateTime, Utc};
use serde::Serialize;

/// Blog post as returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPayload {
    pub id: i32,
    pub movie_id: i32,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    pub view_count: i32,
    pub generated_by_ai: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub generated_at: DateTime<Utc>,
}

/// Output of the blog writer (either parsed from the API or the canned
/// fallback)
#[derive(Debug, Clone)]
pub struct GeneratedBlog {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub keywords: String,
}
