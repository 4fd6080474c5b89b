use serde::{Deserialize, Serialize};

/// Ad interaction kinds accepted by POST /api/track-ad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    Impression,
    Click,
    Completion,
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionKind::Impression => write!(f, "impression"),
            InteractionKind::Click => write!(f, "click"),
            InteractionKind::Completion => write!(f, "completion"),
        }
    }
}

/// Response for POST /api/check-ads/:movieId
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdCheckResponse {
    pub success: bool,
    pub can_watch: bool,
    pub ads_watched: i32,
    pub ads_needed: i32,
    pub is_unlocked: bool,
}

/// Request body for POST /api/track-ad
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackAdRequest {
    pub movie_id: Option<i32>,
    pub ad_type: Option<String>,
    pub ad_network: Option<String>,
    pub interaction_type: InteractionKind,
}

/// Response for POST /api/track-ad after a completion
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackAdResponse {
    pub success: bool,
    pub ads_watched: i32,
    pub movie_unlocked: bool,
}

/// Request body for POST /api/analytics/track
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrackEventRequest {
    pub event_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub additional_data: Option<serde_json::Value>,
}

