//! Request middleware: rate limiting, session bootstrap, admin auth

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::models::NewSession;
use crate::db::repository::{admins, sessions};
use crate::db::SessionRow;
use crate::services::auth;
use crate::AppState;

/// Best-effort client IP from proxy headers
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// User agent header as an owned string
pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Fixed-window rate limiting per client IP, backed by Redis.
///
/// Redis being down never blocks traffic: the limiter silently lets the
/// request through.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let ip = client_ip(req.headers());
    let key = format!("rate:{}", ip);
    let limit = state.config.rate_limit_requests as i64;

    match state
        .redis
        .incr_window(&key, state.config.rate_limit_window_secs)
        .await
    {
        Ok(count) if count > limit => {
            tracing::warn!("Rate limit exceeded for {} ({} requests)", ip, count);
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({ "error": "Rate limit exceeded" })),
            )
                .into_response()
        }
        Ok(count) => {
            let remaining = (limit - count).max(0);
            let mut response = next.run(req).await;
            if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
                response.headers_mut().insert("x-ratelimit-remaining", value);
            }
            response
        }
        Err(e) => {
            tracing::debug!("Rate limiter unavailable, skipping: {}", e);
            next.run(req).await
        }
    }
}

/// Session bootstrap for /api routes.
///
/// A valid X-Session-ID resolves to its live session row; anything else
/// (missing, unknown, expired) silently becomes a fresh session. The id in
/// effect is echoed back via the X-Session-ID response header.
pub async fn attach_session(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let session = match resolve_session(&state, presented.as_deref(), req.headers()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Session bootstrap failed: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Session unavailable" })),
            )
                .into_response();
        }
    };

    let session_id = session.session_id.clone();
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response.headers_mut().insert("x-session-id", value);
    }
    response
}

async fn resolve_session(
    state: &AppState,
    presented: Option<&str>,
    headers: &HeaderMap,
) -> Result<SessionRow, sqlx::Error> {
    if let Some(id) = presented {
        if let Some(existing) = sessions::find_live(&state.pool, id).await? {
            return Ok(existing);
        }
    }

    let fresh = NewSession {
        session_id: Uuid::new_v4().to_string(),
        ip_address: Some(client_ip(headers)),
        user_agent: user_agent(headers),
        expires_at: Utc::now() + chrono::Duration::hours(state.config.session_expire_hours),
    };

    let row = sessions::insert(&state.pool, &fresh).await?;
    tracing::debug!("Created session {}", row.session_id);
    Ok(row)
}

/// Bearer-token gate for the protected admin API.
///
/// The account row is re-loaded on every request, so deactivating an admin
/// takes effect immediately rather than at token expiry.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match auth::bearer_token(req.headers()) {
        Some(token) => token,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Authorization token required" })),
            )
                .into_response();
        }
    };

    let claims = match auth::decode_token(&token, &state.config.jwt_secret) {
        Some(claims) => claims,
        None => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Invalid or expired token" })),
            )
                .into_response();
        }
    };

    match admins::find_active_by_username(&state.pool, &claims.sub).await {
        Ok(Some(admin)) => {
            req.extensions_mut().insert(admin);
            next.run(req).await
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "User not found or inactive" })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to load admin account: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Database error" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }

    #[test]
    fn client_ip_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.0.0.2".parse().unwrap());
        assert_eq!(client_ip(&headers), "10.0.0.2");

        assert_eq!(client_ip(&HeaderMap::new()), "unknown");
    }
}
