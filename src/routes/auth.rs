//! Admin login and token verification endpoints
//!
//! These live outside the bearer-token middleware; everything else under
//! /api/admin runs behind it.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::db::repository::admins;
use crate::models::auth::{AdminUserPayload, LoginRequest, LoginResponse};
use crate::services::auth;
use crate::AppState;

/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Username and password required" })),
        ));
    }

    let admin = admins::find_active_by_username(&state.pool, &payload.username)
        .await
        .map_err(|e| {
            tracing::error!("Login lookup failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Login failed" })),
            )
        })?;

    // Same answer for unknown users and wrong passwords
    let invalid = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": "Invalid credentials" })),
        )
    };

    let admin = admin.ok_or_else(invalid)?;
    if !auth::verify_password(&payload.password, &admin.password_hash) {
        return Err(invalid());
    }

    if let Err(e) = admins::touch_last_login(&state.pool, admin.id).await {
        tracing::warn!("Failed to update last_login: {}", e);
    }

    let token = auth::issue_token(&admin, &state.config.jwt_secret).map_err(|e| {
        tracing::error!("Failed to issue token: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "Login failed" })),
        )
    })?;

    tracing::info!("Admin '{}' logged in", admin.username);

    Ok(Json(LoginResponse {
        success: true,
        token,
        user: AdminUserPayload::from(admin),
    }))
}

/// POST /api/admin/verify - validate a bearer token and return its user
pub async fn verify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let unauthorized = |message: &str| {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({ "error": message })),
        )
    };

    let token = auth::bearer_token(&headers).ok_or_else(|| unauthorized("Token required"))?;
    let claims = auth::decode_token(&token, &state.config.jwt_secret)
        .ok_or_else(|| unauthorized("Invalid token"))?;

    let admin = admins::find_active_by_username(&state.pool, &claims.sub)
        .await
        .map_err(|e| {
            tracing::error!("Verify lookup failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Verification failed" })),
            )
        })?
        .ok_or_else(|| unauthorized("User not found"))?;

    Ok(Json(serde_json::json!({
        "success": true,
        "user": AdminUserPayload::from(admin)
    })))
}
