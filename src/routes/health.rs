use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use std::sync::Arc;

use crate::db;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: String,
    uptime: u64,
    postgres: bool,
    redis: bool,
}

/// GET /health - service health with dependency checks
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    let postgres_ok = db::health_check(&state.pool).await;
    let redis_ok = state.redis.ping().await.unwrap_or(false);

    // Postgres is critical; Redis only backs rate limiting
    let status = if postgres_ok && redis_ok {
        "ok"
    } else if postgres_ok {
        "degraded"
    } else {
        "unhealthy"
    };

    let health = HealthResponse {
        status: status.to_string(),
        uptime,
        postgres: postgres_ok,
        redis: redis_ok,
    };

    Json(health)
}

/// GET /metrics - Prometheus metrics
pub async fn metrics() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

/// Readiness probe (for Kubernetes)
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let postgres_ok = db::health_check(&state.pool).await;
    let redis_ok = state.redis.ping().await.unwrap_or(false);

    if postgres_ok && redis_ok {
        (StatusCode::OK, "ready")
    } else if postgres_ok {
        // Redis down only disables rate limiting
        (StatusCode::OK, "ready (redis degraded)")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready - postgres unavailable")
    }
}

/// Liveness probe (for Kubernetes)
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, "alive")
}
