//! Server-rendered HTML pages (tera templates under templates/)

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tera::Context;

use crate::db::models::NewAnalyticsEvent;
use crate::db::repository::{analytics, movies};
use crate::middleware::{client_ip, user_agent};
use crate::models::movie::MoviePayload;
use crate::routes::movies::ensure_blog;
use crate::services::ad_gate::REQUIRED_ADS;
use crate::template::TERA;
use crate::AppState;

fn render_page(template: &str, context: Context) -> Response {
    match TERA.render(template, &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template render failed for {}: {}", template, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("<h1>Something went wrong</h1>".to_string()),
            )
                .into_response()
        }
    }
}

fn html_error(status: StatusCode, message: &str) -> Response {
    (status, Html(format!("<h1>{}</h1>", message))).into_response()
}

fn base_context(state: &AppState) -> Context {
    let mut context = Context::new();
    context.insert("site_name", &state.config.site_name);
    context.insert("site_description", &state.config.site_description);
    context
}

async fn record_page_view(state: &AppState, headers: &HeaderMap, path: &str) {
    let event = NewAnalyticsEvent {
        event_type: "page_view".to_string(),
        entity_type: Some("page".to_string()),
        entity_id: None,
        session_id: None,
        ip_address: Some(client_ip(headers)),
        user_agent: user_agent(headers),
        referrer: None,
        additional_data: Some(serde_json::json!({ "path": path })),
    };

    if let Err(e) = analytics::insert_event(&state.pool, &event).await {
        tracing::warn!("Failed to record page view: {}", e);
    }
}

/// GET / - home page with the active catalog
pub async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let rows = match movies::list(&state.pool, true).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to load catalog for home page: {}", e);
            return html_error(StatusCode::INTERNAL_SERVER_ERROR, "Error Loading Movies");
        }
    };

    record_page_view(&state, &headers, "/").await;

    let payloads: Vec<MoviePayload> = rows.into_iter().map(MoviePayload::from).collect();
    let mut context = base_context(&state);
    context.insert("movies", &payloads);

    render_page("index.html", context)
}

/// GET /watch/:id - watch page with the player and the ad overlay
pub async fn watch(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let movie = match movies::find_by_id(&state.pool, movie_id).await {
        Ok(Some(movie)) if movie.is_active => movie,
        Ok(_) => return html_error(StatusCode::NOT_FOUND, "Movie Not Found"),
        Err(e) => {
            tracing::error!("Failed to load movie {}: {}", movie_id, e);
            return html_error(StatusCode::INTERNAL_SERVER_ERROR, "Error Loading Movie");
        }
    };

    record_page_view(&state, &headers, &format!("/watch/{movie_id}")).await;

    let mut context = base_context(&state);
    context.insert("movie", &MoviePayload::from(movie));
    context.insert("required_ads", &REQUIRED_ADS);

    render_page("watch.html", context)
}

/// GET /movie/:id/blog - rendered blog article (generated on first view)
pub async fn movie_blog(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    headers: HeaderMap,
) -> Response {
    let movie = match movies::find_by_id(&state.pool, movie_id).await {
        Ok(Some(movie)) if movie.is_active => movie,
        Ok(_) => return html_error(StatusCode::NOT_FOUND, "Movie Not Found"),
        Err(e) => {
            tracing::error!("Failed to load movie {}: {}", movie_id, e);
            return html_error(StatusCode::INTERNAL_SERVER_ERROR, "Error Loading Blog");
        }
    };

    let blog = match ensure_blog(&state, &movie).await {
        Ok(blog) => blog,
        Err(e) => {
            tracing::error!("Failed to load blog for movie {}: {}", movie_id, e);
            return html_error(StatusCode::INTERNAL_SERVER_ERROR, "Error Loading Blog");
        }
    };

    record_page_view(&state, &headers, &format!("/movie/{movie_id}/blog")).await;

    let mut context = base_context(&state);
    context.insert("movie", &MoviePayload::from(movie));
    context.insert("blog_title", &blog.title);
    context.insert("blog_content", &blog.content);
    if let Some(summary) = &blog.summary {
        context.insert("blog_summary", summary);
    }
    context.insert("blog_generated_at", &blog.generated_at.to_rfc3339());

    render_page("blog.html", context)
}

/// GET /admin - admin login page
pub async fn admin_login(State(state): State<Arc<AppState>>) -> Response {
    render_page("admin_login.html", base_context(&state))
}

/// GET /admin/dashboard - admin panel shell (data loads via the admin API)
pub async fn admin_dashboard(State(state): State<Arc<AppState>>) -> Response {
    render_page("admin_dashboard.html", base_context(&state))
}
