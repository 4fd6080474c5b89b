mod config;
mod db;
mod middleware;
mod models;
mod routes;
mod services;
mod template;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::models::NewAdmin;
use crate::db::repository::admins;
use crate::db::{create_pool, run_migrations};
use crate::models::auth::AdminRole;
use crate::services::{
    blog_writer::BlogWriter,
    cleanup::{start_cleanup_task, CleanupConfig},
    file_host::FileHostClient,
    redis::RedisService,
};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub redis: RedisService,
    pub file_host: FileHostClient,
    pub blog_writer: BlogWriter,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinegate_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting CineGate Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);

    // Compile templates up front so a broken deploy fails here, not on the
    // first page view
    lazy_static::initialize(&template::TERA);
    tracing::info!("Templates compiled");

    // Initialize PostgreSQL connection pool
    let pool = create_pool(&config).await?;
    tracing::info!("PostgreSQL connected");

    // Run database migrations
    run_migrations(&pool).await?;

    // Redis backs the API rate limiter
    let redis = RedisService::new(&config.redis_url).await?;
    tracing::info!("Redis connected: {}", config.redis_url);

    // Remote media backend and blog generation clients
    let file_host = FileHostClient::new(
        &config.file_host_api_base,
        &config.file_host_bot_token,
        config.file_host_lookup_timeout_ms,
    );
    let blog_writer = BlogWriter::new(
        &config.blog_api_url,
        config.blog_api_key.clone(),
        &config.blog_model,
        config.blog_timeout_ms,
    );
    tracing::info!("File host and blog writer clients initialized");

    // First-run superadmin account
    seed_superadmin(&pool, &config).await?;

    // Start cleanup task (runs in background)
    let cleanup_pool = pool.clone();
    let cleanup_config = CleanupConfig {
        interval_secs: 3600,
        analytics_retention_days: config.analytics_retention_days,
    };
    tokio::spawn(start_cleanup_task(cleanup_pool, cleanup_config));
    tracing::info!("Cleanup task started (hourly)");

    // Build application state
    let state = Arc::new(AppState {
        config,
        pool,
        redis,
        file_host,
        blog_writer,
        start_time: Instant::now(),
    });

    // Admin API behind the bearer-token gate
    let admin_api = Router::new()
        .route("/api/admin/stats", get(routes::admin::get_stats))
        .route(
            "/api/admin/movies",
            get(routes::admin::list_movies).post(routes::admin::create_movie),
        )
        .route(
            "/api/admin/movies/:id",
            put(routes::admin::update_movie).delete(routes::admin::delete_movie),
        )
        .route(
            "/api/admin/movies/:id/generate-blog",
            post(routes::admin::generate_blog),
        )
        .route("/api/admin/validate-file", post(routes::admin::validate_file))
        .route("/api/admin/cron/:job", post(routes::admin::run_cron_job))
        .route(
            "/api/admin/users",
            get(routes::admin::list_admins).post(routes::admin::create_admin),
        )
        .route(
            "/api/admin/users/:username",
            delete(routes::admin::delete_admin),
        )
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    // JSON API: sessions attach to everything under /api, rate limiting
    // runs outermost
    let api = Router::new()
        // Public catalog
        .route("/api/movies", get(routes::movies::list_movies))
        .route("/api/movies/:id", get(routes::movies::get_movie))
        .route("/api/movies/:id/blog", get(routes::movies::get_movie_blog))
        // Ad gate and analytics
        .route("/api/check-ads/:movie_id", post(routes::streaming::check_ads))
        .route("/api/track-ad", post(routes::streaming::track_ad))
        .route("/api/analytics/track", post(routes::streaming::track_event))
        // Admin auth (outside the bearer gate)
        .route("/api/admin/login", post(routes::auth::login))
        .route("/api/admin/verify", post(routes::auth::verify))
        .merge(admin_api)
        .layer(from_fn_with_state(state.clone(), middleware::attach_session))
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    // Media relay routes stay outside compression, CORS and the session/
    // rate-limit layers: the relay sets its own CORS headers, bodies must
    // pass through byte-exact, and range seeks from the <video> element
    // carry no session header
    let media_api = Router::new()
        .route("/api/stream/:handle", get(routes::streaming::stream_media))
        .route(
            "/api/download/:handle",
            get(routes::streaming::download_media),
        );

    // Build router
    let app = Router::new()
        // Server-rendered pages
        .route("/", get(routes::pages::home))
        .route("/watch/:id", get(routes::pages::watch))
        .route("/movie/:id/blog", get(routes::pages::movie_blog))
        .route("/admin", get(routes::pages::admin_login))
        .route("/admin/dashboard", get(routes::pages::admin_dashboard))
        // Health endpoints
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/ready", get(routes::health::ready))
        .route("/live", get(routes::health::live))
        .merge(api)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .merge(media_api)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the first superadmin account from env credentials when the
/// admin table is empty
async fn seed_superadmin(pool: &PgPool, config: &Config) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (
        config.superadmin_username.as_ref(),
        config.superadmin_password.as_ref(),
    ) else {
        return Ok(());
    };

    if admins::count(pool).await? > 0 {
        return Ok(());
    }

    let password_hash = services::auth::hash_password(password)?;
    admins::insert(
        pool,
        &NewAdmin {
            username: username.clone(),
            password_hash,
            role: AdminRole::Superadmin,
            created_by: None,
        },
    )
    .await?;

    tracing::info!("Seeded superadmin account '{}'", username);
    Ok(())
}
