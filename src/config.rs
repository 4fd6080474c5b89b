use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub node_env: String,
    pub base_url: String,
    pub site_name: String,
    pub site_description: String,

    // PostgreSQL
    pub database_url: String,
    pub db_max_connections: u32,

    // Redis (rate limiting)
    pub redis_url: String,
    pub rate_limit_requests: u32,
    pub rate_limit_window_secs: u64,

    // Sessions
    pub session_expire_hours: i64,

    // Admin auth
    pub jwt_secret: String,
    pub superadmin_username: Option<String>,
    pub superadmin_password: Option<String>,

    // File host (remote media backend)
    pub file_host_api_base: String,
    pub file_host_bot_token: String,
    pub file_host_lookup_timeout_ms: u64,

    // Blog generation API
    pub blog_api_url: String,
    pub blog_api_key: Option<String>,
    pub blog_model: String,
    pub blog_timeout_ms: u64,

    // Retention
    pub analytics_retention_days: i64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            site_name: env::var("SITE_NAME").unwrap_or_else(|_| "CineGate".to_string()),
            site_description: env::var("SITE_DESCRIPTION")
                .unwrap_or_else(|_| "Watch movies online, read AI-written reviews".to_string()),

            // PostgreSQL
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/cinegate".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap_or(15),

            // Redis
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .unwrap_or(3600), // 1 hour

            // Sessions
            session_expire_hours: env::var("SESSION_EXPIRE_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),

            // Admin auth
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "change-me-in-production".to_string()),
            superadmin_username: env::var("SUPERADMIN_USERNAME").ok(),
            superadmin_password: env::var("SUPERADMIN_PASSWORD").ok(),

            // File host
            file_host_api_base: env::var("FILE_HOST_API_BASE")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            file_host_bot_token: env::var("FILE_HOST_BOT_TOKEN").unwrap_or_default(),
            file_host_lookup_timeout_ms: env::var("FILE_HOST_LOOKUP_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .unwrap_or(10_000), // 10 seconds

            // Blog generation
            blog_api_url: env::var("BLOG_API_URL")
                .unwrap_or_else(|_| "https://openrouter.ai/api/v1/chat/completions".to_string()),
            blog_api_key: env::var("BLOG_API_KEY").ok(),
            blog_model: env::var("BLOG_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            blog_timeout_ms: env::var("BLOG_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds

            // Retention
            analytics_retention_days: env::var("ANALYTICS_RETENTION_DAYS")
                .unwrap_or_else(|_| "90".to_string())
                .parse()
                .unwrap_or(90),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
