use anyhow::Result;
use std::env;

/// One day.
pub const MAX_CALL_MINUTES_LIMIT: i64 = 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_days: i64,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origin: String,
    pub public_base_url: String,
    pub media_root: String,
    pub max_upload_bytes: usize,
    pub invite_scheme: String,
    pub chatbot_url: String,
    pub summary_url: String,
    pub news_api_url: String,
    pub news_api_key: Option<String>,
    pub news_cache_seconds: u64,
    pub video_app_id: u32,
    pub video_app_sign: String,
    pub max_call_minutes: i64,
    pub rate_limit_requests: u32,
    pub rate_limit_window_seconds: i64,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let jwt_secret = var_or(
            "JWT_SECRET",
            "your-super-secret-jwt-key-change-this-in-production-12345",
        );
        let video_app_sign = var_or("VIDEO_APP_SIGN", "development-video-app-sign");

        let config = Config {
            database_url: var_or("DATABASE_URL", "postgres://@localhost:5432/officecomms"),
            jwt_secret,
            jwt_expiration_days: parsed_or("JWT_EXPIRATION_DAYS", 30),
            host: var_or("HOST", "127.0.0.1"),
            port: parsed_or("PORT", 8080),
            environment: var_or("ENVIRONMENT", "development"),
            cors_origin: var_or("CORS_ORIGIN", "http://localhost:3000"),
            public_base_url: var_or("PUBLIC_BASE_URL", "http://localhost:8080"),
            media_root: var_or("MEDIA_ROOT", "./media"),
            max_upload_bytes: parsed_or("MAX_UPLOAD_BYTES", 25 * 1024 * 1024),
            invite_scheme: var_or("INVITE_SCHEME", "officecomms"),
            chatbot_url: var_or("CHATBOT_URL", "http://localhost:5000/chat"),
            summary_url: var_or("SUMMARY_URL", "http://localhost:5001/summarize-call"),
            news_api_url: var_or("NEWS_API_URL", "https://newsapi.org/v2/top-headlines"),
            news_api_key: env::var("NEWS_API_KEY").ok().filter(|key| !key.is_empty()),
            news_cache_seconds: parsed_or("NEWS_CACHE_SECONDS", 600),
            video_app_id: parsed_or("VIDEO_APP_ID", 0),
            video_app_sign,
            max_call_minutes: parsed_or("MAX_CALL_MINUTES", 10),
            rate_limit_requests: parsed_or("RATE_LIMIT_REQUESTS", 20),
            rate_limit_window_seconds: parsed_or("RATE_LIMIT_WINDOW_SECONDS", 60),
        };

        if config.is_production() {
            for key in ["JWT_SECRET", "VIDEO_APP_SIGN"] {
                if env::var(key).unwrap_or_default().is_empty() {
                    anyhow::bail!("{} must be set in production", key);
                }
            }
            if config.jwt_secret.len() < 32 {
                anyhow::bail!("JWT_SECRET must be at least 32 characters in production");
            }
        }

        if !(1..=MAX_CALL_MINUTES_LIMIT).contains(&config.max_call_minutes) {
            anyhow::bail!(
                "MAX_CALL_MINUTES must be between 1 and {}",
                MAX_CALL_MINUTES_LIMIT
            );
        }

        Ok(config)
    }

    /// Fixed configuration for tests: memory store, short-lived tokens.
    pub fn test_config() -> Self {
        Config {
            database_url: "memory".to_string(),
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            jwt_expiration_days: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
            media_root: "./media".to_string(),
            max_upload_bytes: 1024 * 1024,
            invite_scheme: "officecomms".to_string(),
            chatbot_url: "http://chatbot.test/chat".to_string(),
            summary_url: "http://summary.test/summarize-call".to_string(),
            news_api_url: "http://news.test/v2/top-headlines".to_string(),
            news_api_key: Some("test-news-key".to_string()),
            news_cache_seconds: 60,
            video_app_id: 1234,
            video_app_sign: "test-video-app-sign".to_string(),
            max_call_minutes: 10,
            rate_limit_requests: 1000,
            rate_limit_window_seconds: 60,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == "memory"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Body limit for JSON payloads carrying base64 media.
    pub fn json_payload_limit(&self) -> usize {
        self.max_upload_bytes / 3 * 4 + 64 * 1024
    }
}
