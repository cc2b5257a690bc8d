use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Shape constants for the comment-quality score.
///
/// `k` controls how fast the length reward saturates, `k_sigmoid` and `b`
/// set the slope and midpoint of the word-score dispersion sigmoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    pub k: f64,
    pub k_sigmoid: f64,
    pub b: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            k: 0.17,
            k_sigmoid: 7.0,
            b: 0.5,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub comments_model_path: PathBuf,
    pub users_cache_path: PathBuf,
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub api_user_agent: String,
    pub api_timeout_secs: u64,
    pub api_request_delay_ms: u64,
    pub api_max_retries: u32,
    pub api_retry_backoff_base_secs: u64,
    pub feed_limit: usize,
    pub comments_per_post: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub scoring: ScoringParams,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("comments_model_path", &self.comments_model_path)
            .field("users_cache_path", &self.users_cache_path)
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("api_user_agent", &self.api_user_agent)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("api_request_delay_ms", &self.api_request_delay_ms)
            .field("api_max_retries", &self.api_max_retries)
            .field(
                "api_retry_backoff_base_secs",
                &self.api_retry_backoff_base_secs,
            )
            .field("feed_limit", &self.feed_limit)
            .field("comments_per_post", &self.comments_per_post)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("scoring", &self.scoring)
            .finish()
    }
}
