use crate::app_config::{AppConfig, Environment, ScoringParams};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(invalid(var, "value must be finite".to_string()))
        }
    };

    let database_url = lookup("DATABASE_URL").ok();
    let env = parse_environment(&or_default("INFL_ENV", "development"));
    let log_level = or_default("INFL_LOG_LEVEL", "info");

    let comments_model_path = PathBuf::from(or_default(
        "INFL_COMMENTS_MODEL_PATH",
        "./models/comments.model.json",
    ));
    let users_cache_path = PathBuf::from(or_default(
        "INFL_USERS_CACHE_PATH",
        "./models/users_sample.json",
    ));

    let api_base_url = or_default("INFL_API_BASE_URL", "https://i.instagram.com/api/v1");
    let api_token = lookup("INFL_API_TOKEN").ok();
    let api_user_agent = or_default("INFL_API_USER_AGENT", "infl/0.1 (feature-extraction)");
    let api_timeout_secs = parse_u64("INFL_API_TIMEOUT_SECS", "30")?;
    let api_request_delay_ms = parse_u64("INFL_API_REQUEST_DELAY_MS", "1000")?;
    let api_max_retries = parse_u32("INFL_API_MAX_RETRIES", "4")?;
    let api_retry_backoff_base_secs = parse_u64("INFL_API_RETRY_BACKOFF_BASE_SECS", "60")?;

    let feed_limit = parse_usize("INFL_FEED_LIMIT", "50")?;
    let comments_per_post = parse_usize("INFL_COMMENTS_PER_POST", "10")?;

    let db_max_connections = parse_u32("INFL_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("INFL_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("INFL_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scoring = ScoringParams {
        k: parse_f64("INFL_COMMENT_K", "0.17")?,
        k_sigmoid: parse_f64("INFL_COMMENT_K_SIGMOID", "7")?,
        b: parse_f64("INFL_COMMENT_B", "0.5")?,
    };

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        comments_model_path,
        users_cache_path,
        api_base_url,
        api_token,
        api_user_agent,
        api_timeout_secs,
        api_request_delay_ms,
        api_max_retries,
        api_retry_backoff_base_secs,
        feed_limit,
        comments_per_post,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scoring,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
