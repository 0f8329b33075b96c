use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
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
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("XOPT_ENV", "development"))?;

    let bind_addr = parse_addr("XOPT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("XOPT_LOG_LEVEL", "info");
    let library_path = PathBuf::from(or_default("XOPT_LIBRARY_PATH", "./config/library.yaml"));
    let state_path = PathBuf::from(or_default("XOPT_STATE_PATH", "./.xopt-state.json"));

    let db_max_connections = parse_u32("XOPT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("XOPT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("XOPT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let anthropic_api_key = lookup("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let generator_model = or_default("XOPT_GENERATOR_MODEL", "claude-sonnet-4-20250514");
    let generator_base_url = or_default("XOPT_GENERATOR_BASE_URL", "https://api.anthropic.com");
    let generator_timeout_secs = parse_u64("XOPT_GENERATOR_TIMEOUT_SECS", "120")?;
    let generator_max_retries = parse_u32("XOPT_GENERATOR_MAX_RETRIES", "2")?;
    let generator_retry_backoff_base_ms =
        parse_u64("XOPT_GENERATOR_RETRY_BACKOFF_BASE_MS", "1000")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        library_path,
        state_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        anthropic_api_key,
        generator_model,
        generator_base_url,
        generator_timeout_secs,
        generator_max_retries,
        generator_retry_backoff_base_ms,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "XOPT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
