use crate::app_config::{AppConfig, Environment, StorageConfig, WHATSAPP_RECIPIENT_VAR};
use crate::checkout::DEFAULT_CURRENCY_LABEL;
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
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let whatsapp_recipient = lookup(WHATSAPP_RECIPIENT_VAR)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty());

    let env = parse_environment(&or_default("AKAUN_ENV", "development"))?;

    let bind_addr = parse_addr("AKAUN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("AKAUN_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("AKAUN_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AKAUN_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AKAUN_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let whatsapp_base_url = or_default("AKAUN_WHATSAPP_BASE_URL", "https://wa.me");
    let currency_label = or_default("AKAUN_CURRENCY_LABEL", DEFAULT_CURRENCY_LABEL);

    let storage = match lookup("AKAUN_STORAGE_URL").ok().filter(|v| !v.trim().is_empty()) {
        Some(url) => Some(StorageConfig {
            url,
            service_key: require("AKAUN_STORAGE_SERVICE_KEY")?,
            bucket: or_default("AKAUN_STORAGE_BUCKET", "feedbacks"),
            product_bucket: or_default("AKAUN_STORAGE_PRODUCT_BUCKET", "products"),
            timeout_secs: parse_u64("AKAUN_STORAGE_TIMEOUT_SECS", "30")?,
        }),
        None => None,
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        whatsapp_base_url,
        whatsapp_recipient,
        currency_label,
        storage,
    })
}

/// Parse `AKAUN_ENV`. Unknown values are an error, never development.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AKAUN_ENV".to_string(),
            reason: format!("expected development, test or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
