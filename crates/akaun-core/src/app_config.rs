use std::net::SocketAddr;

use crate::checkout::MessageFormat;
use crate::ConfigError;

pub const WHATSAPP_RECIPIENT_VAR: &str = "AKAUN_WHATSAPP_RECIPIENT";

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

/// Object storage project. Feedback and product images live in separate buckets.
#[derive(Clone)]
pub struct StorageConfig {
    pub url: String,
    pub service_key: String,
    pub bucket: String,
    pub product_bucket: String,
    pub timeout_secs: u64,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("service_key", &"[redacted]")
            .field("bucket", &self.bucket)
            .field("product_bucket", &self.product_bucket)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub whatsapp_base_url: String,
    /// Only checkout needs it; `db` commands run without it.
    pub whatsapp_recipient: Option<String>,
    pub currency_label: String,
    /// `None` when `AKAUN_STORAGE_URL` is unset; image upload is then disabled.
    pub storage: Option<StorageConfig>,
}

impl AppConfig {
    #[must_use]
    pub fn message_format(&self) -> MessageFormat {
        MessageFormat {
            currency_label: self.currency_label.clone(),
        }
    }

    /// The order recipient, required by every checkout path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `AKAUN_WHATSAPP_RECIPIENT` is unset.
    pub fn whatsapp_recipient(&self) -> Result<&str, ConfigError> {
        self.whatsapp_recipient
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar(WHATSAPP_RECIPIENT_VAR.to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("whatsapp_base_url", &self.whatsapp_base_url)
            .field("whatsapp_recipient", &self.whatsapp_recipient)
            .field("currency_label", &self.currency_label)
            .field("storage", &self.storage)
            .finish()
    }
}
