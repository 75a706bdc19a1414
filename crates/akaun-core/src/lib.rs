pub mod app_config;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod feedback;
pub mod product;
pub mod seed_file;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, StorageConfig};
pub use catalog::{filter_products, search_admin, sort_products, SortKey, ALL};
pub use checkout::{
    build_checkout, whatsapp_link, CartItem, CheckoutLine, CheckoutRequest, CheckoutSummary,
    MessageFormat, ProductQuote,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use feedback::{Feedback, FeedbackInput};
pub use product::{Category, Product, ProductInput, StockStatus};
pub use seed_file::load_seed_file;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read seed file {path}: {source}")]
    SeedFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file: {0}")]
    SeedFileParse(#[source] serde_yaml::Error),
    #[error("invalid seed entry: {0}")]
    SeedFileValidation(String),
}

/// Input rejected before it reaches storage or the checkout builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
