use thiserror::Error;

/// Errors returned by the storage client.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The configured base URL cannot carry object paths.
    #[error("invalid storage base URL '{0}'")]
    InvalidBaseUrl(String),

    /// The storage API answered with a non-2xx status.
    #[error("storage API error ({status}): {message}")]
    Api { status: u16, message: String },
}
