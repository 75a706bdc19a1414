//! Client for the object storage bucket that holds feedback images.

pub mod client;
pub mod error;
pub mod path;

pub use client::StorageClient;
pub use error::StorageError;
pub use path::{sanitize_file_name, upload_object_path};
