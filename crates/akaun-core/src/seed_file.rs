use std::path::Path;

use serde::Deserialize;

use crate::{ConfigError, ProductInput};

#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<ProductInput>,
}

/// Load and validate a YAML product seed file.
///
/// Every entry goes through [`ProductInput::normalized`]; the first invalid
/// entry fails the whole file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_seed_file(path: &Path) -> Result<Vec<ProductInput>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SeedFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_seed_file(&content)
}

fn parse_seed_file(content: &str) -> Result<Vec<ProductInput>, ConfigError> {
    let file: SeedFile = serde_yaml::from_str(content).map_err(ConfigError::SeedFileParse)?;

    file.products
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            p.normalized()
                .map_err(|e| ConfigError::SeedFileValidation(format!("products[{i}]: {e}")))
        })
        .collect()
}
