use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses, and validates a TOML configuration file
///
/// The SHA-256 of the raw file content is logged on success so a run's logs
/// can be matched to the exact configuration text that produced it.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;

    tracing::info!(
        "Loaded configuration from {} (sha256: {})",
        path.display(),
        content_hash(&content)
    );
    Ok(config)
}

/// SHA-256 hex digest of the raw configuration text
fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
