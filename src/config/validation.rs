use crate::config::types::{Config, CrawlerConfig, DomainsConfig, OutputConfig, ScopeConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_scope_config(&config.scope)?;
    validate_output_config(&config.output)?;
    validate_domains_config(&config.domains)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.base_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "base-url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' has no host",
            config.base_url
        )));
    }

    if config.num_workers < 1 || config.num_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "num-workers must be between 1 and 64, got {}",
            config.num_workers
        )));
    }

    if config.yield_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "yield-ms must be <= 60000ms, got {}ms",
            config.yield_ms
        )));
    }

    Ok(())
}

/// Validates scope configuration
fn validate_scope_config(config: &ScopeConfig) -> Result<(), ConfigError> {
    // Path matching is meaningless across hosts
    if config.path_match && !config.domain_match {
        return Err(ConfigError::Validation(
            "domain-match must be true when path-match is enabled".to_string(),
        ));
    }

    if config.link_tag_list().is_empty() {
        return Err(ConfigError::Validation(
            "link-tags must name at least one tag".to_string(),
        ));
    }

    for tag in config
        .content_tag_list()
        .iter()
        .chain(config.link_tag_list().iter())
    {
        validate_tag_name(tag)?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("markdown-dir", &config.markdown_dir),
        ("download-dir", &config.download_dir),
        ("state-dir", &config.state_dir),
        ("ledger-path", &config.ledger_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates domain-discovery configuration
fn validate_domains_config(config: &DomainsConfig) -> Result<(), ConfigError> {
    if config.max_level < 1 {
        return Err(ConfigError::Validation(
            "domains max-level must be at least 1".to_string(),
        ));
    }

    if config.suffix_parts < 1 {
        return Err(ConfigError::Validation(
            "domains suffix-parts must be at least 1".to_string(),
        ));
    }

    for (name, value) in [
        ("domains-path", &config.domains_path),
        ("processed-log", &config.processed_log),
    ] {
        if let Some(path) = value {
            if path.is_empty() {
                return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
            }
        }
    }

    Ok(())
}

/// Validates a single HTML tag name
fn validate_tag_name(tag: &str) -> Result<(), ConfigError> {
    if tag.is_empty() {
        return Err(ConfigError::Validation(
            "tag name cannot be empty".to_string(),
        ));
    }

    if !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "tag name '{}' contains invalid characters",
            tag
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::ScopeConfig;

    fn valid_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                base_url: "https://example.com/docs".to_string(),
                max_depth: 3,
                num_workers: 2,
                yield_ms: 50,
                resume: false,
            },
            scope: ScopeConfig::default(),
            output: OutputConfig {
                markdown_dir: "./markdown".to_string(),
                download_dir: "./download".to_string(),
                state_dir: "./state".to_string(),
                ledger_path: "./pages.json".to_string(),
                no_content_log: "no_content_urls.txt".to_string(),
                file_types_path: None,
            },
            domains: DomainsConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let mut config = valid_config();
        config.crawler.base_url = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unparseable_base_url_rejected() {
        let mut config = valid_config();
        config.crawler.base_url = "not a url".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_path_match_without_domain_match_rejected() {
        let mut config = valid_config();
        config.scope.domain_match = false;
        config.scope.path_match = true;
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = valid_config();
        config.crawler.num_workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_bad_tag_name_rejected() {
        let mut config = valid_config();
        config.scope.link_tags = "body,<script>".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let mut config = valid_config();
        config.output.ledger_path = "".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_suffix_parts_rejected() {
        let mut config = valid_config();
        config.domains.suffix_parts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_domains_path_rejected() {
        let mut config = valid_config();
        config.domains.domains_path = Some("".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_tag_name_rules() {
        assert!(validate_tag_name("article").is_ok());
        assert!(validate_tag_name("h1").is_ok());
        assert!(validate_tag_name("").is_err());
        assert!(validate_tag_name("a b").is_err());
    }
}
