use crate::config::types::{Config, RunConfig, SiteConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_storage_config(&config.storage)?;
    validate_run_config(&config.run)?;
    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "base-url must use an HTTP scheme, got '{}'",
            url.scheme()
        )));
    }

    if config.base_url.ends_with('/') {
        return Err(ConfigError::Validation(
            "base-url must not end with a slash".to_string(),
        ));
    }

    if config.min_request_interval_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "min-request-interval-ms must be >= 100ms, got {}ms",
            config.min_request_interval_ms
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates object store configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.bucket.is_empty() {
        return Err(ConfigError::Validation("bucket cannot be empty".to_string()));
    }

    if config.region.is_empty() {
        return Err(ConfigError::Validation("region cannot be empty".to_string()));
    }

    if config.root_prefix.is_empty() || config.root_prefix.contains('/') {
        return Err(ConfigError::Validation(format!(
            "root-prefix must be a single non-empty path segment, got '{}'",
            config.root_prefix
        )));
    }

    if let Some(endpoint) = &config.endpoint {
        Url::parse(endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;
    }

    Ok(())
}

/// Validates run budgets
fn validate_run_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.max_days_per_run < 1 {
        return Err(ConfigError::Validation(format!(
            "max-days-per-run must be >= 1, got {}",
            config.max_days_per_run
        )));
    }

    if config.max_runtime_minutes < 1 {
        return Err(ConfigError::Validation(format!(
            "max-runtime-minutes must be >= 1, got {}",
            config.max_runtime_minutes
        )));
    }

    Ok(())
}
