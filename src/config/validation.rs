use crate::config::types::{Config, CrawlConfig, EndpointConfig, HttpConfig, SelectorConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawl_config(&config.crawl)?;
    validate_http_config(&config.http)?;
    validate_endpoints(&config.endpoints)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    if config.detail_concurrency < 1 || config.detail_concurrency > 32 {
        return Err(ConfigError::Validation(format!(
            "detail_concurrency must be between 1 and 32, got {}",
            config.detail_concurrency
        )));
    }

    Ok(())
}

/// Validates HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.page_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "page_retries must be <= 10, got {}",
            config.page_retries
        )));
    }

    Ok(())
}

/// Validates endpoint configuration
fn validate_endpoints(config: &EndpointConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.query().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must not carry a query string",
            config.base_url
        )));
    }

    Ok(())
}

/// Validates that no selector is blank
///
/// Syntax errors are reported when the extractors compile the selectors.
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let selectors = [
        ("snippet", &config.snippet),
        ("details", &config.details),
        ("title", &config.title),
        ("price", &config.price),
        ("developer", &config.developer),
        ("rating", &config.rating),
        ("metadata", &config.metadata),
    ];

    for (name, selector) in selectors {
        if selector.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "selector '{}' cannot be empty",
                name
            )));
        }
    }

    Ok(())
}
