use crate::config::types::{Config, CrawlSettings, CrawlerConfig, SearchConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_search_config(&config.search)?;
    validate_user_agent(config)?;

    if config.database.path.is_empty() {
        return Err(ConfigError::Validation(
            "database path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.default_max_pages < 1 || config.default_max_pages > 1000 {
        return Err(ConfigError::Validation(format!(
            "default-max-pages must be between 1 and 1000, got {}",
            config.default_max_pages
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 300, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_content_length < 1024 {
        return Err(ConfigError::Validation(format!(
            "max-content-length must be >= 1024 bytes, got {}",
            config.max_content_length
        )));
    }

    if config.max_links_per_page < 1 {
        return Err(ConfigError::Validation(
            "max-links-per-page must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates search configuration
fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.max_per_page < 1 || config.max_per_page > 100 {
        return Err(ConfigError::Validation(format!(
            "max-per-page must be between 1 and 100, got {}",
            config.max_per_page
        )));
    }

    if config.default_per_page < 1 || config.default_per_page > config.max_per_page {
        return Err(ConfigError::Validation(format!(
            "default-per-page must be between 1 and {}, got {}",
            config.max_per_page, config.default_per_page
        )));
    }

    if config.snippet_length < 50 {
        return Err(ConfigError::Validation(format!(
            "snippet-length must be >= 50, got {}",
            config.snippet_length
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent(config: &Config) -> Result<(), ConfigError> {
    let ua = &config.user_agent;

    if ua.name.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent name cannot be empty".to_string(),
        ));
    }

    if !ua.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
            ua.name
        )));
    }

    if let Some(url) = &ua.contact_url {
        Url::parse(url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;
    }

    Ok(())
}

/// Validates per-project crawl settings at the registration boundary
pub fn validate_crawl_settings(settings: &CrawlSettings) -> Result<(), ConfigError> {
    if settings.max_depth > 10 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be <= 10, got {}",
            settings.max_depth
        )));
    }

    if settings.crawl_delay.as_millis() > 60_000 {
        return Err(ConfigError::Validation(format!(
            "crawl-delay must be <= 60s, got {}ms",
            settings.crawl_delay.as_millis()
        )));
    }

    Ok(())
}

/// Validates a base domain entry for a project allow-list
pub fn validate_domain(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidDomain(
            "domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidDomain(format!(
            "domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidDomain(format!(
            "domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    Ok(())
}
