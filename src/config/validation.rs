use crate::config::types::{
    Config, CrawlerConfig, FilterConfig, OutputConfig, ScheduleConfig, SeedsConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_filter_config(&config.filter)?;
    validate_seeds_config(&config.seeds)?;
    validate_schedule_config(&config.schedule)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.concurrency_limit < 1 || config.concurrency_limit > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 100, got {}",
            config.concurrency_limit
        )));
    }

    if !config.fetch_timeout_seconds.is_finite() || config.fetch_timeout_seconds <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_seconds must be > 0, got {}",
            config.fetch_timeout_seconds
        )));
    }

    Ok(())
}

/// Validates the admission filter configuration
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "at least one keyword is required".to_string(),
        ));
    }

    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "keywords cannot be empty strings".to_string(),
        ));
    }

    if config.required_domain_substring.trim().is_empty() {
        return Err(ConfigError::Validation(
            "required_domain_substring cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that exactly one seed source is configured
fn validate_seeds_config(config: &SeedsConfig) -> Result<(), ConfigError> {
    let sources = [
        config.sitemap.is_some(),
        config.url_file.is_some(),
        !config.urls.is_empty(),
    ]
    .iter()
    .filter(|set| **set)
    .count();

    if sources != 1 {
        return Err(ConfigError::Validation(format!(
            "exactly one of seeds.sitemap, seeds.url-file or seeds.urls must be set, got {}",
            sources
        )));
    }

    for seed in &config.urls {
        validate_http_url(seed, "seed URL")?;
    }

    if let Some(sitemap) = &config.sitemap {
        if sitemap.trim().is_empty() {
            return Err(ConfigError::Validation(
                "seeds.sitemap cannot be empty".to_string(),
            ));
        }
        if sitemap.starts_with("http://") || sitemap.starts_with("https://") {
            validate_http_url(sitemap, "sitemap URL")?;
        }
    }

    Ok(())
}

/// Validates recrawl scheduling configuration
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    if !config.recrawl_interval_seconds.is_finite() || config.recrawl_interval_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "recrawl_interval_seconds must be >= 0, got {}",
            config.recrawl_interval_seconds
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.text_directory, Some(dir) if dir.is_empty()) {
        return Err(ConfigError::Validation(
            "text_directory cannot be empty when set".to_string(),
        ));
    }

    if matches!(&config.json_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "json_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates an absolute http(s) URL
fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            what, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
