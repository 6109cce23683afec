use crate::config::types::{
    ChemicalConfig, Config, DetailConfig, HarvestConfig, ListingConfig, OutputConfig,
    UpstreamConfig,
};
use crate::{ConfigError, ConfigResult};
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_upstream_config(&config.upstream)?;
    validate_listing_config(&config.listing)?;
    validate_detail_config(&config.detail)?;
    validate_chemical_config(&config.chemical)?;
    validate_harvest_config(&config.harvest)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates upstream endpoint configuration
fn validate_upstream_config(config: &UpstreamConfig) -> ConfigResult<()> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    for (name, path) in [
        ("listing-path", &config.listing_path),
        ("detail-path", &config.detail_path),
        ("chemical-path", &config.chemical_path),
    ] {
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "{} must start with '/', got '{}'",
                name, path
            )));
        }
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates listing configuration
fn validate_listing_config(config: &ListingConfig) -> ConfigResult<()> {
    if config.page_size < 1 {
        return Err(ConfigError::Validation(format!(
            "listing page-size must be >= 1, got {}",
            config.page_size
        )));
    }

    if config.max_stalled_pages < 1 || config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "listing max-stalled-pages and max-pages must be >= 1".to_string(),
        ));
    }

    for (name, field) in [
        ("items-field", &config.items_field),
        ("year-field", &config.year_field),
        ("query-field", &config.query_field),
        ("page-field", &config.page_field),
    ] {
        if field.is_empty() {
            return Err(ConfigError::Validation(format!(
                "listing {} cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

/// Validates detail page configuration
fn validate_detail_config(config: &DetailConfig) -> ConfigResult<()> {
    if config.identity_selectors.is_empty() {
        return Err(ConfigError::Validation(
            "identity-selectors must list at least one selector".to_string(),
        ));
    }

    for selector in config
        .identity_selectors
        .iter()
        .chain(std::iter::once(&config.title_selector))
    {
        validate_selector(selector)?;
    }

    if config.identity_labels.iter().all(|l| l.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "identity-labels must contain at least one label".to_string(),
        ));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    Ok(())
}

/// Validates chemical sub-list configuration
fn validate_chemical_config(config: &ChemicalConfig) -> ConfigResult<()> {
    if config.page_unit < 1 {
        return Err(ConfigError::Validation(format!(
            "chemical page-unit must be >= 1, got {}",
            config.page_unit
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "chemical max-pages must be >= 1".to_string(),
        ));
    }

    if config.rows_field.is_empty() {
        return Err(ConfigError::Validation(
            "chemical rows-field cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates harvest run defaults
fn validate_harvest_config(config: &HarvestConfig) -> ConfigResult<()> {
    if config.max_companies < 1 {
        return Err(ConfigError::Validation(
            "max-companies must be >= 1".to_string(),
        ));
    }
    validate_year(&config.year)
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Checks that a reporting year is four ASCII digits
pub fn validate_year(year: &str) -> ConfigResult<()> {
    if year.len() != 4 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(ConfigError::Validation(format!(
            "year must be four digits, got '{}'",
            year
        )));
    }
    Ok(())
}

/// Checks that a string parses as a CSS selector
fn validate_selector(selector: &str) -> ConfigResult<()> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(
            "selector cannot be empty".to_string(),
        ));
    }

    Selector::parse(selector)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
