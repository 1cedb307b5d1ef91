use crate::config::types::{ApiConfig, Config, ExportConfig, PollingConfig, SessionConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_session_config(&config.session)?;
    validate_polling_config(&config.polling)?;
    validate_export_config(&config.export)?;
    Ok(())
}

/// Validates API connection settings
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' has no host",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 300 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 300, got {}",
            config.timeout_secs
        )));
    }

    if config.retry_delay_ms > 60_000 {
        return Err(ConfigError::Validation(format!(
            "retry_delay_ms must be <= 60000ms, got {}ms",
            config.retry_delay_ms
        )));
    }

    Ok(())
}

fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.store_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "store_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates polling cadence
fn validate_polling_config(config: &PollingConfig) -> Result<(), ConfigError> {
    if config.running_interval_ms < 500 {
        return Err(ConfigError::Validation(format!(
            "running_interval_ms must be >= 500ms, got {}ms",
            config.running_interval_ms
        )));
    }

    // Polling must never be faster while idle than while running
    if config.running_interval_ms > config.idle_interval_ms {
        return Err(ConfigError::Validation(format!(
            "running_interval_ms ({}ms) cannot exceed idle_interval_ms ({}ms)",
            config.running_interval_ms, config.idle_interval_ms
        )));
    }

    Ok(())
}

fn validate_export_config(config: &ExportConfig) -> Result<(), ConfigError> {
    if config.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}
