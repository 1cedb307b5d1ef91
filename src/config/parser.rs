use crate::config::types::{Config, BASE_URL_ENV};
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// The `LEAD_DESK_API_URL` environment variable, when set and non-empty,
/// replaces `api.base-url` before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use lead_desk::config::load_config;
///
/// let config = load_config(Path::new("lead-desk.toml")).unwrap();
/// println!("API: {}", config.api.base_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content, std::env::var(BASE_URL_ENV).ok())?;
    Ok(config)
}

/// Builds the configuration used when no file is given
///
/// Defaults everywhere, with the environment override still honoured.
pub fn default_config() -> Result<Config, ConfigError> {
    let mut config = Config::default();
    apply_env_override(&mut config, std::env::var(BASE_URL_ENV).ok());
    validate(&config)?;
    Ok(config)
}

/// Parses configuration text, applies the base-URL override and validates
///
/// # Arguments
///
/// * `content` - TOML text
/// * `base_url_override` - Value of the environment override, if any
pub fn parse_config(content: &str, base_url_override: Option<String>) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;
    apply_env_override(&mut config, base_url_override);
    validate(&config)?;
    Ok(config)
}

fn apply_env_override(config: &mut Config, base_url_override: Option<String>) {
    if let Some(url) = base_url_override.filter(|u| !u.trim().is_empty()) {
        tracing::debug!("Using API base URL from {}: {}", BASE_URL_ENV, url);
        config.api.base_url = url.trim().to_string();
    }
}
