use serde::Deserialize;

/// Default API endpoint when neither the config file nor the environment sets one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable that overrides `api.base-url`
pub const BASE_URL_ENV: &str = "LEAD_DESK_API_URL";

/// Main configuration structure for Lead-Desk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Lead API connection settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the lead API (scheme, host, optional port)
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Per-request ceiling in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause before the single retry of a failed read (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

/// Session persistence settings
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Path to the SQLite file holding the local key/value store
    #[serde(rename = "store-path", default = "default_store_path")]
    pub store_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
        }
    }
}

/// Scraping-status polling cadence
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    /// Delay between polls while a job is running (milliseconds)
    #[serde(rename = "running-interval-ms", default = "default_running_interval")]
    pub running_interval_ms: u64,

    /// Delay between polls otherwise (milliseconds)
    #[serde(rename = "idle-interval-ms", default = "default_idle_interval")]
    pub idle_interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            running_interval_ms: default_running_interval(),
            idle_interval_ms: default_idle_interval(),
        }
    }
}

/// Export download settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Directory downloaded files are written to
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    1_000
}

fn default_store_path() -> String {
    "./lead-desk.db".to_string()
}

fn default_running_interval() -> u64 {
    3_000
}

fn default_idle_interval() -> u64 {
    30_000
}

fn default_output_dir() -> String {
    ".".to_string()
}
