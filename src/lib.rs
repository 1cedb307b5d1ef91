//! Lead-Desk: a console for a sales-lead list
//!
//! This crate is the client side of a lead-management tool. It triggers remote
//! scraping jobs, reviews and edits the collected company records, tracks the
//! sales pipeline per company, and exports filtered lists, all through the
//! lead API. The layers are:
//!
//! - `api`: the configured HTTP client and its error taxonomy
//! - `services`: one async function per API endpoint
//! - `query` / `hooks`: cached, invalidating, notifying reads and mutations
//! - `pages`: headless view-models for every screen
//! - `layout`: routes, navigation and the text shell

pub mod api;
pub mod config;
pub mod context;
pub mod hooks;
pub mod layout;
pub mod models;
pub mod pages;
pub mod query;
pub mod services;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Main error type for Lead-Desk operations
#[derive(Debug, Error)]
pub enum LeadDeskError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] api::ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation in progress: {0}")]
    Busy(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Lead-Desk operations
pub type Result<T> = std::result::Result<T, LeadDeskError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, ErrorKind};
pub use config::Config;
pub use context::AppContext;
pub use layout::Route;
