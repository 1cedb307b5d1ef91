//! Configuration module for Lead-Desk
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use lead_desk::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("lead-desk.toml")).unwrap();
//! println!("Polling every {}ms while running", config.polling.running_interval_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, ExportConfig, PollingConfig, SessionConfig, BASE_URL_ENV, DEFAULT_BASE_URL,
};

// Re-export parser functions
pub use parser::{default_config, load_config, parse_config};
