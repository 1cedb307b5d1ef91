use serde::Deserialize;
use std::collections::BTreeMap;

/// `GET /health`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HealthCheck {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub version: String,
    /// Seconds since the API started
    #[serde(default)]
    pub uptime: Option<f64>,
}

/// `GET /api/info`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
}
