//! Scraping job endpoints (`/api/scraping`)

use crate::api::{ApiClient, ApiError};
use crate::models::{Ack, SavedScrapingConfig, ScrapingConfig, ScrapingHistory, ScrapingStartResponse, ScrapingStatus};
use serde_json::{Map, Value};

/// Starts a job with `config`
pub async fn start(
    client: &ApiClient,
    config: &ScrapingConfig,
) -> Result<ScrapingStartResponse, ApiError> {
    client.post_json("/api/scraping/start", config).await
}

/// Current state of the process-wide job
pub async fn status(client: &ApiClient) -> Result<ScrapingStatus, ApiError> {
    client.get_json("/api/scraping/status", &[]).await
}

pub async fn stop(client: &ApiClient) -> Result<Ack, ApiError> {
    client.post_empty("/api/scraping/stop").await
}

/// Job history, newest first
///
/// Both paging parameters are always sent.
pub async fn history(client: &ApiClient, limit: u32, offset: u32) -> Result<ScrapingHistory, ApiError> {
    let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
    client.get_json("/api/scraping/history", &query).await
}

pub async fn config(client: &ApiClient) -> Result<SavedScrapingConfig, ApiError> {
    client.get_json("/api/scraping/config", &[]).await
}

/// Replaces the saved configuration
pub async fn update_config(client: &ApiClient, config: &Map<String, Value>) -> Result<Ack, ApiError> {
    client.put_json("/api/scraping/config", config).await
}
