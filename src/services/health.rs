//! Liveness and metadata endpoints

use crate::api::{ApiClient, ApiError};
use crate::models::{ApiInfo, HealthCheck};

pub async fn health(client: &ApiClient) -> Result<HealthCheck, ApiError> {
    client.get_json("/health", &[]).await
}

pub async fn info(client: &ApiClient) -> Result<ApiInfo, ApiError> {
    client.get_json("/api/info", &[]).await
}
