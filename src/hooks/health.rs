//! API health and metadata

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::{ApiInfo, HealthCheck};
use crate::query::{run_query, QueryKey, QueryPolicy};
use crate::services;
use std::sync::Arc;

pub async fn health(ctx: &AppContext) -> Result<Arc<HealthCheck>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &QueryKey::root("health"),
        &QueryPolicy::always(),
        "ヘルスチェックに失敗しました",
        || services::health::health(client),
    )
    .await
}

/// API metadata rarely changes; cached for 10 minutes
pub async fn api_info(ctx: &AppContext) -> Result<Arc<ApiInfo>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &QueryKey::root("api-info"),
        &QueryPolicy::minutes(10),
        "API情報の取得に失敗しました",
        || services::health::info(client),
    )
    .await
}
