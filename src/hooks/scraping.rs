//! Scraping job control, status polling, history and saved configuration

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::{Ack, SavedScrapingConfig, ScrapingConfig, ScrapingHistory, ScrapingStartResponse, ScrapingStatus};
use crate::query::{run_mutation, run_query, Mutation, PollOutcome, Poller, QueryKey, QueryPolicy};
use crate::services;
use serde_json::{Map, Value};
use std::sync::Arc;

const STATUS_POLICY: QueryPolicy = QueryPolicy::always();
const HISTORY_POLICY: QueryPolicy = QueryPolicy::minutes(2);
const CONFIG_POLICY: QueryPolicy = QueryPolicy::minutes(10);

const STATUS_FAILURE: &str = "スクレイピング状況の取得に失敗しました";

pub fn status_key() -> QueryKey {
    QueryKey::root("scraping-status")
}

/// Prefix of every history key
pub fn history_key() -> QueryKey {
    QueryKey::root("scraping-history")
}

pub fn config_key() -> QueryKey {
    QueryKey::root("scraping-config")
}

/// One status read; always hits the API
pub async fn scraping_status(ctx: &AppContext) -> Result<Arc<ScrapingStatus>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &status_key(),
        &STATUS_POLICY,
        STATUS_FAILURE,
        || services::scraping::status(client),
    )
    .await
}

/// Polls the job status in the background
///
/// The next poll comes after the context's fast interval while the last
/// status was `running`, and after the slow interval otherwise, failures
/// included. Dropping the returned poller stops polling.
pub fn watch_status(ctx: &AppContext) -> Poller<ScrapingStatus> {
    let client = ctx.client().clone();
    let cache = ctx.cache().clone();
    let notifier = ctx.notifier().clone();
    let cadence = ctx.cadence();

    Poller::spawn(
        move || {
            let client = client.clone();
            let cache = cache.clone();
            let notifier = notifier.clone();
            async move {
                run_query(
                    &cache,
                    &notifier,
                    &status_key(),
                    &STATUS_POLICY,
                    STATUS_FAILURE,
                    || services::scraping::status(&client),
                )
                .await
            }
        },
        move |outcome: &PollOutcome<ScrapingStatus>| {
            cadence.delay(matches!(outcome, Ok(status) if status.status.is_running()))
        },
    )
}

pub async fn scraping_history(
    ctx: &AppContext,
    limit: u32,
    offset: u32,
) -> Result<Arc<ScrapingHistory>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &history_key().with(limit).with(offset),
        &HISTORY_POLICY,
        "スクレイピング履歴の取得に失敗しました",
        || services::scraping::history(client, limit, offset),
    )
    .await
}

pub async fn scraping_config(ctx: &AppContext) -> Result<Arc<SavedScrapingConfig>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &config_key(),
        &CONFIG_POLICY,
        "スクレイピング設定の取得に失敗しました",
        || services::scraping::config(client),
    )
    .await
}

pub async fn start_scraping(
    ctx: &AppContext,
    config: &ScrapingConfig,
) -> Result<ScrapingStartResponse, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("スクレイピングを開始しました"),
            failure: "スクレイピングの開始に失敗しました",
            invalidates: vec![status_key()],
        },
        services::scraping::start(ctx.client(), config),
    )
    .await
}

pub async fn stop_scraping(ctx: &AppContext) -> Result<Ack, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("スクレイピングを停止しました"),
            failure: "スクレイピングの停止に失敗しました",
            invalidates: vec![status_key()],
        },
        services::scraping::stop(ctx.client()),
    )
    .await
}

pub async fn update_scraping_config(
    ctx: &AppContext,
    config: &Map<String, Value>,
) -> Result<Ack, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("スクレイピング設定を更新しました"),
            failure: "スクレイピング設定の更新に失敗しました",
            invalidates: vec![config_key()],
        },
        services::scraping::update_config(ctx.client(), config),
    )
    .await
}
