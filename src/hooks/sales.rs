//! Sales status reads and writes
//!
//! A status update invalidates the company's status, every status list and
//! the dashboard. A follow-up invalidates the status and the follow-ups.

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::{
    Ack, AnalyticsPeriod, ConversionAnalytics, FollowUpRequest, SalesDashboard, SalesFilters,
    SalesRange, SalesStatusResponse, SalesStatusUpdate, UpcomingFollowUps,
};
use crate::query::{run_mutation, run_query, Mutation, QueryKey, QueryPolicy};
use crate::services;
use std::sync::Arc;

const STATUS_POLICY: QueryPolicy = QueryPolicy::minutes(5);
const DASHBOARD_POLICY: QueryPolicy = QueryPolicy::minutes(2);
const FOLLOW_UP_POLICY: QueryPolicy = QueryPolicy::minutes(5);
const ANALYTICS_POLICY: QueryPolicy = QueryPolicy::minutes(10);

pub fn status_key(company_id: i64) -> QueryKey {
    QueryKey::root("sales-status").with(company_id)
}

/// Prefix of every status list key
pub fn statuses_key() -> QueryKey {
    QueryKey::root("sales-statuses")
}

pub fn dashboard_key() -> QueryKey {
    QueryKey::root("sales-dashboard")
}

/// Prefix of every upcoming follow-ups key
pub fn follow_ups_key() -> QueryKey {
    QueryKey::root("upcoming-follow-ups")
}

pub fn analytics_key(period: AnalyticsPeriod) -> QueryKey {
    QueryKey::root("conversion-analytics").with(period.as_str())
}

pub async fn sales_status(
    ctx: &AppContext,
    company_id: i64,
) -> Result<Arc<SalesStatusResponse>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &status_key(company_id),
        &STATUS_POLICY,
        "営業ステータスの取得に失敗しました",
        || services::sales::status(client, company_id),
    )
    .await
}

pub async fn sales_statuses(
    ctx: &AppContext,
    filters: &SalesFilters,
    range: &SalesRange,
) -> Result<Arc<Vec<SalesStatusResponse>>, ApiError> {
    let client = ctx.client();
    let key = statuses_key()
        .with(filters.cache_segment())
        .with(format!("limit={}&offset={}", range.limit, range.offset));
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &key,
        &STATUS_POLICY,
        "営業ステータス一覧の取得に失敗しました",
        || services::sales::list(client, filters, range),
    )
    .await
}

pub async fn sales_dashboard(ctx: &AppContext) -> Result<Arc<SalesDashboard>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &dashboard_key(),
        &DASHBOARD_POLICY,
        "営業ダッシュボードの取得に失敗しました",
        || services::sales::dashboard(client),
    )
    .await
}

pub async fn upcoming_follow_ups(
    ctx: &AppContext,
    days: u32,
) -> Result<Arc<UpcomingFollowUps>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &follow_ups_key().with(days),
        &FOLLOW_UP_POLICY,
        "フォローアップ予定の取得に失敗しました",
        || services::sales::upcoming_follow_ups(client, days),
    )
    .await
}

pub async fn conversion_analytics(
    ctx: &AppContext,
    period: AnalyticsPeriod,
) -> Result<Arc<ConversionAnalytics>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &analytics_key(period),
        &ANALYTICS_POLICY,
        "成約率分析の取得に失敗しました",
        || services::sales::conversion_analytics(client, period),
    )
    .await
}

/// Updates a status; the company's status, every status list and the
/// dashboard aggregate are invalidated
pub async fn update_sales_status(
    ctx: &AppContext,
    company_id: i64,
    update: &SalesStatusUpdate,
) -> Result<Ack, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("営業ステータスを更新しました"),
            failure: "営業ステータスの更新に失敗しました",
            invalidates: vec![status_key(company_id), statuses_key(), dashboard_key()],
        },
        services::sales::update_status(ctx.client(), company_id, update),
    )
    .await
}

pub async fn schedule_follow_up(
    ctx: &AppContext,
    company_id: i64,
    request: &FollowUpRequest,
) -> Result<Ack, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("フォローアップ予定を設定しました"),
            failure: "フォローアップ予定の設定に失敗しました",
            invalidates: vec![status_key(company_id), follow_ups_key()],
        },
        services::sales::schedule_follow_up(ctx.client(), company_id, request),
    )
    .await
}
