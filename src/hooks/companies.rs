//! Company reads and writes
//!
//! Lists and details are fresh for five minutes. Create and delete
//! invalidate the lists; update also invalidates the edited detail.

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::{
    Ack, CompaniesList, Company, CompanyCreated, CompanyFilters, CompanyPatch, CompanyResponse,
    DuplicateReport, Pagination,
};
use crate::query::{run_mutation, run_query, Mutation, QueryKey, QueryPolicy};
use crate::services;
use std::sync::Arc;

const POLICY: QueryPolicy = QueryPolicy::minutes(5);

/// Prefix of every company list key
pub fn companies_key() -> QueryKey {
    QueryKey::root("companies")
}

pub fn list_key(filters: &CompanyFilters, pagination: &Pagination) -> QueryKey {
    companies_key()
        .with("list")
        .with(filters.cache_segment())
        .with(format!("page={}&page_size={}", pagination.page, pagination.page_size))
}

pub fn detail_key(id: i64) -> QueryKey {
    QueryKey::root("company").with(id)
}

pub async fn companies(
    ctx: &AppContext,
    filters: &CompanyFilters,
    pagination: &Pagination,
) -> Result<Arc<CompaniesList>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &list_key(filters, pagination),
        &POLICY,
        "企業一覧の取得に失敗しました",
        || services::companies::list(client, filters, pagination),
    )
    .await
}

pub async fn company(ctx: &AppContext, id: i64) -> Result<Arc<CompanyResponse>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &detail_key(id),
        &POLICY,
        "企業詳細の取得に失敗しました",
        || services::companies::get(client, id),
    )
    .await
}

pub async fn create_company(ctx: &AppContext, company: &Company) -> Result<CompanyCreated, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("企業を登録しました"),
            failure: "企業の登録に失敗しました",
            invalidates: vec![companies_key()],
        },
        services::companies::create(ctx.client(), company),
    )
    .await
}

/// Updates a company; its detail and every list are invalidated
pub async fn update_company(
    ctx: &AppContext,
    id: i64,
    patch: &CompanyPatch,
) -> Result<Ack, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("企業情報を更新しました"),
            failure: "企業情報の更新に失敗しました",
            invalidates: vec![detail_key(id), companies_key()],
        },
        services::companies::update(ctx.client(), id, patch),
    )
    .await
}

pub async fn delete_company(ctx: &AppContext, id: i64) -> Result<Ack, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: Some("企業を削除しました"),
            failure: "企業の削除に失敗しました",
            invalidates: vec![companies_key()],
        },
        services::companies::delete(ctx.client(), id),
    )
    .await
}

/// On-demand duplicate check; not cached
pub async fn check_duplicate(ctx: &AppContext, id: i64) -> Result<DuplicateReport, ApiError> {
    run_mutation(
        ctx.cache(),
        ctx.notifier(),
        Mutation {
            success: None,
            failure: "重複チェックに失敗しました",
            invalidates: Vec::new(),
        },
        services::companies::check_duplicate(ctx.client(), id),
    )
    .await
}
