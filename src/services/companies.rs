//! Company endpoints (`/api/companies`)

use crate::api::{ApiClient, ApiError};
use crate::models::company::{self, CompaniesList, Company, CompanyCreated, CompanyFilters};
use crate::models::{Ack, CompanyPatch, CompanyResponse, DuplicateReport, Pagination};

/// Lists companies matching `filters`, one page at a time
///
/// # Arguments
///
/// * `client` - The API client
/// * `filters` - Status/prefecture/industry/keyword filters; empty ones are not sent
/// * `pagination` - Page number and size
///
/// # Returns
///
/// * `Ok(CompaniesList)` - The requested page
/// * `Err(ApiError)` - Transport or HTTP failure
pub async fn list(
    client: &ApiClient,
    filters: &CompanyFilters,
    pagination: &Pagination,
) -> Result<CompaniesList, ApiError> {
    let query = company::list_query(filters, pagination);
    client.get_json("/api/companies", &query).await
}

/// Fetches one company; a missing id is `ApiError::NotFound`
pub async fn get(client: &ApiClient, id: i64) -> Result<CompanyResponse, ApiError> {
    client.get_json(&format!("/api/companies/{}", id), &[]).await
}

pub async fn create(client: &ApiClient, company: &Company) -> Result<CompanyCreated, ApiError> {
    client.post_json("/api/companies", company).await
}

/// Applies a partial update
pub async fn update(client: &ApiClient, id: i64, patch: &CompanyPatch) -> Result<Ack, ApiError> {
    client.put_json(&format!("/api/companies/{}", id), patch).await
}

pub async fn delete(client: &ApiClient, id: i64) -> Result<Ack, ApiError> {
    client.delete_json(&format!("/api/companies/{}", id)).await
}

pub async fn check_duplicate(client: &ApiClient, id: i64) -> Result<DuplicateReport, ApiError> {
    client
        .get_json(&format!("/api/companies/{}/duplicate-check", id), &[])
        .await
}
