//! Sales pipeline endpoints (`/api/sales`)

use crate::api::{ApiClient, ApiError};
use crate::models::sales::{self, SalesFilters, SalesRange};
use crate::models::{
    Ack, AnalyticsPeriod, ConversionAnalytics, FollowUpRequest, SalesDashboard,
    SalesStatusResponse, SalesStatusUpdate, UpcomingFollowUps,
};

pub async fn status(client: &ApiClient, company_id: i64) -> Result<SalesStatusResponse, ApiError> {
    client.get_json(&format!("/api/sales/{}", company_id), &[]).await
}

pub async fn update_status(
    client: &ApiClient,
    company_id: i64,
    update: &SalesStatusUpdate,
) -> Result<Ack, ApiError> {
    client.put_json(&format!("/api/sales/{}", company_id), update).await
}

/// Lists statuses across companies
///
/// The endpoint answers with a bare array of status envelopes.
pub async fn list(
    client: &ApiClient,
    filters: &SalesFilters,
    range: &SalesRange,
) -> Result<Vec<SalesStatusResponse>, ApiError> {
    let query = sales::list_query(filters, range);
    client.get_json("/api/sales", &query).await
}

/// Per-stage counts and the conversion rate
pub async fn dashboard(client: &ApiClient) -> Result<SalesDashboard, ApiError> {
    client.get_json("/api/sales/dashboard", &[]).await
}

pub async fn schedule_follow_up(
    client: &ApiClient,
    company_id: i64,
    request: &FollowUpRequest,
) -> Result<Ack, ApiError> {
    client
        .post_json(&format!("/api/sales/{}/follow-up", company_id), request)
        .await
}

/// Follow-ups due within the next `days` days
pub async fn upcoming_follow_ups(client: &ApiClient, days: u32) -> Result<UpcomingFollowUps, ApiError> {
    let query = [("days", days.to_string())];
    client.get_json("/api/sales/follow-ups/upcoming", &query).await
}

pub async fn conversion_analytics(
    client: &ApiClient,
    period: AnalyticsPeriod,
) -> Result<ConversionAnalytics, ApiError> {
    let query = [("period", period.as_str().to_string())];
    client.get_json("/api/sales/analytics/conversion", &query).await
}
