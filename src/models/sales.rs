//! Sales pipeline status per company

use crate::models::envelope::{push_param, ResponseMeta};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Pipeline stage of a company
///
/// The API exchanges the localized label; English keys are accepted as input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SalesStage {
    Unstarted,
    Approaching,
    Negotiating,
    Won,
    Declined,
}

impl SalesStage {
    pub const ALL: [SalesStage; 5] = [
        Self::Unstarted,
        Self::Approaching,
        Self::Negotiating,
        Self::Won,
        Self::Declined,
    ];

    /// Localized label, also the wire value
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unstarted => "未着手",
            Self::Approaching => "アプローチ中",
            Self::Negotiating => "商談中",
            Self::Won => "成約",
            Self::Declined => "見送り",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Approaching => "approaching",
            Self::Negotiating => "negotiating",
            Self::Won => "won",
            Self::Declined => "declined",
        }
    }
}

impl fmt::Display for SalesStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SalesStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.label() == s || stage.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown sales status '{}'", s))
    }
}

impl TryFrom<String> for SalesStage {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SalesStage> for String {
    fn from(stage: SalesStage) -> Self {
        stage.label().to_string()
    }
}

/// Sales status of one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesStatus {
    pub company_id: i64,
    pub status: SalesStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Body of `PUT /api/sales/{company_id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesStatusUpdate {
    pub status: SalesStage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "optional_date")]
    pub last_contact_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_action: Option<String>,
}

/// `GET /api/sales/{company_id}` and each element of `GET /api/sales`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalesStatusResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub status: SalesStatus,
}

/// Filters for the status list
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SalesFilters {
    pub status: Option<SalesStage>,
    pub contact_person: Option<String>,
}

/// Offset window for the status list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SalesRange {
    pub limit: u32,
    pub offset: u32,
}

impl Default for SalesRange {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
        }
    }
}

impl SalesFilters {
    pub fn cache_segment(&self) -> String {
        format!(
            "status={}&contact_person={}",
            self.status.map(|s| s.label()).unwrap_or(""),
            self.contact_person.as_deref().unwrap_or("")
        )
    }
}

/// Query parameters for `GET /api/sales`
pub fn list_query(filters: &SalesFilters, range: &SalesRange) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    push_param(&mut query, "status", filters.status.map(|s| s.label()));
    push_param(&mut query, "contact_person", filters.contact_person.as_deref());
    if range.limit > 0 {
        query.push(("limit", range.limit.to_string()));
    }
    if range.offset > 0 {
        query.push(("offset", range.offset.to_string()));
    }
    query
}

/// `GET /api/sales/dashboard`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SalesDashboard {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    /// Company count per stage label
    #[serde(default)]
    pub summary: BTreeMap<String, u64>,
    #[serde(default)]
    pub total_companies: u64,
    #[serde(default)]
    pub recent_updates: Vec<RecentUpdate>,
    /// Percentage
    #[serde(default)]
    pub conversion_rate: f64,
}

impl SalesDashboard {
    pub fn count(&self, stage: SalesStage) -> u64 {
        self.summary.get(stage.label()).copied().unwrap_or(0)
    }
}

/// One entry of the dashboard's recent-activity timeline
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecentUpdate {
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Body of `POST /api/sales/{company_id}/follow-up`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FollowUpRequest {
    pub next_action: String,
    #[serde(skip_serializing_if = "Option::is_none", with = "optional_date")]
    pub follow_up_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// One scheduled follow-up
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FollowUp {
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub next_action: Option<String>,
    #[serde(default, alias = "follow_up_date")]
    pub scheduled_date: Option<String>,
}

/// `GET /api/sales/follow-ups/upcoming`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpcomingFollowUps {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub follow_ups: Vec<FollowUp>,
    #[serde(default)]
    pub count: u64,
}

/// Aggregation period of the conversion analytics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AnalyticsPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl AnalyticsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl FromStr for AnalyticsPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!("unknown period '{}'", other)),
        }
    }
}

/// Headline figures of the conversion analytics
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConversionSummary {
    /// Percentage
    #[serde(default)]
    pub conversion_rate: f64,
    #[serde(default)]
    pub total_approached: u64,
    #[serde(default)]
    pub total_converted: u64,
    /// Any further breakdown the API includes
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// `GET /api/sales/analytics/conversion`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConversionAnalytics {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub analytics: ConversionSummary,
    #[serde(default)]
    pub period: String,
}

mod optional_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }
}
