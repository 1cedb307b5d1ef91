//! Company records and list queries

use crate::models::envelope::{push_param, ResponseMeta};
use crate::models::sales::SalesStage;
use serde::{Deserialize, Serialize};

/// A company record as stored by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub company_name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Partial company update
///
/// Each optional field is tri-state: `None` leaves the stored value alone,
/// `Some(None)` sends `null` to clear it, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_detail: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tel: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_content: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub established_date: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<Option<String>>,
}

impl CompanyPatch {
    /// True when the patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch for an edit of `original`
    ///
    /// Every field the edit form covers is sent, so a blanked field is
    /// cleared. Fields the form never shows are carried over from
    /// `original` unchanged.
    pub fn edit(original: Option<&Company>, edited: Company) -> Self {
        let carried = |value: Option<&Option<String>>| value.cloned().flatten().map(Some);
        Self {
            address_detail: carried(original.map(|c| &c.address_detail)),
            source_url: carried(original.map(|c| &c.source_url)),
            ..Self::from(edited)
        }
    }
}

impl From<Company> for CompanyPatch {
    /// A full replacement of the editable fields
    fn from(company: Company) -> Self {
        let present = |v: Option<String>| v.map(Some);
        Self {
            company_name: Some(company.company_name),
            url: Some(company.url),
            address: Some(company.address),
            postal_code: Some(company.postal_code),
            prefecture: Some(company.prefecture),
            city: Some(company.city),
            address_detail: present(company.address_detail),
            tel: Some(company.tel),
            fax: Some(company.fax),
            representative: Some(company.representative),
            business_content: Some(company.business_content),
            established_date: Some(company.established_date),
            capital: Some(company.capital),
            contact_url: Some(company.contact_url),
            source_url: present(company.source_url),
        }
    }
}

/// Filters for the company list
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CompanyFilters {
    pub status: Option<SalesStage>,
    pub prefecture: Option<String>,
    pub industry: Option<String>,
    pub keyword: Option<String>,
}

/// Page selection for the company list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 100,
        }
    }
}

impl CompanyFilters {
    /// Stable representation used in cache keys
    pub fn cache_segment(&self) -> String {
        format!(
            "status={}&prefecture={}&industry={}&keyword={}",
            self.status.map(|s| s.label()).unwrap_or(""),
            self.prefecture.as_deref().unwrap_or(""),
            self.industry.as_deref().unwrap_or(""),
            self.keyword.as_deref().unwrap_or("")
        )
    }
}

/// Query parameters for `GET /api/companies`
pub fn list_query(filters: &CompanyFilters, pagination: &Pagination) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if pagination.page > 0 {
        query.push(("page", pagination.page.to_string()));
    }
    if pagination.page_size > 0 {
        query.push(("page_size", pagination.page_size.to_string()));
    }
    push_param(&mut query, "status", filters.status.map(|s| s.label()));
    push_param(&mut query, "prefecture", filters.prefecture.as_deref());
    push_param(&mut query, "industry", filters.industry.as_deref());
    push_param(&mut query, "keyword", filters.keyword.as_deref());
    query
}

/// `GET /api/companies`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CompaniesList {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub companies: Vec<Company>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub has_next: bool,
}

/// `GET /api/companies/{id}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompanyResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub company: Company,
}

/// `POST /api/companies`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CompanyCreated {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    pub company_id: i64,
}

/// `GET /api/companies/{id}/duplicate-check`; the report shape is API-defined
pub type DuplicateReport = serde_json::Value;
