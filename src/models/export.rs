//! Export filters and aggregate counts

use crate::models::envelope::{push_param, ResponseMeta};
use crate::models::sales::SalesStage;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

/// File format of a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Excel,
    Template,
}

impl ExportFormat {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Csv => "/api/export/csv",
            Self::Excel => "/api/export/excel",
            Self::Template => "/api/export/template",
        }
    }

    /// Default file name for a download made on `today`
    pub fn default_filename(&self, today: NaiveDate) -> String {
        match self {
            Self::Csv => format!("companies_{}.csv", today.format("%Y-%m-%d")),
            Self::Excel => format!("companies_{}.xlsx", today.format("%Y-%m-%d")),
            Self::Template => "companies_template.xlsx".to_string(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
            Self::Template => "テンプレート",
        }
    }
}

/// Query descriptor restricting which companies are exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFilters {
    pub status: Option<SalesStage>,
    pub prefecture: Option<String>,
    pub industry: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub include_sales_status: bool,
}

impl Default for ExportFilters {
    fn default() -> Self {
        Self {
            status: None,
            prefecture: None,
            industry: None,
            date_from: None,
            date_to: None,
            include_sales_status: true,
        }
    }
}

impl ExportFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        push_param(&mut query, "status", self.status.map(|s| s.label()));
        push_param(&mut query, "prefecture", self.prefecture.as_deref());
        push_param(&mut query, "industry", self.industry.as_deref());
        if let Some(date) = self.date_from {
            query.push(("date_from", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.date_to {
            query.push(("date_to", date.format("%Y-%m-%d").to_string()));
        }
        query.push(("include_sales_status", self.include_sales_status.to_string()));
        query
    }
}

/// `GET /api/export/stats`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportStats {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub total_companies: u64,
    /// Company count per sales stage label
    #[serde(default)]
    pub status_summary: BTreeMap<String, u64>,
    #[serde(default)]
    pub prefecture_summary: BTreeMap<String, u64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

impl ExportStats {
    /// Upper bound of the rows an export with `filters` would contain
    ///
    /// Starts from the total, narrows to the status count when a status is
    /// chosen, then to the prefecture count when that is smaller.
    pub fn estimated_count(&self, filters: &ExportFilters) -> u64 {
        let mut count = self.total_companies;

        if let Some(status) = filters.status {
            count = self.status_summary.get(status.label()).copied().unwrap_or(0);
        }

        if let Some(prefecture) = filters.prefecture.as_deref().filter(|p| !p.is_empty()) {
            let in_prefecture = self.prefecture_summary.get(prefecture).copied().unwrap_or(0);
            count = count.min(in_prefecture);
        }

        count
    }
}
