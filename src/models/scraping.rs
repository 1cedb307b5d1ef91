//! Scraping job configuration, status and history

use crate::models::envelope::ResponseMeta;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Default target site category when none is chosen
pub const DEFAULT_TARGET_SITE: &str = "job_sites";

/// Default page limit per job
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Job parameters submitted to `POST /api/scraping/start`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapingConfig {
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_sites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            target_sites: vec![DEFAULT_TARGET_SITE.to_string()],
            max_pages: Some(DEFAULT_MAX_PAGES),
            prefecture: None,
            industry: None,
        }
    }
}

impl ScrapingConfig {
    /// Writes the edited keys onto a saved configuration object
    ///
    /// Keys this type does not model are kept as they are. A cleared
    /// optional key is written as `null` so the stored value is dropped.
    pub fn apply_to(&self, saved: &mut serde_json::Map<String, Value>) {
        let nullable = |v: Option<Value>| v.unwrap_or(Value::Null);
        saved.insert("keywords".into(), Value::from(self.keywords.clone()));
        saved.insert("target_sites".into(), Value::from(self.target_sites.clone()));
        saved.insert("max_pages".into(), nullable(self.max_pages.map(Value::from)));
        saved.insert("prefecture".into(), nullable(self.prefecture.clone().map(Value::from)));
        saved.insert("industry".into(), nullable(self.industry.clone().map(Value::from)));
    }
}

/// Outcome counters of a finished job
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrapingResult {
    #[serde(default)]
    pub collected: u64,
    #[serde(default)]
    pub errors: u64,
    #[serde(default)]
    pub skipped: u64,
    #[serde(default)]
    pub execution_time: Option<f64>,
    #[serde(default)]
    pub details: Option<Value>,
}

/// `POST /api/scraping/start`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrapingStartResponse {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub result: ScrapingResult,
}

/// Lifecycle phase of the process-wide scraping job
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ScrapingPhase {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
    /// A phase this client does not know about
    Other(String),
}

impl ScrapingPhase {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Other(s) => s,
        }
    }

    /// Localized label for the status card
    pub fn label(&self) -> &str {
        match self {
            Self::Idle => "待機中",
            Self::Running => "実行中",
            Self::Completed => "完了",
            Self::Error => "エラー",
            Self::Other(s) if s.is_empty() => "不明",
            Self::Other(s) => s,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<String> for ScrapingPhase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "idle" => Self::Idle,
            "running" => Self::Running,
            "completed" => Self::Completed,
            "error" => Self::Error,
            _ => Self::Other(value),
        }
    }
}

impl From<ScrapingPhase> for String {
    fn from(phase: ScrapingPhase) -> Self {
        phase.as_str().to_string()
    }
}

impl fmt::Display for ScrapingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /api/scraping/status`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrapingStatus {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub status: ScrapingPhase,
    /// Percentage, 0..=100
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub collected: u64,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub current_url: Option<String>,
    /// Seconds
    #[serde(default)]
    pub estimated_remaining: Option<u64>,
}

impl ScrapingStatus {
    /// `collected/total`, or just `collected` when the total is unknown
    pub fn collected_display(&self) -> String {
        match self.total {
            Some(total) if total > 0 => format!("{}/{}", self.collected, total),
            _ => self.collected.to_string(),
        }
    }

    pub fn progress_display(&self) -> String {
        format!("{}%", format_number(self.progress))
    }

    /// Whole minutes remaining, or `-` when unknown
    pub fn remaining_display(&self) -> String {
        match self.estimated_remaining {
            Some(secs) if secs > 0 => format!("{}分", secs / 60),
            _ => "-".to_string(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

/// One row of the job history
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrapingHistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub execution_date: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub collected_count: u64,
    #[serde(default)]
    pub success_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub status: String,
}

/// `GET /api/scraping/history`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrapingHistory {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub history: Vec<ScrapingHistoryEntry>,
    #[serde(default)]
    pub count: u64,
}

/// `GET /api/scraping/config`; the saved settings are an API-defined object
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SavedScrapingConfig {
    #[serde(flatten)]
    pub meta: ResponseMeta,
    #[serde(default)]
    pub config: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_clears_and_keeps_unmodelled_keys() {
        let mut saved: serde_json::Map<String, Value> = serde_json::from_str(
            r#"{"keywords":["IT"],"prefecture":"東京都","industry":"IT","interval":2}"#,
        )
        .unwrap();
        let edited = ScrapingConfig {
            keywords: vec!["SaaS".to_string()],
            prefecture: Some("大阪府".to_string()),
            ..Default::default()
        };
        edited.apply_to(&mut saved);

        assert_eq!(saved["keywords"], serde_json::json!(["SaaS"]));
        assert_eq!(saved["prefecture"], "大阪府");
        assert!(saved["industry"].is_null());
        assert_eq!(saved["interval"], 2);
        assert_eq!(saved["max_pages"], 10);
    }

    #[test]
    fn test_running_status_display() {
        let status: ScrapingStatus = serde_json::from_str(
            r#"{"success":true,"message":"","status":"running","progress":45,"collected":23,"total":50,"estimated_remaining":330}"#,
        )
        .unwrap();
        assert!(status.status.is_running());
        assert_eq!(status.progress_display(), "45%");
        assert_eq!(status.collected_display(), "23/50");
        assert_eq!(status.remaining_display(), "5分");
    }

    #[test]
    fn test_unknown_phase_is_kept() {
        let status: ScrapingStatus =
            serde_json::from_str(r#"{"status":"paused","progress":12.5,"collected":3}"#).unwrap();
        assert_eq!(status.status, ScrapingPhase::Other("paused".to_string()));
        assert_eq!(status.status.label(), "paused");
        assert_eq!(status.progress_display(), "12.5%");
        assert_eq!(status.collected_display(), "3");
        assert_eq!(status.remaining_display(), "-");
    }

    #[test]
    fn test_config_defaults() {
        let config = ScrapingConfig::default();
        assert_eq!(config.target_sites, vec!["job_sites".to_string()]);
        assert_eq!(config.max_pages, Some(10));
    }

    #[test]
    fn test_history_deserializes() {
        let history: ScrapingHistory = serde_json::from_str(
            r#"{"success":true,"message":"","history":[{"id":1,"execution_date":"2024-01-01T10:00:00",
                "keyword":"IT企業","collected_count":20,"success_count":18,"error_count":2,"status":"成功"}],"count":1}"#,
        )
        .unwrap();
        assert_eq!(history.history[0].error_count, 2);
        assert_eq!(history.count, 1);
    }
}
