//! Export page
//!
//! Filter form with an estimated row count, and the three downloads. Only
//! one export runs at a time; every export button is disabled until it
//! settles.

use crate::api::ApiError;
use crate::context::AppContext;
use crate::hooks;
use crate::layout::Route;
use crate::models::{ExportFilters, ExportFormat, ExportStats, SalesStage};
use crate::pages::view::ViewState;
use crate::pages::widgets::{heading, render_stats, Button, Stat};
use crate::pages::Render;
use crate::query::{QueryObserver, Ticket};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const STATS_FAILURE: &str = "統計情報の取得に失敗しました";

/// Download buttons in display order
pub const FORMATS: [(ExportFormat, &str); 3] = [
    (ExportFormat::Csv, "CSV形式"),
    (ExportFormat::Excel, "Excel形式"),
    (ExportFormat::Template, "テンプレート"),
];

/// One download, detached from the page
#[derive(Debug, Clone)]
pub struct ExportJob {
    format: ExportFormat,
    filters: ExportFilters,
    dir: PathBuf,
    filename: Option<String>,
}

impl ExportJob {
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub async fn run(&self, ctx: &AppContext) -> crate::Result<PathBuf> {
        hooks::export::download(
            ctx,
            self.format,
            &self.filters,
            &self.dir,
            self.filename.as_deref(),
        )
        .await
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StatsRequest {
    ticket: Ticket,
}

impl StatsRequest {
    pub async fn fetch(&self, ctx: &AppContext) -> Result<Arc<ExportStats>, ApiError> {
        hooks::export::export_stats(ctx).await
    }
}

#[derive(Debug)]
pub struct ExportPage {
    output_dir: PathBuf,
    observer: QueryObserver,
    stats: ViewState<Arc<ExportStats>>,
    filters: ExportFilters,
    exporting: Option<ExportFormat>,
    error: Option<&'static str>,
    last_file: Option<PathBuf>,
}

impl ExportPage {
    /// Creates the page; downloads are saved under `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            observer: QueryObserver::new(),
            stats: ViewState::Loading,
            filters: ExportFilters::default(),
            exporting: None,
            error: None,
            last_file: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn stats(&self) -> &ViewState<Arc<ExportStats>> {
        &self.stats
    }

    pub fn filters(&self) -> &ExportFilters {
        &self.filters
    }

    /// Filter values; None while an export runs
    pub fn filters_mut(&mut self) -> Option<&mut ExportFilters> {
        if self.exporting.is_some() {
            None
        } else {
            Some(&mut self.filters)
        }
    }

    pub fn set_status(&mut self, status: Option<SalesStage>) {
        self.filters.status = status;
    }

    pub fn set_prefecture(&mut self, prefecture: Option<String>) {
        self.filters.prefecture = prefecture;
    }

    pub fn set_industry(&mut self, industry: Option<String>) {
        self.filters.industry = industry;
    }

    pub fn set_date_range(&mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) {
        self.filters.date_from = from;
        self.filters.date_to = to;
    }

    pub fn set_include_sales_status(&mut self, include: bool) {
        self.filters.include_sales_status = include;
    }

    /// Restores the default filters
    pub fn reset(&mut self) {
        self.filters = ExportFilters::default();
    }

    pub fn is_exporting(&self) -> bool {
        self.exporting.is_some()
    }

    /// Inline message of the last failed export
    pub fn error(&self) -> Option<&str> {
        self.error
    }

    pub fn last_file(&self) -> Option<&Path> {
        self.last_file.as_deref()
    }

    /// Rows the current filters would export, once stats are loaded
    pub fn estimated_count(&self) -> Option<u64> {
        self.stats.ready().map(|s| s.estimated_count(&self.filters))
    }

    pub fn begin_load(&mut self) -> StatsRequest {
        self.stats = ViewState::Loading;
        StatsRequest {
            ticket: self.observer.issue(),
        }
    }

    pub fn settle(&mut self, request: &StatsRequest, result: Result<Arc<ExportStats>, ApiError>) -> bool {
        if !self.observer.accepts(request.ticket) {
            return false;
        }
        self.stats = ViewState::from_result(result, None);
        true
    }

    pub async fn load(&mut self, ctx: &AppContext) {
        let request = self.begin_load();
        let result = request.fetch(ctx).await;
        self.settle(&request, result);
    }

    /// Reserves the page for one download
    ///
    /// Returns None while another export is running.
    pub fn begin_export(&mut self, format: ExportFormat, filename: Option<&str>) -> Option<ExportJob> {
        if self.exporting.is_some() {
            return None;
        }
        self.exporting = Some(format);
        self.error = None;
        Some(ExportJob {
            format,
            filters: self.filters.clone(),
            dir: self.output_dir.clone(),
            filename: filename.map(String::from),
        })
    }

    /// Releases the page after a download; returns whether it succeeded
    pub fn finish_export(&mut self, job: &ExportJob, result: &crate::Result<PathBuf>) -> bool {
        self.exporting = None;
        match result {
            Ok(path) => {
                self.last_file = Some(path.clone());
                true
            }
            Err(crate::LeadDeskError::Api(e)) if e.is_fatal() => false,
            Err(e) => {
                tracing::debug!("{} export failed: {}", job.format.label(), e);
                self.error = Some(hooks::export::failure_message(job.format));
                false
            }
        }
    }

    /// Runs one download end to end
    pub async fn export(
        &mut self,
        ctx: &AppContext,
        format: ExportFormat,
        filename: Option<&str>,
    ) -> crate::Result<PathBuf> {
        let Some(job) = self.begin_export(format, filename) else {
            return Err(crate::LeadDeskError::Busy("export already running".into()));
        };
        let result = job.run(ctx).await;
        self.finish_export(&job, &result);
        result
    }

    /// One button per format; all disabled while any export runs
    pub fn buttons(&self) -> Vec<Button> {
        FORMATS
            .iter()
            .map(|(format, label)| {
                Button::new(label)
                    .disabled(self.exporting.is_some())
                    .loading(self.exporting == Some(*format))
            })
            .collect()
    }

    fn summary_stats(&self, stats: &ExportStats) -> Vec<Stat> {
        vec![
            Stat::new("登録企業数", stats.total_companies.to_string()),
            Stat::new("エクスポート対象", stats.estimated_count(&self.filters).to_string()),
            Stat::new(
                "アプローチ中",
                stats
                    .status_summary
                    .get(SalesStage::Approaching.label())
                    .copied()
                    .unwrap_or(0)
                    .to_string(),
            ),
            Stat::new("最終更新", stats.last_updated.clone().unwrap_or_else(|| "-".into())),
        ]
    }
}

impl Render for ExportPage {
    fn route(&self) -> Route {
        Route::Export
    }

    fn render(&self) -> String {
        let mut out = heading("データエクスポート");

        if self.exporting.is_some() {
            out.push_str("  エクスポート中...\n");
        }

        match &self.stats {
            ViewState::Loading => out.push_str("  読み込み中...\n"),
            ViewState::Failed(_) => out.push_str(&format!("!! {}\n", STATS_FAILURE)),
            ViewState::Ready(stats) => out.push_str(&render_stats(&self.summary_stats(stats))),
        }

        let filters = &self.filters;
        let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_else(|| "-".into());
        out.push_str(&heading("エクスポート設定"));
        out.push_str(&format!(
            "  営業ステータス: {}\n",
            filters.status.map(|s| s.label()).unwrap_or("-")
        ));
        out.push_str(&format!("  都道府県: {}\n", filters.prefecture.as_deref().unwrap_or("-")));
        out.push_str(&format!("  業界: {}\n", filters.industry.as_deref().unwrap_or("-")));
        out.push_str(&format!(
            "  作成日期間: {} 〜 {}\n",
            date(filters.date_from),
            date(filters.date_to)
        ));
        out.push_str(&format!(
            "  営業ステータスを含める: {}\n",
            if filters.include_sales_status { "はい" } else { "いいえ" }
        ));
        out.push_str(&format!(
            "  {}\n",
            Button::new("リセット").disabled(self.exporting.is_some()).render()
        ));

        out.push_str(&heading("エクスポート実行"));
        let buttons: Vec<String> = self.buttons().iter().map(Button::render).collect();
        out.push_str(&format!("  {}\n", buttons.join(" ")));
        if let Some(error) = self.error {
            out.push_str(&format!("  !! {}\n", error));
        }
        if let Some(path) = &self.last_file {
            out.push_str(&format!("  保存先: {}\n", path.display()));
        }

        if let Some(stats) = self.stats.ready().filter(|s| !s.status_summary.is_empty()) {
            out.push_str(&heading("ステータス別統計"));
            for (status, count) in &stats.status_summary {
                out.push_str(&format!("  {}: {}\n", status, count));
            }
        }
        out
    }
}
