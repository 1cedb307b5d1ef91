//! Scraping page
//!
//! - Status cards fed by the background poller while mounted
//! - Job form with Start while idle and Stop while a job runs
//! - Run history (latest 10)
//! - Saved configuration editor

use crate::api::ApiError;
use crate::context::AppContext;
use crate::hooks;
use crate::layout::Route;
use crate::models::{SavedScrapingConfig, ScrapingHistory, ScrapingStatus};
use crate::pages::form::{FieldErrors, Form, ScrapingConfigForm};
use crate::pages::modal::ModalForm;
use crate::pages::view::{FailureView, ViewState};
use crate::pages::widgets::{heading, render_failure, render_stats, Button, Cell, EmptyState, Stat, Table};
use crate::pages::Render;
use crate::query::{PollOutcome, Poller, QueryObserver, Ticket};
use std::sync::Arc;

pub const HISTORY_LIMIT: u32 = 10;

pub const HISTORY_COLUMNS: [&str; 6] = ["実行日時", "キーワード", "収集件数", "成功件数", "エラー件数", "ステータス"];

pub const HISTORY_EMPTY: EmptyState = EmptyState {
    message: "実行履歴がありません",
    hint: None,
};

pub const START_LABEL: &str = "収集開始";
pub const STOP_LABEL: &str = "収集停止";

/// Target site categories with their labels
pub const TARGET_SITES: [(&str, &str); 3] = [
    ("job_sites", "求人サイト"),
    ("press_sites", "プレスリリースサイト"),
    ("company_sites", "企業サイト"),
];

type Outcome<T> = Result<Arc<T>, ApiError>;

#[derive(Debug, Clone, Copy)]
pub struct ScrapingRequest {
    ticket: Ticket,
}

impl ScrapingRequest {
    pub async fn fetch(
        &self,
        ctx: &AppContext,
    ) -> (
        Outcome<ScrapingStatus>,
        Outcome<ScrapingHistory>,
        Outcome<SavedScrapingConfig>,
    ) {
        tokio::join!(
            hooks::scraping::scraping_status(ctx),
            hooks::scraping::scraping_history(ctx, HISTORY_LIMIT, 0),
            hooks::scraping::scraping_config(ctx)
        )
    }
}

#[derive(Default)]
pub struct ScrapingPage {
    observer: QueryObserver,
    status: ViewState<Arc<ScrapingStatus>>,
    history: ViewState<Arc<ScrapingHistory>>,
    saved: Option<Arc<SavedScrapingConfig>>,
    form: ScrapingConfigForm,
    form_errors: FieldErrors,
    starting: bool,
    stopping: bool,
    config_modal: ModalForm<ScrapingConfigForm>,
    poller: Option<Poller<ScrapingStatus>>,
}

impl ScrapingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &ViewState<Arc<ScrapingStatus>> {
        &self.status
    }

    pub fn history(&self) -> &ViewState<Arc<ScrapingHistory>> {
        &self.history
    }

    pub fn saved_config(&self) -> Option<&SavedScrapingConfig> {
        self.saved.as_deref()
    }

    pub fn form(&self) -> &ScrapingConfigForm {
        &self.form
    }

    /// Job form values; None while a job runs (the form is disabled)
    pub fn form_mut(&mut self) -> Option<&mut ScrapingConfigForm> {
        if self.is_running() {
            None
        } else {
            Some(&mut self.form)
        }
    }

    pub fn form_errors(&self) -> &FieldErrors {
        &self.form_errors
    }

    pub fn config_modal(&self) -> &ModalForm<ScrapingConfigForm> {
        &self.config_modal
    }

    pub fn config_modal_mut(&mut self) -> &mut ModalForm<ScrapingConfigForm> {
        &mut self.config_modal
    }

    pub fn is_running(&self) -> bool {
        self.status
            .ready()
            .map(|s| s.status.is_running())
            .unwrap_or(false)
    }

    pub fn begin_load(&mut self) -> ScrapingRequest {
        self.status = ViewState::Loading;
        self.history = ViewState::Loading;
        ScrapingRequest {
            ticket: self.observer.issue(),
        }
    }

    pub fn settle(
        &mut self,
        request: &ScrapingRequest,
        status: Outcome<ScrapingStatus>,
        history: Outcome<ScrapingHistory>,
        config: Outcome<SavedScrapingConfig>,
    ) -> bool {
        if !self.observer.accepts(request.ticket) {
            return false;
        }
        self.status = ViewState::from_result(status, None);
        self.history = ViewState::from_result(history, None);
        self.saved = config.ok();
        true
    }

    pub async fn load(&mut self, ctx: &AppContext) {
        let request = self.begin_load();
        let (status, history, config) = request.fetch(ctx).await;
        self.settle(&request, status, history, config);
    }

    /// Starts background status polling; replaces any running poller
    pub fn mount(&mut self, ctx: &AppContext) {
        self.poller = Some(hooks::scraping::watch_status(ctx));
    }

    /// Stops polling
    pub fn unmount(&mut self) {
        if self.poller.take().is_some() {
            tracing::debug!("Scraping status polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().map(Poller::is_running).unwrap_or(false)
    }

    /// Applies one status outcome
    ///
    /// A failed poll keeps the last good status on screen; the failure has
    /// already been toasted.
    pub fn apply_status(&mut self, outcome: PollOutcome<ScrapingStatus>) {
        match outcome {
            Ok(status) => self.status = ViewState::Ready(status),
            Err(e) if e.is_fatal() => self.status = ViewState::Loading,
            Err(_) if self.status.is_ready() => {}
            Err(_) => self.status = ViewState::Failed(FailureView::fetch_failed()),
        }
    }

    /// Waits for the poller's next outcome and applies it
    ///
    /// Returns false when the page is not mounted or polling has stopped.
    pub async fn next_update(&mut self) -> bool {
        let outcome = match self.poller.as_mut() {
            Some(poller) => poller.next().await,
            None => return false,
        };
        match outcome {
            Some(outcome) => {
                self.apply_status(outcome);
                true
            }
            None => false,
        }
    }

    /// Re-reads the status once
    pub async fn refresh_status(&mut self, ctx: &AppContext) {
        let outcome = hooks::scraping::scraping_status(ctx).await;
        self.apply_status(outcome);
    }

    /// The Start or Stop control, whichever applies
    pub fn control(&self) -> Button {
        if self.is_running() {
            Button::new(STOP_LABEL).loading(self.stopping)
        } else {
            Button::new(START_LABEL)
                .loading(self.starting)
                .disabled(self.status.is_loading())
        }
    }

    /// Validates the job form and starts a job
    ///
    /// Nothing is sent while a job is running or when validation fails.
    pub async fn start(&mut self, ctx: &AppContext) -> bool {
        if self.is_running() || self.starting {
            return false;
        }
        let config = match self.form.validate() {
            Ok(config) => config,
            Err(errors) => {
                self.form_errors = errors;
                return false;
            }
        };
        self.form_errors.clear();

        self.starting = true;
        let result = hooks::scraping::start_scraping(ctx, &config).await;
        self.starting = false;

        if let Ok(response) = &result {
            tracing::info!(
                "Scraping started: {} collected, {} errors",
                response.result.collected,
                response.result.errors
            );
            self.refresh_status(ctx).await;
        }
        result.is_ok()
    }

    pub async fn stop(&mut self, ctx: &AppContext) -> bool {
        if !self.is_running() || self.stopping {
            return false;
        }

        self.stopping = true;
        let stopped = hooks::scraping::stop_scraping(ctx).await.is_ok();
        self.stopping = false;

        if stopped {
            self.refresh_status(ctx).await;
        }
        stopped
    }

    /// Opens the saved-configuration editor pre-filled from the last read
    pub fn open_config(&mut self) {
        let values = self
            .saved
            .as_ref()
            .map(|saved| ScrapingConfigForm::from_saved(&saved.config))
            .unwrap_or_default();
        self.config_modal.open_edit(0, values);
    }

    /// Saves the edited configuration
    ///
    /// Keys the form does not edit are sent back unchanged; cleared fields
    /// are sent as `null`.
    pub async fn save_config(&mut self, ctx: &AppContext) -> bool {
        let Some((_, config)) = self.config_modal.begin_submit() else {
            return false;
        };

        let mut merged = self
            .saved
            .as_ref()
            .map(|saved| saved.config.clone())
            .unwrap_or_default();
        config.apply_to(&mut merged);

        let result = hooks::scraping::update_scraping_config(ctx, &merged).await;
        self.config_modal.finish(&result, "スクレイピング設定の更新に失敗しました");
        if result.is_ok() {
            self.saved = hooks::scraping::scraping_config(ctx).await.ok();
        }
        result.is_ok()
    }

    pub fn status_stats(&self) -> Vec<Stat> {
        let status = self.status.ready();
        let phase = match status {
            Some(s) => s.status.label().to_string(),
            None => "不明".to_string(),
        };
        vec![
            Stat::new("実行状況", phase),
            Stat::new(
                "収集済み",
                status.map(|s| s.collected_display()).unwrap_or_else(|| "0".into()),
            ),
            Stat::new(
                "進捗",
                status.map(|s| s.progress_display()).unwrap_or_else(|| "0%".into()),
            ),
            Stat::new(
                "残り時間",
                status.map(|s| s.remaining_display()).unwrap_or_else(|| "-".into()),
            ),
        ]
    }

    pub fn history_table(&self) -> Table {
        let mut table = Table::new(&HISTORY_COLUMNS);
        if let Some(history) = self.history.ready() {
            for entry in &history.history {
                let status = if entry.status.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Tag(entry.status.clone())
                };
                table.push(vec![
                    Cell::text(&entry.execution_date),
                    Cell::text(&entry.keyword),
                    Cell::text(entry.collected_count.to_string()),
                    Cell::text(entry.success_count.to_string()),
                    Cell::text(entry.error_count.to_string()),
                    status,
                ]);
            }
        }
        table
    }

    fn render_form(&self, out: &mut String) {
        let disabled = if self.is_running() { " (実行中は編集できません)" } else { "" };
        let sites: Vec<&str> = self
            .form
            .target_sites
            .iter()
            .map(|site| {
                TARGET_SITES
                    .iter()
                    .find(|(key, _)| *key == site.as_str())
                    .map(|(_, label)| *label)
                    .unwrap_or(site.as_str())
            })
            .collect();

        out.push_str(&heading("収集設定"));
        if !disabled.is_empty() {
            out.push_str(&format!("  {}\n", disabled.trim()));
        }
        let fields = [
            ("検索キーワード", "keywords", self.form.keywords.clone()),
            ("対象都道府県", "prefecture", self.form.prefecture.clone()),
            ("対象業界", "industry", self.form.industry.clone()),
            ("最大ページ数", "max_pages", self.form.max_pages.clone()),
            ("対象サイト", "target_sites", sites.join(", ")),
        ];
        for (label, name, value) in fields {
            out.push_str(&format!("  {}: {}\n", label, value));
            if let Some(message) = self.form_errors.get(name) {
                out.push_str(&format!("    ! {}\n", message));
            }
        }
        out.push_str(&format!(
            "  {} {} {}\n",
            self.control().render(),
            Button::new("更新").render(),
            Button::new("詳細設定").render()
        ));
    }
}

impl std::fmt::Debug for ScrapingPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrapingPage")
            .field("status", &self.status)
            .field("polling", &self.is_polling())
            .finish()
    }
}

impl Render for ScrapingPage {
    fn route(&self) -> Route {
        Route::Scraping
    }

    fn render(&self) -> String {
        let mut out = heading("データ収集");

        match &self.status {
            ViewState::Failed(failure) => out.push_str(&render_failure(failure)),
            _ => out.push_str(&render_stats(&self.status_stats())),
        }

        if let Some(status) = self.status.ready().filter(|s| s.status.is_running()) {
            out.push_str(&format!("\n  進捗状況 {}\n", status.progress_display()));
            if let Some(url) = status.current_url.as_deref().filter(|u| !u.is_empty()) {
                out.push_str(&format!("  処理中: {}\n", url));
            }
        }

        self.render_form(&mut out);

        out.push_str(&heading("実行履歴"));
        match &self.history {
            ViewState::Loading => out.push_str("  読み込み中...\n"),
            ViewState::Failed(failure) => out.push_str(&render_failure(failure)),
            ViewState::Ready(history) if history.history.is_empty() => {
                out.push_str(&HISTORY_EMPTY.render());
            }
            ViewState::Ready(_) => out.push_str(&self.history_table().render()),
        }

        let values = self.config_modal.values();
        out.push_str(&self.config_modal.render(
            "詳細設定",
            &[
                ("検索キーワード", "keywords", values.keywords.clone()),
                ("対象都道府県", "prefecture", values.prefecture.clone()),
                ("対象業界", "industry", values.industry.clone()),
                ("最大ページ数", "max_pages", values.max_pages.clone()),
                ("対象サイト", "target_sites", values.target_sites.join(", ")),
            ],
            "設定保存",
        ));
        out
    }
}
