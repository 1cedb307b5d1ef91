//! Sales management page
//!
//! Combines the dashboard aggregate, the filtered status list, follow-ups
//! due in the next week and the monthly conversion analytics. The page is
//! in its error state when any of the first three fails; analytics are
//! optional.

use crate::api::ApiError;
use crate::context::AppContext;
use crate::hooks;
use crate::layout::Route;
use crate::models::{
    AnalyticsPeriod, ConversionAnalytics, SalesDashboard, SalesFilters, SalesRange, SalesStage,
    SalesStatusResponse, UpcomingFollowUps,
};
use crate::pages::form::{FollowUpForm, SalesStatusForm};
use crate::pages::modal::{ModalForm, ModalMode};
use crate::pages::view::ViewState;
use crate::pages::widgets::{heading, percent, render_failure, render_stats, Cell, Stat, Table};
use crate::pages::Render;
use crate::query::{QueryObserver, Ticket};
use std::sync::Arc;

/// Window of the upcoming follow-ups panel
pub const FOLLOW_UP_DAYS: u32 = 7;

pub const ANALYTICS_PERIOD: AnalyticsPeriod = AnalyticsPeriod::Monthly;

pub const STATUS_COLUMNS: [&str; 7] = [
    "企業ID",
    "ステータス",
    "担当者",
    "最終コンタクト日",
    "メモ",
    "次回アクション",
    "操作",
];

/// Everything the page shows once loaded
#[derive(Debug, Clone)]
pub struct SalesData {
    pub dashboard: Arc<SalesDashboard>,
    pub statuses: Arc<Vec<SalesStatusResponse>>,
    pub follow_ups: Arc<UpcomingFollowUps>,
    pub analytics: Option<Arc<ConversionAnalytics>>,
}

/// Results of one page fetch
pub struct SalesResults {
    pub dashboard: Result<Arc<SalesDashboard>, ApiError>,
    pub statuses: Result<Arc<Vec<SalesStatusResponse>>, ApiError>,
    pub follow_ups: Result<Arc<UpcomingFollowUps>, ApiError>,
    pub analytics: Result<Arc<ConversionAnalytics>, ApiError>,
}

impl SalesResults {
    fn combine(self) -> Result<SalesData, ApiError> {
        Ok(SalesData {
            dashboard: self.dashboard?,
            statuses: self.statuses?,
            follow_ups: self.follow_ups?,
            analytics: self.analytics.ok(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct SalesRequest {
    ticket: Ticket,
    filters: SalesFilters,
    range: SalesRange,
}

impl SalesRequest {
    pub fn filters(&self) -> &SalesFilters {
        &self.filters
    }

    pub async fn fetch(&self, ctx: &AppContext) -> SalesResults {
        let (dashboard, statuses, follow_ups, analytics) = tokio::join!(
            hooks::sales::sales_dashboard(ctx),
            hooks::sales::sales_statuses(ctx, &self.filters, &self.range),
            hooks::sales::upcoming_follow_ups(ctx, FOLLOW_UP_DAYS),
            hooks::sales::conversion_analytics(ctx, ANALYTICS_PERIOD)
        );
        SalesResults {
            dashboard,
            statuses,
            follow_ups,
            analytics,
        }
    }
}

#[derive(Debug, Default)]
pub struct SalesPage {
    filters: SalesFilters,
    range: SalesRange,
    observer: QueryObserver,
    view: ViewState<SalesData>,
    status_modal: ModalForm<SalesStatusForm>,
    follow_up_modal: ModalForm<FollowUpForm>,
}

impl SalesPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &SalesFilters {
        &self.filters
    }

    pub fn view(&self) -> &ViewState<SalesData> {
        &self.view
    }

    pub fn status_modal(&self) -> &ModalForm<SalesStatusForm> {
        &self.status_modal
    }

    pub fn status_modal_mut(&mut self) -> &mut ModalForm<SalesStatusForm> {
        &mut self.status_modal
    }

    pub fn follow_up_modal(&self) -> &ModalForm<FollowUpForm> {
        &self.follow_up_modal
    }

    pub fn follow_up_modal_mut(&mut self) -> &mut ModalForm<FollowUpForm> {
        &mut self.follow_up_modal
    }

    pub fn set_status_filter(&mut self, status: Option<SalesStage>) {
        self.filters.status = status;
        self.range.offset = 0;
    }

    pub fn set_contact_person(&mut self, contact_person: Option<String>) {
        self.filters.contact_person = contact_person;
        self.range.offset = 0;
    }

    pub fn set_range(&mut self, range: SalesRange) {
        self.range = range;
    }

    pub fn begin_load(&mut self) -> SalesRequest {
        self.view = ViewState::Loading;
        SalesRequest {
            ticket: self.observer.issue(),
            filters: self.filters.clone(),
            range: self.range,
        }
    }

    pub fn settle(&mut self, request: &SalesRequest, results: SalesResults) -> bool {
        if !self.observer.accepts(request.ticket) {
            return false;
        }
        self.view = ViewState::from_result(results.combine(), None);
        true
    }

    pub async fn load(&mut self, ctx: &AppContext) {
        let request = self.begin_load();
        let results = request.fetch(ctx).await;
        self.settle(&request, results);
    }

    pub fn stats(&self) -> Vec<Stat> {
        let Some(data) = self.view.ready() else {
            return Vec::new();
        };
        let dashboard = &data.dashboard;
        vec![
            Stat::new("総企業数", dashboard.total_companies.to_string()),
            Stat::new("未着手", dashboard.count(SalesStage::Unstarted).to_string()),
            Stat::new("アプローチ中", dashboard.count(SalesStage::Approaching).to_string()),
            Stat::new("商談中", dashboard.count(SalesStage::Negotiating).to_string()),
            Stat::new("成約", dashboard.count(SalesStage::Won).to_string()),
            Stat::new("成約率", percent(dashboard.conversion_rate)),
        ]
    }

    pub fn status_table(&self) -> Table {
        let mut table = Table::new(&STATUS_COLUMNS);
        let Some(data) = self.view.ready() else {
            return table;
        };
        for response in data.statuses.iter() {
            let status = &response.status;
            table.push(vec![
                Cell::link(
                    status.company_id.to_string(),
                    Route::CompanyDetail(status.company_id).path(),
                ),
                Cell::Tag(status.status.label().to_string()),
                Cell::optional(status.contact_person.as_deref()),
                Cell::optional(status.last_contact_date.as_deref()),
                Cell::optional(status.memo.as_deref()),
                Cell::optional(status.next_action.as_deref()),
                Cell::text("更新 / フォローアップ"),
            ]);
        }
        table
    }

    /// Opens the status editor for `company_id`, pre-filled from its row
    pub fn open_status(&mut self, company_id: i64) {
        let values = self
            .view
            .ready()
            .and_then(|data| {
                data.statuses
                    .iter()
                    .find(|r| r.status.company_id == company_id)
                    .map(|r| SalesStatusForm::from(&r.status))
            })
            .unwrap_or_default();
        self.status_modal.open_edit(company_id, values);
    }

    pub fn open_follow_up(&mut self, company_id: i64) {
        self.follow_up_modal.open_edit(company_id, FollowUpForm::default());
    }

    pub async fn submit_status(&mut self, ctx: &AppContext) -> bool {
        let Some((ModalMode::Edit(company_id), update)) = self.status_modal.begin_submit() else {
            return false;
        };
        let result = hooks::sales::update_sales_status(ctx, company_id, &update).await;
        self.status_modal.finish(&result, "営業ステータスの更新に失敗しました");
        if result.is_ok() {
            self.load(ctx).await;
        }
        result.is_ok()
    }

    pub async fn submit_follow_up(&mut self, ctx: &AppContext) -> bool {
        let Some((ModalMode::Edit(company_id), request)) = self.follow_up_modal.begin_submit() else {
            return false;
        };
        let result = hooks::sales::schedule_follow_up(ctx, company_id, &request).await;
        self.follow_up_modal.finish(&result, "フォローアップ予定の設定に失敗しました");
        if result.is_ok() {
            self.load(ctx).await;
        }
        result.is_ok()
    }

    fn render_panels(data: &SalesData, out: &mut String) {
        out.push_str(&heading("最近の更新"));
        if data.dashboard.recent_updates.is_empty() {
            out.push_str("  更新履歴がありません\n");
        }
        for update in &data.dashboard.recent_updates {
            out.push_str(&format!(
                "  {} {} [{}] {}\n",
                update.updated_at.as_deref().unwrap_or("-"),
                update.company_name.as_deref().unwrap_or("-"),
                update.status.as_deref().unwrap_or("-"),
                update.contact_person.as_deref().unwrap_or(""),
            ));
        }

        out.push_str(&heading("今後の予定"));
        if data.follow_ups.follow_ups.is_empty() {
            out.push_str("  予定がありません\n");
        }
        for follow_up in &data.follow_ups.follow_ups {
            out.push_str(&format!(
                "  {} {}: {}\n",
                follow_up.scheduled_date.as_deref().unwrap_or("-"),
                follow_up.company_name.as_deref().unwrap_or("-"),
                follow_up.next_action.as_deref().unwrap_or("-"),
            ));
        }

        if let Some(analytics) = &data.analytics {
            let summary = &analytics.analytics;
            out.push_str(&heading("成約率推移"));
            out.push_str(&render_stats(&[
                Stat::new("成約率", percent(summary.conversion_rate)),
                Stat::new("総アプローチ数", summary.total_approached.to_string()),
                Stat::new("成約数", summary.total_converted.to_string()),
            ]));
        }
    }

    fn render_modals(&self, out: &mut String) {
        let status = self.status_modal.values();
        out.push_str(&self.status_modal.render(
            "ステータス更新",
            &[
                (
                    "ステータス",
                    "status",
                    status.status.map(|s| s.label().to_string()).unwrap_or_default(),
                ),
                ("担当者", "contact_person", status.contact_person.clone()),
                ("最終コンタクト日", "last_contact_date", status.last_contact_date.clone()),
                ("次回アクション", "next_action", status.next_action.clone()),
                ("メモ", "memo", status.memo.clone()),
            ],
            "更新",
        ));

        let follow_up = self.follow_up_modal.values();
        out.push_str(&self.follow_up_modal.render(
            "フォローアップ予定",
            &[
                ("次回アクション", "next_action", follow_up.next_action.clone()),
                ("予定日", "follow_up_date", follow_up.follow_up_date.clone()),
                ("メモ", "memo", follow_up.memo.clone()),
            ],
            "設定",
        ));
    }
}

impl Render for SalesPage {
    fn route(&self) -> Route {
        Route::Sales
    }

    fn render(&self) -> String {
        let mut out = heading("営業管理");

        match &self.view {
            ViewState::Loading => out.push_str("  読み込み中...\n"),
            ViewState::Failed(failure) => out.push_str(&render_failure(failure)),
            ViewState::Ready(data) => {
                out.push_str(&render_stats(&self.stats()));
                Self::render_panels(data, &mut out);

                out.push_str(&heading("営業ステータス一覧"));
                out.push_str(&format!(
                    "  ステータス: {}  担当者: {}\n\n",
                    self.filters.status.map(|s| s.label()).unwrap_or("すべて"),
                    self.filters.contact_person.as_deref().unwrap_or("-"),
                ));
                let table = self.status_table();
                if table.is_empty() {
                    out.push_str("  データがありません\n");
                } else {
                    out.push_str(&table.render());
                }
            }
        }

        self.render_modals(&mut out);
        out
    }
}
