//! Dashboard: headline figures, recent activity and sales progress

use crate::api::ApiError;
use crate::context::AppContext;
use crate::hooks;
use crate::layout::Route;
use crate::models::{SalesDashboard, SalesStage, ScrapingStatus};
use crate::pages::view::ViewState;
use crate::pages::widgets::{heading, percent, render_failure, render_stats, Stat};
use crate::pages::Render;
use crate::query::{QueryObserver, Ticket};
use std::sync::Arc;

const NO_DATA: &str = "データがありません";
const RECENT_LIMIT: usize = 5;

/// Quick action links, in display order
pub const QUICK_ACTIONS: [(&str, Route); 3] = [
    ("データ収集開始", Route::Scraping),
    ("企業リスト", Route::Companies),
    ("データ出力", Route::Export),
];

#[derive(Debug, Clone, Copy)]
pub struct DashboardRequest {
    ticket: Ticket,
}

impl DashboardRequest {
    pub async fn fetch(
        &self,
        ctx: &AppContext,
    ) -> (
        Result<Arc<SalesDashboard>, ApiError>,
        Result<Arc<ScrapingStatus>, ApiError>,
    ) {
        tokio::join!(
            hooks::sales::sales_dashboard(ctx),
            hooks::scraping::scraping_status(ctx)
        )
    }
}

#[derive(Debug, Default)]
pub struct DashboardPage {
    observer: QueryObserver,
    view: ViewState<Arc<SalesDashboard>>,
    scraping: Option<Arc<ScrapingStatus>>,
}

impl DashboardPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewState<Arc<SalesDashboard>> {
        &self.view
    }

    pub fn begin_load(&mut self) -> DashboardRequest {
        self.view = ViewState::Loading;
        DashboardRequest {
            ticket: self.observer.issue(),
        }
    }

    /// The scraping status only feeds one figure, so its failure is tolerated
    pub fn settle(
        &mut self,
        request: &DashboardRequest,
        dashboard: Result<Arc<SalesDashboard>, ApiError>,
        scraping: Result<Arc<ScrapingStatus>, ApiError>,
    ) -> bool {
        if !self.observer.accepts(request.ticket) {
            return false;
        }
        self.view = ViewState::from_result(dashboard, None);
        self.scraping = scraping.ok();
        true
    }

    pub async fn load(&mut self, ctx: &AppContext) {
        let request = self.begin_load();
        let (dashboard, scraping) = request.fetch(ctx).await;
        self.settle(&request, dashboard, scraping);
    }

    /// Running scraping jobs; the API runs at most one
    pub fn active_scrapings(&self) -> u32 {
        match &self.scraping {
            Some(status) if status.status.is_running() => 1,
            _ => 0,
        }
    }

    pub fn stats(&self) -> Vec<Stat> {
        let Some(dashboard) = self.view.ready() else {
            return Vec::new();
        };
        vec![
            Stat::new("登録企業数", dashboard.total_companies.to_string()),
            Stat::new("実行中収集", self.active_scrapings().to_string()),
            Stat::new("成約件数", dashboard.count(SalesStage::Won).to_string()),
            Stat::new("成約率", percent(dashboard.conversion_rate)),
        ]
    }
}

impl Render for DashboardPage {
    fn route(&self) -> Route {
        Route::Dashboard
    }

    fn render(&self) -> String {
        let mut out = heading("ダッシュボード");

        let dashboard = match &self.view {
            ViewState::Loading => {
                out.push_str("  読み込み中...\n");
                return out;
            }
            ViewState::Failed(failure) => {
                out.push_str(&render_failure(failure));
                return out;
            }
            ViewState::Ready(dashboard) => dashboard,
        };

        out.push_str(&render_stats(&self.stats()));

        out.push_str(&heading("最近の活動"));
        if dashboard.recent_updates.is_empty() {
            out.push_str(&format!("  {}\n", NO_DATA));
        }
        for update in dashboard.recent_updates.iter().take(RECENT_LIMIT) {
            out.push_str(&format!(
                "  {} {} [{}]\n",
                update.updated_at.as_deref().unwrap_or("-"),
                update.company_name.as_deref().unwrap_or("-"),
                update.status.as_deref().unwrap_or("-"),
            ));
        }

        out.push_str(&heading("営業進捗"));
        if dashboard.total_companies == 0 {
            out.push_str(&format!("  {}\n", NO_DATA));
        } else {
            for stage in SalesStage::ALL {
                out.push_str(&format!("  {}: {}\n", stage.label(), dashboard.count(stage)));
            }
        }

        out.push_str(&heading("クイックアクション"));
        for (label, route) in QUICK_ACTIONS {
            out.push_str(&format!("  [{}] {}\n", label, route.path()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> Arc<SalesDashboard> {
        Arc::new(
            serde_json::from_str(
                r#"{"success":true,"message":"","total_companies":40,
                    "summary":{"未着手":20,"アプローチ中":10,"成約":4},
                    "recent_updates":[{"company_id":1,"company_name":"A社","status":"成約","updated_at":"2024-03-01"}],
                    "conversion_rate":10.0}"#,
            )
            .unwrap(),
        )
    }

    fn running() -> Arc<ScrapingStatus> {
        Arc::new(
            serde_json::from_str(r#"{"success":true,"message":"","status":"running","progress":10,"collected":1}"#)
                .unwrap(),
        )
    }

    #[test]
    fn test_stats() {
        let mut page = DashboardPage::new();
        let request = page.begin_load();
        page.settle(&request, Ok(dashboard()), Ok(running()));

        let stats = page.stats();
        assert_eq!(stats[0], Stat::new("登録企業数", "40"));
        assert_eq!(stats[1], Stat::new("実行中収集", "1"));
        assert_eq!(stats[2], Stat::new("成約件数", "4"));
        assert_eq!(stats[3], Stat::new("成約率", "10.0%"));
    }

    #[test]
    fn test_scraping_failure_is_tolerated() {
        let mut page = DashboardPage::new();
        let request = page.begin_load();
        page.settle(&request, Ok(dashboard()), Err(ApiError::Timeout));

        assert!(page.view().is_ready());
        assert_eq!(page.active_scrapings(), 0);
        let out = page.render();
        assert!(out.contains("A社"));
        assert!(out.contains("アプローチ中: 10"));
    }

    #[test]
    fn test_dashboard_failure() {
        let mut page = DashboardPage::new();
        let request = page.begin_load();
        page.settle(&request, Err(ApiError::from_status(500, "")), Ok(running()));

        assert!(page.render().contains("データの取得に失敗しました"));
        assert!(page.stats().is_empty());
    }
}
