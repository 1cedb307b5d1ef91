//! Settings page: effective configuration plus API health and metadata

use crate::api::ApiError;
use crate::config::Config;
use crate::context::AppContext;
use crate::hooks;
use crate::layout::Route;
use crate::models::{ApiInfo, HealthCheck};
use crate::pages::view::ViewState;
use crate::pages::widgets::{heading, render_failure, Cell, Table};
use crate::pages::Render;
use crate::query::{QueryObserver, Ticket};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct SettingsRequest {
    ticket: Ticket,
}

impl SettingsRequest {
    pub async fn fetch(
        &self,
        ctx: &AppContext,
    ) -> (Result<Arc<HealthCheck>, ApiError>, Result<Arc<ApiInfo>, ApiError>) {
        tokio::join!(hooks::health::health(ctx), hooks::health::api_info(ctx))
    }
}

#[derive(Debug)]
pub struct SettingsPage {
    rows: Vec<(&'static str, String)>,
    observer: QueryObserver,
    health: ViewState<Arc<HealthCheck>>,
    info: Option<Arc<ApiInfo>>,
}

impl SettingsPage {
    pub fn new(config: &Config) -> Self {
        let rows = vec![
            ("APIエンドポイント", config.api.base_url.clone()),
            ("タイムアウト", format!("{}秒", config.api.timeout_secs)),
            ("再試行間隔", format!("{}ms", config.api.retry_delay_ms)),
            ("ポーリング間隔 (実行中)", format!("{}ms", config.polling.running_interval_ms)),
            ("ポーリング間隔 (待機中)", format!("{}ms", config.polling.idle_interval_ms)),
            ("セッション保存先", config.session.store_path.clone()),
            ("エクスポート保存先", config.export.output_dir.clone()),
        ];
        Self {
            rows,
            observer: QueryObserver::new(),
            health: ViewState::Loading,
            info: None,
        }
    }

    pub fn rows(&self) -> &[(&'static str, String)] {
        &self.rows
    }

    pub fn health(&self) -> &ViewState<Arc<HealthCheck>> {
        &self.health
    }

    pub fn info(&self) -> Option<&ApiInfo> {
        self.info.as_deref()
    }

    pub fn begin_load(&mut self) -> SettingsRequest {
        self.health = ViewState::Loading;
        SettingsRequest {
            ticket: self.observer.issue(),
        }
    }

    pub fn settle(
        &mut self,
        request: &SettingsRequest,
        health: Result<Arc<HealthCheck>, ApiError>,
        info: Result<Arc<ApiInfo>, ApiError>,
    ) -> bool {
        if !self.observer.accepts(request.ticket) {
            return false;
        }
        self.health = ViewState::from_result(health, None);
        self.info = info.ok();
        true
    }

    pub async fn load(&mut self, ctx: &AppContext) {
        let request = self.begin_load();
        let (health, info) = request.fetch(ctx).await;
        self.settle(&request, health, info);
    }
}

impl Render for SettingsPage {
    fn route(&self) -> Route {
        Route::Settings
    }

    fn render(&self) -> String {
        let mut out = heading("設定");
        for (label, value) in &self.rows {
            out.push_str(&format!("  {}: {}\n", label, value));
        }

        out.push_str(&heading("API状態"));
        match &self.health {
            ViewState::Loading => out.push_str("  読み込み中...\n"),
            ViewState::Failed(failure) => out.push_str(&render_failure(failure)),
            ViewState::Ready(health) => {
                out.push_str(&format!("  状態: {}\n", health.status));
                out.push_str(&format!("  バージョン: {}\n", health.version));
                if let Some(uptime) = health.uptime {
                    out.push_str(&format!("  稼働時間: {}秒\n", uptime.round() as u64));
                }
                out.push_str(&format!("  確認日時: {}\n", health.timestamp));
            }
        }

        if let Some(info) = &self.info {
            out.push_str(&heading("API情報"));
            out.push_str(&format!("  {} v{}\n", info.title, info.version));
            if !info.description.is_empty() {
                out.push_str(&format!("  {}\n", info.description));
            }
            if !info.endpoints.is_empty() {
                let mut table = Table::new(&["名前", "パス"]);
                for (name, path) in &info.endpoints {
                    table.push(vec![Cell::text(name), Cell::text(path)]);
                }
                out.push('\n');
                out.push_str(&table.render());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_reflect_config() {
        let page = SettingsPage::new(&Config::default());
        assert_eq!(page.rows()[0], ("APIエンドポイント", "http://localhost:8000".to_string()));
        assert_eq!(page.rows()[1].1, "30秒");
    }

    #[test]
    fn test_render_health_and_info() {
        let mut page = SettingsPage::new(&Config::default());
        let request = page.begin_load();
        let health: HealthCheck = serde_json::from_str(
            r#"{"status":"healthy","timestamp":"2024-03-01T00:00:00","version":"1.0.0","uptime":3600.4}"#,
        )
        .unwrap();
        let info: ApiInfo = serde_json::from_str(
            r#"{"title":"営業リストAPI","version":"1.0.0","endpoints":{"companies":"/api/companies"}}"#,
        )
        .unwrap();
        page.settle(&request, Ok(Arc::new(health)), Ok(Arc::new(info)));

        let out = page.render();
        assert!(out.contains("状態: healthy"));
        assert!(out.contains("稼働時間: 3600秒"));
        assert!(out.contains("営業リストAPI v1.0.0"));
        assert!(out.contains("/api/companies"));
    }

    #[test]
    fn test_health_failure() {
        let mut page = SettingsPage::new(&Config::default());
        let request = page.begin_load();
        page.settle(&request, Err(ApiError::Network("refused".into())), Err(ApiError::Timeout));

        assert!(page.render().contains("データの取得に失敗しました"));
        assert!(page.info().is_none());
    }
}
