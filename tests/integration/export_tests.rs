//! Export downloads and stats

use crate::support::{context, test_config};
use lead_desk::models::{ExportFormat, SalesStage};
use lead_desk::pages::{ExportPage, Render};
use lead_desk::storage::MemoryStore;
use lead_desk::AppContext;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_csv_export_writes_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/export/csv"))
        .and(query_param("status", "アプローチ中"))
        .and(query_param("include_sales_status", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes("id,company_name\n1,E2Eテスト企業\n"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let ctx = context(&server);
    let mut page = ExportPage::new(dir.path());
    page.set_status(Some(SalesStage::Approaching));

    let saved = page
        .export(&ctx, ExportFormat::Csv, Some("leads.csv"))
        .await
        .unwrap();

    assert_eq!(saved, dir.path().join("leads.csv"));
    let content = std::fs::read_to_string(&saved).unwrap();
    assert!(content.contains("E2Eテスト企業"));
    assert_eq!(page.last_file(), Some(saved.as_path()));
    assert!(ctx.notifier().contains("CSVファイルをダウンロードしました"));
}

#[tokio::test]
async fn test_oversized_export_reenables_buttons() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/export/csv"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({
            "success": false,
            "message": "Export too large"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let ctx = AppContext::new(test_config(&server), Box::new(MemoryStore::new())).unwrap();
    let mut page = ExportPage::new(dir.path());

    let result = page.export(&ctx, ExportFormat::Csv, None).await;

    assert!(result.is_err());
    assert!(!page.is_exporting());
    assert_eq!(page.error(), Some("エクスポートに失敗しました"));
    assert!(page.buttons().iter().all(|b| b.enabled));
    assert!(ctx.notifier().contains("エクスポートに失敗しました"));
    assert!(page.render().contains("!! エクスポートに失敗しました"));
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_stats_estimate_follow_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/export/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "total_companies": 120,
            "status_summary": {"未着手": 80, "アプローチ中": 30, "成約": 10},
            "prefecture_summary": {"東京都": 50},
            "last_updated": "2024-03-01T09:00:00"
        })))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = ExportPage::new(".");
    page.load(&ctx).await;

    assert_eq!(page.estimated_count(), Some(120));
    page.set_status(Some(SalesStage::Won));
    assert_eq!(page.estimated_count(), Some(10));
    assert!(page.render().contains("ステータス別統計"));
}
