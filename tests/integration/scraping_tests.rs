//! Scraping control page against a mocked job

use crate::support::{ack, context};
use lead_desk::models::ScrapingPhase;
use lead_desk::pages::{Render, ScrapingPage};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn running_status() -> Value {
    json!({
        "success": true,
        "message": "",
        "status": "running",
        "progress": 45,
        "collected": 23,
        "total": 50,
        "current_url": "https://example.com/companies?page=3",
        "estimated_remaining": 300
    })
}

async fn mount_page_reads(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/scraping/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "history": [{
                "id": 1,
                "execution_date": "2024-03-01 10:00",
                "keyword": "IT企業",
                "collected_count": 40,
                "success_count": 38,
                "error_count": 2,
                "status": "completed"
            }],
            "count": 1
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "config": {"keywords": ["IT企業"], "max_pages": 5}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_running_job_shows_progress_and_stop() {
    let server = MockServer::start().await;
    mount_page_reads(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(running_status()))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = ScrapingPage::new();
    page.load(&ctx).await;

    assert!(page.is_running());
    assert_eq!(page.control().label, "収集停止");
    assert!(page.form_mut().is_none());

    let out = page.render();
    assert!(out.contains("45%"));
    assert!(out.contains("23/50"));
    assert!(out.contains("5分"));
    assert!(out.contains("IT企業"));
}

#[tokio::test]
async fn test_invalid_job_form_sends_nothing() {
    let server = MockServer::start().await;
    mount_page_reads(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "status": "idle"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/scraping/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = ScrapingPage::new();
    page.load(&ctx).await;

    assert_eq!(page.control().label, "収集開始");
    assert!(!page.start(&ctx).await);
    assert!(page.form_errors().contains_key("keywords"));
}

#[tokio::test]
async fn test_watch_follows_job_to_completion() {
    let server = MockServer::start().await;
    mount_page_reads(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(running_status()))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "status": "completed",
            "progress": 100,
            "collected": 50,
            "total": 50
        })))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = ScrapingPage::new();
    page.load(&ctx).await;
    assert!(page.is_running());

    page.mount(&ctx);
    assert!(page.is_polling());

    let finished = tokio::time::timeout(Duration::from_secs(5), async {
        while page.next_update().await {
            if !page.is_running() {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    assert!(finished);
    assert_eq!(
        page.status().ready().map(|s| s.status.clone()),
        Some(ScrapingPhase::Completed)
    );
    page.unmount();
    assert!(!page.is_polling());
}

#[tokio::test]
async fn test_failed_poll_keeps_last_status() {
    let server = MockServer::start().await;
    mount_page_reads(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(running_status()))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scraping/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = ScrapingPage::new();
    page.load(&ctx).await;

    page.refresh_status(&ctx).await;

    assert!(page.is_running());
    assert!(page.render().contains("23/50"));
    assert!(ctx.notifier().contains("スクレイピング状況の取得に失敗しました"));
}
