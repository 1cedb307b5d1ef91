//! Sales pipeline flows and invalidation

use crate::support::{ack, context};
use lead_desk::hooks;
use lead_desk::models::{SalesFilters, SalesRange, SalesStage, SalesStatusUpdate};
use lead_desk::pages::{CompanyDetailPage, Render, SalesPage};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn status_body(company_id: i64, stage: &str) -> Value {
    json!({
        "success": true,
        "message": "",
        "status": {
            "company_id": company_id,
            "status": stage,
            "contact_person": "佐藤",
            "last_contact_date": "2024-03-01T10:00:00",
            "next_action": "資料送付"
        }
    })
}

fn dashboard_body() -> Value {
    json!({
        "success": true,
        "message": "",
        "summary": {"未着手": 5, "アプローチ中": 3, "商談中": 1, "成約": 1},
        "total_companies": 10,
        "recent_updates": [],
        "conversion_rate": 10.0
    })
}

async fn mount_get(server: &MockServer, route: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_status_update_invalidates_related_reads() {
    let server = MockServer::start().await;
    mount_get(&server, "/api/sales/1", status_body(1, "アプローチ中"), 2).await;
    mount_get(&server, "/api/sales", json!([status_body(1, "アプローチ中")]), 2).await;
    mount_get(&server, "/api/sales/dashboard", dashboard_body(), 2).await;
    mount_get(
        &server,
        "/api/sales/follow-ups/upcoming",
        json!({"success": true, "message": "", "follow_ups": [], "count": 0}),
        1,
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/sales/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let filters = SalesFilters::default();
    let range = SalesRange::default();

    // Two rounds of reads; the second is served from cache
    for _ in 0..2 {
        hooks::sales::sales_status(&ctx, 1).await.unwrap();
        hooks::sales::sales_statuses(&ctx, &filters, &range).await.unwrap();
        hooks::sales::sales_dashboard(&ctx).await.unwrap();
        hooks::sales::upcoming_follow_ups(&ctx, 7).await.unwrap();
    }

    let update = SalesStatusUpdate {
        status: SalesStage::Negotiating,
        memo: None,
        contact_person: None,
        last_contact_date: None,
        next_action: None,
    };
    hooks::sales::update_sales_status(&ctx, 1, &update).await.unwrap();
    assert!(ctx.notifier().contains("営業ステータスを更新しました"));

    // Status, status lists and dashboard refetch; follow-ups stay cached
    hooks::sales::sales_status(&ctx, 1).await.unwrap();
    hooks::sales::sales_statuses(&ctx, &filters, &range).await.unwrap();
    hooks::sales::sales_dashboard(&ctx).await.unwrap();
    hooks::sales::upcoming_follow_ups(&ctx, 7).await.unwrap();
}

#[tokio::test]
async fn test_detail_without_status_shows_hint() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/companies/8",
        json!({
            "success": true,
            "message": "",
            "company": {"id": 8, "company_name": "未着手商会", "url": "https://michakushu.example.com"}
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/sales/8"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompanyDetailPage::new(8);
    page.load(&ctx).await;

    assert_eq!(page.company().map(|c| c.company_name.as_str()), Some("未着手商会"));
    assert!(page.sales_status().is_none());
    assert!(page.sales().is_ready());

    // A first status is entered from a blank form
    page.open_status();
    assert_eq!(page.status_modal().values().status, None);
}

#[tokio::test]
async fn test_status_update_from_detail_page() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/companies/1",
        json!({
            "success": true,
            "message": "",
            "company": {"id": 1, "company_name": "営業先株式会社", "url": "https://eigyo.example.com"}
        }),
        1,
    )
    .await;
    mount_get(&server, "/api/sales/1", status_body(1, "アプローチ中"), 2).await;
    Mock::given(method("PUT"))
        .and(path("/api/sales/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompanyDetailPage::new(1);
    page.load(&ctx).await;

    page.open_status();
    assert_eq!(page.status_modal().values().last_contact_date, "2024-03-01");
    if let Some(form) = page.status_modal_mut().values_mut() {
        form.status = Some(SalesStage::Negotiating);
    }

    assert!(page.submit_status(&ctx).await);
    assert!(!page.status_modal().is_open());
}

#[tokio::test]
async fn test_sales_page_renders_pipeline() {
    let server = MockServer::start().await;
    mount_get(&server, "/api/sales/dashboard", dashboard_body(), 1).await;
    mount_get(&server, "/api/sales", json!([status_body(2, "商談中")]), 1).await;
    mount_get(
        &server,
        "/api/sales/follow-ups/upcoming",
        json!({
            "success": true,
            "message": "",
            "follow_ups": [{
                "company_id": 2,
                "company_name": "商談中工業",
                "next_action": "見積提出",
                "scheduled_date": "2024-03-05"
            }],
            "count": 1
        }),
        1,
    )
    .await;
    mount_get(
        &server,
        "/api/sales/analytics/conversion",
        json!({
            "success": true,
            "message": "",
            "analytics": {"conversion_rate": 12.5, "total_approached": 8, "total_converted": 1},
            "period": "monthly"
        }),
        1,
    )
    .await;

    let ctx = context(&server);
    let mut page = SalesPage::new();
    page.load(&ctx).await;

    let out = page.render();
    assert!(out.contains("営業ステータス一覧"));
    assert!(out.contains("見積提出"));
    assert!(out.contains("10.0%"));
}
