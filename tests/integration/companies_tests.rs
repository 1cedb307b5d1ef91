//! Company list and detail flows

use crate::support::{ack, companies_body, company, context, test_config};
use lead_desk::layout::Route;
use lead_desk::pages::widgets::Cell;
use lead_desk::pages::{CompaniesPage, CompanyDetailPage, FailureAction, Render};
use lead_desk::storage::MemoryStore;
use lead_desk::{AppContext, ApiError};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_renders_company_row() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![company(
            1,
            "E2Eテスト企業",
            "https://e2e-test.example.com",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();
    page.load(&ctx).await;

    let table = page.table();
    assert_eq!(table.len(), 1);
    assert_eq!(
        table.cell(0, "会社名"),
        Some(&Cell::link("E2Eテスト企業", "/companies/1"))
    );
    assert_eq!(
        table.cell(0, "URL"),
        Some(&Cell::link("https://e2e-test.example.com", "https://e2e-test.example.com"))
    );

    let out = page.render();
    assert!(out.contains("E2Eテスト企業"));
    assert!(out.contains("登録企業数"));
    assert!(page.empty_state().is_none());
}

#[tokio::test]
async fn test_empty_list_shows_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![])))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();
    page.load(&ctx).await;

    assert!(page.empty_state().is_some());
    assert_eq!(page.empty_state_action(), Route::Scraping);
    assert!(page.render().contains("企業データがありません"));
}

#[tokio::test]
async fn test_filter_change_refetches_first_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .and(query_param("keyword", "東京"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![company(
            7,
            "東京商事",
            "https://tokyo.example.com",
        )])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();
    page.set_page(3);
    page.load(&ctx).await;
    assert!(page.companies().is_empty());

    page.set_keyword(Some("東京".to_string()));
    assert_eq!(page.pagination().page, 1);
    page.load(&ctx).await;

    assert_eq!(page.companies().len(), 1);
    assert_eq!(page.companies()[0].company_name, "東京商事");
}

#[tokio::test]
async fn test_superseded_response_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .and(query_param("keyword", "新"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![company(
            2,
            "新しい企業",
            "https://new.example.com",
        )])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(companies_body(vec![company(1, "古い企業", "https://old.example.com")]))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();

    let first = page.begin_load();
    page.set_keyword(Some("新".to_string()));
    let second = page.begin_load();

    let (old, new) = tokio::join!(first.fetch(&ctx), second.fetch(&ctx));

    assert!(page.settle(&second, new));
    assert!(!page.settle(&first, old));
    assert_eq!(page.companies().len(), 1);
    assert_eq!(page.companies()[0].company_name, "新しい企業");
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(0)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();
    page.open_create();
    if let Some(form) = page.modal_mut().values_mut() {
        form.url = "not a url".to_string();
    }

    assert!(!page.submit(&ctx).await);
    assert!(page.modal().is_open());
    assert!(page.modal().field_error("company_name").is_some());
    assert_eq!(page.modal().field_error("url"), Some("正しいURLを入力してください"));
}

#[tokio::test]
async fn test_create_refreshes_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![])))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/companies"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "created", "company_id": 5})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();
    page.load(&ctx).await;
    // Served from cache while fresh
    page.load(&ctx).await;

    page.open_create();
    if let Some(form) = page.modal_mut().values_mut() {
        form.company_name = "新規株式会社".to_string();
        form.url = "https://shinki.example.com".to_string();
    }

    assert!(page.submit(&ctx).await);
    assert!(!page.modal().is_open());
    assert!(ctx.notifier().contains("企業を登録しました"));
}

#[tokio::test]
async fn test_server_rejection_keeps_modal_open() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "message": "入力内容に誤りがあります",
            "details": {"url": "このURLは既に登録されています"}
        })))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();
    page.open_create();
    if let Some(form) = page.modal_mut().values_mut() {
        form.company_name = "重複企業".to_string();
        form.url = "https://dup.example.com".to_string();
    }

    assert!(!page.submit(&ctx).await);
    assert!(page.modal().is_open());
    assert_eq!(page.modal().values().company_name, "重複企業");
    assert_eq!(page.modal().field_error("url"), Some("このURLは既に登録されています"));
    assert!(ctx.notifier().contains("企業の登録に失敗しました"));
}

#[tokio::test]
async fn test_missing_company_offers_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Company not found"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sales/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompanyDetailPage::new(99);
    page.load(&ctx).await;

    let failure = page.view().failure().expect("expected a failure view");
    assert_eq!(failure.action, FailureAction::Back(Route::Companies));
}

#[tokio::test]
async fn test_server_error_offers_retry() {
    let server = MockServer::start().await;
    // One retry after the first failure
    Mock::given(method("GET"))
        .and(path("/api/companies/3"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sales/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompanyDetailPage::new(3);
    page.load(&ctx).await;

    let failure = page.view().failure().expect("expected a failure view");
    assert_eq!(failure.action, FailureAction::Retry);
    assert!(page.render().contains("データの取得に失敗しました"));
}

#[tokio::test]
async fn test_delete_reloads_list() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/companies/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompaniesPage::new();
    page.request_delete(4);

    assert!(page.confirm_delete(&ctx).await);
    assert_eq!(page.pending_delete(), None);
    assert!(ctx.notifier().contains("企業を削除しました"));
}

fn detail_body(company: Value) -> Value {
    json!({"success": true, "message": "", "company": company})
}

async fn mount_missing_status(server: &MockServer, id: i64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/sales/{}", id)))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_edit_sends_cleared_fields() {
    let server = MockServer::start().await;
    let mut stored = company(1, "A", "https://a.example.com");
    stored["tel"] = json!("03-1111-2222");
    stored["address_detail"] = json!("3F");
    Mock::given(method("GET"))
        .and(path("/api/companies/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(stored)))
        .mount(&server)
        .await;
    mount_missing_status(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/api/companies/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut page = CompanyDetailPage::new(1);
    page.load(&ctx).await;

    assert!(page.open_edit_company());
    if let Some(form) = page.company_modal_mut().values_mut() {
        form.tel = String::new();
    }
    assert!(page.submit_company(&ctx).await);

    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.to_string() == "PUT")
        .expect("no PUT was sent");
    let body: Value = serde_json::from_slice(&put.body).unwrap();
    let fields = body.as_object().unwrap();
    assert!(fields.contains_key("tel"));
    assert!(body["tel"].is_null());
    assert_eq!(body["address_detail"], "3F");
    assert_eq!(body["representative"], "山田太郎");
}

#[tokio::test]
async fn test_edit_invalidates_detail_and_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies/1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detail_body(company(1, "A", "https://a.example.com"))),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(companies_body(vec![company(1, "A", "https://a.example.com")])),
        )
        .expect(2)
        .mount(&server)
        .await;
    mount_missing_status(&server, 1).await;
    Mock::given(method("PUT"))
        .and(path("/api/companies/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ack()))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    let mut list = CompaniesPage::new();
    let mut detail = CompanyDetailPage::new(1);

    // Second round is served from cache
    for _ in 0..2 {
        list.load(&ctx).await;
        detail.load(&ctx).await;
    }

    assert!(list.open_edit(1));
    if let Some(form) = list.modal_mut().values_mut() {
        form.company_name = "A改".to_string();
    }
    // Reloads the list itself
    assert!(list.submit(&ctx).await);
    assert!(ctx.notifier().contains("企業情報を更新しました"));

    detail.load(&ctx).await;
    assert!(detail.view().is_ready());
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    // The timeout is retried once
    Mock::given(method("GET"))
        .and(path("/api/companies/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(detail_body(company(2, "B", "https://b.example.com")))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut config = test_config(&server);
    config.api.timeout_secs = 1;
    let ctx = AppContext::new(config, Box::new(MemoryStore::new())).unwrap();

    let result = lead_desk::hooks::companies::company(&ctx, 2).await;
    assert!(matches!(result, Err(ApiError::Timeout)));
    assert!(ctx.notifier().contains("企業詳細の取得に失敗しました"));
}
