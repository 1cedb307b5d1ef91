//! Session handling: bearer token and 401 teardown

use crate::support::{companies_body, context, context_with_store};
use lead_desk::layout::Route;
use lead_desk::models::ExportFormat;
use lead_desk::pages::{CompaniesPage, ExportPage};
use lead_desk::query::QueryKey;
use lead_desk::session::TOKEN_KEY;
use lead_desk::storage::MemoryStore;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_token_is_sent_as_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(companies_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context(&server);
    ctx.login("token-123").unwrap();

    let mut page = CompaniesPage::new();
    page.load(&ctx).await;

    assert!(page.view().is_ready());
}

#[tokio::test]
async fn test_unauthorized_tears_down_session() {
    let server = MockServer::start().await;
    // A 401 is never retried
    Mock::given(method("GET"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_with_store(&server, Box::new(MemoryStore::with_entry(TOKEN_KEY, "expired")));
    ctx.cache().set(QueryKey::new(["sales", "dashboard"]), 1u32);
    assert!(ctx.is_authenticated());

    let mut page = CompaniesPage::new();
    page.load(&ctx).await;

    assert!(!ctx.is_authenticated());
    assert_eq!(ctx.navigator().current(), Route::Login);
    assert!(ctx.cache().is_empty());
    // No in-page error and no toast; the login route takes over
    assert!(page.view().is_loading());
    assert!(ctx.notifier().pending().is_empty());
}

#[tokio::test]
async fn test_unauthorized_submit_closes_modal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/companies"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = context_with_store(&server, Box::new(MemoryStore::with_entry(TOKEN_KEY, "expired")));
    let mut page = CompaniesPage::new();
    page.open_create();
    if let Some(form) = page.modal_mut().values_mut() {
        form.company_name = "新規株式会社".to_string();
        form.url = "https://shinki.example.com".to_string();
    }

    assert!(!page.submit(&ctx).await);
    assert_eq!(ctx.navigator().current(), Route::Login);
    assert!(!page.modal().is_open());
    assert_eq!(page.modal().error(), None);
    assert!(ctx.notifier().pending().is_empty());
}

#[tokio::test]
async fn test_unauthorized_export_shows_no_inline_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/export/excel"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let ctx = context_with_store(&server, Box::new(MemoryStore::with_entry(TOKEN_KEY, "expired")));
    let mut page = ExportPage::new(dir.path());

    assert!(page.export(&ctx, ExportFormat::Excel, None).await.is_err());
    assert_eq!(ctx.navigator().current(), Route::Login);
    assert!(!page.is_exporting());
    assert_eq!(page.error(), None);
    assert!(ctx.notifier().pending().is_empty());
}
