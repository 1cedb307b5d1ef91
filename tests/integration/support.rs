//! Shared fixtures

use lead_desk::config::Config;
use lead_desk::storage::{KeyValueStore, MemoryStore};
use lead_desk::AppContext;
use serde_json::{json, Value};
use wiremock::MockServer;

/// Configuration pointed at `server` with no retry pause
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_secs = 5;
    config.api.retry_delay_ms = 0;
    config.polling.running_interval_ms = 10;
    config.polling.idle_interval_ms = 10;
    config
}

pub fn context_with_store(server: &MockServer, store: Box<dyn KeyValueStore>) -> AppContext {
    AppContext::new(test_config(server), store).expect("Failed to build context")
}

pub fn context(server: &MockServer) -> AppContext {
    context_with_store(server, Box::new(MemoryStore::new()))
}

/// `GET /api/companies` body holding `companies`
pub fn companies_body(companies: Vec<Value>) -> Value {
    let total = companies.len();
    json!({
        "success": true,
        "message": "",
        "companies": companies,
        "total": total,
        "page": 1,
        "page_size": 100,
        "has_next": false
    })
}

pub fn company(id: i64, name: &str, url: &str) -> Value {
    json!({
        "id": id,
        "company_name": name,
        "url": url,
        "prefecture": "東京都",
        "representative": "山田太郎",
        "business_content": "ソフトウェア開発"
    })
}

pub fn ack() -> Value {
    json!({"success": true, "message": "OK"})
}
