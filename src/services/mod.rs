//! Resource service modules
//!
//! One async function per API operation, grouped by resource family:
//! - `companies` - company CRUD and duplicate check
//! - `scraping` - job start/stop, status, history, saved config
//! - `sales` - pipeline status, dashboard, follow-ups, analytics
//! - `export` - CSV/Excel/template downloads and export stats
//! - `health` - liveness and API metadata
//!
//! Services are pure transport mapping: no caching and no retries. Every
//! failure is the client's `ApiError` with status and body intact.

pub mod companies;
pub mod export;
pub mod health;
pub mod sales;
pub mod scraping;
