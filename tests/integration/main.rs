//! Integration tests against a mocked lead API
//!
//! Every test starts a wiremock server and drives the hooks and pages
//! through a context pointed at it.

mod companies_tests;
mod export_tests;
mod sales_tests;
mod scraping_tests;
mod session_tests;
mod support;
