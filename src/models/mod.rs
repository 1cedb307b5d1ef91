//! Entities mirrored from the lead API
//!
//! Records are flat and carry no client-owned invariants; all consistency is
//! the API's responsibility.

pub mod company;
pub mod envelope;
pub mod export;
pub mod health;
pub mod sales;
pub mod scraping;

pub use company::{
    CompaniesList, Company, CompanyCreated, CompanyFilters, CompanyPatch, CompanyResponse,
    DuplicateReport, Pagination,
};
pub use envelope::{Ack, ResponseMeta};
pub use export::{ExportFilters, ExportFormat, ExportStats};
pub use health::{ApiInfo, HealthCheck};
pub use sales::{
    AnalyticsPeriod, ConversionAnalytics, ConversionSummary, FollowUp, FollowUpRequest, SalesDashboard,
    RecentUpdate, SalesFilters, SalesRange, SalesStage, SalesStatus, SalesStatusResponse, SalesStatusUpdate,
    UpcomingFollowUps,
};
pub use scraping::{
    SavedScrapingConfig, ScrapingConfig, ScrapingHistory, ScrapingHistoryEntry, ScrapingPhase,
    ScrapingResult, ScrapingStartResponse, ScrapingStatus,
};
