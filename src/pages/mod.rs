//! Headless page view-models
//!
//! Every page owns its filters, its `ViewState` and its modals, and renders
//! into the widget model. Loading is split in three steps so callers can
//! drive several requests at once:
//!
//! - `begin_load` issues a ticket, snapshots the parameters and switches the
//!   view to loading
//! - the returned request's `fetch` awaits the hook without borrowing the page
//! - `settle` applies the result only if its ticket is still the latest
//!
//! `load` composes the three for the common case.

pub mod companies;
pub mod company_detail;
pub mod dashboard;
pub mod export;
pub mod form;
pub mod modal;
pub mod sales;
pub mod scraping;
pub mod settings;
pub mod view;
pub mod widgets;

use crate::layout::Route;

pub use companies::CompaniesPage;
pub use company_detail::CompanyDetailPage;
pub use dashboard::DashboardPage;
pub use export::ExportPage;
pub use modal::{ModalForm, ModalMode, ModalPhase};
pub use sales::SalesPage;
pub use scraping::ScrapingPage;
pub use settings::SettingsPage;
pub use view::{FailureAction, FailureView, ViewState};

/// A page that can be printed inside the layout shell
pub trait Render {
    /// Route the page is mounted at
    fn route(&self) -> Route;

    /// Text rendering of the current state
    fn render(&self) -> String;
}
