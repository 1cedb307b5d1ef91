//! Layout and navigation shell
//!
//! This module provides the route table, the navigator that owns the current
//! location, and the text shell (header + sidebar) wrapped around every page.

use std::fmt;
use std::sync::Mutex;

/// Application title shown in the header
pub const APP_TITLE: &str = "営業リスト作成ツール";

/// A client-side route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    Companies,
    CompanyDetail(i64),
    Scraping,
    Sales,
    Export,
    Settings,
    Login,
}

/// Routes listed in the sidebar, in menu order
pub const NAV_ITEMS: [Route; 6] = [
    Route::Dashboard,
    Route::Companies,
    Route::Scraping,
    Route::Sales,
    Route::Export,
    Route::Settings,
];

impl Route {
    /// Returns the URL path of this route
    pub fn path(&self) -> String {
        match self {
            Self::Dashboard => "/".to_string(),
            Self::Companies => "/companies".to_string(),
            Self::CompanyDetail(id) => format!("/companies/{}", id),
            Self::Scraping => "/scraping".to_string(),
            Self::Sales => "/sales".to_string(),
            Self::Export => "/export".to_string(),
            Self::Settings => "/settings".to_string(),
            Self::Login => "/login".to_string(),
        }
    }

    /// Parses a URL path into a route
    ///
    /// Trailing slashes are ignored. Returns None for unknown paths.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Some(Self::Dashboard),
            ["companies"] => Some(Self::Companies),
            ["companies", id] => id.parse().ok().map(Self::CompanyDetail),
            ["scraping"] => Some(Self::Scraping),
            ["sales"] => Some(Self::Sales),
            ["export"] => Some(Self::Export),
            ["settings"] => Some(Self::Settings),
            ["login"] => Some(Self::Login),
            _ => None,
        }
    }

    /// Localized menu label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "ダッシュボード",
            Self::Companies => "企業管理",
            Self::CompanyDetail(_) => "企業詳細",
            Self::Scraping => "データ収集",
            Self::Sales => "営業管理",
            Self::Export => "エクスポート",
            Self::Settings => "設定",
            Self::Login => "ログイン",
        }
    }

    /// The sidebar entry highlighted while this route is shown
    pub fn menu_key(&self) -> Route {
        match self {
            Self::CompanyDetail(_) => Self::Companies,
            other => *other,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Owns the current location and its history
#[derive(Debug)]
pub struct Navigator {
    history: Mutex<Vec<Route>>,
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            history: Mutex::new(vec![initial]),
        }
    }

    /// Pushes `route` as the new current location
    pub fn navigate(&self, route: Route) {
        tracing::debug!("navigate -> {}", route);
        self.lock().push(route);
    }

    /// Returns the current location
    pub fn current(&self) -> Route {
        self.lock().last().copied().unwrap_or(Route::Dashboard)
    }

    /// Goes back one entry; the first entry is never popped
    pub fn back(&self) -> Route {
        let mut history = self.lock();
        if history.len() > 1 {
            history.pop();
        }
        history.last().copied().unwrap_or(Route::Dashboard)
    }

    /// Returns a copy of the full history, oldest first
    pub fn history(&self) -> Vec<Route> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Route>> {
        // A poisoned history is still a valid list of routes
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::Dashboard)
    }
}

/// Wraps a rendered page body in the header and sidebar
pub fn render_shell(current: Route, body: &str) -> String {
    let active = current.menu_key();
    let mut out = String::new();

    out.push_str(&format!("== {} ==  [{}]\n", APP_TITLE, current.path()));
    out.push_str("----------------------------------------\n");
    for item in NAV_ITEMS {
        let marker = if item == active { ">" } else { " " };
        out.push_str(&format!("{} {:<12} {}\n", marker, item.label(), item.path()));
    }
    out.push_str("----------------------------------------\n");
    out.push_str(body);
    if !body.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths_round_trip() {
        for route in [
            Route::Dashboard,
            Route::Companies,
            Route::CompanyDetail(42),
            Route::Scraping,
            Route::Sales,
            Route::Export,
            Route::Settings,
            Route::Login,
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_paths() {
        assert_eq!(Route::parse("/companies/abc"), None);
        assert_eq!(Route::parse("/nope"), None);
        assert_eq!(Route::parse("/companies/1/extra"), None);
        assert_eq!(Route::parse("/sales/"), Some(Route::Sales));
    }

    #[test]
    fn test_detail_highlights_companies_menu() {
        assert_eq!(Route::CompanyDetail(3).menu_key(), Route::Companies);
        assert_eq!(Route::Export.menu_key(), Route::Export);
    }

    #[test]
    fn test_navigator_history() {
        let nav = Navigator::default();
        assert_eq!(nav.current(), Route::Dashboard);

        nav.navigate(Route::Companies);
        nav.navigate(Route::CompanyDetail(7));
        assert_eq!(nav.current(), Route::CompanyDetail(7));

        assert_eq!(nav.back(), Route::Companies);
        assert_eq!(nav.back(), Route::Dashboard);
        assert_eq!(nav.back(), Route::Dashboard);
    }

    #[test]
    fn test_render_shell_marks_active_item() {
        let out = render_shell(Route::CompanyDetail(1), "body");
        assert!(out.contains(APP_TITLE));
        assert!(out.contains("> 企業管理"));
        assert!(out.contains("  データ収集"));
        assert!(out.ends_with("body\n"));
    }
}
