//! Three-state view contract shared by every page

use crate::api::{ApiError, ErrorKind};
use crate::layout::Route;

pub const FETCH_FAILED_TITLE: &str = "データの取得に失敗しました";
pub const FETCH_FAILED_DESCRIPTION: &str = "ページを再読み込みしてください";
pub const NOT_FOUND_TITLE: &str = "企業が見つかりません";
pub const NOT_FOUND_DESCRIPTION: &str = "指定された企業は存在しないか、削除されています";

/// The control offered by a failure alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Re-issue the failed fetch
    Retry,
    /// Leave for another route
    Back(Route),
}

impl FailureAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Retry => "再試行",
            Self::Back(Route::Companies) => "企業一覧に戻る",
            Self::Back(_) => "戻る",
        }
    }
}

/// Alert rendered in place of a page's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureView {
    pub title: &'static str,
    pub description: &'static str,
    pub action: FailureAction,
}

impl FailureView {
    pub fn fetch_failed() -> Self {
        Self {
            title: FETCH_FAILED_TITLE,
            description: FETCH_FAILED_DESCRIPTION,
            action: FailureAction::Retry,
        }
    }

    pub fn not_found(back: Route) -> Self {
        Self {
            title: NOT_FOUND_TITLE,
            description: NOT_FOUND_DESCRIPTION,
            action: FailureAction::Back(back),
        }
    }

    /// Picks the alert for `error`
    ///
    /// A 404 gets the not-found alert when the page names a route to go back
    /// to; everything else is the generic fetch failure with retry.
    pub fn for_error(error: &ApiError, not_found_back: Option<Route>) -> Self {
        match (error.kind(), not_found_back) {
            (ErrorKind::NotFound, Some(back)) => Self::not_found(back),
            _ => Self::fetch_failed(),
        }
    }
}

/// Loading, failed or ready
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Failed(FailureView),
    Ready(T),
}

impl<T> ViewState<T> {
    /// Settles a view from a fetch result
    ///
    /// A rejected session leaves the view loading: the navigator has already
    /// moved to the login route and no in-page error is shown.
    pub fn from_result(result: Result<T, ApiError>, not_found_back: Option<Route>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) if e.is_fatal() => Self::Loading,
            Err(e) => Self::Failed(FailureView::for_error(&e, not_found_back)),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureView> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_offers_back() {
        let state: ViewState<()> =
            ViewState::from_result(Err(ApiError::from_status(404, "")), Some(Route::Companies));
        let failure = state.failure().unwrap();
        assert_eq!(failure.title, NOT_FOUND_TITLE);
        assert_eq!(failure.action, FailureAction::Back(Route::Companies));
        assert_eq!(failure.action.label(), "企業一覧に戻る");
    }

    #[test]
    fn test_generic_failures_offer_retry() {
        for error in [
            ApiError::Timeout,
            ApiError::from_status(500, ""),
            ApiError::from_status(429, ""),
            ApiError::from_status(413, ""),
        ] {
            let state: ViewState<()> = ViewState::from_result(Err(error), Some(Route::Companies));
            assert_eq!(state.failure(), Some(&FailureView::fetch_failed()));
        }
    }

    #[test]
    fn test_not_found_without_back_route_is_generic() {
        let state: ViewState<()> = ViewState::from_result(Err(ApiError::from_status(404, "")), None);
        assert_eq!(state.failure().unwrap().title, FETCH_FAILED_TITLE);
    }

    #[test]
    fn test_unauthorized_is_not_an_in_page_error() {
        let state: ViewState<()> = ViewState::from_result(Err(ApiError::Unauthorized), None);
        assert!(state.is_loading());
    }
}
