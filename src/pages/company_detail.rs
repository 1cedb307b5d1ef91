//! Company detail page
//!
//! Shows one company with its sales status panel. A missing company gets the
//! not-found alert with a way back to the list; a company without a sales
//! status gets an informational panel instead of an error.

use crate::api::{ApiError, ErrorKind};
use crate::context::AppContext;
use crate::hooks;
use crate::layout::Route;
use crate::models::{Company, CompanyPatch, CompanyResponse, DuplicateReport, SalesStatus, SalesStatusResponse};
use crate::pages::form::{CompanyForm, FollowUpForm, SalesStatusForm};
use crate::pages::modal::ModalForm;
use crate::pages::view::{FailureView, ViewState};
use crate::pages::widgets::{heading, render_failure, Button};
use crate::pages::Render;
use crate::query::{QueryObserver, Ticket};
use std::sync::Arc;

pub const NO_STATUS_TITLE: &str = "営業ステータスが登録されていません";
pub const NO_STATUS_HINT: &str = "ステータス更新ボタンから営業情報を登録してください";

type SalesResult = Result<Arc<SalesStatusResponse>, ApiError>;

/// Paired fetch of the company and its sales status
#[derive(Debug, Clone, Copy)]
pub struct DetailRequest {
    ticket: Ticket,
    id: i64,
}

impl DetailRequest {
    /// Issues both reads concurrently
    pub async fn fetch(
        &self,
        ctx: &AppContext,
    ) -> (Result<Arc<CompanyResponse>, ApiError>, SalesResult) {
        tokio::join!(
            hooks::companies::company(ctx, self.id),
            hooks::sales::sales_status(ctx, self.id)
        )
    }
}

#[derive(Debug)]
pub struct CompanyDetailPage {
    id: i64,
    observer: QueryObserver,
    company: ViewState<Arc<CompanyResponse>>,
    /// `Ready(None)` when the company has no status yet
    sales: ViewState<Option<SalesStatus>>,
    company_modal: ModalForm<CompanyForm>,
    status_modal: ModalForm<SalesStatusForm>,
    follow_up_modal: ModalForm<FollowUpForm>,
    duplicates: Option<DuplicateReport>,
}

impl CompanyDetailPage {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            observer: QueryObserver::new(),
            company: ViewState::Loading,
            sales: ViewState::Loading,
            company_modal: ModalForm::new(),
            status_modal: ModalForm::new(),
            follow_up_modal: ModalForm::new(),
            duplicates: None,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn view(&self) -> &ViewState<Arc<CompanyResponse>> {
        &self.company
    }

    pub fn sales(&self) -> &ViewState<Option<SalesStatus>> {
        &self.sales
    }

    pub fn company(&self) -> Option<&Company> {
        self.company.ready().map(|r| &r.company)
    }

    pub fn sales_status(&self) -> Option<&SalesStatus> {
        self.sales.ready().and_then(Option::as_ref)
    }

    pub fn company_modal(&self) -> &ModalForm<CompanyForm> {
        &self.company_modal
    }

    pub fn company_modal_mut(&mut self) -> &mut ModalForm<CompanyForm> {
        &mut self.company_modal
    }

    pub fn status_modal(&self) -> &ModalForm<SalesStatusForm> {
        &self.status_modal
    }

    pub fn status_modal_mut(&mut self) -> &mut ModalForm<SalesStatusForm> {
        &mut self.status_modal
    }

    pub fn follow_up_modal(&self) -> &ModalForm<FollowUpForm> {
        &self.follow_up_modal
    }

    pub fn follow_up_modal_mut(&mut self) -> &mut ModalForm<FollowUpForm> {
        &mut self.follow_up_modal
    }

    pub fn duplicates(&self) -> Option<&DuplicateReport> {
        self.duplicates.as_ref()
    }

    pub fn begin_load(&mut self) -> DetailRequest {
        self.company = ViewState::Loading;
        self.sales = ViewState::Loading;
        DetailRequest {
            ticket: self.observer.issue(),
            id: self.id,
        }
    }

    pub fn settle(
        &mut self,
        request: &DetailRequest,
        company: Result<Arc<CompanyResponse>, ApiError>,
        sales: SalesResult,
    ) -> bool {
        if !self.observer.accepts(request.ticket) {
            return false;
        }

        self.company = ViewState::from_result(company, Some(Route::Companies));
        self.sales = match sales {
            Ok(response) => ViewState::Ready(Some(response.status.clone())),
            Err(e) if e.kind() == ErrorKind::NotFound => ViewState::Ready(None),
            Err(e) if e.is_fatal() => ViewState::Loading,
            Err(_) => ViewState::Failed(FailureView::fetch_failed()),
        };
        true
    }

    pub async fn load(&mut self, ctx: &AppContext) {
        let request = self.begin_load();
        let (company, sales) = request.fetch(ctx).await;
        self.settle(&request, company, sales);
    }

    /// Leaves for the company list
    pub fn back(&self, ctx: &AppContext) {
        ctx.navigator().navigate(Route::Companies);
    }

    /// Opens the company editor pre-filled; false until the company is loaded
    pub fn open_edit_company(&mut self) -> bool {
        let Some(values) = self.company().map(CompanyForm::from) else {
            return false;
        };
        self.company_modal.open_edit(self.id, values);
        true
    }

    /// Opens the status editor, blank when no status exists yet
    pub fn open_status(&mut self) {
        let values = self
            .sales_status()
            .map(SalesStatusForm::from)
            .unwrap_or_default();
        self.status_modal.open_edit(self.id, values);
    }

    pub fn open_follow_up(&mut self) {
        let values = FollowUpForm {
            next_action: self
                .sales_status()
                .and_then(|s| s.next_action.clone())
                .unwrap_or_default(),
            ..FollowUpForm::default()
        };
        self.follow_up_modal.open_edit(self.id, values);
    }

    pub async fn submit_company(&mut self, ctx: &AppContext) -> bool {
        let Some((_, company)) = self.company_modal.begin_submit() else {
            return false;
        };
        let patch = CompanyPatch::edit(self.company(), company);
        let result = hooks::companies::update_company(ctx, self.id, &patch).await;
        self.company_modal.finish(&result, "企業情報の更新に失敗しました");
        self.reload_after(ctx, result.is_ok()).await
    }

    pub async fn submit_status(&mut self, ctx: &AppContext) -> bool {
        let Some((_, update)) = self.status_modal.begin_submit() else {
            return false;
        };
        let result = hooks::sales::update_sales_status(ctx, self.id, &update).await;
        self.status_modal.finish(&result, "営業ステータスの更新に失敗しました");
        self.reload_after(ctx, result.is_ok()).await
    }

    pub async fn submit_follow_up(&mut self, ctx: &AppContext) -> bool {
        let Some((_, request)) = self.follow_up_modal.begin_submit() else {
            return false;
        };
        let result = hooks::sales::schedule_follow_up(ctx, self.id, &request).await;
        self.follow_up_modal.finish(&result, "フォローアップ予定の設定に失敗しました");
        self.reload_after(ctx, result.is_ok()).await
    }

    /// Runs the duplicate check and keeps the report for display
    pub async fn check_duplicates(&mut self, ctx: &AppContext) -> bool {
        match hooks::companies::check_duplicate(ctx, self.id).await {
            Ok(report) => {
                self.duplicates = Some(report);
                true
            }
            Err(_) => false,
        }
    }

    async fn reload_after(&mut self, ctx: &AppContext, saved: bool) -> bool {
        if saved {
            self.load(ctx).await;
        }
        saved
    }

    fn render_company(company: &Company, out: &mut String) {
        let field = |v: &Option<String>| v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "-".into());

        out.push_str(&heading("企業基本情報"));
        out.push_str(&format!("  会社名: {}\n", company.company_name));
        out.push_str(&format!("  企業サイト: {}\n", company.url));
        out.push_str(&format!("  住所: {}\n", field(&company.address)));
        out.push_str(&format!("  電話番号: {}\n", field(&company.tel)));
        out.push_str(&format!("  FAX番号: {}\n", field(&company.fax)));
        out.push_str(&format!("  代表者名: {}\n", field(&company.representative)));
        out.push_str(&format!("  設立年月日: {}\n", field(&company.established_date)));
        out.push_str(&format!("  資本金: {}\n", field(&company.capital)));
        out.push_str(&format!("  事業内容: {}\n", field(&company.business_content)));
        out.push_str(&format!("  問い合わせフォーム: {}\n", field(&company.contact_url)));
    }

    fn render_sales(&self, out: &mut String) {
        out.push_str(&heading("営業ステータス"));
        match &self.sales {
            ViewState::Loading => out.push_str("  読み込み中...\n"),
            ViewState::Failed(failure) => out.push_str(&render_failure(failure)),
            ViewState::Ready(None) => {
                out.push_str(&format!("  {}\n  {}\n", NO_STATUS_TITLE, NO_STATUS_HINT));
            }
            ViewState::Ready(Some(status)) => {
                let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
                out.push_str(&format!("  ステータス: [{}]\n", status.status));
                out.push_str(&format!("  担当者: {}\n", field(&status.contact_person)));
                out.push_str(&format!("  最終コンタクト日: {}\n", field(&status.last_contact_date)));
                out.push_str(&format!("  次回アクション: {}\n", field(&status.next_action)));
                out.push_str(&format!("  メモ: {}\n", field(&status.memo)));
                out.push_str(&format!("  最終更新日時: {}\n", field(&status.updated_at)));
            }
        }
    }

    fn render_modals(&self, out: &mut String) {
        let company = self.company_modal.values();
        out.push_str(&self.company_modal.render(
            "企業情報を編集",
            &[
                ("会社名", "company_name", company.company_name.clone()),
                ("URL", "url", company.url.clone()),
                ("住所", "address", company.address.clone()),
                ("電話番号", "tel", company.tel.clone()),
                ("代表者名", "representative", company.representative.clone()),
                ("事業内容", "business_content", company.business_content.clone()),
                ("問い合わせURL", "contact_url", company.contact_url.clone()),
            ],
            "更新",
        ));

        let status = self.status_modal.values();
        out.push_str(&self.status_modal.render(
            "営業ステータスを更新",
            &[
                (
                    "ステータス",
                    "status",
                    status.status.map(|s| s.label().to_string()).unwrap_or_default(),
                ),
                ("担当者", "contact_person", status.contact_person.clone()),
                ("最終コンタクト日", "last_contact_date", status.last_contact_date.clone()),
                ("次回アクション", "next_action", status.next_action.clone()),
                ("メモ", "memo", status.memo.clone()),
            ],
            "更新",
        ));

        let follow_up = self.follow_up_modal.values();
        out.push_str(&self.follow_up_modal.render(
            "フォローアップ予定",
            &[
                ("次回アクション", "next_action", follow_up.next_action.clone()),
                ("予定日", "follow_up_date", follow_up.follow_up_date.clone()),
                ("メモ", "memo", follow_up.memo.clone()),
            ],
            "設定",
        ));
    }
}

impl Render for CompanyDetailPage {
    fn route(&self) -> Route {
        Route::CompanyDetail(self.id)
    }

    fn render(&self) -> String {
        let mut out = String::new();

        match &self.company {
            ViewState::Loading => {
                out.push_str(&heading("企業詳細"));
                out.push_str("  読み込み中...\n");
            }
            ViewState::Failed(failure) => {
                out.push_str(&heading("企業詳細"));
                out.push_str(&render_failure(failure));
            }
            ViewState::Ready(response) => {
                out.push_str(&format!("  {}\n", Button::new("企業一覧に戻る").render()));
                out.push_str(&heading(&response.company.company_name));
                out.push_str(&format!(
                    "  {} {} {} {}\n",
                    Button::new("企業情報編集").render(),
                    Button::new("ステータス更新").render(),
                    Button::new("フォローアップ").render(),
                    Button::new("重複チェック").render()
                ));
                Self::render_company(&response.company, &mut out);
                self.render_sales(&mut out);

                if let Some(report) = &self.duplicates {
                    out.push_str(&heading("重複チェック結果"));
                    let text = serde_json::to_string_pretty(report).unwrap_or_else(|_| report.to_string());
                    for line in text.lines() {
                        out.push_str(&format!("  {}\n", line));
                    }
                }
            }
        }

        self.render_modals(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesStage;
    use crate::pages::view::FailureAction;

    fn company() -> Arc<CompanyResponse> {
        Arc::new(
            serde_json::from_str(
                r#"{"success":true,"message":"","company":{"id":7,"company_name":"テスト株式会社",
                    "url":"https://test.example.com","tel":"03-1234-5678"}}"#,
            )
            .unwrap(),
        )
    }

    fn status() -> Arc<SalesStatusResponse> {
        Arc::new(
            serde_json::from_str(
                r#"{"success":true,"message":"","status":{"company_id":7,"status":"商談中",
                    "contact_person":"山田太郎","last_contact_date":"2024-03-01T10:00:00"}}"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_not_found_offers_back_navigation() {
        let mut page = CompanyDetailPage::new(99);
        let request = page.begin_load();
        page.settle(
            &request,
            Err(ApiError::from_status(404, r#"{"detail":"Company not found"}"#)),
            Err(ApiError::from_status(404, "")),
        );

        let failure = page.view().failure().unwrap();
        assert_eq!(failure.title, "企業が見つかりません");
        assert_eq!(failure.action, FailureAction::Back(Route::Companies));
        assert!(page.render().contains("[企業一覧に戻る]"));
    }

    #[test]
    fn test_generic_failure_offers_retry() {
        let mut page = CompanyDetailPage::new(7);
        let request = page.begin_load();
        page.settle(
            &request,
            Err(ApiError::from_status(500, "")),
            Err(ApiError::from_status(500, "")),
        );

        let failure = page.view().failure().unwrap();
        assert_eq!(failure.title, "データの取得に失敗しました");
        assert_eq!(failure.action, FailureAction::Retry);
    }

    #[test]
    fn test_missing_status_shows_hint() {
        let mut page = CompanyDetailPage::new(7);
        let request = page.begin_load();
        page.settle(&request, Ok(company()), Err(ApiError::from_status(404, "")));

        assert!(page.view().is_ready());
        assert_eq!(page.sales(), &ViewState::Ready(None));
        let out = page.render();
        assert!(out.contains(NO_STATUS_TITLE));
        assert!(out.contains("03-1234-5678"));
    }

    #[test]
    fn test_status_modal_prefills() {
        let mut page = CompanyDetailPage::new(7);
        let request = page.begin_load();
        page.settle(&request, Ok(company()), Ok(status()));

        page.open_status();
        let values = page.status_modal().values();
        assert_eq!(values.status, Some(SalesStage::Negotiating));
        assert_eq!(values.last_contact_date, "2024-03-01");
        assert!(page.render().contains("営業ステータスを更新"));
    }

    #[test]
    fn test_edit_requires_loaded_company() {
        let mut page = CompanyDetailPage::new(7);
        assert!(!page.open_edit_company());

        let request = page.begin_load();
        page.settle(&request, Ok(company()), Ok(status()));
        assert!(page.open_edit_company());
        assert_eq!(page.company_modal().values().company_name, "テスト株式会社");
    }
}
