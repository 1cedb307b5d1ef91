//! Company list page
//!
//! Holds the list filters and pagination, the create/edit modal and the
//! pending delete confirmation. Any filter or pagination change resets to
//! the first page and must be followed by a reload; results of a request
//! issued before the change are discarded.

use crate::api::ApiError;
use crate::context::AppContext;
use crate::hooks;
use crate::layout::Route;
use crate::models::{CompaniesList, Company, CompanyFilters, CompanyPatch, Pagination, SalesStage};
use crate::pages::form::CompanyForm;
use crate::pages::modal::{ModalForm, ModalMode};
use crate::pages::view::ViewState;
use crate::pages::widgets::{heading, render_failure, render_stats, Button, Cell, EmptyState, Stat, Table};
use crate::pages::Render;
use crate::query::{QueryObserver, Ticket};
use std::sync::Arc;

pub const COLUMNS: [&str; 7] = ["ID", "会社名", "URL", "都道府県", "代表者", "事業内容", "操作"];

pub const EMPTY: EmptyState = EmptyState {
    message: "企業データがありません",
    hint: Some("データ収集を開始して企業情報を追加しましょう"),
};

pub const DELETE_CONFIRM_TITLE: &str = "削除確認";
pub const DELETE_CONFIRM_MESSAGE: &str = "この企業を削除してもよろしいですか？";

/// One list fetch, detached from the page
#[derive(Debug, Clone)]
pub struct ListRequest {
    ticket: Ticket,
    filters: CompanyFilters,
    pagination: Pagination,
}

impl ListRequest {
    pub fn filters(&self) -> &CompanyFilters {
        &self.filters
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub async fn fetch(&self, ctx: &AppContext) -> Result<Arc<CompaniesList>, ApiError> {
        hooks::companies::companies(ctx, &self.filters, &self.pagination).await
    }
}

#[derive(Debug, Default)]
pub struct CompaniesPage {
    filters: CompanyFilters,
    pagination: Pagination,
    observer: QueryObserver,
    view: ViewState<Arc<CompaniesList>>,
    modal: ModalForm<CompanyForm>,
    pending_delete: Option<i64>,
}

impl CompaniesPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filters(&self) -> &CompanyFilters {
        &self.filters
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn view(&self) -> &ViewState<Arc<CompaniesList>> {
        &self.view
    }

    pub fn modal(&self) -> &ModalForm<CompanyForm> {
        &self.modal
    }

    pub fn modal_mut(&mut self) -> &mut ModalForm<CompanyForm> {
        &mut self.modal
    }

    /// Replaces every filter at once
    pub fn set_filters(&mut self, filters: CompanyFilters) {
        self.filters = filters;
        self.pagination.page = 1;
    }

    /// Company-name search
    pub fn set_keyword(&mut self, keyword: Option<String>) {
        self.filters.keyword = keyword;
        self.pagination.page = 1;
    }

    pub fn set_status(&mut self, status: Option<SalesStage>) {
        self.filters.status = status;
        self.pagination.page = 1;
    }

    pub fn set_prefecture(&mut self, prefecture: Option<String>) {
        self.filters.prefecture = prefecture;
        self.pagination.page = 1;
    }

    pub fn set_industry(&mut self, industry: Option<String>) {
        self.filters.industry = industry;
        self.pagination.page = 1;
    }

    pub fn set_page(&mut self, page: u32) {
        self.pagination.page = page.max(1);
    }

    /// Changing the page size returns to the first page
    pub fn set_page_size(&mut self, page_size: u32) {
        self.pagination.page_size = page_size.max(1);
        self.pagination.page = 1;
    }

    /// Starts a fetch for the current parameters, superseding any earlier one
    pub fn begin_load(&mut self) -> ListRequest {
        self.view = ViewState::Loading;
        ListRequest {
            ticket: self.observer.issue(),
            filters: self.filters.clone(),
            pagination: self.pagination,
        }
    }

    /// Applies a fetch result
    ///
    /// Returns false when `request` was superseded and its result dropped.
    pub fn settle(
        &mut self,
        request: &ListRequest,
        result: Result<Arc<CompaniesList>, ApiError>,
    ) -> bool {
        if !self.observer.accepts(request.ticket) {
            tracing::debug!("Dropping superseded company list result");
            return false;
        }
        self.view = ViewState::from_result(result, None);
        true
    }

    /// Fetches and applies the list for the current parameters
    pub async fn load(&mut self, ctx: &AppContext) {
        let request = self.begin_load();
        let result = request.fetch(ctx).await;
        self.settle(&request, result);
    }

    pub fn companies(&self) -> &[Company] {
        self.view
            .ready()
            .map(|list| list.companies.as_slice())
            .unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.view.ready().map(|list| list.total).unwrap_or(0)
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new(&COLUMNS);
        for company in self.companies() {
            let id = company.id.map(|id| id.to_string()).unwrap_or_default();
            let name = match company.id {
                Some(id) => Cell::link(&company.company_name, Route::CompanyDetail(id).path()),
                None => Cell::text(&company.company_name),
            };
            table.push(vec![
                Cell::text(id),
                name,
                Cell::link(&company.url, &company.url),
                Cell::optional(company.prefecture.as_deref()),
                Cell::optional(company.representative.as_deref()),
                Cell::optional(company.business_content.as_deref()),
                Cell::text("編集 / 削除"),
            ]);
        }
        table
    }

    /// The empty-state prompt, when the loaded page has no rows
    pub fn empty_state(&self) -> Option<&'static EmptyState> {
        match self.view.ready() {
            Some(list) if list.companies.is_empty() => Some(&EMPTY),
            _ => None,
        }
    }

    /// Route the empty state's call to action leads to
    pub fn empty_state_action(&self) -> Route {
        Route::Scraping
    }

    pub fn open_create(&mut self) {
        self.modal.open_create();
    }

    /// Opens the edit modal pre-filled from the loaded row
    ///
    /// Returns false when `id` is not on the current page.
    pub fn open_edit(&mut self, id: i64) -> bool {
        let Some(company) = self.companies().iter().find(|c| c.id == Some(id)) else {
            return false;
        };
        let values = CompanyForm::from(company);
        self.modal.open_edit(id, values);
        true
    }

    /// Validates and submits the modal
    ///
    /// Nothing is sent when validation fails. On success the modal closes
    /// and the list is reloaded.
    ///
    /// # Returns
    ///
    /// * `true` - The company was saved
    /// * `false` - Validation failed or the request failed
    pub async fn submit(&mut self, ctx: &AppContext) -> bool {
        let Some((mode, company)) = self.modal.begin_submit() else {
            return false;
        };

        let (result, failure) = match mode {
            ModalMode::Create => (
                hooks::companies::create_company(ctx, &company)
                    .await
                    .map(|created| {
                        tracing::info!("Created company {}", created.company_id);
                    }),
                "企業の登録に失敗しました",
            ),
            ModalMode::Edit(id) => {
                let original = self.companies().iter().find(|c| c.id == Some(id));
                let patch = CompanyPatch::edit(original, company);
                (
                    hooks::companies::update_company(ctx, id, &patch)
                        .await
                        .map(|_| ()),
                    "企業情報の更新に失敗しました",
                )
            }
        };

        self.modal.finish(&result, failure);
        if result.is_ok() {
            self.load(ctx).await;
        }
        result.is_ok()
    }

    /// Asks for confirmation before deleting `id`
    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    /// Deletes the company awaiting confirmation and reloads the list
    pub async fn confirm_delete(&mut self, ctx: &AppContext) -> bool {
        let Some(id) = self.pending_delete.take() else {
            return false;
        };
        let deleted = hooks::companies::delete_company(ctx, id).await.is_ok();
        if deleted {
            self.load(ctx).await;
        }
        deleted
    }

    fn render_modal(&self) -> String {
        let values = self.modal.values();
        let (title, submit) = match self.modal.mode() {
            ModalMode::Create => ("企業登録", "登録"),
            ModalMode::Edit(_) => ("企業編集", "更新"),
        };
        self.modal.render(
            title,
            &[
                ("会社名", "company_name", values.company_name.clone()),
                ("URL", "url", values.url.clone()),
                ("住所", "address", values.address.clone()),
                ("電話番号", "tel", values.tel.clone()),
                ("FAX番号", "fax", values.fax.clone()),
                ("代表者名", "representative", values.representative.clone()),
                ("事業内容", "business_content", values.business_content.clone()),
                ("設立年月日", "established_date", values.established_date.clone()),
                ("資本金", "capital", values.capital.clone()),
                ("問い合わせURL", "contact_url", values.contact_url.clone()),
            ],
            submit,
        )
    }
}

impl Render for CompaniesPage {
    fn route(&self) -> Route {
        Route::Companies
    }

    fn render(&self) -> String {
        let mut out = heading("企業管理");

        match &self.view {
            ViewState::Loading => out.push_str("  読み込み中...\n"),
            ViewState::Failed(failure) => out.push_str(&render_failure(failure)),
            ViewState::Ready(list) => {
                out.push_str(&render_stats(&[Stat::new("登録企業数", list.total.to_string())]));
                out.push_str(&format!(
                    "  検索: {}  ステータス: {}  都道府県: {}\n",
                    self.filters.keyword.as_deref().unwrap_or("-"),
                    self.filters.status.map(|s| s.label()).unwrap_or("-"),
                    self.filters.prefecture.as_deref().unwrap_or("-"),
                ));
                out.push_str(&format!(
                    "  {} {}\n\n",
                    Button::new("更新").render(),
                    Button::new("新規追加").render()
                ));

                match self.empty_state() {
                    Some(empty) => {
                        out.push_str(&empty.render());
                        out.push_str(&format!("  {}\n", Button::new("データ収集を開始").render()));
                    }
                    None => {
                        out.push_str(&self.table().render());
                        out.push_str(&format!(
                            "\n  {} / {}件 (ページ {}, {}件/ページ)\n",
                            list.companies.len(),
                            list.total,
                            self.pagination.page,
                            self.pagination.page_size
                        ));
                    }
                }
            }
        }

        if let Some(id) = self.pending_delete {
            out.push_str(&format!(
                "\n-- {} --\n  {} (ID: {})\n  {} {}\n",
                DELETE_CONFIRM_TITLE,
                DELETE_CONFIRM_MESSAGE,
                id,
                Button::new("はい").render(),
                Button::new("いいえ").render()
            ));
        }
        out.push_str(&self.render_modal());
        out
    }
}
