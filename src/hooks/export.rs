//! Export statistics and file downloads

use crate::api::ApiError;
use crate::context::AppContext;
use crate::models::{ExportFilters, ExportFormat, ExportStats};
use crate::query::{run_query, QueryKey, QueryPolicy};
use crate::services;
use crate::LeadDeskError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const STATS_POLICY: QueryPolicy = QueryPolicy::always();

/// Shown when any export download fails
pub const EXPORT_FAILURE: &str = "エクスポートに失敗しました";

pub fn stats_key() -> QueryKey {
    QueryKey::root("export-stats")
}

pub async fn export_stats(ctx: &AppContext) -> Result<Arc<ExportStats>, ApiError> {
    let client = ctx.client();
    run_query(
        ctx.cache(),
        ctx.notifier(),
        &stats_key(),
        &STATS_POLICY,
        "統計情報の取得に失敗しました",
        || services::export::stats(client),
    )
    .await
}

/// Downloads an export into `dir` and toasts the outcome
///
/// # Arguments
///
/// * `ctx` - Application context
/// * `format` - CSV, Excel or the import template
/// * `filters` - Ignored for the template
/// * `dir` - Target directory
/// * `filename` - Overrides the date-derived default name
///
/// # Returns
///
/// * `Ok(PathBuf)` - Where the file was written
/// * `Err(LeadDeskError)` - Download or write failure
pub async fn download(
    ctx: &AppContext,
    format: ExportFormat,
    filters: &ExportFilters,
    dir: &Path,
    filename: Option<&str>,
) -> crate::Result<PathBuf> {
    let result = services::export::download(ctx.client(), format, filters, dir, filename).await;

    match &result {
        Ok(_) => ctx.notifier().success(success_message(format)),
        Err(LeadDeskError::Api(e)) if e.is_fatal() => {
            tracing::warn!("{}: {}", failure_message(format), e);
        }
        Err(e) => ctx.notifier().error(failure_message(format), e),
    }

    result
}

fn success_message(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Csv => "CSVファイルをダウンロードしました",
        ExportFormat::Excel => "Excelファイルをダウンロードしました",
        ExportFormat::Template => "テンプレートをダウンロードしました",
    }
}

/// Failure toast and inline message for `format`
pub fn failure_message(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Csv | ExportFormat::Excel => EXPORT_FAILURE,
        ExportFormat::Template => "テンプレートのダウンロードに失敗しました",
    }
}
