//! Export endpoints (`/api/export`)
//!
//! The file endpoints return raw bytes. The `download_*` helpers save the
//! payload to a directory under a date-derived default name.

use crate::api::{ApiClient, ApiError};
use crate::models::{ExportFilters, ExportFormat, ExportStats};
use chrono::Utc;
use std::path::{Path, PathBuf};

pub async fn csv(client: &ApiClient, filters: &ExportFilters) -> Result<Vec<u8>, ApiError> {
    client
        .get_bytes(ExportFormat::Csv.path(), &filters.to_query())
        .await
}

pub async fn excel(client: &ApiClient, filters: &ExportFilters) -> Result<Vec<u8>, ApiError> {
    client
        .get_bytes(ExportFormat::Excel.path(), &filters.to_query())
        .await
}

/// Blank import template
pub async fn template(client: &ApiClient) -> Result<Vec<u8>, ApiError> {
    client.get_bytes(ExportFormat::Template.path(), &[]).await
}

/// Aggregate counts used to estimate export size
pub async fn stats(client: &ApiClient) -> Result<ExportStats, ApiError> {
    client.get_json("/api/export/stats", &[]).await
}

/// Downloads a CSV export into `dir`
///
/// # Arguments
///
/// * `client` - The API client
/// * `filters` - Which companies to include
/// * `dir` - Target directory, created if missing
/// * `filename` - File name; defaults to `companies_YYYY-MM-DD.csv`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(LeadDeskError)` - Request or write failure
pub async fn download_csv(
    client: &ApiClient,
    filters: &ExportFilters,
    dir: &Path,
    filename: Option<&str>,
) -> crate::Result<PathBuf> {
    let bytes = csv(client, filters).await?;
    save(ExportFormat::Csv, &bytes, dir, filename).await
}

/// Downloads an Excel export into `dir` (default `companies_YYYY-MM-DD.xlsx`)
pub async fn download_excel(
    client: &ApiClient,
    filters: &ExportFilters,
    dir: &Path,
    filename: Option<&str>,
) -> crate::Result<PathBuf> {
    let bytes = excel(client, filters).await?;
    save(ExportFormat::Excel, &bytes, dir, filename).await
}

/// Downloads the import template into `dir` (default `companies_template.xlsx`)
pub async fn download_template(
    client: &ApiClient,
    dir: &Path,
    filename: Option<&str>,
) -> crate::Result<PathBuf> {
    let bytes = template(client).await?;
    save(ExportFormat::Template, &bytes, dir, filename).await
}

/// Fetches and saves a download of `format`
pub async fn download(
    client: &ApiClient,
    format: ExportFormat,
    filters: &ExportFilters,
    dir: &Path,
    filename: Option<&str>,
) -> crate::Result<PathBuf> {
    match format {
        ExportFormat::Csv => download_csv(client, filters, dir, filename).await,
        ExportFormat::Excel => download_excel(client, filters, dir, filename).await,
        ExportFormat::Template => download_template(client, dir, filename).await,
    }
}

async fn save(format: ExportFormat, bytes: &[u8], dir: &Path, filename: Option<&str>) -> crate::Result<PathBuf> {
    let name = match filename.map(str::trim).filter(|f| !f.is_empty()) {
        Some(name) => name.to_string(),
        None => format.default_filename(Utc::now().date_naive()),
    };

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(name);
    tokio::fs::write(&path, bytes).await?;

    tracing::info!("Saved {} export ({} bytes) to {}", format.label(), bytes.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_uses_default_name() {
        let dir = TempDir::new().unwrap();
        let path = save(ExportFormat::Template, b"xlsx", dir.path(), None).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "companies_template.xlsx");
        assert_eq!(std::fs::read(&path).unwrap(), b"xlsx");
    }

    #[tokio::test]
    async fn test_save_respects_explicit_name() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out");
        let path = save(ExportFormat::Csv, b"a,b\n", &nested, Some("leads.csv")).await.unwrap();
        assert_eq!(path, nested.join("leads.csv"));
    }

    #[tokio::test]
    async fn test_save_default_csv_name_is_dated() {
        let dir = TempDir::new().unwrap();
        let path = save(ExportFormat::Csv, b"", dir.path(), Some("  ")).await.unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("companies_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "companies_2024-01-01.csv".len());
    }
}
