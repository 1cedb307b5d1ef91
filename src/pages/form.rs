//! Form values and client-side validation
//!
//! Each form keeps raw text input and validates into the request body it
//! submits. Validation runs before any network call; a failing field is
//! reported under the same name the API uses for it.

use crate::models::scraping::{DEFAULT_MAX_PAGES, DEFAULT_TARGET_SITE};
use crate::models::{
    Company, FollowUpRequest, SalesStage, SalesStatus, SalesStatusUpdate, ScrapingConfig,
};
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use url::{Host, Url};

/// Field name -> message
pub type FieldErrors = BTreeMap<String, String>;

/// A form that validates into a submission
pub trait Form: Clone + Default {
    type Output;

    fn validate(&self) -> Result<Self::Output, FieldErrors>;
}

/// Accepts http(s) URLs whose host is a dotted domain, `localhost` or an
/// IPv4 address, with an optional port
pub fn is_valid_url(input: &str) -> bool {
    let input = input.trim();
    let Ok(url) = Url::parse(input) else {
        return false;
    };
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => {
            domain == "localhost"
                || (domain.contains('.')
                    && domain.split('.').all(|label| !label.is_empty()))
        }
        Some(Host::Ipv4(_)) => true,
        _ => false,
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_date(value: &str) -> Option<Result<NaiveDate, ()>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ()))
}

const DATE_FORMAT_MESSAGE: &str = "日付はYYYY-MM-DD形式で入力してください";

/// Create/edit company form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyForm {
    pub company_name: String,
    pub url: String,
    pub address: String,
    pub postal_code: String,
    pub prefecture: String,
    pub city: String,
    pub tel: String,
    pub fax: String,
    pub representative: String,
    pub business_content: String,
    pub established_date: String,
    pub capital: String,
    pub contact_url: String,
}

impl From<&Company> for CompanyForm {
    fn from(company: &Company) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            company_name: company.company_name.clone(),
            url: company.url.clone(),
            address: text(&company.address),
            postal_code: text(&company.postal_code),
            prefecture: text(&company.prefecture),
            city: text(&company.city),
            tel: text(&company.tel),
            fax: text(&company.fax),
            representative: text(&company.representative),
            business_content: text(&company.business_content),
            established_date: text(&company.established_date),
            capital: text(&company.capital),
            contact_url: text(&company.contact_url),
        }
    }
}

impl Form for CompanyForm {
    type Output = Company;

    fn validate(&self) -> Result<Company, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.company_name.trim().is_empty() {
            errors.insert("company_name".into(), "会社名を入力してください".into());
        }
        if self.url.trim().is_empty() {
            errors.insert("url".into(), "URLを入力してください".into());
        } else if !is_valid_url(&self.url) {
            errors.insert("url".into(), "正しいURLを入力してください".into());
        }
        if !self.contact_url.trim().is_empty() && !is_valid_url(&self.contact_url) {
            errors.insert("contact_url".into(), "正しいURLを入力してください".into());
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Company {
            company_name: self.company_name.trim().to_string(),
            url: self.url.trim().to_string(),
            address: optional(&self.address),
            postal_code: optional(&self.postal_code),
            prefecture: optional(&self.prefecture),
            city: optional(&self.city),
            tel: optional(&self.tel),
            fax: optional(&self.fax),
            representative: optional(&self.representative),
            business_content: optional(&self.business_content),
            established_date: optional(&self.established_date),
            capital: optional(&self.capital),
            contact_url: optional(&self.contact_url),
            ..Company::default()
        })
    }
}

/// Sales status update form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesStatusForm {
    pub status: Option<SalesStage>,
    pub contact_person: String,
    /// `YYYY-MM-DD`
    pub last_contact_date: String,
    pub next_action: String,
    pub memo: String,
}

impl From<&SalesStatus> for SalesStatusForm {
    fn from(status: &SalesStatus) -> Self {
        Self {
            status: Some(status.status),
            contact_person: status.contact_person.clone().unwrap_or_default(),
            // The API may send a full timestamp; keep the date part
            last_contact_date: status
                .last_contact_date
                .as_deref()
                .map(|d| d.chars().take(10).collect())
                .unwrap_or_default(),
            next_action: status.next_action.clone().unwrap_or_default(),
            memo: status.memo.clone().unwrap_or_default(),
        }
    }
}

impl Form for SalesStatusForm {
    type Output = SalesStatusUpdate;

    fn validate(&self) -> Result<SalesStatusUpdate, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.status.is_none() {
            errors.insert("status".into(), "ステータスを選択してください".into());
        }
        let last_contact_date = match parse_date(&self.last_contact_date) {
            None => None,
            Some(Ok(date)) => Some(date),
            Some(Err(())) => {
                errors.insert("last_contact_date".into(), DATE_FORMAT_MESSAGE.into());
                None
            }
        };

        match self.status {
            Some(status) if errors.is_empty() => Ok(SalesStatusUpdate {
                status,
                memo: optional(&self.memo),
                contact_person: optional(&self.contact_person),
                last_contact_date,
                next_action: optional(&self.next_action),
            }),
            _ => Err(errors),
        }
    }
}

/// Follow-up scheduling form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FollowUpForm {
    pub next_action: String,
    /// `YYYY-MM-DD`
    pub follow_up_date: String,
    pub memo: String,
}

impl Form for FollowUpForm {
    type Output = FollowUpRequest;

    fn validate(&self) -> Result<FollowUpRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.next_action.trim().is_empty() {
            errors.insert("next_action".into(), "次回アクションを入力してください".into());
        }
        let follow_up_date = match parse_date(&self.follow_up_date) {
            None => None,
            Some(Ok(date)) => Some(date),
            Some(Err(())) => {
                errors.insert("follow_up_date".into(), DATE_FORMAT_MESSAGE.into());
                None
            }
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(FollowUpRequest {
            next_action: self.next_action.trim().to_string(),
            follow_up_date,
            memo: optional(&self.memo),
        })
    }
}

/// Scraping job form, also used to edit the saved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapingConfigForm {
    /// Comma-separated
    pub keywords: String,
    pub target_sites: Vec<String>,
    pub max_pages: String,
    pub prefecture: String,
    pub industry: String,
}

impl Default for ScrapingConfigForm {
    fn default() -> Self {
        Self {
            keywords: String::new(),
            target_sites: vec![DEFAULT_TARGET_SITE.to_string()],
            max_pages: DEFAULT_MAX_PAGES.to_string(),
            prefecture: String::new(),
            industry: String::new(),
        }
    }
}

impl ScrapingConfigForm {
    /// Pre-fills from a saved configuration object
    ///
    /// `keywords` may be a list or a comma-separated string; missing fields
    /// keep their defaults.
    pub fn from_saved(config: &Map<String, Value>) -> Self {
        let mut form = Self::default();

        match config.get("keywords") {
            Some(Value::Array(items)) => {
                form.keywords = items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(",");
            }
            Some(Value::String(s)) => form.keywords = s.clone(),
            _ => {}
        }
        if let Some(Value::Array(items)) = config.get("target_sites") {
            let sites: Vec<String> = items.iter().filter_map(Value::as_str).map(String::from).collect();
            if !sites.is_empty() {
                form.target_sites = sites;
            }
        }
        if let Some(pages) = config.get("max_pages").and_then(Value::as_u64) {
            form.max_pages = pages.to_string();
        }
        if let Some(s) = config.get("prefecture").and_then(Value::as_str) {
            form.prefecture = s.to_string();
        }
        if let Some(s) = config.get("industry").and_then(Value::as_str) {
            form.industry = s.to_string();
        }

        form
    }

    /// The validated configuration as a JSON object for the config endpoint
    pub fn to_saved(&self) -> Result<Map<String, Value>, FieldErrors> {
        let config = self.validate()?;
        match serde_json::to_value(config) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}

impl Form for ScrapingConfigForm {
    type Output = ScrapingConfig;

    fn validate(&self) -> Result<ScrapingConfig, FieldErrors> {
        let mut errors = FieldErrors::new();

        let keywords: Vec<String> = self
            .keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect();
        if keywords.is_empty() {
            errors.insert("keywords".into(), "検索キーワードを入力してください".into());
        }

        let max_pages = match self.max_pages.trim() {
            "" => Some(DEFAULT_MAX_PAGES),
            text => match text.parse::<u32>() {
                Ok(n) if (1..=100).contains(&n) => Some(n),
                _ => {
                    errors.insert("max_pages".into(), "最大ページ数は1〜100で指定してください".into());
                    None
                }
            },
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let target_sites = if self.target_sites.is_empty() {
            vec![DEFAULT_TARGET_SITE.to_string()]
        } else {
            self.target_sites.clone()
        };

        Ok(ScrapingConfig {
            keywords,
            target_sites,
            max_pages,
            prefecture: optional(&self.prefecture),
            industry: optional(&self.industry),
        })
    }
}
