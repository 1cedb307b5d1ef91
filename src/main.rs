//! Lead-Desk main entry point
//!
//! This is the command-line front end of the lead-management console. Each
//! subcommand drives one page against the configured API and prints the
//! page inside the layout shell, followed by any pending notifications.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use lead_desk::config::{default_config, load_config};
use lead_desk::layout::{render_shell, Route};
use lead_desk::models::{AnalyticsPeriod, CompanyFilters, ExportFormat, SalesRange, SalesStage};
use lead_desk::pages::form::{CompanyForm, FollowUpForm, SalesStatusForm, ScrapingConfigForm};
use lead_desk::pages::widgets::{heading, percent, render_stats, Cell, Stat, Table};
use lead_desk::pages::{
    CompaniesPage, CompanyDetailPage, DashboardPage, ExportPage, Render, SalesPage, ScrapingPage,
    SettingsPage,
};
use lead_desk::{hooks, AppContext};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Lead-Desk: a console for a sales-lead list
///
/// Lead-Desk triggers remote scraping jobs, reviews and edits the collected
/// companies, tracks the sales pipeline and exports filtered lists.
#[derive(Parser, Debug)]
#[command(name = "lead-desk")]
#[command(version = "1.0.0")]
#[command(about = "A console for a sales-lead list", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the dashboard
    Dashboard,

    /// Browse and edit companies
    #[command(subcommand)]
    Companies(CompaniesCommand),

    /// Control and inspect scraping jobs
    #[command(subcommand)]
    Scraping(ScrapingCommand),

    /// Track the sales pipeline
    #[command(subcommand)]
    Sales(SalesCommand),

    /// Download company lists
    #[command(subcommand)]
    Export(ExportCommand),

    /// Show the effective settings and API state
    Settings,

    /// Check that the API is reachable
    Health,

    /// Store an access token for subsequent requests
    Login {
        /// Access token issued by the API
        token: String,
    },

    /// Forget the stored access token
    Logout,
}

#[derive(Subcommand, Debug)]
enum CompaniesCommand {
    /// List companies
    List {
        #[command(flatten)]
        filters: CompanyFilterArgs,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Rows per page
        #[arg(long, default_value_t = 100)]
        page_size: u32,
    },

    /// Show one company with its sales status
    Show { id: i64 },

    /// Register a company
    Create {
        #[command(flatten)]
        fields: CompanyArgs,
    },

    /// Edit a company; only the given fields change
    Update {
        id: i64,

        #[command(flatten)]
        fields: CompanyArgs,
    },

    /// Delete a company
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Run the duplicate check for a company
    Duplicates { id: i64 },
}

#[derive(Args, Debug, Default)]
struct CompanyFilterArgs {
    /// Free-text search
    #[arg(long)]
    keyword: Option<String>,

    /// Sales status (label or key, e.g. "approaching")
    #[arg(long)]
    status: Option<SalesStage>,

    #[arg(long)]
    prefecture: Option<String>,

    #[arg(long)]
    industry: Option<String>,
}

#[derive(Args, Debug, Default)]
struct CompanyArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    postal_code: Option<String>,
    #[arg(long)]
    prefecture: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    tel: Option<String>,
    #[arg(long)]
    fax: Option<String>,
    #[arg(long)]
    representative: Option<String>,
    #[arg(long)]
    business_content: Option<String>,
    #[arg(long)]
    established_date: Option<String>,
    #[arg(long)]
    capital: Option<String>,
    #[arg(long)]
    contact_url: Option<String>,
}

impl CompanyArgs {
    fn apply(self, form: &mut CompanyForm) {
        let fields = [
            (self.name, &mut form.company_name),
            (self.url, &mut form.url),
            (self.address, &mut form.address),
            (self.postal_code, &mut form.postal_code),
            (self.prefecture, &mut form.prefecture),
            (self.city, &mut form.city),
            (self.tel, &mut form.tel),
            (self.fax, &mut form.fax),
            (self.representative, &mut form.representative),
            (self.business_content, &mut form.business_content),
            (self.established_date, &mut form.established_date),
            (self.capital, &mut form.capital),
            (self.contact_url, &mut form.contact_url),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum ScrapingCommand {
    /// Show the current job status
    Status,

    /// Follow the running job until it finishes (Ctrl-C to stop watching)
    Watch,

    /// Start a job
    Start {
        #[command(flatten)]
        job: ScrapingArgs,
    },

    /// Stop the running job
    Stop,

    /// Show recent runs
    History,

    /// Show the saved configuration
    Config,

    /// Edit the saved configuration; only the given fields change
    SetConfig {
        #[command(flatten)]
        job: ScrapingArgs,
    },
}

#[derive(Args, Debug, Default)]
struct ScrapingArgs {
    /// Comma-separated search keywords
    #[arg(long)]
    keywords: Option<String>,

    /// Site to collect from (repeatable)
    #[arg(long = "site")]
    sites: Vec<String>,

    #[arg(long)]
    max_pages: Option<u32>,

    #[arg(long)]
    prefecture: Option<String>,

    #[arg(long)]
    industry: Option<String>,
}

impl ScrapingArgs {
    fn apply(self, form: &mut ScrapingConfigForm) {
        if let Some(keywords) = self.keywords {
            form.keywords = keywords;
        }
        if !self.sites.is_empty() {
            form.target_sites = self.sites;
        }
        if let Some(max_pages) = self.max_pages {
            form.max_pages = max_pages.to_string();
        }
        if let Some(prefecture) = self.prefecture {
            form.prefecture = prefecture;
        }
        if let Some(industry) = self.industry {
            form.industry = industry;
        }
    }
}

#[derive(Subcommand, Debug)]
enum SalesCommand {
    /// Show the sales page with the status list
    List {
        /// Sales status (label or key)
        #[arg(long)]
        status: Option<SalesStage>,

        #[arg(long)]
        contact_person: Option<String>,

        #[arg(long, default_value_t = 100)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one company's sales status
    Show { company_id: i64 },

    /// Update a company's sales status; only the given fields change
    Update {
        company_id: i64,

        #[arg(long)]
        status: Option<SalesStage>,

        #[arg(long)]
        contact_person: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        last_contact_date: Option<String>,

        #[arg(long)]
        next_action: Option<String>,

        #[arg(long)]
        memo: Option<String>,
    },

    /// Show the pipeline aggregate
    Dashboard,

    /// Schedule a follow-up for a company
    FollowUp {
        company_id: i64,

        /// Next action to take
        #[arg(long)]
        action: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        memo: Option<String>,
    },

    /// List follow-ups due soon
    Upcoming {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },

    /// Show conversion analytics
    Analytics {
        /// weekly, monthly or yearly
        #[arg(long, default_value = "monthly")]
        period: AnalyticsPeriod,
    },
}

#[derive(Subcommand, Debug)]
enum ExportCommand {
    /// Download the filtered list as CSV
    Csv(ExportArgs),

    /// Download the filtered list as Excel
    Excel(ExportArgs),

    /// Download the import template
    Template {
        /// Output file name inside the export directory
        #[arg(long)]
        filename: Option<String>,
    },

    /// Show the export statistics and the estimated row count
    Stats {
        #[command(flatten)]
        filters: ExportFilterArgs,
    },
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    filters: ExportFilterArgs,

    /// Output file name inside the export directory
    #[arg(long)]
    filename: Option<String>,
}

#[derive(Args, Debug, Default)]
struct ExportFilterArgs {
    #[arg(long)]
    status: Option<SalesStage>,

    #[arg(long)]
    prefecture: Option<String>,

    #[arg(long)]
    industry: Option<String>,

    /// Created on or after (YYYY-MM-DD)
    #[arg(long)]
    date_from: Option<NaiveDate>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long)]
    date_to: Option<NaiveDate>,

    /// Leave the sales status columns out
    #[arg(long)]
    without_sales_status: bool,
}

impl ExportFilterArgs {
    fn apply(self, page: &mut ExportPage) {
        page.set_status(self.status);
        page.set_prefecture(self.prefecture);
        page.set_industry(self.industry);
        page.set_date_range(self.date_from, self.date_to);
        page.set_include_sales_status(!self.without_sales_status);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => default_config().context("Invalid default configuration")?,
    };
    tracing::debug!("API base URL: {}", config.api.base_url);

    let ctx = AppContext::open(config).context("Failed to initialise the application context")?;

    match cli.command {
        Command::Dashboard => handle_dashboard(&ctx).await,
        Command::Companies(command) => handle_companies(&ctx, command).await,
        Command::Scraping(command) => handle_scraping(&ctx, command).await,
        Command::Sales(command) => handle_sales(&ctx, command).await,
        Command::Export(command) => handle_export(&ctx, command).await,
        Command::Settings => handle_settings(&ctx).await,
        Command::Health => handle_health(&ctx).await,
        Command::Login { token } => {
            ctx.login(&token)?;
            println!("✓ Token stored in {}", ctx.config().session.store_path);
            Ok(())
        }
        Command::Logout => {
            ctx.logout()?;
            println!("✓ Logged out");
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lead_desk=warn,warn"),
            1 => EnvFilter::new("lead_desk=info,warn"),
            2 => EnvFilter::new("lead_desk=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints a page in the shell, then the queued toasts
///
/// A rejected session has already moved the navigator to the login route,
/// so that route is shown instead of the page.
fn show(ctx: &AppContext, page: &impl Render) {
    if ctx.navigator().current() == Route::Login {
        print!(
            "{}",
            render_shell(
                Route::Login,
                "セッションが無効です。`lead-desk login <TOKEN>` で再ログインしてください\n"
            )
        );
    } else {
        ctx.navigator().navigate(page.route());
        print!("{}", render_shell(page.route(), &page.render()));
    }
    flush_toasts(ctx);
}

fn flush_toasts(ctx: &AppContext) {
    for toast in ctx.notifier().drain() {
        println!("{}", toast);
    }
}

async fn handle_dashboard(ctx: &AppContext) -> anyhow::Result<()> {
    let mut page = DashboardPage::new();
    page.load(ctx).await;
    show(ctx, &page);
    Ok(())
}

async fn handle_companies(ctx: &AppContext, command: CompaniesCommand) -> anyhow::Result<()> {
    match command {
        CompaniesCommand::List {
            filters,
            page: page_number,
            page_size,
        } => {
            let mut page = CompaniesPage::new();
            page.set_filters(CompanyFilters {
                status: filters.status,
                prefecture: filters.prefecture,
                industry: filters.industry,
                keyword: filters.keyword,
            });
            page.set_page_size(page_size);
            page.set_page(page_number);
            page.load(ctx).await;
            show(ctx, &page);
        }
        CompaniesCommand::Show { id } => {
            let mut page = CompanyDetailPage::new(id);
            page.load(ctx).await;
            show(ctx, &page);
        }
        CompaniesCommand::Create { fields } => {
            let mut page = CompaniesPage::new();
            page.open_create();
            if let Some(form) = page.modal_mut().values_mut() {
                fields.apply(form);
            }
            let created = page.submit(ctx).await;
            show(ctx, &page);
            if !created {
                anyhow::bail!("Company was not registered");
            }
        }
        CompaniesCommand::Update { id, fields } => {
            let mut page = CompanyDetailPage::new(id);
            page.load(ctx).await;
            if !page.open_edit_company() {
                show(ctx, &page);
                anyhow::bail!("Company {} could not be loaded", id);
            }
            if let Some(form) = page.company_modal_mut().values_mut() {
                fields.apply(form);
            }
            let updated = page.submit_company(ctx).await;
            show(ctx, &page);
            if !updated {
                anyhow::bail!("Company {} was not updated", id);
            }
        }
        CompaniesCommand::Delete { id, yes } => {
            let mut page = CompaniesPage::new();
            page.request_delete(id);
            if !yes {
                // Without confirmation only the dialog is shown
                show(ctx, &page);
                println!("Re-run with --yes to delete company {}", id);
                return Ok(());
            }
            let deleted = page.confirm_delete(ctx).await;
            show(ctx, &page);
            if !deleted {
                anyhow::bail!("Company {} was not deleted", id);
            }
        }
        CompaniesCommand::Duplicates { id } => {
            let mut page = CompanyDetailPage::new(id);
            page.load(ctx).await;
            page.check_duplicates(ctx).await;
            show(ctx, &page);
        }
    }
    Ok(())
}

async fn handle_scraping(ctx: &AppContext, command: ScrapingCommand) -> anyhow::Result<()> {
    let mut page = ScrapingPage::new();
    page.load(ctx).await;

    match command {
        ScrapingCommand::Status | ScrapingCommand::Config => show(ctx, &page),
        ScrapingCommand::History => {
            let mut out = heading("実行履歴");
            let table = page.history_table();
            if table.is_empty() {
                out.push_str(&format!("  {}\n", lead_desk::pages::scraping::HISTORY_EMPTY.message));
            } else {
                out.push_str(&table.render());
            }
            print!("{}", render_shell(Route::Scraping, &out));
            flush_toasts(ctx);
        }
        ScrapingCommand::Watch => watch_scraping(ctx, &mut page).await,
        ScrapingCommand::Start { job } => {
            if let Some(form) = page.form_mut() {
                job.apply(form);
            }
            let started = page.start(ctx).await;
            show(ctx, &page);
            if !started {
                anyhow::bail!("Scraping job was not started");
            }
        }
        ScrapingCommand::Stop => {
            let stopped = page.stop(ctx).await;
            show(ctx, &page);
            if !stopped {
                anyhow::bail!("No running scraping job was stopped");
            }
        }
        ScrapingCommand::SetConfig { job } => {
            page.open_config();
            if let Some(form) = page.config_modal_mut().values_mut() {
                job.apply(form);
            }
            let saved = page.save_config(ctx).await;
            show(ctx, &page);
            if !saved {
                anyhow::bail!("Scraping configuration was not saved");
            }
        }
    }
    Ok(())
}

/// Prints status updates until the job leaves `running` or Ctrl-C
async fn watch_scraping(ctx: &AppContext, page: &mut ScrapingPage) {
    show(ctx, &*page);
    page.mount(ctx);

    loop {
        tokio::select! {
            updated = page.next_update() => {
                if !updated {
                    break;
                }
                print!("{}", render_stats(&page.status_stats()));
                flush_toasts(ctx);
                if ctx.navigator().current() == Route::Login || !page.is_running() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopped watching");
                break;
            }
        }
    }

    page.unmount();
    println!();
    show(ctx, &*page);
}

async fn handle_sales(ctx: &AppContext, command: SalesCommand) -> anyhow::Result<()> {
    match command {
        SalesCommand::List {
            status,
            contact_person,
            limit,
            offset,
        } => {
            let mut page = SalesPage::new();
            page.set_status_filter(status);
            page.set_contact_person(contact_person);
            page.set_range(SalesRange { limit, offset });
            page.load(ctx).await;
            show(ctx, &page);
        }
        SalesCommand::Show { company_id } => {
            let mut page = CompanyDetailPage::new(company_id);
            page.load(ctx).await;
            show(ctx, &page);
        }
        SalesCommand::Update {
            company_id,
            status,
            contact_person,
            last_contact_date,
            next_action,
            memo,
        } => {
            let mut page = CompanyDetailPage::new(company_id);
            page.load(ctx).await;
            page.open_status();
            if let Some(form) = page.status_modal_mut().values_mut() {
                apply_status_args(form, status, contact_person, last_contact_date, next_action, memo);
            }
            let saved = page.submit_status(ctx).await;
            show(ctx, &page);
            if !saved {
                anyhow::bail!("Sales status of company {} was not updated", company_id);
            }
        }
        SalesCommand::Dashboard => {
            let mut page = SalesPage::new();
            page.load(ctx).await;
            let mut out = heading("営業管理");
            out.push_str(&render_stats(&page.stats()));
            print!("{}", render_shell(Route::Sales, &out));
            flush_toasts(ctx);
        }
        SalesCommand::FollowUp {
            company_id,
            action,
            date,
            memo,
        } => {
            let mut page = CompanyDetailPage::new(company_id);
            page.load(ctx).await;
            page.open_follow_up();
            if let Some(form) = page.follow_up_modal_mut().values_mut() {
                apply_follow_up_args(form, action, date, memo);
            }
            let saved = page.submit_follow_up(ctx).await;
            show(ctx, &page);
            if !saved {
                anyhow::bail!("Follow-up for company {} was not scheduled", company_id);
            }
        }
        SalesCommand::Upcoming { days } => {
            let mut out = heading(&format!("今後の予定 ({}日以内)", days));
            if let Ok(upcoming) = hooks::sales::upcoming_follow_ups(ctx, days).await {
                let mut table = Table::new(&["予定日", "会社名", "ステータス", "担当者", "次回アクション"]);
                for follow_up in &upcoming.follow_ups {
                    table.push(vec![
                        Cell::optional(follow_up.scheduled_date.as_deref()),
                        match follow_up.company_id {
                            Some(id) => Cell::link(
                                follow_up.company_name.clone().unwrap_or_else(|| id.to_string()),
                                Route::CompanyDetail(id).path(),
                            ),
                            None => Cell::optional(follow_up.company_name.as_deref()),
                        },
                        Cell::optional(follow_up.status.as_deref()),
                        Cell::optional(follow_up.contact_person.as_deref()),
                        Cell::optional(follow_up.next_action.as_deref()),
                    ]);
                }
                if table.is_empty() {
                    out.push_str("  予定がありません\n");
                } else {
                    out.push_str(&table.render());
                }
            }
            print!("{}", render_shell(Route::Sales, &out));
            flush_toasts(ctx);
        }
        SalesCommand::Analytics { period } => {
            let mut out = heading(&format!("成約率分析 ({})", period.as_str()));
            if let Ok(analytics) = hooks::sales::conversion_analytics(ctx, period).await {
                let summary = &analytics.analytics;
                out.push_str(&render_stats(&[
                    Stat::new("成約率", percent(summary.conversion_rate)),
                    Stat::new("アプローチ数", summary.total_approached.to_string()),
                    Stat::new("成約数", summary.total_converted.to_string()),
                ]));
                for (key, value) in &summary.extra {
                    out.push_str(&format!("  {}: {}\n", key, value));
                }
            }
            print!("{}", render_shell(Route::Sales, &out));
            flush_toasts(ctx);
        }
    }
    Ok(())
}

fn apply_status_args(
    form: &mut SalesStatusForm,
    status: Option<SalesStage>,
    contact_person: Option<String>,
    last_contact_date: Option<String>,
    next_action: Option<String>,
    memo: Option<String>,
) {
    if status.is_some() {
        form.status = status;
    }
    if let Some(value) = contact_person {
        form.contact_person = value;
    }
    if let Some(value) = last_contact_date {
        form.last_contact_date = value;
    }
    if let Some(value) = next_action {
        form.next_action = value;
    }
    if let Some(value) = memo {
        form.memo = value;
    }
}

fn apply_follow_up_args(
    form: &mut FollowUpForm,
    action: Option<String>,
    date: Option<String>,
    memo: Option<String>,
) {
    if let Some(value) = action {
        form.next_action = value;
    }
    if let Some(value) = date {
        form.follow_up_date = value;
    }
    if let Some(value) = memo {
        form.memo = value;
    }
}

async fn handle_export(ctx: &AppContext, command: ExportCommand) -> anyhow::Result<()> {
    let mut page = ExportPage::new(&ctx.config().export.output_dir);

    let (format, filename) = match command {
        ExportCommand::Stats { filters } => {
            filters.apply(&mut page);
            page.load(ctx).await;
            show(ctx, &page);
            return Ok(());
        }
        ExportCommand::Csv(args) => {
            args.filters.apply(&mut page);
            (ExportFormat::Csv, args.filename)
        }
        ExportCommand::Excel(args) => {
            args.filters.apply(&mut page);
            (ExportFormat::Excel, args.filename)
        }
        ExportCommand::Template { filename } => (ExportFormat::Template, filename),
    };

    tracing::info!("Exporting {} into {}", format.label(), page.output_dir().display());

    let result = page.export(ctx, format, filename.as_deref()).await;
    page.load(ctx).await;
    show(ctx, &page);
    let path = result.with_context(|| format!("{} export failed", format.label()))?;
    println!("✓ Saved {}", path.display());
    Ok(())
}

async fn handle_settings(ctx: &AppContext) -> anyhow::Result<()> {
    let mut page = SettingsPage::new(ctx.config());
    page.load(ctx).await;
    show(ctx, &page);
    Ok(())
}

/// Prints the health check without the shell; exits non-zero when unreachable
async fn handle_health(ctx: &AppContext) -> anyhow::Result<()> {
    let health = hooks::health::health(ctx).await;
    flush_toasts(ctx);
    let health = health.context("API health check failed")?;
    println!("API: {}", ctx.client().base_url());
    println!("Status: {}", health.status);
    println!("Version: {}", health.version);
    Ok(())
}
