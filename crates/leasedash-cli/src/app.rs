//! Command handlers.
//!
//! `App` wires the configuration, the session store and the API client
//! together. Each command restores the session first and renders the
//! typed results as text.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use leasedash_core::models::{
    filter_reports, sort_reports, NewReport, Report, ReportFilter, ReportSortColumn, ReportType,
    User,
};
use leasedash_core::{ApiClient, Config, SessionStore};
use tracing::{debug, info, warn};

use crate::render;

/// Environment variable holding the login email
const EMAIL_ENV: &str = "LEASEDASH_EMAIL";

/// Environment variable holding the login password
const PASSWORD_ENV: &str = "LEASEDASH_PASSWORD";

/// Shortest allowed polling interval for `watch`
const MIN_WATCH_INTERVAL_SECS: u64 = 5;

pub struct ReportQuery {
    pub template: Option<i64>,
    pub search: Option<String>,
    pub status: Option<String>,
    pub report_type: Option<ReportType>,
    pub sort: ReportSortColumn,
    pub ascending: bool,
}

pub struct CreateArgs {
    pub name: String,
    pub report_type: ReportType,
    pub template: i64,
    pub break_at: NaiveDate,
    pub months: u32,
    pub years: Option<u32>,
    pub language: Option<String>,
    pub webhook: Option<String>,
    pub linked_report: Option<i64>,
    pub linked_reports: Vec<i64>,
}

pub struct App {
    config: Config,
    api: ApiClient,
}

impl App {
    pub fn new(api_url: Option<String>) -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let base_url = api_url.unwrap_or_else(|| config.base_url());
        debug!(base_url = %base_url, backend = ?config.token_backend, "Config loaded");

        let storage = config
            .token_storage()
            .context("Failed to open token storage")?;
        let api = ApiClient::with_options(
            base_url,
            SessionStore::from_boxed(storage),
            config.client_options(),
        )
        .context("Failed to create API client")?;

        Ok(Self { config, api })
    }

    /// Restore the stored session, failing when there is none.
    async fn require_session(&mut self) -> Result<User> {
        match self.api.bootstrap().await? {
            Some(user) => Ok(user),
            None => bail!("Not logged in. Run `leasedash login` first."),
        }
    }

    pub async fn login(&mut self, email: Option<String>, device: Option<String>) -> Result<()> {
        let email = match email
            .or_else(|| std::env::var(EMAIL_ENV).ok())
            .or_else(|| self.config.last_email.clone())
        {
            Some(email) => email,
            None => prompt_line("Email: ")?,
        };
        if email.is_empty() {
            bail!("Email required");
        }

        let password = match std::env::var(PASSWORD_ENV) {
            Ok(password) => password,
            Err(_) => rpassword::prompt_password(format!("Password for {}: ", email))?,
        };
        if password.is_empty() {
            bail!("Password required");
        }

        let device = device.unwrap_or_else(|| self.config.device_label().to_string());
        let result = self.api.login(&email, &password, &device).await?;

        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!("Login successful");
        println!("Logged in as {}", result.user.display_name());
        if leasedash_core::api::token::is_placeholder(&result.token) {
            println!("The service returned no token; running with a local demo session.");
        }
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.api.logout()?;
        println!("Logged out");
        Ok(())
    }

    pub async fn whoami(&mut self) -> Result<()> {
        let user = self.require_session().await?;
        render::print_user(&user);
        Ok(())
    }

    pub async fn ping(&mut self) -> Result<()> {
        let answer = self.api.ping().await?;
        println!("{} is up: {}", self.api.base_url(), answer);
        Ok(())
    }

    pub async fn status(&mut self) -> Result<()> {
        let user = self.require_session().await?;
        let (reports, templates) =
            futures::try_join!(self.api.list_reports(), self.api.list_templates())?;
        render::print_user(&user);
        render::print_overview(&reports, &templates);
        Ok(())
    }

    pub async fn templates(&mut self) -> Result<()> {
        self.require_session().await?;
        let templates = self.api.list_templates().await?;
        render::print_templates(&templates);
        Ok(())
    }

    pub async fn reports(&mut self, query: ReportQuery) -> Result<()> {
        self.require_session().await?;
        let reports = self.fetch_reports(query.template).await?;
        let filter = ReportFilter {
            query: query.search,
            template_id: query.template,
            status: query.status,
            report_type: query.report_type,
        };
        let mut view = filter_reports(&reports, &filter);
        sort_reports(&mut view, query.sort, query.ascending);
        render::print_reports(&view);
        Ok(())
    }

    pub async fn report(&mut self, id: i64) -> Result<()> {
        self.require_session().await?;
        let report = self.api.get_report(id).await?;
        render::print_report(&report);
        Ok(())
    }

    pub async fn create_report(&mut self, args: CreateArgs) -> Result<()> {
        self.require_session().await?;
        let mut new_report = NewReport::new(
            args.name,
            args.report_type,
            args.template,
            args.break_at,
            args.months,
        );
        new_report.years = args.years;
        new_report.language = args.language;
        new_report.webhook = args.webhook;
        new_report.linked_report_id = args.linked_report;
        if !args.linked_reports.is_empty() {
            new_report.linked_reports = Some(args.linked_reports);
        }

        let report = self.api.create_report(&new_report).await?;
        match report.id {
            Some(id) => println!("Created report {}", id),
            None => println!("Report submitted"),
        }
        render::print_report(&report);
        Ok(())
    }

    /// Re-fetch the report list every `interval` seconds until an
    /// authentication failure or interrupt.
    pub async fn watch(&mut self, interval: u64, template: Option<i64>) -> Result<()> {
        self.require_session().await?;
        let interval = Duration::from_secs(interval.max(MIN_WATCH_INTERVAL_SECS));

        loop {
            match self.fetch_reports(template).await {
                Ok(reports) => {
                    let mut view: Vec<&Report> = reports.iter().collect();
                    sort_reports(&mut view, ReportSortColumn::Created, false);
                    println!("--- {} ---", Local::now().format("%H:%M:%S"));
                    render::print_reports(&view);
                }
                Err(e) if e.as_api_error().is_some_and(|api| api.is_unauthorized()) => {
                    return Err(e.into());
                }
                Err(e) => {
                    warn!(error = %e, "Poll failed");
                    eprintln!("Poll failed: {}", e);
                }
            }
            tokio::time::sleep(interval).await;
        }
    }

    async fn fetch_reports(
        &self,
        template: Option<i64>,
    ) -> leasedash_core::api::error::Result<Vec<Report>> {
        match template {
            Some(id) => self.api.list_template_reports(id).await,
            None => self.api.list_reports().await,
        }
    }
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
