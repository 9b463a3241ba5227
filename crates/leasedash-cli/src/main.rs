//! leasedash - command-line dashboard for lease-accounting reports.
//!
//! Lists, inspects and creates reports on the reporting service. The
//! session token survives between runs; every command other than `login`
//! and `logout` restores it first.

mod app;
mod render;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use leasedash_core::models::{ReportSortColumn, ReportType};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, CreateArgs, ReportQuery};

/// Directory for an additional log file, unset to log to stderr only
const LOG_DIR_ENV: &str = "LEASEDASH_LOG_DIR";

const LOG_FILE_PREFIX: &str = "leasedash.log";

#[derive(Debug, Parser)]
#[command(name = "leasedash", version, about = "Lease-accounting report dashboard")]
struct Cli {
    /// API base URL (overrides LEASEDASH_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        /// Account email (defaults to LEASEDASH_EMAIL or the last used one)
        email: Option<String>,
        /// Device label sent to the service
        #[arg(long)]
        device: Option<String>,
    },
    /// Forget the stored session token
    Logout,
    /// Show the current user with report and template counts
    Status,
    /// Show the current user
    Whoami,
    /// Check that the service is reachable
    Ping,
    /// List templates as a tree
    Templates,
    /// List reports, filtered and sorted locally
    Reports {
        /// Only reports generated from this template
        #[arg(long)]
        template: Option<i64>,
        /// Case-insensitive match on name or type
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long = "type")]
        report_type: Option<ReportType>,
        /// name, type, break_at, status or created
        #[arg(long, default_value = "break_at")]
        sort: ReportSortColumn,
        #[arg(long)]
        desc: bool,
    },
    /// Show one report
    Report { id: i64 },
    /// Submit a new report
    CreateReport {
        #[arg(long)]
        name: String,
        /// IFRS16, LOCALGAAP, RKRR5 or GENERATOR
        #[arg(long = "type")]
        report_type: ReportType,
        #[arg(long)]
        template: i64,
        /// Break date, YYYY-MM-DD
        #[arg(long)]
        break_at: NaiveDate,
        #[arg(long)]
        months: u32,
        #[arg(long)]
        years: Option<u32>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        webhook: Option<String>,
        #[arg(long)]
        linked_report: Option<i64>,
        /// Comma-separated report ids to link
        #[arg(long = "link", value_delimiter = ',')]
        linked_reports: Vec<i64>,
    },
    /// Re-poll the report list on an interval
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 30)]
        interval: u64,
        #[arg(long)]
        template: Option<i64>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(PathBuf::from(dir), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing();
    info!("leasedash starting");

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", render::error_message(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut app = App::new(cli.api_url)?;

    match cli.command {
        Command::Login { email, device } => app.login(email, device).await,
        Command::Logout => app.logout(),
        Command::Status => app.status().await,
        Command::Whoami => app.whoami().await,
        Command::Ping => app.ping().await,
        Command::Templates => app.templates().await,
        Command::Reports {
            template,
            search,
            status,
            report_type,
            sort,
            desc,
        } => {
            app.reports(ReportQuery {
                template,
                search,
                status,
                report_type,
                sort,
                ascending: !desc,
            })
            .await
        }
        Command::Report { id } => app.report(id).await,
        Command::CreateReport {
            name,
            report_type,
            template,
            break_at,
            months,
            years,
            language,
            webhook,
            linked_report,
            linked_reports,
        } => {
            app.create_report(CreateArgs {
                name,
                report_type,
                template,
                break_at,
                months,
                years,
                language,
                webhook,
                linked_report,
                linked_reports,
            })
            .await
        }
        Command::Watch { interval, template } => app.watch(interval, template).await,
    }
}
