//! Inactive Users - Account Inactivity Audit
//!
//! Flags local accounts that have not logged in within the configured
//! number of days.
//!
//! Exit codes: 0 when no account is inactive, 1 when at least one is (or on
//! a fatal error), 130 when interrupted.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use colored::Colorize;
use inactive_users::accounts::{self, AccountPolicy};
use inactive_users::audit;
use inactive_users::classify::Classifier;
use inactive_users::config::{self, Config};
use inactive_users::lastlog::Lastlog;
use inactive_users::output::{self, OutputFormat};
use log::{debug, error, info};
use std::path::PathBuf;
use tokio::signal;

/// Exit code for configuration or output failures
const EXIT_FATAL: i32 = 1;
/// Exit code after Ctrl+C (128 + SIGINT)
const EXIT_INTERRUPTED: i32 = 130;

/// Inactive Users - flag accounts with no recent login
#[derive(Parser)]
#[command(name = "inactive-users")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Days without login before an account is flagged
    #[arg(short, long)]
    days: Option<u32>,

    /// Minimum UID of audited accounts
    #[arg(long)]
    min_uid: Option<u32>,

    /// Account database in passwd format
    #[arg(long)]
    passwd: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print a sample configuration file and exit
    #[arg(long)]
    sample_config: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_secs()
        .init();

    let outcome = tokio::select! {
        result = run(cli) => Outcome::Finished(result),
        Ok(()) = signal::ctrl_c() => Outcome::Interrupted,
    };

    std::process::exit(exit_code(outcome));
}

/// How the audit run ended
enum Outcome {
    Finished(Result<i32>),
    Interrupted,
}

/// Report the outcome on stderr when needed and map it to a process exit code
fn exit_code(outcome: Outcome) -> i32 {
    match outcome {
        Outcome::Finished(Ok(code)) => code,
        Outcome::Finished(Err(e)) => {
            error!("Audit failed: {:#}", e);
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            EXIT_FATAL
        }
        Outcome::Interrupted => {
            eprintln!("\n{}", "[!] Audit interrupted by user".yellow());
            EXIT_INTERRUPTED
        }
    }
}

/// Build the effective configuration from the config file and CLI overrides
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            config::load(path).context("Failed to load configuration")?
        }
        None => Config::default(),
    };

    if let Some(days) = cli.days {
        config.audit.inactive_days = days;
    }
    if let Some(min_uid) = cli.min_uid {
        config.audit.min_uid = min_uid;
    }
    if let Some(passwd) = &cli.passwd {
        config.audit.passwd_file = passwd.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli) -> Result<i32> {
    if cli.sample_config {
        print!("{}", config::generate_sample());
        return Ok(audit::EXIT_OK);
    }

    let config = load_config(&cli)?;
    let policy = AccountPolicy::from(&config.audit);
    let accounts = accounts::enumerate(&config.audit.passwd_file, &policy);

    if cli.format == OutputFormat::Text && cli.output.is_none() {
        println!("{} Checking {} account(s)...", "[*]".blue(), accounts.len());
    }

    let history = Lastlog::from_config(&config.lookup);
    let classifier = Classifier::new(Utc::now(), config.audit.inactive_days);
    let report = audit::audit_accounts(accounts, &history, &classifier).await;

    output::write_report(&report, cli.format, cli.output.as_deref())
        .context("Failed to write report")?;

    info!(
        "Audit complete: {} checked, exit code {}",
        report.accounts.len(),
        report.exit_code()
    );
    Ok(report.exit_code())
}
