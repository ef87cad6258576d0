//! Output formatting for audit reports

use crate::audit::AuditReport;
use crate::classify::{Bucket, ClassifiedAccount};
use crate::lastlog::LoginRecord;
use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tabled::{Table, Tabled};

/// Output format enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Machine-readable JSON
    Json,
    /// One table row per account
    Table,
}

/// Render the report and write it to `output_path` or stdout
pub fn write_report(
    report: &AuditReport,
    format: OutputFormat,
    output_path: Option<&Path>,
) -> Result<()> {
    let output = format_report(report, format)?;

    match output_path {
        Some(path) => std::fs::write(path, &output)?,
        None => emit(io::stdout().lock(), &output)?,
    }

    Ok(())
}

/// Write rendered output; a closed pipe is returned as an error
fn emit<W: Write>(mut out: W, output: &str) -> io::Result<()> {
    out.write_all(output.as_bytes())?;
    out.flush()
}

pub fn format_report(report: &AuditReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => format_text(report),
        OutputFormat::Json => format_json(report)?,
        OutputFormat::Table => format_table(report),
    })
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        "day"
    } else {
        "days"
    }
}

fn last_login_label(entry: &ClassifiedAccount) -> String {
    match &entry.record {
        LoginRecord::Timestamp(login) => login.to_string(),
        LoginRecord::Never => "never".to_string(),
        LoginRecord::Unparseable(_) => "unknown".to_string(),
    }
}

fn note(entry: &ClassifiedAccount) -> Option<&str> {
    match &entry.record {
        LoginRecord::Unparseable(reason) => Some(reason),
        _ => None,
    }
}

/// Format as human-readable text
fn format_text(report: &AuditReport) -> String {
    let mut output = String::new();
    let rule = "=".repeat(60);

    output.push_str(&format!("\n{}\n", "INACTIVE ACCOUNT AUDIT".bold().underline()));
    output.push_str(&format!(
        "Threshold: {} days (cutoff {})\n",
        report.inactive_days,
        report.cutoff.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!("Accounts checked: {}\n\n", report.accounts.len()));

    if report.accounts.is_empty() {
        output.push_str(&format!(
            "{} No accounts matched the audit policy\n",
            "[!]".yellow()
        ));
        return output;
    }

    let groups = report.groups();

    if groups.inactive.is_empty() {
        output.push_str(&format!("{} No inactive accounts found\n\n", "[+]".green()));
    } else {
        output.push_str(&format!(
            "{} INACTIVE ACCOUNTS (> {} days):\n\n",
            "[!]".red().bold(),
            report.inactive_days
        ));
        for entry in &groups.inactive {
            let days = entry.days.unwrap_or_default();
            output.push_str(&format!("  {}\n", entry.name().red()));
            output.push_str(&format!("     Last login:   {}\n", last_login_label(entry)));
            output.push_str(&format!("     Inactive for: {} {}\n\n", days, plural(days)));
        }
    }

    if !groups.never.is_empty() {
        output.push_str(&format!(
            "{} ACCOUNTS THAT NEVER LOGGED IN:\n\n",
            "[!]".yellow().bold()
        ));
        for entry in &groups.never {
            match note(entry) {
                Some(reason) => output.push_str(&format!(
                    "  {} {}\n",
                    entry.name().yellow(),
                    format!("(login record unreadable: {})", reason).dimmed()
                )),
                None => output.push_str(&format!("  {}\n", entry.name().yellow())),
            }
        }
        output.push('\n');
    }

    if !groups.active.is_empty() {
        output.push_str(&format!(
            "{} ACTIVE ACCOUNTS (last {} days):\n\n",
            "[+]".green().bold(),
            report.inactive_days
        ));
        for entry in &groups.active {
            let days = entry.days.unwrap_or_default();
            output.push_str(&format!("  {}\n", entry.name().green()));
            output.push_str(&format!("     Last login: {}\n", last_login_label(entry)));
            output.push_str(&format!("     ({} {} ago)\n\n", days, plural(days)));
        }
    }

    output.push_str(&format!("{}\n", rule));
    output.push_str(&format!("{}\n", "SUMMARY:".bold()));
    output.push_str(&format!("  Total accounts:  {}\n", report.accounts.len()));
    output.push_str(&format!("  Active:          {}\n", groups.active.len()));
    output.push_str(&format!("  Inactive:        {}\n", groups.inactive.len()));
    output.push_str(&format!("  Never logged in: {}\n", groups.never.len()));
    output.push_str(&format!("{}\n\n", rule));

    if report.needs_attention() {
        output.push_str(&format!("{}\n\n", "RECOMMENDATIONS:".cyan().bold()));
        if !groups.inactive.is_empty() {
            output.push_str("  Inactive accounts:\n");
            output.push_str("  - Confirm the account still needs access\n");
            output.push_str("  - Lock it: sudo usermod -L <user>\n");
            output.push_str("  - Or remove it: sudo userdel <user>\n\n");
        }
        if !groups.never.is_empty() {
            output.push_str("  Accounts that never logged in:\n");
            output.push_str("  - May have been created and never used\n");
            output.push_str("  - Remove them if they are not needed\n\n");
        }
    }

    output
}

/// Format as JSON
fn format_json(report: &AuditReport) -> Result<String> {
    #[derive(Serialize)]
    struct Report<'a> {
        generated_at: DateTime<Utc>,
        inactive_days: u32,
        cutoff: DateTime<Utc>,
        summary: Summary,
        accounts: Vec<Entry<'a>>,
    }

    #[derive(Serialize)]
    struct Summary {
        total: usize,
        active: usize,
        inactive: usize,
        never_logged_in: usize,
    }

    #[derive(Serialize)]
    struct Entry<'a> {
        name: &'a str,
        uid: u32,
        status: Bucket,
        last_login: Option<String>,
        days: Option<i64>,
        note: Option<&'a str>,
    }

    let groups = report.groups();
    let accounts = groups
        .inactive
        .iter()
        .chain(&groups.never)
        .chain(&groups.active)
        .map(|entry| Entry {
            name: entry.name(),
            uid: entry.account.uid,
            status: entry.bucket,
            last_login: entry.record.last_login().map(|l| l.to_string()),
            days: entry.days,
            note: note(entry),
        })
        .collect();

    let out = Report {
        generated_at: report.now,
        inactive_days: report.inactive_days,
        cutoff: report.cutoff,
        summary: Summary {
            total: report.accounts.len(),
            active: groups.active.len(),
            inactive: groups.inactive.len(),
            never_logged_in: groups.never.len(),
        },
        accounts,
    };

    Ok(format!("{}\n", serde_json::to_string_pretty(&out)?))
}

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "UID")]
    uid: u32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Last Login")]
    last_login: String,
    #[tabled(rename = "Days")]
    days: String,
}

/// Format as a table
fn format_table(report: &AuditReport) -> String {
    let groups = report.groups();
    let rows: Vec<AccountRow> = groups
        .inactive
        .iter()
        .chain(&groups.never)
        .chain(&groups.active)
        .map(|entry| AccountRow {
            user: entry.name().to_string(),
            uid: entry.account.uid,
            status: entry.bucket.to_string(),
            last_login: last_login_label(entry),
            days: entry.days.map_or("-".to_string(), |d| d.to_string()),
        })
        .collect();

    format!(
        "{}\n{} inactive, {} never logged in, {} active (threshold {} days)\n",
        Table::new(&rows),
        groups.inactive.len(),
        groups.never.len(),
        groups.active.len(),
        report.inactive_days
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::tests::{account, days_ago, now, sample_report, FakeHistory};
    use crate::audit::audit_accounts;
    use crate::classify::Classifier;

    fn plain(report: &AuditReport, format: OutputFormat) -> String {
        colored::control::set_override(false);
        format_report(report, format).unwrap()
    }

    #[tokio::test]
    async fn test_text_sections_in_order() {
        let report = sample_report().await;
        let text = plain(&report, OutputFormat::Text);

        let dave = text.find("  dave").unwrap();
        let alice = text.find("  alice").unwrap();
        let carol = text.find("  carol").unwrap();
        let erin = text.find("  erin").unwrap();
        let bob = text.find("  bob").unwrap();
        assert!(dave < alice && alice < carol && carol < erin && erin < bob);

        assert!(text.contains("Inactive for: 90 days"));
        assert!(text.contains("Inactive for: 20 days"));
        assert!(text.contains("(2 days ago)"));
        assert!(text.contains("ghost (login record unreadable"));
        assert!(text.contains("Total accounts:  6"));
        assert!(text.contains("Inactive:        2"));
        assert!(text.contains("sudo usermod -L <user>"));
    }

    #[tokio::test]
    async fn test_text_all_active_has_no_recommendations() {
        let history = FakeHistory::new(&[("bob", days_ago(1))]);
        let report =
            audit_accounts(vec![account("bob", 1000)], &history, &Classifier::new(now(), 15)).await;
        let text = plain(&report, OutputFormat::Text);

        assert!(text.contains("No inactive accounts found"));
        assert!(text.contains("(1 day ago)"));
        assert!(!text.contains("RECOMMENDATIONS"));
    }

    #[tokio::test]
    async fn test_text_empty_report() {
        let history = FakeHistory::new(&[]);
        let report = audit_accounts(Vec::new(), &history, &Classifier::new(now(), 15)).await;
        let text = plain(&report, OutputFormat::Text);

        assert!(text.contains("No accounts matched the audit policy"));
        assert!(!text.contains("SUMMARY"));
    }

    #[tokio::test]
    async fn test_json_report() {
        let report = sample_report().await;
        let json: serde_json::Value =
            serde_json::from_str(&plain(&report, OutputFormat::Json)).unwrap();

        assert_eq!(json["inactive_days"], 15);
        assert_eq!(json["summary"]["total"], 6);
        assert_eq!(json["summary"]["never_logged_in"], 2);

        let accounts = json["accounts"].as_array().unwrap();
        assert_eq!(accounts[0]["name"], "dave");
        assert_eq!(accounts[0]["status"], "inactive");
        assert_eq!(accounts[0]["days"], 90);
        let ghost = accounts.iter().find(|a| a["name"] == "ghost").unwrap();
        assert_eq!(ghost["status"], "never_logged_in");
        assert!(ghost["note"].as_str().unwrap().contains("Unknown user"));
    }

    #[tokio::test]
    async fn test_table_report() {
        let report = sample_report().await;
        let table = plain(&report, OutputFormat::Table);

        assert!(table.contains("Last Login"));
        assert!(table.contains("Never logged in"));
        assert!(table.contains("2 inactive, 2 never logged in, 2 active"));
    }

    #[tokio::test]
    async fn test_write_report_to_file() {
        let report = sample_report().await;
        let file = tempfile::NamedTempFile::new().unwrap();

        write_report(&report, OutputFormat::Json, Some(file.path())).unwrap();
        let written = std::fs::read_to_string(file.path()).unwrap();
        assert!(written.contains("\"summary\""));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_closed_pipe_is_an_error() {
        let err = emit(ClosedPipe, "report\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let mut buf = Vec::new();
        emit(&mut buf, "report\n").unwrap();
        assert_eq!(buf, b"report\n");
    }
}
