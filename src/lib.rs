//! # Inactive Users
//!
//! Audits local accounts on a single host and flags those without a login
//! inside a configurable window.
//!
//! ## Pipeline
//!
//! 1. [`accounts`] reads the passwd database and keeps interactive accounts
//!    at or above the minimum UID
//! 2. [`lastlog`] runs `lastlog -u <user>` under the `C` locale, with a
//!    timeout, and parses the date it prints
//! 3. [`classify`] buckets each account as active, inactive or never logged in
//! 4. [`audit`] drives the lookups one account at a time
//! 5. [`output`] renders the report as text, JSON or a table
//!
//! ## Example
//!
//! ```no_run
//! use inactive_users::{accounts, audit, classify::Classifier, lastlog::Lastlog};
//! use std::path::Path;
//!
//! # async fn run() {
//! let accounts = accounts::enumerate(Path::new("/etc/passwd"), &Default::default());
//! let classifier = Classifier::new(chrono::Utc::now(), 15);
//! let report = audit::audit_accounts(accounts, &Lastlog::default(), &classifier).await;
//! std::process::exit(report.exit_code());
//! # }
//! ```

pub mod accounts;
pub mod audit;
pub mod classify;
pub mod config;
pub mod error;
pub mod lastlog;
pub mod output;

pub use accounts::{Account, AccountPolicy};
pub use audit::{audit_accounts, AuditReport};
pub use classify::{Bucket, ClassifiedAccount, Classifier};
pub use config::Config;
pub use error::{AuditError, AuditResult, LookupError};
pub use lastlog::{Lastlog, LastLogin, LoginHistory, LoginRecord};
pub use output::OutputFormat;
