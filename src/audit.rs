//! Sequential audit of eligible accounts

use crate::accounts::Account;
use crate::classify::{Bucket, ClassifiedAccount, Classifier};
use crate::lastlog::{LoginHistory, LoginRecord};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

/// Exit code when no account is inactive
pub const EXIT_OK: i32 = 0;
/// Exit code when at least one account is inactive
pub const EXIT_INACTIVE: i32 = 1;

/// Outcome of one audit run
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub inactive_days: u32,
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
    /// Classified accounts in enumeration order
    pub accounts: Vec<ClassifiedAccount>,
}

/// Accounts grouped by bucket, in report order
#[derive(Debug)]
pub struct Groups<'a> {
    /// Most inactive first
    pub inactive: Vec<&'a ClassifiedAccount>,
    /// Enumeration order
    pub never: Vec<&'a ClassifiedAccount>,
    /// Most recently active first
    pub active: Vec<&'a ClassifiedAccount>,
}

impl AuditReport {
    pub fn new(classifier: &Classifier, accounts: Vec<ClassifiedAccount>) -> Self {
        Self {
            inactive_days: classifier.inactive_days(),
            now: classifier.now(),
            cutoff: classifier.cutoff(),
            accounts,
        }
    }

    pub fn count(&self, bucket: Bucket) -> usize {
        self.accounts.iter().filter(|a| a.bucket == bucket).count()
    }

    pub fn has_inactive(&self) -> bool {
        self.accounts.iter().any(|a| a.bucket == Bucket::Inactive)
    }

    /// Whether any account needs review
    pub fn needs_attention(&self) -> bool {
        self.accounts.iter().any(|a| a.bucket != Bucket::Active)
    }

    pub fn exit_code(&self) -> i32 {
        if self.has_inactive() {
            EXIT_INACTIVE
        } else {
            EXIT_OK
        }
    }

    pub fn groups(&self) -> Groups<'_> {
        let pick = |bucket: Bucket| {
            let mut picked: Vec<&ClassifiedAccount> =
                self.accounts.iter().filter(|a| a.bucket == bucket).collect();
            picked.sort_by(|a, b| a.name().cmp(b.name()));
            picked
        };

        // Sort on the login instant; day counts are floored and tie too often
        let mut inactive = pick(Bucket::Inactive);
        inactive.sort_by_key(|a| a.last_login_utc());

        let mut active = pick(Bucket::Active);
        active.sort_by(|a, b| b.last_login_utc().cmp(&a.last_login_utc()));

        let never = self
            .accounts
            .iter()
            .filter(|a| a.bucket == Bucket::NeverLoggedIn)
            .collect();

        Groups {
            inactive,
            never,
            active,
        }
    }
}

/// Look up and classify each account, one lookup at a time
///
/// A failed lookup is logged and recorded as unparseable; it never stops
/// the scan.
pub async fn audit_accounts<H>(
    accounts: Vec<Account>,
    history: &H,
    classifier: &Classifier,
) -> AuditReport
where
    H: LoginHistory + ?Sized,
{
    info!(
        "Checking {} account(s) with {} (cutoff {})",
        accounts.len(),
        history.name(),
        classifier.cutoff().format("%Y-%m-%d %H:%M:%S UTC")
    );

    let mut classified = Vec::with_capacity(accounts.len());

    for account in accounts {
        let record = match history.last_login(&account.name).await {
            Ok(record) => record,
            Err(e) => {
                let what = if e.is_execution_error() {
                    "Failed to check"
                } else {
                    "Unreadable login record for"
                };
                warn!("{} {}: {}", what, account.name, e);
                LoginRecord::Unparseable(e.to_string())
            }
        };

        let entry = classifier.classify(account, record);
        debug!("{}: {} ({:?} days)", entry.name(), entry.bucket, entry.days);
        classified.push(entry);
    }

    AuditReport::new(classifier, classified)
}
