//! Local account enumeration
//!
//! Reads the passwd-format account database and keeps only interactive,
//! non-system accounts.

use crate::config::AuditConfig;
use crate::error::{AuditError, AuditResult};
use log::{debug, error};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A local account eligible for the audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub name: String,
    pub uid: u32,
    pub gid: u32,
    pub home: String,
    pub shell: String,
}

/// Inclusion rules applied to every passwd entry
#[derive(Debug, Clone)]
pub struct AccountPolicy {
    pub min_uid: u32,
    pub denied_shells: Vec<String>,
}

impl AccountPolicy {
    pub fn new(min_uid: u32, denied_shells: Vec<String>) -> Self {
        Self {
            min_uid,
            denied_shells,
        }
    }

    /// Shells such as /usr/sbin/nologin or /bin/false deny interactive logins
    pub fn is_denied_shell(&self, shell: &str) -> bool {
        self.denied_shells.iter().any(|deny| shell.contains(deny.as_str()))
    }

    pub fn admits(&self, account: &Account) -> bool {
        account.uid >= self.min_uid && !self.is_denied_shell(&account.shell)
    }
}

impl From<&AuditConfig> for AccountPolicy {
    fn from(config: &AuditConfig) -> Self {
        Self::new(config.min_uid, config.denied_shells.clone())
    }
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self::from(&AuditConfig::default())
    }
}

/// Parse one passwd line (name:passwd:uid:gid:gecos:home:shell)
fn parse_passwd_line(line: &str) -> Option<Account> {
    let parts: Vec<&str> = line.split(':').collect();
    if parts.len() < 7 {
        return None;
    }

    Some(Account {
        name: parts[0].to_string(),
        uid: parts[2].parse().ok()?,
        gid: parts[3].parse().ok()?,
        home: parts[5].to_string(),
        shell: parts[6].to_string(),
    })
}

/// Read eligible accounts from a passwd-format source, keeping source order
pub fn parse_passwd<R: BufRead>(reader: R, policy: &AccountPolicy) -> AuditResult<Vec<Account>> {
    let mut accounts = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let Some(account) = parse_passwd_line(trimmed) else {
            debug!("Skipping malformed passwd entry: {}", trimmed);
            continue;
        };

        if !policy.admits(&account) {
            debug!(
                "Skipping {} (uid {}, shell {})",
                account.name, account.uid, account.shell
            );
            continue;
        }

        accounts.push(account);
    }

    Ok(accounts)
}

/// Load eligible accounts from the account database at `path`
pub fn load_accounts(path: &Path, policy: &AccountPolicy) -> AuditResult<Vec<Account>> {
    let file = File::open(path).map_err(|source| AuditError::AccountDatabase {
        path: path.to_path_buf(),
        source,
    })?;

    parse_passwd(BufReader::new(file), policy)
}

/// Enumerate accounts, treating an unreadable database as "nothing to check"
pub fn enumerate(path: &Path, policy: &AccountPolicy) -> Vec<Account> {
    match load_accounts(path, policy) {
        Ok(accounts) => {
            debug!("Found {} eligible accounts in {}", accounts.len(), path.display());
            accounts
        }
        Err(e) => {
            error!("Failed to list accounts: {}", e);
            Vec::new()
        }
    }
}
