//! Configuration management for the audit

use crate::error::{AuditError, AuditResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest accepted inactivity threshold (about 100 years)
pub const MAX_INACTIVE_DAYS: u32 = 36_500;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Account selection and threshold settings
    #[serde(default)]
    pub audit: AuditConfig,

    /// Login-history lookup settings
    #[serde(default)]
    pub lookup: LookupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Days without login before an account is flagged
    #[serde(default = "default_inactive_days")]
    pub inactive_days: u32,

    /// Accounts below this UID are system accounts and skipped
    #[serde(default = "default_min_uid")]
    pub min_uid: u32,

    /// Shell substrings that mark an account as non-interactive
    #[serde(default = "default_denied_shells")]
    pub denied_shells: Vec<String>,

    /// Path of the passwd-format account database
    #[serde(default = "default_passwd_file")]
    pub passwd_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Login-history command
    #[serde(default = "default_command")]
    pub command: String,

    /// Arguments placed before the username
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Per-lookup timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Locale forced on the lookup command
    #[serde(default = "default_locale")]
    pub locale: String,
}

// Default value functions
fn default_inactive_days() -> u32 { 15 }
fn default_min_uid() -> u32 { 1000 }
fn default_denied_shells() -> Vec<String> { vec!["nologin".to_string(), "false".to_string()] }
fn default_passwd_file() -> PathBuf { PathBuf::from("/etc/passwd") }
fn default_command() -> String { "lastlog".to_string() }
fn default_args() -> Vec<String> { vec!["-u".to_string()] }
fn default_timeout() -> u64 { 5 }
fn default_locale() -> String { "C".to_string() }

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            inactive_days: default_inactive_days(),
            min_uid: default_min_uid(),
            denied_shells: default_denied_shells(),
            passwd_file: default_passwd_file(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            timeout_secs: default_timeout(),
            locale: default_locale(),
        }
    }
}

impl LookupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Reject settings the audit cannot run with
    pub fn validate(&self) -> AuditResult<()> {
        if self.audit.inactive_days > MAX_INACTIVE_DAYS {
            return Err(AuditError::Config(format!(
                "audit.inactive_days must be at most {} (got {})",
                MAX_INACTIVE_DAYS, self.audit.inactive_days
            )));
        }
        if self.lookup.timeout_secs == 0 {
            return Err(AuditError::Config(
                "lookup.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.lookup.command.trim().is_empty() {
            return Err(AuditError::Config("lookup.command is empty".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from a file
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;

    let config: Config = if path.extension().map_or(false, |ext| ext == "json") {
        serde_json::from_str(&content)?
    } else {
        // Assume TOML if not JSON
        toml::from_str(&content)?
    };

    Ok(config)
}

/// Generate a sample configuration file
pub fn generate_sample() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_default()
}
