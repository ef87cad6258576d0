//! Login-history lookup
//!
//! Runs `lastlog -u <user>` under a pinned locale and turns its positional
//! text output into a [`LoginRecord`].

use crate::config::LookupConfig;
use crate::error::LookupError;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc};
use log::trace;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Marker printed by lastlog for accounts with no recorded login
pub const NEVER_LOGGED_IN: &str = "**Never logged in**";

/// `Mon Feb 16 22:18:29 -0300 2026`
const ZONED_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";
/// `Mon Feb 16 22:18:29 2026`
const LOCAL_FORMAT: &str = "%a %b %d %H:%M:%S %Y";

/// Environment variables overridden so dates come out unlocalized
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_TIME", "LANG"];

/// Time of the most recent login
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastLogin {
    /// Date printed with a numeric UTC offset
    Zoned(DateTime<FixedOffset>),
    /// Date printed without an offset, in the host's local time
    Local(NaiveDateTime),
}

impl LastLogin {
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            LastLogin::Zoned(dt) => dt.with_timezone(&Utc),
            LastLogin::Local(naive) => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                // Nonexistent local time (DST gap)
                .unwrap_or_else(|| Utc.from_utc_datetime(naive)),
        }
    }
}

impl fmt::Display for LastLogin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastLogin::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S %z")),
            LastLogin::Local(naive) => write!(f, "{}", naive.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Result of looking up one account's login history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRecord {
    Timestamp(LastLogin),
    Never,
    /// The lookup failed or its output could not be read; holds the reason
    Unparseable(String),
}

impl LoginRecord {
    pub fn last_login(&self) -> Option<&LastLogin> {
        match self {
            LoginRecord::Timestamp(login) => Some(login),
            _ => None,
        }
    }
}

/// Parse the trailing date tokens of a lastlog record line
fn parse_record_date(record: &str) -> Option<LastLogin> {
    let tokens: Vec<&str> = record.split_whitespace().collect();
    // First column is the username; Port and From may be empty
    let fields = tokens.get(1..)?;

    if fields.len() >= 6 {
        let date = fields[fields.len() - 6..].join(" ");
        if let Ok(dt) = DateTime::parse_from_str(&date, ZONED_FORMAT) {
            return Some(LastLogin::Zoned(dt));
        }
    }

    if fields.len() >= 5 {
        let date = fields[fields.len() - 5..].join(" ");
        if let Ok(naive) = NaiveDateTime::parse_from_str(&date, LOCAL_FORMAT) {
            return Some(LastLogin::Local(naive));
        }
    }

    None
}

/// Interpret lastlog output: a header line followed by one record line
pub fn parse_lastlog(output: &str) -> Result<LoginRecord, LookupError> {
    let mut lines = output.trim().lines();
    let _header = lines.next();
    let record = lines.next().ok_or(LookupError::MissingRecord)?;

    if record.contains(NEVER_LOGGED_IN) {
        return Ok(LoginRecord::Never);
    }

    parse_record_date(record)
        .map(LoginRecord::Timestamp)
        .ok_or_else(|| LookupError::BadDate(record.trim().to_string()))
}

/// Source of per-account login history
#[async_trait]
pub trait LoginHistory: Send + Sync {
    /// Look up the most recent login of `username`
    async fn last_login(&self, username: &str) -> Result<LoginRecord, LookupError>;

    /// Name of the source, for logging
    fn name(&self) -> &str;
}

/// Login history backed by the `lastlog` command
#[derive(Debug, Clone)]
pub struct Lastlog {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    locale: String,
}

impl Lastlog {
    pub fn new(command: &str) -> Self {
        Self::from_config(&LookupConfig {
            command: command.to_string(),
            ..LookupConfig::default()
        })
    }

    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout: config.timeout(),
            locale: config.locale.clone(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the command for `username` and return its stdout
    async fn query(&self, username: &str) -> Result<String, LookupError> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(username)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for var in LOCALE_VARS {
            cmd.env(var, &self.locale);
        }

        let output = timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))?
            .map_err(|source| LookupError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(LookupError::Failed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for Lastlog {
    fn default() -> Self {
        Self::from_config(&LookupConfig::default())
    }
}

#[async_trait]
impl LoginHistory for Lastlog {
    async fn last_login(&self, username: &str) -> Result<LoginRecord, LookupError> {
        let stdout = self.query(username).await?;
        trace!("{} output for {}: {:?}", self.command, username, stdout);
        parse_lastlog(&stdout)
    }

    fn name(&self) -> &str {
        &self.command
    }
}
