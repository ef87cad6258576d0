//! Activity classification against the inactivity cutoff

use crate::accounts::Account;
use crate::lastlog::LoginRecord;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// Activity bucket of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Active,
    Inactive,
    NeverLoggedIn,
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Bucket::Active => "Active",
            Bucket::Inactive => "Inactive",
            Bucket::NeverLoggedIn => "Never logged in",
        };
        write!(f, "{}", label)
    }
}

/// An account together with its login record and bucket
#[derive(Debug, Clone)]
pub struct ClassifiedAccount {
    pub account: Account,
    pub record: LoginRecord,
    pub bucket: Bucket,
    /// Whole days since the last login, when one is known
    pub days: Option<i64>,
}

impl ClassifiedAccount {
    pub fn name(&self) -> &str {
        &self.account.name
    }

    pub fn last_login_utc(&self) -> Option<DateTime<Utc>> {
        self.record.last_login().map(|login| login.to_utc())
    }
}

/// Classifies login records relative to a fixed "now"
#[derive(Debug, Clone, Copy)]
pub struct Classifier {
    now: DateTime<Utc>,
    inactive_days: u32,
    cutoff: DateTime<Utc>,
}

impl Classifier {
    pub fn new(now: DateTime<Utc>, inactive_days: u32) -> Self {
        Self {
            now,
            inactive_days,
            cutoff: now
                .checked_sub_signed(Duration::days(i64::from(inactive_days)))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    pub fn inactive_days(&self) -> u32 {
        self.inactive_days
    }

    /// Bucket and day count for a record
    pub fn bucket(&self, record: &LoginRecord) -> (Bucket, Option<i64>) {
        let Some(login) = record.last_login() else {
            return (Bucket::NeverLoggedIn, None);
        };

        let at = login.to_utc();
        // Positive spans only, so num_days() is the floor
        let days = (self.now - at).num_days();

        if at >= self.cutoff {
            (Bucket::Active, Some(days.max(0)))
        } else {
            (Bucket::Inactive, Some(days))
        }
    }

    pub fn classify(&self, account: Account, record: LoginRecord) -> ClassifiedAccount {
        let (bucket, days) = self.bucket(&record);
        ClassifiedAccount {
            account,
            record,
            bucket,
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lastlog::LastLogin;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn at(dt: DateTime<Utc>) -> LoginRecord {
        LoginRecord::Timestamp(LastLogin::Zoned(dt.fixed_offset()))
    }

    #[test]
    fn test_inactive_after_threshold() {
        let classifier = Classifier::new(now(), 15);
        let record = at(now() - Duration::days(20));
        assert_eq!(classifier.bucket(&record), (Bucket::Inactive, Some(20)));
    }

    #[test]
    fn test_active_within_threshold() {
        let classifier = Classifier::new(now(), 15);
        let record = at(now() - Duration::days(2));
        assert_eq!(classifier.bucket(&record), (Bucket::Active, Some(2)));
    }

    #[test]
    fn test_cutoff_boundary_is_active() {
        let classifier = Classifier::new(now(), 15);
        assert_eq!(classifier.cutoff(), now() - Duration::days(15));

        let record = at(classifier.cutoff());
        assert_eq!(classifier.bucket(&record), (Bucket::Active, Some(15)));

        let record = at(classifier.cutoff() - Duration::seconds(1));
        assert_eq!(classifier.bucket(&record), (Bucket::Inactive, Some(15)));
    }

    #[test]
    fn test_days_are_floored() {
        let classifier = Classifier::new(now(), 15);
        let record = at(now() - Duration::days(40) - Duration::hours(23));
        assert_eq!(classifier.bucket(&record), (Bucket::Inactive, Some(40)));
    }

    #[test]
    fn test_days_use_utc_offset() {
        // 2026-02-08 09:00 at -0300 is 12:00 UTC, 30 days before now()
        let login = chrono::DateTime::parse_from_rfc3339("2026-02-08T09:00:00-03:00").unwrap();
        let record = LoginRecord::Timestamp(LastLogin::Zoned(login));
        let classifier = Classifier::new(now(), 15);
        assert_eq!(classifier.bucket(&record), (Bucket::Inactive, Some(30)));
    }

    #[test]
    fn test_future_login_counts_as_today() {
        let classifier = Classifier::new(now(), 15);
        let record = at(now() + Duration::days(3));
        assert_eq!(classifier.bucket(&record), (Bucket::Active, Some(0)));
    }

    #[test]
    fn test_huge_threshold_saturates() {
        let classifier = Classifier::new(now(), u32::MAX);
        assert_eq!(classifier.cutoff(), DateTime::<Utc>::MIN_UTC);
        assert_eq!(classifier.bucket(&at(now() - Duration::days(3650))).0, Bucket::Active);
    }

    #[test]
    fn test_never_and_unparseable() {
        let classifier = Classifier::new(now(), 15);
        assert_eq!(
            classifier.bucket(&LoginRecord::Never),
            (Bucket::NeverLoggedIn, None)
        );
        assert_eq!(
            classifier.bucket(&LoginRecord::Unparseable("timed out".to_string())),
            (Bucket::NeverLoggedIn, None)
        );
    }
}
