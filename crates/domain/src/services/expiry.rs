//! Time-based account expiry.
//!
//! Every approved account is measured against three thresholds counted
//! from `approved_at`. Past the delete threshold the account is removed;
//! past the deactivate threshold an active account becomes inactive; past
//! the warn threshold an active, not yet warned account gets a warning
//! popup and email. Comparisons are inclusive, so an account sitting exactly
//! on a threshold falls into the longer-elapsed bucket.

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::notification::{AccountNotice, Mailer, NoticeKind};
use super::store::{AccountStore, StoreError};
use crate::models::{Account, AccountStatus, NewPopup};

pub const DEFAULT_WARN_AFTER_DAYS: i64 = 120;
pub const DEFAULT_DEACTIVATE_AFTER_DAYS: i64 = 150;
pub const DEFAULT_DELETE_AFTER_DAYS: i64 = 180;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("Expiry thresholds must be positive")]
    NonPositive,

    #[error("Expiry thresholds must be strictly increasing (warn < deactivate < delete)")]
    NotIncreasing,
}

/// Day counts after approval at which each action fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryThresholds {
    pub warn_after_days: i64,
    pub deactivate_after_days: i64,
    pub delete_after_days: i64,
}

impl Default for ExpiryThresholds {
    fn default() -> Self {
        Self {
            warn_after_days: DEFAULT_WARN_AFTER_DAYS,
            deactivate_after_days: DEFAULT_DEACTIVATE_AFTER_DAYS,
            delete_after_days: DEFAULT_DELETE_AFTER_DAYS,
        }
    }
}

impl ExpiryThresholds {
    pub fn new(
        warn_after_days: i64,
        deactivate_after_days: i64,
        delete_after_days: i64,
    ) -> Result<Self, ThresholdError> {
        let thresholds = Self {
            warn_after_days,
            deactivate_after_days,
            delete_after_days,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ThresholdError> {
        if self.warn_after_days <= 0 {
            return Err(ThresholdError::NonPositive);
        }
        if self.warn_after_days >= self.deactivate_after_days
            || self.deactivate_after_days >= self.delete_after_days
        {
            return Err(ThresholdError::NotIncreasing);
        }
        Ok(())
    }
}

/// What the sweep does with one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryAction {
    Delete,
    Deactivate,
    Warn,
    Keep,
}

/// Picks the single action for `account` at `now`.
pub fn classify(account: &Account, now: DateTime<Utc>, thresholds: &ExpiryThresholds) -> ExpiryAction {
    let Some(approved_at) = account.approved_at else {
        return ExpiryAction::Keep;
    };
    let is_active = account.status == AccountStatus::Active;

    if approved_at <= now - Duration::days(thresholds.delete_after_days) {
        ExpiryAction::Delete
    } else if approved_at <= now - Duration::days(thresholds.deactivate_after_days) && is_active {
        ExpiryAction::Deactivate
    } else if approved_at <= now - Duration::days(thresholds.warn_after_days)
        && account.warning_sent_at.is_none()
        && is_active
    {
        ExpiryAction::Warn
    } else {
        ExpiryAction::Keep
    }
}

/// Counters produced by one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SweepReport {
    pub warnings_sent: u64,
    pub accounts_deactivated: u64,
    pub accounts_deleted: u64,
    /// Accounts skipped because a store write failed.
    pub failures: u64,
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} warned, {} deactivated, {} deleted",
            self.warnings_sent, self.accounts_deactivated, self.accounts_deleted
        )
    }
}

/// The expiry sweep over injected stores and mailer.
#[derive(Clone)]
pub struct ExpirySweep {
    accounts: Arc<dyn AccountStore>,
    mailer: Arc<dyn Mailer>,
    thresholds: ExpiryThresholds,
}

impl ExpirySweep {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        mailer: Arc<dyn Mailer>,
        thresholds: ExpiryThresholds,
    ) -> Self {
        Self {
            accounts,
            mailer,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &ExpiryThresholds {
        &self.thresholds
    }

    /// Runs one sweep as of `now`.
    ///
    /// Only a failure to load the account list aborts the sweep. Errors on
    /// individual accounts are logged and counted in `failures`.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SweepReport, StoreError> {
        let accounts = self.accounts.list_approved().await?;
        let mut report = SweepReport::default();

        debug!(candidates = accounts.len(), "Starting account expiry sweep");

        for account in accounts {
            let result = match classify(&account, now, &self.thresholds) {
                ExpiryAction::Delete => self.delete(&account, &mut report).await,
                ExpiryAction::Deactivate => self.deactivate(&account, &mut report).await,
                ExpiryAction::Warn => self.warn(&account, now, &mut report).await,
                ExpiryAction::Keep => Ok(()),
            };

            if let Err(e) = result {
                report.failures += 1;
                error!(
                    student_id = %account.id,
                    error = %e,
                    "Failed to process account during expiry sweep"
                );
            }
        }

        info!(
            warned = report.warnings_sent,
            deactivated = report.accounts_deactivated,
            deleted = report.accounts_deleted,
            failures = report.failures,
            "Account expiry sweep finished"
        );

        Ok(report)
    }

    async fn delete(&self, account: &Account, report: &mut SweepReport) -> Result<(), StoreError> {
        if self.accounts.delete_account(account.id).await? {
            report.accounts_deleted += 1;
            info!(student_id = %account.id, username = %account.username, "Deleted expired account");
        } else {
            warn!(student_id = %account.id, "Expired account already gone");
        }
        Ok(())
    }

    async fn deactivate(&self, account: &Account, report: &mut SweepReport) -> Result<(), StoreError> {
        self.accounts
            .update_status(account.id, AccountStatus::Inactive)
            .await?;
        report.accounts_deactivated += 1;
        info!(student_id = %account.id, username = %account.username, "Deactivated expiring account");
        Ok(())
    }

    async fn warn(
        &self,
        account: &Account,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) -> Result<(), StoreError> {
        self.accounts
            .record_warning(account.id, NewPopup::expiry_warning(account.id), now)
            .await?;
        report.warnings_sent += 1;

        self.mailer
            .dispatch(AccountNotice::for_account(NoticeKind::ExpiryWarning, account));
        info!(student_id = %account.id, username = %account.username, "Sent account expiry warning");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::{InMemoryAccountStore, InMemoryPopupStore};
    use crate::services::notification::MockMailer;
    use crate::services::store::{AccountStore, PopupStore};
    use uuid::Uuid;

    struct Harness {
        accounts: Arc<InMemoryAccountStore>,
        popups: Arc<InMemoryPopupStore>,
        mailer: MockMailer,
        sweep: ExpirySweep,
    }

    fn harness_with(popups: InMemoryPopupStore, mailer: MockMailer) -> Harness {
        let popups = Arc::new(popups);
        let accounts = Arc::new(InMemoryAccountStore::with_popups(popups.clone()));
        let sweep = ExpirySweep::new(
            accounts.clone(),
            Arc::new(mailer.clone()),
            ExpiryThresholds::default(),
        );
        Harness {
            accounts,
            popups,
            mailer,
            sweep,
        }
    }

    fn harness() -> Harness {
        harness_with(InMemoryPopupStore::new(), MockMailer::new())
    }

    fn approved(now: DateTime<Utc>, age: Duration) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: format!("student-{}", Uuid::new_v4().simple()),
            email: "student@example.com".to_string(),
            first_name: "Student".to_string(),
            status: AccountStatus::Active,
            approved_at: Some(now - age),
            warning_sent_at: None,
        }
    }

    #[test]
    fn test_default_thresholds() {
        let t = ExpiryThresholds::default();
        assert_eq!((t.warn_after_days, t.deactivate_after_days, t.delete_after_days), (120, 150, 180));
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_threshold_validation() {
        assert_eq!(ExpiryThresholds::new(0, 150, 180), Err(ThresholdError::NonPositive));
        assert_eq!(ExpiryThresholds::new(150, 150, 180), Err(ThresholdError::NotIncreasing));
        assert_eq!(ExpiryThresholds::new(10, 30, 20), Err(ThresholdError::NotIncreasing));
        assert!(ExpiryThresholds::new(1, 2, 3).is_ok());
    }

    #[test]
    fn test_classify_exact_boundaries() {
        let now = Utc::now();
        let t = ExpiryThresholds::default();

        assert_eq!(classify(&approved(now, Duration::days(180)), now, &t), ExpiryAction::Delete);
        assert_eq!(classify(&approved(now, Duration::days(150)), now, &t), ExpiryAction::Deactivate);
        assert_eq!(classify(&approved(now, Duration::days(120)), now, &t), ExpiryAction::Warn);

        let just_under = Duration::days(120) - Duration::seconds(1);
        assert_eq!(classify(&approved(now, just_under), now, &t), ExpiryAction::Keep);
        let before_delete = Duration::days(180) - Duration::seconds(1);
        assert_eq!(classify(&approved(now, before_delete), now, &t), ExpiryAction::Deactivate);
    }

    #[test]
    fn test_classify_respects_status_and_warning() {
        let now = Utc::now();
        let t = ExpiryThresholds::default();

        let mut inactive = approved(now, Duration::days(160));
        inactive.status = AccountStatus::Inactive;
        assert_eq!(classify(&inactive, now, &t), ExpiryAction::Keep);

        let mut warned = approved(now, Duration::days(121));
        warned.warning_sent_at = Some(now - Duration::days(1));
        assert_eq!(classify(&warned, now, &t), ExpiryAction::Keep);

        let mut rejected = approved(now, Duration::days(185));
        rejected.status = AccountStatus::Rejected;
        assert_eq!(classify(&rejected, now, &t), ExpiryAction::Delete);

        let mut never_approved = approved(now, Duration::days(400));
        never_approved.approved_at = None;
        assert_eq!(classify(&never_approved, now, &t), ExpiryAction::Keep);
    }

    #[tokio::test]
    async fn test_sweep_deletes_after_181_days() {
        let now = Utc::now();
        let h = harness();
        let account = approved(now, Duration::days(181));
        h.accounts.insert(account.clone());

        let report = h.sweep.run(now).await.unwrap();

        assert_eq!(report.accounts_deleted, 1);
        assert_eq!(report.accounts_deactivated, 0);
        assert!(h.accounts.get(account.id).is_none());
    }

    #[tokio::test]
    async fn test_sweep_deactivates_once() {
        let now = Utc::now();
        let h = harness();
        let account = approved(now, Duration::days(151));
        h.accounts.insert(account.clone());

        let first = h.sweep.run(now).await.unwrap();
        let second = h.sweep.run(now).await.unwrap();

        assert_eq!(first.accounts_deactivated, 1);
        assert_eq!(second, SweepReport::default());
        assert_eq!(h.accounts.get(account.id).unwrap().status, AccountStatus::Inactive);
    }

    #[tokio::test]
    async fn test_sweep_warns_once() {
        let now = Utc::now();
        let h = harness();
        let account = approved(now, Duration::days(121));
        h.accounts.insert(account.clone());

        let first = h.sweep.run(now).await.unwrap();
        assert_eq!(first.warnings_sent, 1);
        let stored = h.accounts.get(account.id).unwrap();
        assert_eq!(stored.warning_sent_at, Some(now));
        assert_eq!(stored.status, AccountStatus::Active);
        assert_eq!(h.popups.popups_for(account.id).len(), 1);
        assert_eq!(h.mailer.sent().len(), 1);
        assert_eq!(h.mailer.sent()[0].kind, NoticeKind::ExpiryWarning);

        let second = h.sweep.run(now).await.unwrap();
        assert_eq!(second, SweepReport::default());
        assert_eq!(h.popups.popups_for(account.id).len(), 1);
        assert_eq!(h.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_skips_already_warned() {
        let now = Utc::now();
        let h = harness();
        let mut account = approved(now, Duration::days(121));
        account.warning_sent_at = Some(now - Duration::hours(5));
        h.accounts.insert(account.clone());

        let report = h.sweep.run(now).await.unwrap();

        assert_eq!(report, SweepReport::default());
        assert!(h.popups.popups().is_empty());
    }

    #[tokio::test]
    async fn test_sweep_179_days_deactivates_without_deleting() {
        let now = Utc::now();
        let h = harness();
        let account = approved(now, Duration::days(179));
        h.accounts.insert(account.clone());

        let report = h.sweep.run(now).await.unwrap();

        assert_eq!(report.accounts_deactivated, 1);
        assert_eq!(report.accounts_deleted, 0);
        assert_eq!(report.warnings_sent, 0);
        assert_eq!(h.accounts.get(account.id).unwrap().status, AccountStatus::Inactive);
    }

    #[tokio::test]
    async fn test_sweep_mixed_population() {
        let now = Utc::now();
        let h = harness();
        let fresh = approved(now, Duration::days(30));
        for account in [
            approved(now, Duration::days(200)),
            approved(now, Duration::days(190)),
            approved(now, Duration::days(155)),
            approved(now, Duration::days(125)),
            fresh.clone(),
        ] {
            h.accounts.insert(account);
        }

        let report = h.sweep.run(now).await.unwrap();

        assert_eq!(report.accounts_deleted, 2);
        assert_eq!(report.accounts_deactivated, 1);
        assert_eq!(report.warnings_sent, 1);
        assert_eq!(report.failures, 0);
        assert_eq!(report.to_string(), "1 warned, 1 deactivated, 2 deleted");
        assert_eq!(h.accounts.get(fresh.id), Some(fresh));
    }

    #[tokio::test]
    async fn test_mail_failure_does_not_change_counters() {
        let now = Utc::now();
        let h = harness_with(InMemoryPopupStore::new(), MockMailer::failing());
        let account = approved(now, Duration::days(121));
        h.accounts.insert(account.clone());

        let report = h.sweep.run(now).await.unwrap();

        assert_eq!(report.warnings_sent, 1);
        assert!(h.mailer.sent().is_empty());
        assert!(h.accounts.get(account.id).unwrap().warning_sent_at.is_some());
        assert_eq!(h.popups.popups_for(account.id).len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_stop_sweep() {
        let now = Utc::now();
        let h = harness();
        let broken = approved(now, Duration::days(151));
        let healthy = approved(now, Duration::days(152));
        let doomed = approved(now, Duration::days(181));
        h.accounts.insert(broken.clone());
        h.accounts.insert(healthy.clone());
        h.accounts.insert(doomed.clone());
        h.accounts.fail_updates_for(broken.id);

        let report = h.sweep.run(now).await.unwrap();

        assert_eq!(report.failures, 1);
        assert_eq!(report.accounts_deactivated, 1);
        assert_eq!(report.accounts_deleted, 1);
        assert_eq!(h.accounts.get(broken.id).unwrap().status, AccountStatus::Active);
        assert_eq!(h.accounts.get(healthy.id).unwrap().status, AccountStatus::Inactive);
    }

    #[tokio::test]
    async fn test_popup_failure_leaves_account_unwarned() {
        let now = Utc::now();
        let h = harness_with(InMemoryPopupStore::failing_creates(), MockMailer::new());
        let account = approved(now, Duration::days(121));
        h.accounts.insert(account.clone());

        let report = h.sweep.run(now).await.unwrap();

        assert_eq!(report.warnings_sent, 0);
        assert_eq!(report.failures, 1);
        assert!(h.accounts.get(account.id).unwrap().warning_sent_at.is_none());
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_failed_warning_write_leaves_no_popup() {
        let now = Utc::now();
        let h = harness();
        let account = approved(now, Duration::days(121));
        h.accounts.insert(account.clone());
        h.accounts.fail_updates_for(account.id);

        let first = h.sweep.run(now).await.unwrap();
        let second = h.sweep.run(now).await.unwrap();

        assert_eq!(first.failures, 1);
        assert_eq!(second.failures, 1);
        assert_eq!(first.warnings_sent + second.warnings_sent, 0);
        assert!(h.popups.popups_for(account.id).is_empty());
        assert!(h.accounts.get(account.id).unwrap().warning_sent_at.is_none());
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_account_warned_elsewhere_is_not_warned_twice() {
        let now = Utc::now();
        let h = harness();
        let account = approved(now, Duration::days(121));
        h.accounts.insert(account.clone());
        h.accounts
            .record_warning(account.id, NewPopup::expiry_warning(account.id), now)
            .await
            .unwrap();

        // The sweep classifies from a stale snapshot; the store refuses the repeat.
        let outcome = h.sweep.warn(&account, now, &mut SweepReport::default()).await;

        assert!(matches!(outcome, Err(StoreError::NotFound(_))));
        assert_eq!(h.popups.popups_for(account.id).len(), 1);
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_warning_popup_visible_to_recipient() {
        let now = Utc::now();
        let h = harness();
        let account = approved(now, Duration::days(121));
        h.accounts.insert(account.clone());
        h.sweep.run(now).await.unwrap();

        let candidates = h.popups.candidates_for(account.id, now).await.unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(!candidates[0].seen);
    }
}
