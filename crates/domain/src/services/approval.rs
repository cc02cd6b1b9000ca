//! Admin approval and manual status changes.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::notification::{AccountNotice, Mailer, NoticeKind};
use super::store::{AccountStore, StoreError};
use crate::models::{Account, AccountStatus, LifecycleChange};

/// Admin decision on a student account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalAction {
    Approve,
    Reject,
}

impl ApprovalAction {
    pub fn target_status(&self) -> AccountStatus {
        match self {
            ApprovalAction::Approve => AccountStatus::Active,
            ApprovalAction::Reject => AccountStatus::Rejected,
        }
    }

    fn notice_kind(&self) -> NoticeKind {
        match self {
            ApprovalAction::Approve => NoticeKind::AccountApproved,
            ApprovalAction::Reject => NoticeKind::AccountRejected,
        }
    }
}

/// Computes the lifecycle fields after moving `account` to `target`.
///
/// Entering `active` from any other status restarts the expiry clock:
/// `approved_at` becomes `now` and `warning_sent_at` is cleared. Every other
/// transition only changes the status.
pub fn plan_transition(account: &Account, target: AccountStatus, now: DateTime<Utc>) -> LifecycleChange {
    if target == AccountStatus::Active && account.status != AccountStatus::Active {
        LifecycleChange {
            status: AccountStatus::Active,
            approved_at: Some(now),
            warning_sent_at: None,
        }
    } else {
        LifecycleChange {
            status: target,
            approved_at: account.approved_at,
            warning_sent_at: account.warning_sent_at,
        }
    }
}

/// Result of a gate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalOutcome {
    /// The account after the change.
    pub account: Account,
    pub previous_status: AccountStatus,
    /// False when the account was already in the requested state.
    pub changed: bool,
}

/// Applies admin decisions to accounts.
#[derive(Clone)]
pub struct ApprovalGate {
    accounts: Arc<dyn AccountStore>,
    mailer: Arc<dyn Mailer>,
}

impl ApprovalGate {
    pub fn new(accounts: Arc<dyn AccountStore>, mailer: Arc<dyn Mailer>) -> Self {
        Self { accounts, mailer }
    }

    /// Approves or rejects an account and queues the matching email.
    ///
    /// No email is queued when nothing changed.
    pub async fn decide(
        &self,
        id: Uuid,
        action: ApprovalAction,
        now: DateTime<Utc>,
    ) -> Result<ApprovalOutcome, StoreError> {
        let outcome = self.transition(id, action.target_status(), now).await?;

        if outcome.changed {
            self.mailer
                .dispatch(AccountNotice::for_account(action.notice_kind(), &outcome.account));
        }

        Ok(outcome)
    }

    /// Sets any status directly. Sends no email.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: AccountStatus,
        now: DateTime<Utc>,
    ) -> Result<ApprovalOutcome, StoreError> {
        self.transition(id, status, now).await
    }

    async fn transition(
        &self,
        id: Uuid,
        target: AccountStatus,
        now: DateTime<Utc>,
    ) -> Result<ApprovalOutcome, StoreError> {
        let account = self
            .accounts
            .find_account(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("student {}", id)))?;

        let previous_status = account.status;
        let change = plan_transition(&account, target, now);

        if change.is_noop_for(&account) {
            return Ok(ApprovalOutcome {
                account,
                previous_status,
                changed: false,
            });
        }

        self.accounts.apply_change(id, &change).await?;

        info!(
            student_id = %id,
            from = %previous_status,
            to = %change.status,
            "Student account status changed"
        );

        Ok(ApprovalOutcome {
            account: account.with_change(&change),
            previous_status,
            changed: true,
        })
    }
}
