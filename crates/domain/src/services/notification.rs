//! Account notices and the mailer seam.
//!
//! Lifecycle services hand notices to a [`Mailer`] and move on; delivery
//! happens elsewhere and its failures never reach the caller.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::models::Account;

/// Kind of email sent to a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    AccountApproved,
    AccountRejected,
    ExpiryWarning,
    ApplicationApproved,
    ApplicationRejected,
}

impl std::fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeKind::AccountApproved => write!(f, "account_approved"),
            NoticeKind::AccountRejected => write!(f, "account_rejected"),
            NoticeKind::ExpiryWarning => write!(f, "expiry_warning"),
            NoticeKind::ApplicationApproved => write!(f, "application_approved"),
            NoticeKind::ApplicationRejected => write!(f, "application_rejected"),
        }
    }
}

/// An email addressed to one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNotice {
    pub kind: NoticeKind,
    pub recipient_email: String,
    pub recipient_name: String,
    /// Extra text for the template, such as the program name or remarks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AccountNotice {
    pub fn for_account(kind: NoticeKind, account: &Account) -> Self {
        Self {
            kind,
            recipient_email: account.email.clone(),
            recipient_name: account.first_name.clone(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Best-effort email dispatch. Never blocks on delivery and never fails.
pub trait Mailer: Send + Sync {
    fn dispatch(&self, notice: AccountNotice);
}

/// Mailer that records notices instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct MockMailer {
    /// Whether to simulate transport failures.
    pub simulate_failure: bool,
    sent: Arc<Mutex<Vec<AccountNotice>>>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Notices delivered so far.
    pub fn sent(&self) -> Vec<AccountNotice> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Mailer for MockMailer {
    fn dispatch(&self, notice: AccountNotice) {
        if self.simulate_failure {
            tracing::warn!(
                kind = %notice.kind,
                recipient = %notice.recipient_email,
                "Mock mailer simulating failure"
            );
            return;
        }

        tracing::info!(
            kind = %notice.kind,
            recipient = %notice.recipient_email,
            "Mock: Would send email"
        );
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notice);
        }
    }
}
