//! Storage seams used by the lifecycle services.
//!
//! The persistence crate implements these traits over Postgres; the
//! in-memory versions in [`super::memory`] back the unit tests.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, AccountStatus, LifecycleChange, NewPopup, Popup, PopupCandidate};

/// Error raised by a store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Account registry operations needed by the approval gate and the sweep.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// All accounts with `approved_at` set.
    async fn list_approved(&self) -> Result<Vec<Account>, StoreError>;

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<(), StoreError>;

    /// Stores the warning popup and sets `warning_sent_at = at` as one unit:
    /// either both land or neither does. Fails with `NotFound` if the account
    /// is missing or was already warned.
    async fn record_warning(
        &self,
        id: Uuid,
        popup: NewPopup,
        at: DateTime<Utc>,
    ) -> Result<Popup, StoreError>;

    /// Writes status, `approved_at` and `warning_sent_at` together.
    async fn apply_change(&self, id: Uuid, change: &LifecycleChange) -> Result<(), StoreError>;

    /// Deletes an account. Returns false if it did not exist.
    async fn delete_account(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Popup store operations needed by the sweep and the visibility rules.
#[async_trait::async_trait]
pub trait PopupStore: Send + Sync {
    async fn create_popup(&self, popup: NewPopup) -> Result<Popup, StoreError>;

    /// Every stored popup flagged with whether `student_id` has seen it.
    ///
    /// Implementations may pre-filter rows that could never be visible at `now`.
    async fn candidates_for(
        &self,
        student_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<PopupCandidate>, StoreError>;

    /// Adds the student to the popup's seen set. Returns false if the popup
    /// does not exist.
    async fn mark_seen(&self, popup_id: Uuid, student_id: Uuid) -> Result<bool, StoreError>;
}
