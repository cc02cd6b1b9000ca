//! Domain services for ScholarSync.
//!
//! Lifecycle rules for student accounts: approval, time-based expiry and
//! popup visibility. Storage and email are reached through traits so the
//! rules run against any backend.

pub mod approval;
pub mod expiry;
pub mod memory;
pub mod notification;
pub mod store;
pub mod visibility;

pub use approval::{plan_transition, ApprovalAction, ApprovalGate, ApprovalOutcome};
pub use expiry::{classify, ExpiryAction, ExpirySweep, ExpiryThresholds, SweepReport, ThresholdError};
pub use memory::{InMemoryAccountStore, InMemoryPopupStore};
pub use notification::{AccountNotice, Mailer, MockMailer, NoticeKind};
pub use store::{AccountStore, PopupStore, StoreError};
pub use visibility::{popups_for_student, visible_popups};
