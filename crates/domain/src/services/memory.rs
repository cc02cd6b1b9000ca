//! In-memory store implementations for tests and local tooling.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::store::{AccountStore, PopupStore, StoreError};
use crate::models::{Account, AccountStatus, LifecycleChange, NewPopup, Popup, PopupCandidate};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Database("store lock poisoned".to_string()))
}

/// Account registry held in a map.
///
/// Warning popups land in the attached popup store, the way the Postgres
/// store writes both tables in one transaction.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
    failing: Mutex<HashSet<Uuid>>,
    popups: Arc<InMemoryPopupStore>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_popups(popups: Arc<InMemoryPopupStore>) -> Self {
        Self {
            popups,
            ..Self::default()
        }
    }

    /// The popup store receiving warning popups.
    pub fn popups(&self) -> Arc<InMemoryPopupStore> {
        Arc::clone(&self.popups)
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let store = Self::new();
        for account in accounts {
            store.insert(account);
        }
        store
    }

    pub fn insert(&self, account: Account) {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(account.id, account);
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Account> {
        self.accounts.lock().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Makes every write for `id` fail with a database error.
    pub fn fail_updates_for(&self, id: Uuid) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(id);
        }
    }

    fn check_writable(&self, id: Uuid) -> Result<(), StoreError> {
        if lock(&self.failing)?.contains(&id) {
            return Err(StoreError::Database(format!("write rejected for {}", id)));
        }
        Ok(())
    }

    fn modify(&self, id: Uuid, f: impl FnOnce(&mut Account)) -> Result<(), StoreError> {
        self.check_writable(id)?;
        let mut accounts = lock(&self.accounts)?;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("account {}", id)))?;
        f(account);
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn list_approved(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = lock(&self.accounts)?;
        let mut approved: Vec<Account> = accounts
            .values()
            .filter(|a| a.approved_at.is_some())
            .cloned()
            .collect();
        approved.sort_by_key(|a| a.approved_at);
        Ok(approved)
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(lock(&self.accounts)?.get(&id).cloned())
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> Result<(), StoreError> {
        self.modify(id, |account| account.status = status)
    }

    async fn record_warning(
        &self,
        id: Uuid,
        popup: NewPopup,
        at: DateTime<Utc>,
    ) -> Result<Popup, StoreError> {
        self.check_writable(id)?;
        let mut accounts = lock(&self.accounts)?;
        let account = accounts
            .get_mut(&id)
            .filter(|a| a.warning_sent_at.is_none())
            .ok_or_else(|| StoreError::NotFound(format!("unwarned account {}", id)))?;

        // The account lock is held until both writes are done.
        let stored = self.popups.store(popup)?;
        account.warning_sent_at = Some(at);
        Ok(stored)
    }

    async fn apply_change(&self, id: Uuid, change: &LifecycleChange) -> Result<(), StoreError> {
        self.modify(id, |account| {
            account.status = change.status;
            account.approved_at = change.approved_at;
            account.warning_sent_at = change.warning_sent_at;
        })
    }

    async fn delete_account(&self, id: Uuid) -> Result<bool, StoreError> {
        self.check_writable(id)?;
        Ok(lock(&self.accounts)?.remove(&id).is_some())
    }
}

/// Popup store held in a vector plus a seen set.
#[derive(Debug, Default)]
pub struct InMemoryPopupStore {
    popups: Mutex<Vec<Popup>>,
    seen: Mutex<HashSet<(Uuid, Uuid)>>,
    fail_creates: bool,
}

impl InMemoryPopupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `create_popup` always fails.
    pub fn failing_creates() -> Self {
        Self {
            fail_creates: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, popup: Popup) {
        if let Ok(mut popups) = self.popups.lock() {
            popups.push(popup);
        }
    }

    pub fn popups(&self) -> Vec<Popup> {
        self.popups.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn popups_for(&self, student_id: Uuid) -> Vec<Popup> {
        self.popups()
            .into_iter()
            .filter(|p| p.target_student_id == Some(student_id))
            .collect()
    }

    fn store(&self, popup: NewPopup) -> Result<Popup, StoreError> {
        if self.fail_creates {
            return Err(StoreError::Database("popup insert rejected".to_string()));
        }
        let now = Utc::now();
        let stored = Popup {
            id: Uuid::new_v4(),
            title: popup.title,
            message: popup.message,
            popup_type: popup.popup_type,
            is_active: popup.is_active,
            expires_at: popup.expires_at,
            target_student_id: popup.target_student_id,
            created_at: now,
            updated_at: now,
        };
        lock(&self.popups)?.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait::async_trait]
impl PopupStore for InMemoryPopupStore {
    async fn create_popup(&self, popup: NewPopup) -> Result<Popup, StoreError> {
        self.store(popup)
    }

    async fn candidates_for(
        &self,
        student_id: Uuid,
        _now: DateTime<Utc>,
    ) -> Result<Vec<PopupCandidate>, StoreError> {
        let popups = lock(&self.popups)?;
        let seen = lock(&self.seen)?;
        Ok(popups
            .iter()
            .map(|popup| PopupCandidate {
                seen: seen.contains(&(popup.id, student_id)),
                popup: popup.clone(),
            })
            .collect())
    }

    async fn mark_seen(&self, popup_id: Uuid, student_id: Uuid) -> Result<bool, StoreError> {
        if !lock(&self.popups)?.iter().any(|p| p.id == popup_id) {
            return Ok(false);
        }
        lock(&self.seen)?.insert((popup_id, student_id));
        Ok(true)
    }
}
