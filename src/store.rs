// In-memory relational store with an explicit transaction scope.
//
// Every read-check-write sequence in the ledger runs inside one
// `transaction` call: the lock is the serialization point, and the closure
// re-reads authoritative rows after acquiring it. Closures keep all fallible
// checks of an atomic unit ahead of that unit's first mutation, so an Err
// return leaves the unit's rows untouched.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::{Account, Event, Wager};

/// The three persisted relations plus the email lookup index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relations {
    pub events: HashMap<String, Event>,
    pub accounts: HashMap<Uuid, Account>,
    pub emails: HashMap<String, Uuid>,
    pub wagers: HashMap<String, Wager>,
}

impl Relations {
    pub fn account_id_by_email(&self, email: &str) -> Option<Uuid> {
        self.emails.get(email).copied()
    }

    pub fn account_by_email(&self, email: &str) -> Option<&Account> {
        self.account_id_by_email(email)
            .and_then(|id| self.accounts.get(&id))
    }

    /// Resolve an email to an account id, materializing a guest account on
    /// first reference. Returns the id and whether a row was created.
    pub fn ensure_account(&mut self, email: &str) -> (Uuid, bool) {
        if let Some(id) = self.account_id_by_email(email) {
            return (id, false);
        }
        let account = Account::guest(email);
        let id = account.id;
        self.emails.insert(email.to_string(), id);
        self.accounts.insert(id, account);
        (id, true)
    }

    /// Email of the account owning a wager. Missing rows are a store-level
    /// inconsistency, not a caller error.
    pub fn owner_email(&self, wager: &Wager) -> Result<String, LedgerError> {
        self.accounts
            .get(&wager.user_id)
            .map(|a| a.email.clone())
            .ok_or_else(|| LedgerError::StoreFailure(format!("account row missing for wager {}", wager.id)))
    }

    pub fn event_for(&self, wager: &Wager) -> Result<Event, LedgerError> {
        self.events
            .get(&wager.event_id)
            .cloned()
            .ok_or_else(|| LedgerError::StoreFailure(format!("event row missing for wager {}", wager.id)))
    }
}

/// Mutex-guarded store. The coarse lock serializes conflicting operations;
/// everything inside is short in-memory work.
#[derive(Debug, Default)]
pub struct BookStore {
    inner: Mutex<Relations>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(relations: Relations) -> Self {
        Self {
            inner: Mutex::new(relations),
        }
    }

    /// Run one transaction. A poisoned lock surfaces as the transient
    /// StoreFailure category rather than a panic.
    pub fn transaction<R>(
        &self,
        f: impl FnOnce(&mut Relations) -> Result<R, LedgerError>,
    ) -> Result<R, LedgerError> {
        let mut relations = self
            .inner
            .lock()
            .map_err(|_| LedgerError::StoreFailure("store lock poisoned".to_string()))?;
        f(&mut relations)
    }

    /// Clone of the current relations, for persistence.
    pub fn snapshot(&self) -> Result<Relations, LedgerError> {
        self.transaction(|relations| Ok(relations.clone()))
    }
}
