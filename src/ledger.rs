// Wager ledger: placement with balance-sufficiency checks, single-use status
// transitions, and the balance mutations tied to them.
//
// Each operation that reads a balance or status and conditionally writes runs
// as one store transaction, so concurrent calls against the same account or
// wager serialize on the store lock.

use std::sync::Mutex;

use crate::catalog;
use crate::error::LedgerError;
use crate::models::{Account, Event, Selection, Wager, WagerStatus, WagerView};
use crate::money::Money;
use crate::settlement::{OutcomeStrategy, WeightedCoinFlip};
use crate::store::{BookStore, Relations};

pub struct Ledger {
    pub(crate) store: BookStore,
    pub(crate) outcomes: Mutex<Box<dyn OutcomeStrategy + Send>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::with_outcomes(Box::new(WeightedCoinFlip::default()))
    }

    /// Swap in a different outcome strategy (deterministic ones for tests).
    pub fn with_outcomes(outcomes: Box<dyn OutcomeStrategy + Send>) -> Self {
        Self {
            store: BookStore::new(),
            outcomes: Mutex::new(outcomes),
        }
    }

    pub fn from_snapshot(relations: Relations) -> Self {
        Self {
            store: BookStore::from_snapshot(relations),
            outcomes: Mutex::new(Box::new(WeightedCoinFlip::default())),
        }
    }

    pub fn snapshot(&self) -> Result<Relations, LedgerError> {
        self.store.snapshot()
    }

    /// Replace the outcome strategy on a live ledger.
    pub fn set_outcomes(&self, outcomes: Box<dyn OutcomeStrategy + Send>) -> Result<(), LedgerError> {
        let mut guard = self
            .outcomes
            .lock()
            .map_err(|_| LedgerError::StoreFailure("outcome strategy lock poisoned".to_string()))?;
        *guard = outcomes;
        Ok(())
    }

    // ===== EVENT CATALOG =====

    /// All events ordered by kickoff. Seeds the slate on first call.
    pub fn events(&self) -> Result<Vec<Event>, LedgerError> {
        self.store.transaction(|relations| {
            catalog::seed_if_empty(relations);
            let mut events: Vec<Event> = relations.events.values().cloned().collect();
            events.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
            Ok(events)
        })
    }

    pub fn event(&self, id: &str) -> Result<Option<Event>, LedgerError> {
        self.store
            .transaction(|relations| Ok(relations.events.get(id).cloned()))
    }

    // ===== ACCOUNTS =====

    /// Explicit registration with a chosen starting balance.
    pub fn register_account(
        &self,
        email: &str,
        name: Option<String>,
        balance: Money,
    ) -> Result<Account, LedgerError> {
        self.store.transaction(|relations| {
            if relations.account_by_email(email).is_some() {
                return Err(LedgerError::AccountExists(email.to_string()));
            }
            let account = Account::new(email, name, balance);
            relations.emails.insert(email.to_string(), account.id);
            relations.accounts.insert(account.id, account.clone());
            Ok(account)
        })
    }

    pub fn user_balance(&self, email: &str) -> Result<Money, LedgerError> {
        self.store.transaction(|relations| {
            relations
                .account_by_email(email)
                .map(|account| account.balance)
                .ok_or_else(|| LedgerError::UserNotFound(email.to_string()))
        })
    }

    // ===== WAGER PLACEMENT =====

    /// Place a wager: validate, snapshot the selection's odds, then debit the
    /// stake and insert the wager as one atomic unit. The balance is re-read
    /// under the store lock, so concurrent placements against the same
    /// account can never over-debit it.
    pub fn create_bet(
        &self,
        event_id: &str,
        email: &str,
        selection: Selection,
        amount: f64,
    ) -> Result<WagerView, LedgerError> {
        let stake = Money::from_f64(amount)
            .filter(Money::is_positive)
            .ok_or_else(|| LedgerError::InvalidAmount(format!("stake must be positive, got {}", amount)))?;

        self.store.transaction(|relations| {
            let event = relations
                .events
                .get(event_id)
                .cloned()
                .ok_or_else(|| LedgerError::EventNotFound(event_id.to_string()))?;

            // Guest materialization commits even if the balance check below
            // fails; only the check-insert-debit unit rolls back together.
            let (account_id, _) = relations.ensure_account(email);
            let account = relations
                .accounts
                .get_mut(&account_id)
                .ok_or_else(|| LedgerError::StoreFailure("account row missing".to_string()))?;

            if account.balance < stake {
                return Err(LedgerError::InsufficientBalance {
                    available: account.balance.amount(),
                    requested: stake.amount(),
                });
            }

            account.balance = account.balance - stake;
            let wager = Wager::new(event_id, account_id, selection, event.odds.for_selection(selection), stake);
            relations.wagers.insert(wager.id.clone(), wager.clone());

            Ok(WagerView::new(wager, email, event))
        })
    }

    // ===== STATUS TRANSITIONS =====

    /// Transition a wager out of PENDING. WON credits the payout in the same
    /// atomic unit; LOST touches only the status. Asking for PENDING while
    /// the wager is still pending is a no-op.
    pub fn update_bet_status(
        &self,
        bet_id: &str,
        new_status: WagerStatus,
    ) -> Result<WagerView, LedgerError> {
        self.store.transaction(|relations| {
            let wager = relations
                .wagers
                .get(bet_id)
                .cloned()
                .ok_or_else(|| LedgerError::BetNotFound(bet_id.to_string()))?;

            if wager.status != WagerStatus::Pending {
                return Err(LedgerError::AlreadyResolved { status: wager.status });
            }

            if new_status == WagerStatus::Pending {
                let email = relations.owner_email(&wager)?;
                let event = relations.event_for(&wager)?;
                return Ok(WagerView::new(wager, &email, event));
            }

            apply_resolution(relations, &wager, new_status)
        })
    }

    // ===== QUERIES =====

    /// A user's wagers, most recent first. Unknown emails get an empty list
    /// rather than an error; the history view treats them the same way.
    pub fn get_bets_by_user(&self, email: &str) -> Result<Vec<WagerView>, LedgerError> {
        self.store.transaction(|relations| {
            let account_id = match relations.account_id_by_email(email) {
                Some(id) => id,
                None => return Ok(Vec::new()),
            };

            let mut wagers: Vec<Wager> = relations
                .wagers
                .values()
                .filter(|w| w.user_id == account_id)
                .cloned()
                .collect();
            wagers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));

            wagers
                .into_iter()
                .map(|wager| {
                    let event = relations.event_for(&wager)?;
                    Ok(WagerView::new(wager, email, event))
                })
                .collect()
        })
    }

    pub fn get_bet_by_id(&self, bet_id: &str) -> Result<Option<WagerView>, LedgerError> {
        self.store.transaction(|relations| {
            let wager = match relations.wagers.get(bet_id) {
                Some(w) => w.clone(),
                None => return Ok(None),
            };
            let email = relations.owner_email(&wager)?;
            let event = relations.event_for(&wager)?;
            Ok(Some(WagerView::new(wager, &email, event)))
        })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Commit a WON/LOST transition. The caller has already verified the wager
/// is PENDING inside the current transaction.
pub(crate) fn apply_resolution(
    relations: &mut Relations,
    wager: &Wager,
    new_status: WagerStatus,
) -> Result<WagerView, LedgerError> {
    let email = relations.owner_email(wager)?;
    let event = relations.event_for(wager)?;

    if new_status == WagerStatus::Won {
        let account = relations
            .accounts
            .get_mut(&wager.user_id)
            .ok_or_else(|| LedgerError::StoreFailure("account row missing".to_string()))?;
        account.balance = account.balance + wager.payout();
    }

    let stored = relations
        .wagers
        .get_mut(&wager.id)
        .ok_or_else(|| LedgerError::StoreFailure("wager row missing".to_string()))?;
    stored.status = new_status;
    let updated = stored.clone();

    Ok(WagerView::new(updated, &email, event))
}
