// Settlement of pending wagers. Outcomes come from an injectable strategy;
// the production one is a weighted coin flip standing in for a results feed.

use rand::Rng;
use std::collections::VecDeque;

use crate::error::LedgerError;
use crate::ledger::{apply_resolution, Ledger};
use crate::models::WagerStatus;

/// One draw of the outcome generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
    /// The event has not finished; the wager stays PENDING.
    Unsettled,
}

pub trait OutcomeStrategy: Send {
    fn draw(&mut self) -> Outcome;
}

/// 40% won, 40% lost, 20% still pending.
#[derive(Debug, Clone)]
pub struct WeightedCoinFlip {
    pub win_weight: f64,
    pub lose_weight: f64,
}

impl Default for WeightedCoinFlip {
    fn default() -> Self {
        Self {
            win_weight: 0.4,
            lose_weight: 0.4,
        }
    }
}

impl OutcomeStrategy for WeightedCoinFlip {
    fn draw(&mut self) -> Outcome {
        let roll: f64 = rand::thread_rng().gen();
        if roll < self.win_weight {
            Outcome::Won
        } else if roll < self.win_weight + self.lose_weight {
            Outcome::Lost
        } else {
            Outcome::Unsettled
        }
    }
}

/// Deterministic outcome sequence for tests. Draws beyond the script leave
/// wagers unsettled.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOutcomes {
    queue: VecDeque<Outcome>,
}

impl ScriptedOutcomes {
    pub fn new(outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        Self {
            queue: outcomes.into_iter().collect(),
        }
    }
}

impl OutcomeStrategy for ScriptedOutcomes {
    fn draw(&mut self) -> Outcome {
        self.queue.pop_front().unwrap_or(Outcome::Unsettled)
    }
}

impl Ledger {
    /// Resolve a user's pending wagers. The pending set is snapshotted at
    /// call start; each wager then gets one independent outcome draw and one
    /// independent transaction that re-checks PENDING before committing. A
    /// wager resolved concurrently in the meantime is skipped, which is what
    /// makes back-to-back calls credit each win exactly once.
    pub fn resolve_pending_bets(&self, email: &str) -> Result<(), LedgerError> {
        let pending: Vec<String> = self.store.transaction(|relations| {
            Ok(match relations.account_id_by_email(email) {
                None => Vec::new(),
                Some(account_id) => relations
                    .wagers
                    .values()
                    .filter(|w| w.user_id == account_id && w.status == WagerStatus::Pending)
                    .map(|w| w.id.clone())
                    .collect(),
            })
        })?;

        for bet_id in pending {
            let outcome = self
                .outcomes
                .lock()
                .map_err(|_| LedgerError::StoreFailure("outcome strategy lock poisoned".to_string()))?
                .draw();

            let new_status = match outcome {
                Outcome::Won => WagerStatus::Won,
                Outcome::Lost => WagerStatus::Lost,
                Outcome::Unsettled => continue,
            };

            let result = self.store.transaction(|relations| {
                let wager = relations
                    .wagers
                    .get(&bet_id)
                    .cloned()
                    .ok_or_else(|| LedgerError::BetNotFound(bet_id.clone()))?;
                if wager.status != WagerStatus::Pending {
                    return Err(LedgerError::AlreadyResolved { status: wager.status });
                }
                apply_resolution(relations, &wager, new_status)
            });

            // Lost races are per-wager; they never abort the siblings.
            match result {
                Ok(_) => {}
                Err(LedgerError::AlreadyResolved { .. }) | Err(LedgerError::BetNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}
