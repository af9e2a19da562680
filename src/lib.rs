/// Golazo three-way sports book
/// Exports all modules for use as a library crate

pub mod app_state;
pub mod catalog;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod money;
pub mod settlement;
pub mod store;

pub use app_state::{AppState, SharedState};
pub use error::LedgerError;
pub use handlers::app;
pub use ledger::Ledger;
pub use models::{
    Account, Event, Odds, Selection, Wager, WagerStatus, WagerView, GUEST_STARTING_BALANCE,
};
pub use money::Money;
pub use settlement::{Outcome, OutcomeStrategy, ScriptedOutcomes, WeightedCoinFlip};
pub use store::{BookStore, Relations};
