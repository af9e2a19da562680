// Data models for the wager book: events, accounts, wagers and the
// expanded views the HTTP layer returns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::LedgerError;
use crate::money::Money;

/// Three-way decimal odds for a fixture. Each leg is >= 1.0, 2 dp.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Odds {
    pub home: Decimal,
    pub draw: Decimal,
    pub away: Decimal,
}

impl Odds {
    pub fn for_selection(&self, selection: Selection) -> Decimal {
        match selection {
            Selection::Home => self.home,
            Selection::Draw => self.draw,
            Selection::Away => self.away,
        }
    }
}

/// A fixture on the daily slate. Immutable once seeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub league: String,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    pub odds: Odds,
}

/// 1X2 market selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

impl Selection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Selection::Home => "1",
            Selection::Draw => "X",
            Selection::Away => "2",
        }
    }
}

impl FromStr for Selection {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Selection::Home),
            "X" | "x" => Ok(Selection::Draw),
            "2" => Ok(Selection::Away),
            other => Err(LedgerError::InvalidSelection(format!(
                "expected one of 1, X, 2; got {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WagerStatus {
    Pending,
    Won,
    Lost,
}

impl WagerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WagerStatus::Pending => "PENDING",
            WagerStatus::Won => "WON",
            WagerStatus::Lost => "LOST",
        }
    }
}

impl FromStr for WagerStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(WagerStatus::Pending),
            "WON" => Ok(WagerStatus::Won),
            "LOST" => Ok(WagerStatus::Lost),
            other => Err(LedgerError::InvalidStatus(format!(
                "expected PENDING, WON or LOST; got {:?}",
                other
            ))),
        }
    }
}

/// A user account holding a cash balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: &str, name: Option<String>, balance: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name,
            balance,
            created_at: Utc::now(),
        }
    }

    /// Explicit constructor for the lazy-creation path: a wager referenced an
    /// email nobody registered. Display name falls back to the local part and
    /// the account starts with the house bonus balance.
    pub fn guest(email: &str) -> Self {
        let name = email.split('@').next().map(|s| s.to_string());
        Self::new(email, name, Money::from_f64(GUEST_STARTING_BALANCE).unwrap_or(Money::ZERO))
    }
}

/// Starting balance for lazily created guest accounts.
pub const GUEST_STARTING_BALANCE: f64 = 1000.0;

/// A placed wager. Odds are snapshotted from the event at placement time and
/// never change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wager {
    pub id: String,
    pub event_id: String,
    pub user_id: Uuid,
    pub selection: Selection,
    pub odds: Decimal,
    pub amount: Money,
    pub status: WagerStatus,
    pub created_at: DateTime<Utc>,
}

impl Wager {
    pub fn new(event_id: &str, user_id: Uuid, selection: Selection, odds: Decimal, amount: Money) -> Self {
        Self {
            id: format!("bet_{}", Uuid::new_v4().simple()),
            event_id: event_id.to_string(),
            user_id,
            selection,
            odds,
            amount,
            status: WagerStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Winnings if this wager settles as won: stake times odds, which
    /// already includes return of the stake.
    pub fn payout(&self) -> Money {
        self.amount.times(self.odds)
    }
}

/// A wager expanded with its event and the owner's email, the shape the
/// HTTP layer serves.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerView {
    pub id: String,
    pub event_id: String,
    pub user_id: String,
    pub selection: Selection,
    pub odds: Decimal,
    pub amount: Money,
    pub status: WagerStatus,
    pub created_at: DateTime<Utc>,
    pub event: Event,
}

impl WagerView {
    pub fn new(wager: Wager, email: &str, event: Event) -> Self {
        Self {
            id: wager.id,
            event_id: wager.event_id,
            user_id: email.to_string(),
            selection: wager.selection,
            odds: wager.odds,
            amount: wager.amount,
            status: wager.status,
            created_at: wager.created_at,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_selection_round_trip() {
        assert_eq!("1".parse::<Selection>().unwrap(), Selection::Home);
        assert_eq!("X".parse::<Selection>().unwrap(), Selection::Draw);
        assert_eq!("2".parse::<Selection>().unwrap(), Selection::Away);
        assert!("H".parse::<Selection>().is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("WON".parse::<WagerStatus>().unwrap(), WagerStatus::Won);
        assert!("won".parse::<WagerStatus>().is_err());
    }

    #[test]
    fn test_guest_account_defaults() {
        let acct = Account::guest("lucia@example.com");
        assert_eq!(acct.name.as_deref(), Some("lucia"));
        assert_eq!(acct.balance.amount(), dec!(1000.00));
    }

    #[test]
    fn test_wager_payout() {
        let wager = Wager::new(
            "event-1",
            Uuid::new_v4(),
            Selection::Home,
            dec!(1.50),
            Money::new(dec!(10.25)),
        );
        assert_eq!(wager.payout().amount(), dec!(15.38));
    }
}
