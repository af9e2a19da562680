// Settlement core properties: balance safety, odds snapshots, single-use
// transitions, payout math, and idempotent resolution.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;

use golazo_book::{
    Event, Ledger, LedgerError, Money, Odds, Outcome, Relations, ScriptedOutcomes, Selection,
    WagerStatus,
};

/// Ledger preloaded with one fixture at known odds.
fn ledger_with_fixture() -> Ledger {
    let mut relations = Relations::default();
    relations.events.insert(
        "event-t1".to_string(),
        Event {
            id: "event-t1".to_string(),
            league: "La Liga".to_string(),
            home_team: "Barcelona".to_string(),
            away_team: "Real Madrid".to_string(),
            start_time: Utc::now(),
            odds: Odds {
                home: dec!(1.50),
                draw: dec!(3.20),
                away: dec!(2.80),
            },
        },
    );
    Ledger::from_snapshot(relations)
}

#[test]
fn test_decimal_precision_scenario() {
    // 100.50 - 10.25 = 90.25; WON at 1.50 credits 15.38 -> 105.63
    let ledger = ledger_with_fixture();
    ledger
        .register_account("marta@example.com", None, Money::new(dec!(100.50)))
        .unwrap();

    let bet = ledger
        .create_bet("event-t1", "marta@example.com", Selection::Home, 10.25)
        .unwrap();
    assert_eq!(
        ledger.user_balance("marta@example.com").unwrap().amount(),
        dec!(90.25)
    );

    let settled = ledger.update_bet_status(&bet.id, WagerStatus::Won).unwrap();
    assert_eq!(settled.status, WagerStatus::Won);
    assert_eq!(
        ledger.user_balance("marta@example.com").unwrap().amount(),
        dec!(105.63)
    );
}

#[test]
fn test_zero_balance_rejects_smallest_stake() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("broke@example.com", None, Money::ZERO)
        .unwrap();

    let err = ledger
        .create_bet("event-t1", "broke@example.com", Selection::Home, 0.01)
        .unwrap_err();
    match err {
        LedgerError::InsufficientBalance { available, requested } => {
            assert_eq!(available, dec!(0.00));
            assert_eq!(requested, dec!(0.01));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }
    assert_eq!(
        ledger.user_balance("broke@example.com").unwrap().amount(),
        dec!(0.00)
    );
    assert!(ledger.get_bets_by_user("broke@example.com").unwrap().is_empty());
}

#[test]
fn test_guest_account_survives_rejected_first_bet() {
    // A first bet from an unknown email materializes a guest account, and
    // that account sticks around even when the bet itself is rejected.
    let ledger = ledger_with_fixture();

    let err = ledger
        .create_bet("event-t1", "walkin@example.com", Selection::Home, 1500.0)
        .unwrap_err();
    match err {
        LedgerError::InsufficientBalance { available, requested } => {
            assert_eq!(available, dec!(1000.00));
            assert_eq!(requested, dec!(1500.00));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }

    // Guest row committed: balance readable at the starting amount, no wager rows.
    assert_eq!(
        ledger.user_balance("walkin@example.com").unwrap().amount(),
        dec!(1000.00)
    );
    assert!(ledger.get_bets_by_user("walkin@example.com").unwrap().is_empty());
}

#[test]
fn test_balance_never_goes_negative() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("seq@example.com", None, Money::new(dec!(50.00)))
        .unwrap();

    ledger
        .create_bet("event-t1", "seq@example.com", Selection::Home, 30.0)
        .unwrap();
    assert_eq!(ledger.user_balance("seq@example.com").unwrap().amount(), dec!(20.00));

    let err = ledger
        .create_bet("event-t1", "seq@example.com", Selection::Draw, 25.0)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
    assert_eq!(ledger.user_balance("seq@example.com").unwrap().amount(), dec!(20.00));

    // Draining to exactly zero is allowed.
    ledger
        .create_bet("event-t1", "seq@example.com", Selection::Away, 20.0)
        .unwrap();
    assert_eq!(ledger.user_balance("seq@example.com").unwrap().amount(), dec!(0.00));
}

#[test]
fn test_unknown_event_leaves_no_rows() {
    let ledger = ledger_with_fixture();
    let err = ledger
        .create_bet("event-nope", "nobody@example.com", Selection::Home, 10.0)
        .unwrap_err();
    assert!(matches!(err, LedgerError::EventNotFound(_)));
    assert!(matches!(
        ledger.user_balance("nobody@example.com"),
        Err(LedgerError::UserNotFound(_))
    ));
    assert!(ledger.get_bets_by_user("nobody@example.com").unwrap().is_empty());
}

#[test]
fn test_odds_snapshot_survives_catalog_change() {
    let ledger = ledger_with_fixture();
    let bet = ledger
        .create_bet("event-t1", "snap@example.com", Selection::Home, 10.0)
        .unwrap();
    assert_eq!(bet.odds, dec!(1.50));

    // Simulate a later catalog change by rewriting the event row in a
    // snapshot and rebuilding the book from it.
    let mut relations = ledger.snapshot().unwrap();
    if let Some(event) = relations.events.get_mut("event-t1") {
        event.odds.home = dec!(9.99);
    }
    let reloaded = Ledger::from_snapshot(relations);

    let stored = reloaded.get_bet_by_id(&bet.id).unwrap().unwrap();
    assert_eq!(stored.odds, dec!(1.50));
    assert_eq!(stored.event.odds.home, dec!(9.99));
}

#[test]
fn test_status_transition_is_single_use() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("once@example.com", None, Money::new(dec!(100.00)))
        .unwrap();
    let bet = ledger
        .create_bet("event-t1", "once@example.com", Selection::Home, 20.0)
        .unwrap();

    ledger.update_bet_status(&bet.id, WagerStatus::Won).unwrap();
    let after_win = ledger.user_balance("once@example.com").unwrap();

    for retry in [WagerStatus::Won, WagerStatus::Lost, WagerStatus::Pending] {
        let err = ledger.update_bet_status(&bet.id, retry).unwrap_err();
        match err {
            LedgerError::AlreadyResolved { status } => assert_eq!(status, WagerStatus::Won),
            other => panic!("expected AlreadyResolved, got {:?}", other),
        }
    }
    // No double credit from the retries.
    assert_eq!(ledger.user_balance("once@example.com").unwrap(), after_win);
}

#[test]
fn test_lost_wager_credits_nothing() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("lost@example.com", None, Money::new(dec!(100.00)))
        .unwrap();
    let bet = ledger
        .create_bet("event-t1", "lost@example.com", Selection::Away, 40.0)
        .unwrap();

    let settled = ledger.update_bet_status(&bet.id, WagerStatus::Lost).unwrap();
    assert_eq!(settled.status, WagerStatus::Lost);
    assert_eq!(ledger.user_balance("lost@example.com").unwrap().amount(), dec!(60.00));
}

#[test]
fn test_pending_to_pending_is_a_noop() {
    let ledger = ledger_with_fixture();
    let bet = ledger
        .create_bet("event-t1", "noop@example.com", Selection::Draw, 10.0)
        .unwrap();

    let view = ledger
        .update_bet_status(&bet.id, WagerStatus::Pending)
        .unwrap();
    assert_eq!(view.status, WagerStatus::Pending);

    // The wager is still settleable afterwards.
    ledger.update_bet_status(&bet.id, WagerStatus::Won).unwrap();
}

#[test]
fn test_unknown_bet_id() {
    let ledger = ledger_with_fixture();
    assert!(matches!(
        ledger.update_bet_status("bet_missing", WagerStatus::Won),
        Err(LedgerError::BetNotFound(_))
    ));
    assert!(ledger.get_bet_by_id("bet_missing").unwrap().is_none());
}

#[test]
fn test_resolution_applies_scripted_outcomes() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("resolver@example.com", None, Money::new(dec!(100.00)))
        .unwrap();
    // Two 10.00 stakes at home odds 1.50 -> balance 80.00
    ledger
        .create_bet("event-t1", "resolver@example.com", Selection::Home, 10.0)
        .unwrap();
    ledger
        .create_bet("event-t1", "resolver@example.com", Selection::Home, 10.0)
        .unwrap();

    ledger
        .set_outcomes(Box::new(ScriptedOutcomes::new([Outcome::Won, Outcome::Lost])))
        .unwrap();
    ledger.resolve_pending_bets("resolver@example.com").unwrap();

    // One win credits 15.00; the loss credits nothing.
    assert_eq!(
        ledger.user_balance("resolver@example.com").unwrap().amount(),
        dec!(95.00)
    );
    let statuses: Vec<WagerStatus> = ledger
        .get_bets_by_user("resolver@example.com")
        .unwrap()
        .iter()
        .map(|b| b.status)
        .collect();
    assert!(statuses.contains(&WagerStatus::Won));
    assert!(statuses.contains(&WagerStatus::Lost));
}

#[test]
fn test_resolution_is_idempotent() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("twice@example.com", None, Money::new(dec!(100.00)))
        .unwrap();
    ledger
        .create_bet("event-t1", "twice@example.com", Selection::Home, 10.0)
        .unwrap();

    // More outcomes scripted than pending wagers exist; the second call must
    // not consume one against an already-resolved wager.
    ledger
        .set_outcomes(Box::new(ScriptedOutcomes::new([
            Outcome::Won,
            Outcome::Won,
            Outcome::Won,
        ])))
        .unwrap();

    ledger.resolve_pending_bets("twice@example.com").unwrap();
    let after_first = ledger.user_balance("twice@example.com").unwrap();
    assert_eq!(after_first.amount(), dec!(105.00));

    ledger.resolve_pending_bets("twice@example.com").unwrap();
    assert_eq!(ledger.user_balance("twice@example.com").unwrap(), after_first);
}

#[test]
fn test_unsettled_outcome_keeps_wager_pending() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("waiting@example.com", None, Money::new(dec!(50.00)))
        .unwrap();
    let bet = ledger
        .create_bet("event-t1", "waiting@example.com", Selection::Draw, 5.0)
        .unwrap();

    ledger
        .set_outcomes(Box::new(ScriptedOutcomes::new([Outcome::Unsettled])))
        .unwrap();
    ledger.resolve_pending_bets("waiting@example.com").unwrap();

    let stored = ledger.get_bet_by_id(&bet.id).unwrap().unwrap();
    assert_eq!(stored.status, WagerStatus::Pending);
    assert_eq!(
        ledger.user_balance("waiting@example.com").unwrap().amount(),
        dec!(45.00)
    );
}

#[test]
fn test_resolving_unknown_user_is_a_noop() {
    let ledger = ledger_with_fixture();
    assert!(ledger.resolve_pending_bets("ghost@example.com").is_ok());
}

#[test]
fn test_concurrent_placements_never_over_debit() {
    // Balance covers exactly N-1 stakes: one thread must lose the race.
    let ledger = Arc::new(ledger_with_fixture());
    ledger
        .register_account("race@example.com", None, Money::new(dec!(75.00)))
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let ledger = ledger.clone();
        handles.push(std::thread::spawn(move || {
            ledger.create_bet("event-t1", "race@example.com", Selection::Home, 25.0)
        }));
    }

    let mut wins = 0;
    let mut rejections = 0;
    for handle in handles {
        match handle.join().expect("thread panicked") {
            Ok(_) => wins += 1,
            Err(LedgerError::InsufficientBalance { .. }) => rejections += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }

    assert_eq!(wins, 3);
    assert_eq!(rejections, 1);
    assert_eq!(ledger.user_balance("race@example.com").unwrap().amount(), dec!(0.00));
}

#[test]
fn test_bet_history_is_most_recent_first() {
    let ledger = ledger_with_fixture();
    for amount in [10.0, 20.0, 30.0] {
        ledger
            .create_bet("event-t1", "history@example.com", Selection::Home, amount)
            .unwrap();
    }

    let bets = ledger.get_bets_by_user("history@example.com").unwrap();
    assert_eq!(bets.len(), 3);
    for pair in bets.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[test]
fn test_catalog_seeds_once_and_sorts_by_kickoff() {
    let ledger = Ledger::new();
    let first = ledger.events().unwrap();
    assert_eq!(first.len(), 30);
    for pair in first.windows(2) {
        assert!(pair[0].start_time <= pair[1].start_time);
    }

    let second = ledger.events().unwrap();
    assert_eq!(second.len(), 30);
    // Seeding is idempotent: odds did not get re-rolled.
    assert_eq!(first[0].odds.home, second[0].odds.home);
    assert_eq!(first[0].id, second[0].id);
}

#[test]
fn test_duplicate_registration_rejected() {
    let ledger = ledger_with_fixture();
    ledger
        .register_account("dup@example.com", None, Money::new(dec!(10.00)))
        .unwrap();
    assert!(matches!(
        ledger.register_account("dup@example.com", None, Money::ZERO),
        Err(LedgerError::AccountExists(_))
    ));
}
