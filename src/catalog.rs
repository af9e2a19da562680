// Daily event slate. Seeded once with randomized odds across a fixed set of
// league/team pairings, spread over evenly spaced kickoff slots.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{Event, Odds};
use crate::store::Relations;

const LEAGUES: [&str; 10] = [
    "Premier League",
    "La Liga",
    "Bundesliga",
    "Serie A",
    "Ligue 1",
    "Liga MX",
    "Eredivisie",
    "Liga Portugal",
    "Copa Libertadores",
    "UEFA Champions League",
];

const FIXTURES: [(&str, &str); 30] = [
    ("Manchester United", "Liverpool"),
    ("Barcelona", "Real Madrid"),
    ("Bayern Munich", "Borussia Dortmund"),
    ("Juventus", "Inter Milan"),
    ("PSG", "Marseille"),
    ("Arsenal", "Chelsea"),
    ("Atletico Madrid", "Sevilla"),
    ("RB Leipzig", "Bayer Leverkusen"),
    ("AC Milan", "Napoli"),
    ("Lyon", "Monaco"),
    ("Manchester City", "Tottenham"),
    ("Real Sociedad", "Valencia"),
    ("Freiburg", "Wolfsburg"),
    ("Roma", "Lazio"),
    ("Lens", "Nice"),
    ("América", "Chivas"),
    ("Tigres", "Monterrey"),
    ("Ajax", "PSV Eindhoven"),
    ("Feyenoord", "AZ Alkmaar"),
    ("Porto", "Benfica"),
    ("Sporting CP", "Braga"),
    ("Flamengo", "Palmeiras"),
    ("River Plate", "Boca Juniors"),
    ("São Paulo", "Corinthians"),
    ("West Ham", "Newcastle"),
    ("Villarreal", "Real Betis"),
    ("Union Berlin", "Eintracht Frankfurt"),
    ("Atalanta", "Fiorentina"),
    ("Lille", "Rennes"),
    ("Brighton", "Aston Villa"),
];

fn random_odds(rng: &mut impl Rng, lo: f64, hi: f64) -> Decimal {
    let raw = rng.gen_range(lo..hi);
    Decimal::from_f64_retain(raw)
        .unwrap_or(Decimal::ONE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Kickoff slot for fixture `i`: three matches per hour from 12:00 UTC.
fn kickoff_slot(day: DateTime<Utc>, i: usize) -> DateTime<Utc> {
    let hour = 12 + (i / 3) as u32;
    let minute = ((i % 3) * 20) as u32;
    day.date_naive()
        .and_hms_opt(hour, minute, 0)
        .map(|naive| naive.and_utc())
        .unwrap_or(day)
}

/// Build the full 30-event slate for today.
pub fn build_slate() -> Vec<Event> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    FIXTURES
        .iter()
        .enumerate()
        .map(|(i, (home, away))| Event {
            id: format!("event-{}", i + 1),
            league: LEAGUES[i % LEAGUES.len()].to_string(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            start_time: kickoff_slot(now, i),
            odds: Odds {
                home: random_odds(&mut rng, 1.5, 4.0),
                draw: random_odds(&mut rng, 2.5, 4.5),
                away: random_odds(&mut rng, 1.5, 4.0),
            },
        })
        .collect()
}

/// Seed the slate into the relations if no events exist yet. Runs inside the
/// store lock, so a concurrent first call observes either zero or all events.
pub fn seed_if_empty(relations: &mut Relations) {
    if !relations.events.is_empty() {
        return;
    }
    for event in build_slate() {
        // Fixed id scheme; a duplicate insert just replaces an identical row.
        relations.events.insert(event.id.clone(), event);
    }
}
