//! Factories for players, teams and matches used across the test suite.

use crate::config::MatchConfig;
use crate::phrases::PhraseBook;
use crate::roster::source::{JsonRoster, RosterSource};
use crate::roster::{Gender, Player, Prefix, Role, Team};
use crate::simulation::Simulation;

// =============================================================================
// Players
// =============================================================================

/// Keeper whose three defensive attributes all equal `average`.
pub fn keeper(name: &str, average: f64) -> Player {
    Player::new(name, Role::Keeper, Gender::Male)
        .with_skill("reflexes", average)
        .with_skill("positioning", average)
        .with_skill("blocking", average)
}

/// Chaser with only accuracy and reaction.
pub fn chaser(name: &str, accuracy: f64, reaction: f64) -> Player {
    Player::new(name, Role::Chaser, Gender::Female)
        .with_skill("accuracy", accuracy)
        .with_skill("reaction", reaction)
}

/// Beater with offense attributes `power`/`aim` and protection `defense`.
pub fn beater(name: &str, power: f64, aim: f64, defense: f64) -> Player {
    Player::new(name, Role::Beater, Gender::Male)
        .with_skill("power", power)
        .with_skill("aim", aim)
        .with_skill("defense", defense)
}

/// Seeker with only a reaction skill.
pub fn seeker(name: &str, reaction: f64) -> Player {
    Player::new(name, Role::Seeker, Gender::Male).with_skill("reaction", reaction)
}

// =============================================================================
// Teams
// =============================================================================

/// Team with "the" articles.
pub fn team(name: &str, players: Vec<Player>) -> Team {
    Team::new(name, Prefix::new("the", "the"), players)
}

/// Two players per role, identical skills on both sides.
pub fn equal_team(name: &str) -> Team {
    team(
        name,
        vec![
            keeper(&format!("{name} Keeper A"), 60.0),
            keeper(&format!("{name} Keeper B"), 60.0),
            chaser(&format!("{name} Chaser A"), 60.0, 50.0),
            chaser(&format!("{name} Chaser B"), 60.0, 50.0),
            beater(&format!("{name} Beater A"), 40.0, 40.0, 50.0),
            beater(&format!("{name} Beater B"), 40.0, 40.0, 50.0),
            seeker(&format!("{name} Seeker A"), 80.0),
            seeker(&format!("{name} Seeker B"), 80.0),
        ],
    )
}

/// The bundled Hawks and Dragons.
pub fn standard_teams() -> (Team, Team) {
    JsonRoster::bundled()
        .and_then(|roster| roster.load_teams("Hogwarts Hawks", "Durmstrang Dragons"))
        .expect("bundled roster loads")
}

// =============================================================================
// Matches
// =============================================================================

/// Seeded match between the bundled teams.
pub fn standard_match(seed: u64, config: MatchConfig) -> Simulation {
    let (home, away) = standard_teams();
    Simulation::new(home, away, PhraseBook::standard(), config, seed).expect("valid config")
}

/// Config with the snitch switched off.
pub fn no_snitch() -> MatchConfig {
    MatchConfig {
        snitch_rate_per_minute: 0.0,
        ..MatchConfig::default()
    }
}

/// Every player's rating, home roster first.
pub fn ratings<D: crate::dice::Dice>(sim: &Simulation<D>) -> Vec<f64> {
    let snapshot = sim.snapshot();
    snapshot
        .home
        .players
        .iter()
        .chain(snapshot.away.players.iter())
        .map(|p| p.rating)
        .collect()
}
