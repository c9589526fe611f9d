//! Integration tests for the full match pipeline.
//!
//! These tests drive complete matches through the scheduler, narrator,
//! resolvers and summary:
//! - Termination at the minute bound and on a snitch catch
//! - The narrative gate
//! - Scoring and rating invariants over many seeds

use std::time::Duration;

use proptest::prelude::*;

use crate::config::MatchConfig;
use crate::dice::ScriptedDice;
use crate::phrases::PhraseBook;
use crate::resolver::Delta;
use crate::roster::{PlayerRef, Role, Side};
use crate::simulation::{Simulation, TickOutcome};
use crate::state::{Bucket, MatchState};

use super::helpers::{chaser, keeper, no_snitch, ratings, seeker, standard_match, team};

// =============================================================================
// Termination
// =============================================================================

#[test]
fn match_stops_at_minute_bound() {
    let mut sim = standard_match(3, no_snitch());
    let summary = sim.run_to_end().unwrap();
    assert_eq!(sim.state().minute(), 90);
    assert_eq!(sim.state().snitch_catch(), None);
    assert_eq!(summary.home_score, sim.state().score(Side::Home));

    // Long after the bound: nothing more happens.
    let before = sim.snapshot();
    assert_eq!(sim.tick().unwrap(), TickOutcome::Cancelled);
    sim.advance_by(Duration::from_secs(600)).unwrap();
    assert_eq!(sim.snapshot(), before);
}

#[test]
fn catch_at_minute_forty_ends_the_match() {
    // With every draw at 0.999 the snitch first fires when its chance
    // reaches 1.0, at minute 40 (0.025 per minute).
    let config = MatchConfig {
        snitch_rate_per_minute: 0.025,
        snitch_chance_cap: 1.0,
        ..MatchConfig::default()
    };
    let home = team(
        "Hawks",
        vec![keeper("Oliver", 60.0), chaser("Katie", 60.0, 50.0), seeker("Harry", 80.0)],
    );
    let away = team(
        "Dragons",
        vec![keeper("Boris", 60.0), chaser("Natalia", 60.0, 50.0), seeker("Viktor", 80.0)],
    );
    let mut sim = Simulation::with_dice(
        home,
        away,
        PhraseBook::standard(),
        config,
        ScriptedDice::new(Vec::<f64>::new()),
    )
    .unwrap();

    let summary = sim.run_to_end().unwrap();
    let state = sim.state();
    let viktor = PlayerRef::new(Side::Away, 2);
    let harry = PlayerRef::new(Side::Home, 2);

    assert_eq!(state.minute(), 40);
    assert_eq!(state.snitch_catch().map(|c| c.player), Some(viktor));
    assert!((state.player(viktor).unwrap().rating() - 8.0).abs() < 1e-9);
    assert!((state.player(harry).unwrap().rating() - 5.0).abs() < 1e-9);
    assert!((state.buckets(Side::Away).seeker - 150.0).abs() < f64::EPSILON);
    assert_eq!(summary.away_score, 150);
    assert_eq!(summary.winner, Some(Side::Away));
    assert!(sim.is_over());

    // The summary exists once and is not regenerated.
    assert_eq!(sim.finish(), summary);
    assert_eq!(sim.tick().unwrap(), TickOutcome::Cancelled);
    assert_eq!(sim.state().summary(), Some(&summary));
}

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn absent_keeper_concedes_every_shot() {
    // The away chaser has no skill, so the home side attacks every minute.
    let home = team("Hawks", vec![chaser("Katie", 40.0, 50.0)]);
    let away = team("Dragons", vec![chaser("Natalia", 0.0, 0.0)]);
    let config = MatchConfig {
        max_minute: 30,
        ..no_snitch()
    };
    let mut sim = Simulation::new(home, away, PhraseBook::standard(), config, 5).unwrap();
    sim.run_to_end().unwrap();

    assert_eq!(sim.state().score(Side::Home), 300);
    assert_eq!(sim.state().player(PlayerRef::new(Side::Home, 0)).unwrap().goals(), 30);
}

#[test]
fn chaser_buckets_move_in_tens() {
    for seed in 0..8 {
        let mut sim = standard_match(seed, no_snitch());
        sim.run_to_end().unwrap();
        for side in Side::BOTH {
            let buckets = sim.state().buckets(side);
            assert!((buckets.chasers[0] % 10.0).abs() < 1e-9);
            assert!(buckets.chasers[1..].iter().all(|v| v.abs() < f64::EPSILON));
            // Penalised at minutes 60, 70, 80 and 90.
            assert!((buckets.seeker + 2.0).abs() < 1e-9);
        }
    }
}

#[test]
fn goals_match_chaser_points() {
    let mut sim = standard_match(21, no_snitch());
    sim.run_to_end().unwrap();
    for side in Side::BOTH {
        let goals: u32 = sim.state().team(side).players().iter().map(|p| p.goals()).sum();
        assert!((sim.state().buckets(side).chasers[0] - f64::from(goals) * 10.0).abs() < 1e-9);
    }
}

// =============================================================================
// Narrative gate
// =============================================================================

#[test]
fn gated_ticks_change_nothing() {
    let mut sim = standard_match(11, MatchConfig::default());
    assert!(matches!(sim.tick().unwrap(), TickOutcome::Played { minute: 1 }));
    assert!(sim.state().is_narrative_playing());

    let frozen = sim.snapshot();
    for _ in 0..5 {
        assert_eq!(sim.tick().unwrap(), TickOutcome::Deferred);
    }
    assert_eq!(sim.snapshot(), frozen);
}

#[test]
fn scores_hold_until_chain_finishes() {
    let mut sim = standard_match(8, no_snitch());
    while !sim.is_over() {
        sim.tick().unwrap();
        let held = (sim.state().score(Side::Home), sim.state().score(Side::Away));
        while sim.state().is_narrative_playing() {
            let shown = (sim.state().score(Side::Home), sim.state().score(Side::Away));
            assert_eq!(shown, held);
            sim.advance_narrative();
        }
    }
    assert!(sim.state().summary().is_some());
}

#[test]
fn snapshot_lists_players_in_role_order() {
    let sim = standard_match(1, MatchConfig::default());
    let roles: Vec<Role> = sim.snapshot().home.players.iter().map(|p| p.role).collect();
    let mut sorted = roles.clone();
    sorted.sort();
    assert_eq!(roles, sorted);
    assert_eq!(sim.snapshot().home.team, "Hogwarts Hawks");
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// Ratings stay in [0, 10] whatever deltas are applied.
    #[test]
    fn prop_ratings_stay_in_band(amounts in prop::collection::vec(-20.0f64..20.0, 0..64)) {
        let mut state = MatchState::new(
            team("Hawks", vec![chaser("Katie", 60.0, 50.0)]),
            team("Dragons", vec![chaser("Natalia", 60.0, 50.0)]),
        );
        let katie = PlayerRef::new(Side::Home, 0);
        for amount in amounts {
            state.apply(&Delta::Rating { player: katie, amount });
            let rating = state.player(katie).unwrap().rating();
            prop_assert!((0.0..=10.0).contains(&rating));
        }
    }

    /// Team scores are floored and never negative.
    #[test]
    fn prop_team_score_non_negative(points in prop::collection::vec(-200.0f64..200.0, 0..16)) {
        let mut state = MatchState::new(team("A", vec![]), team("B", vec![]));
        for p in &points {
            state.credit(Side::Home, Bucket::Seeker, *p);
        }
        state.recompute_scores();
        let sum: f64 = points.iter().sum();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let expected = if sum <= 0.0 { 0 } else { sum.floor() as u32 };
        prop_assert_eq!(state.score(Side::Home), expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Every match ends within the minute bound, ratings in band.
    ///
    /// The bound counts played minutes. A snitch chase takes a tick of its
    /// own without advancing the minute, so the un-gated ticks of a match
    /// are at most `max_minute` played minutes, plus one tick per chase,
    /// plus the single tick that cancels at the bound.
    #[test]
    fn prop_match_terminates_within_bound(seed in any::<u64>(), max_minute in 1u32..120) {
        let config = MatchConfig { max_minute, ..MatchConfig::default() };
        let mut sim = standard_match(seed, config);
        let (mut played, mut chases, mut cancels) = (0u32, 0u32, 0u32);
        while !sim.is_over() {
            match sim.tick().unwrap() {
                TickOutcome::Played { .. } => played += 1,
                TickOutcome::SnitchChase => chases += 1,
                TickOutcome::Cancelled => cancels += 1,
                TickOutcome::Deferred => {}
            }
            while sim.state().is_narrative_playing() {
                sim.advance_narrative();
            }
        }
        let caught = sim.state().snitch_catch().is_some();
        prop_assert!(sim.is_over());
        prop_assert_eq!(played, sim.state().minute());
        prop_assert!(played <= max_minute);
        prop_assert!(chases >= u32::from(caught));
        // Ended either by the catch or by one cancelling tick, never both.
        prop_assert_eq!(cancels, u32::from(!caught));
        prop_assert!(played + chases + cancels <= max_minute + chases + 1);
        prop_assert!(ratings(&sim).iter().all(|r| (0.0..=10.0).contains(r)));
        prop_assert!(sim.state().summary().is_some());
    }
}
