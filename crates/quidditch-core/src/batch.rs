//! Batch runner: many independent matches in parallel.
//!
//! Each match is still single-threaded and fully determined by its seed.
//! Matches run on the rayon pool and are collected back in seed order, so a
//! report never depends on thread scheduling.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::MatchConfig;
use crate::error::Result;
use crate::phrases::PhraseBook;
use crate::roster::{Side, Team};
use crate::simulation::Simulation;

/// Outcome of one match in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Seed the match ran with.
    pub seed: u64,
    /// Final home score.
    pub home_score: u32,
    /// Final away score.
    pub away_score: u32,
    /// Winner, `None` on a draw.
    pub winner: Option<Side>,
    /// Minute the match ended in.
    pub end_minute: u32,
    /// Whether the snitch was caught.
    pub snitch_caught: bool,
}

/// Aggregate over a batch, plus every individual record in seed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of matches.
    pub runs: usize,
    /// Matches won by the home side.
    pub home_wins: usize,
    /// Matches won by the away side.
    pub away_wins: usize,
    /// Drawn matches.
    pub draws: usize,
    /// Mean final home score.
    pub avg_home_score: f64,
    /// Mean final away score.
    pub avg_away_score: f64,
    /// Share of matches ended by a snitch catch.
    pub snitch_rate: f64,
    /// Mean final minute.
    pub avg_end_minute: f64,
    /// Per-match records, in the order the seeds were given.
    pub matches: Vec<MatchRecord>,
}

impl BatchReport {
    /// Aggregates `matches`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_records(matches: Vec<MatchRecord>) -> Self {
        let runs = matches.len();
        let count = |side: Option<Side>| matches.iter().filter(|m| m.winner == side).count();
        let mean = |value: &dyn Fn(&MatchRecord) -> f64| {
            if runs == 0 {
                0.0
            } else {
                matches.iter().map(value).sum::<f64>() / runs as f64
            }
        };
        Self {
            runs,
            home_wins: count(Some(Side::Home)),
            away_wins: count(Some(Side::Away)),
            draws: count(None),
            avg_home_score: mean(&|m| f64::from(m.home_score)),
            avg_away_score: mean(&|m| f64::from(m.away_score)),
            snitch_rate: mean(&|m| if m.snitch_caught { 1.0 } else { 0.0 }),
            avg_end_minute: mean(&|m| f64::from(m.end_minute)),
            matches,
        }
    }
}

/// Plays one full match on the virtual clock.
///
/// # Errors
///
/// Returns the first error of [`Simulation::run_to_end`].
pub fn simulate_one(
    home: &Team,
    away: &Team,
    phrases: &PhraseBook,
    config: &MatchConfig,
    seed: u64,
) -> Result<MatchRecord> {
    let mut sim = Simulation::new(
        home.clone(),
        away.clone(),
        phrases.clone(),
        config.clone(),
        seed,
    )?;
    let summary = sim.run_to_end()?;
    Ok(MatchRecord {
        seed,
        home_score: summary.home_score,
        away_score: summary.away_score,
        winner: summary.winner,
        end_minute: sim.state().minute(),
        snitch_caught: sim.state().snitch_catch().is_some(),
    })
}

/// Plays one match per seed in parallel and aggregates the results.
///
/// # Errors
///
/// Returns the error of the first failing match in seed order.
pub fn simulate_many(
    home: &Team,
    away: &Team,
    phrases: &PhraseBook,
    config: &MatchConfig,
    seeds: &[u64],
) -> Result<BatchReport> {
    config.validate()?;
    let records = seeds
        .par_iter()
        .map(|&seed| simulate_one(home, away, phrases, config, seed))
        .collect::<Result<Vec<_>>>()?;
    let report = BatchReport::from_records(records);
    info!(
        runs = report.runs,
        home_wins = report.home_wins,
        away_wins = report.away_wins,
        draws = report.draws,
        "batch finished"
    );
    Ok(report)
}
