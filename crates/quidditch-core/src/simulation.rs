//! Tick scheduler: the minute-by-minute match loop.
//!
//! The `Simulation` owns the [`MatchState`] and drives it through two
//! interleaved cadences:
//!
//! 1. **TICK** (every `tick_period`): if a chain is narrating, do nothing.
//!    Otherwise cancel at the minute bound, else try the snitch, else
//!    advance the minute, resolve one chaser shot, apply any time penalty
//!    and recompute the scores. The resolved chain starts narrating.
//! 2. **NARRATE** (every `line_duration` while a chain plays): reveal the
//!    next line; after the last one, commit the chain's deltas.
//!
//! Both cadences can be driven by hand ([`Simulation::tick`],
//! [`Simulation::advance_narrative`]) or through the virtual clock
//! ([`Simulation::advance_by`], [`Simulation::run_to_end`]).
//!
//! # Determinism
//!
//! Every random decision goes through the simulation's [`Dice`] in a fixed
//! order, so a seed fully determines the event log, scores and ratings.
//!
//! # Example
//!
//! ```
//! use quidditch_core::config::MatchConfig;
//! use quidditch_core::phrases::PhraseBook;
//! use quidditch_core::roster::{Gender, Player, Prefix, Role, Team};
//! use quidditch_core::simulation::Simulation;
//!
//! let side = |name: &str| {
//!     Team::new(
//!         name,
//!         Prefix::new("the", "the"),
//!         vec![Player::new(format!("{name} chaser"), Role::Chaser, Gender::Female)
//!             .with_skill("accuracy", 50.0)],
//!     )
//! };
//! let mut sim = Simulation::new(
//!     side("Hawks"),
//!     side("Dragons"),
//!     PhraseBook::standard(),
//!     MatchConfig::default(),
//!     42,
//! )
//! .unwrap();
//!
//! let summary = sim.run_to_end().unwrap();
//! assert!(sim.is_over());
//! assert_eq!(summary.lines.len(), 2);
//! ```

use std::fmt;
use std::time::Duration;

use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, trace};

use crate::config::MatchConfig;
use crate::dice::{seeded, Dice};
use crate::error::Result;
use crate::narrator::{NarrationStep, Narrator};
use crate::phrases::{PhraseBook, PhraseKey, Vars};
use crate::resolver::{ChaserShot, EventChain, PlayContext, Resolver, SnitchChase};
use crate::roster::source::RosterSource;
use crate::roster::{Side, Team};
use crate::state::{Bucket, MatchSnapshot, MatchState};
use crate::summary::{summarize, Summary};

// =============================================================================
// Scheduler outcomes
// =============================================================================

/// Whether the scheduler still fires.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    /// Ticks are processed.
    Running,
    /// The match is over; ticks are ignored.
    Cancelled,
}

/// What one scheduler tick did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A chain is narrating; nothing changed.
    Deferred,
    /// The snitch appeared; the minute did not advance.
    SnitchChase,
    /// A regular minute was played.
    Played {
        /// The minute just played.
        minute: u32,
    },
    /// The scheduler is cancelled (already, or by this tick).
    Cancelled,
}

/// Virtual time of the two cadences.
#[derive(Debug, Clone, Copy, Default)]
struct Clock {
    now: Duration,
    next_tick: Duration,
    next_line: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Due {
    Line(Duration),
    Tick(Duration),
}

// =============================================================================
// Simulation
// =============================================================================

/// One match from kick-off to summary.
pub struct Simulation<D: Dice = ChaCha8Rng> {
    state: MatchState,
    narrator: Narrator,
    phrases: PhraseBook,
    config: MatchConfig,
    dice: D,
    scheduler: SchedulerState,
    clock: Clock,
    seed: Option<u64>,
}

impl<D: Dice> fmt::Debug for Simulation<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("minute", &self.state.minute())
            .field("scheduler", &self.scheduler)
            .field("narrator", &self.narrator)
            .field("config", &self.config)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl Simulation<ChaCha8Rng> {
    /// Creates a seeded match between two loaded teams.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MatchError::InvalidConfig`] if `config` does not
    /// validate.
    pub fn new(
        home: Team,
        away: Team,
        phrases: PhraseBook,
        config: MatchConfig,
        seed: u64,
    ) -> Result<Self> {
        let mut sim = Self::with_dice(home, away, phrases, config, seeded(seed))?;
        sim.seed = Some(seed);
        Ok(sim)
    }

    /// Loads `home` and `away` from `source` and creates a seeded match.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MatchError::MissingRoster`] if either team is
    /// absent, in which case no scheduler exists at all.
    pub fn from_source(
        source: &dyn RosterSource,
        home: &str,
        away: &str,
        phrases: PhraseBook,
        config: MatchConfig,
        seed: u64,
    ) -> Result<Self> {
        let (home, away) = source.load_teams(home, away)?;
        Self::new(home, away, phrases, config, seed)
    }
}

impl<D: Dice> Simulation<D> {
    /// Creates a match drawing from `dice`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MatchError::InvalidConfig`] if `config` does not
    /// validate.
    pub fn with_dice(
        home: Team,
        away: Team,
        phrases: PhraseBook,
        config: MatchConfig,
        dice: D,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            home = home.name(),
            away = away.name(),
            max_minute = config.max_minute,
            "match created"
        );
        let clock = Clock {
            next_tick: config.tick_period(),
            ..Clock::default()
        };
        Ok(Self {
            state: MatchState::new(home, away),
            narrator: Narrator::new(),
            phrases,
            config,
            dice,
            scheduler: SchedulerState::Running,
            clock,
            seed: None,
        })
    }

    /// Current match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Read-only view for the render layer.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        self.state.snapshot()
    }

    /// Match tunables.
    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Seed of the match dice, if the match was created from one.
    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Scheduler state.
    #[must_use]
    pub fn scheduler(&self) -> SchedulerState {
        self.scheduler
    }

    /// Whether the scheduler has been cancelled.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.scheduler == SchedulerState::Cancelled
    }

    /// Virtual time elapsed on the match clock.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.clock.now
    }

    // -------------------------------------------------------------------------
    // Scheduler
    // -------------------------------------------------------------------------

    /// Runs one scheduler tick.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MatchError::EmptyRoster`] if a side has nobody to
    /// play; the scheduler is cancelled first.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if self.is_over() {
            return Ok(TickOutcome::Cancelled);
        }
        if self.state.is_narrative_playing() {
            return Ok(TickOutcome::Deferred);
        }
        if self.state.minute() >= self.config.max_minute {
            info!(minute = self.state.minute(), "minute bound reached");
            self.finish();
            return Ok(TickOutcome::Cancelled);
        }

        let snitch = self.resolve(&SnitchChase::new());
        if let Some(chain) = self.cancel_on_error(snitch)? {
            self.narrator.start(chain, &mut self.state);
            return Ok(TickOutcome::SnitchChase);
        }

        let minute = self.state.advance_minute();
        let shot = self.resolve(&ChaserShot::new());
        let mut chain = self.cancel_on_error(shot)?;
        if self.config.penalty_due(minute) {
            let line = self.apply_time_penalty(minute);
            // The penalty is narrated after the shot it follows.
            match chain.as_mut() {
                Some(chain) => chain.lines.push(line),
                None if !line.is_empty() => self.state.log(line),
                None => {}
            }
        }
        self.state.recompute_scores();
        if let Some(chain) = chain {
            self.narrator.start(chain, &mut self.state);
        }
        debug!(minute, "minute played");
        Ok(TickOutcome::Played { minute })
    }

    /// Reveals the next narrative line, committing the chain once it ends.
    ///
    /// Does nothing once the match is over.
    pub fn advance_narrative(&mut self) -> NarrationStep {
        if self.is_over() {
            return NarrationStep::Idle;
        }
        let step = self.narrator.advance(&mut self.state);
        if let NarrationStep::Finished(chain) = &step {
            self.commit(chain);
        }
        step
    }

    /// Cancels the scheduler and produces the summary.
    ///
    /// Only called at the minute bound and after a committed catch, so the
    /// summary always sees committed state. Idempotent: the summary is
    /// generated exactly once and returned again on later calls.
    pub(crate) fn finish(&mut self) -> Summary {
        self.scheduler = SchedulerState::Cancelled;
        match self.state.summary() {
            Some(summary) => summary.clone(),
            None => {
                let summary = summarize(&self.state, &self.phrases, &mut self.dice);
                info!(
                    minute = self.state.minute(),
                    home_score = summary.home_score,
                    away_score = summary.away_score,
                    "match over"
                );
                self.state.set_summary(summary.clone());
                summary
            }
        }
    }

    fn resolve(&mut self, resolver: &dyn Resolver) -> Result<Option<EventChain>> {
        let mut ctx = PlayContext {
            state: &self.state,
            phrases: &self.phrases,
            config: &self.config,
            dice: &mut self.dice,
        };
        let resolved = resolver.resolve(&mut ctx);
        if let Ok(Some(chain)) = &resolved {
            trace!(kind = ?resolver.kind(), lines = chain.lines.len(), "play resolved");
        }
        resolved
    }

    fn cancel_on_error<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            error!(%err, minute = self.state.minute(), "play could not be resolved, stopping");
            self.scheduler = SchedulerState::Cancelled;
        }
        result
    }

    /// Charges both seeker buckets and renders the penalty line.
    fn apply_time_penalty(&mut self, minute: u32) -> String {
        for side in Side::BOTH {
            self.state
                .credit(side, Bucket::Seeker, -self.config.penalty_points);
        }
        let vars = Vars::new()
            .set("minute", minute)
            .set("home", self.state.team(Side::Home).nominative())
            .set("away", self.state.team(Side::Away).nominative());
        debug!(minute, points = self.config.penalty_points, "time penalty");
        self.phrases
            .render(PhraseKey::TimePenalty, &vars, &mut self.dice)
    }

    fn commit(&mut self, chain: &EventChain) {
        for delta in &chain.deltas {
            self.state.apply(delta);
        }
        self.state.recompute_scores();
        if chain.ends_match {
            self.finish();
        }
    }

    // -------------------------------------------------------------------------
    // Virtual clock
    // -------------------------------------------------------------------------

    /// Advances the virtual clock by `dt`, firing every tick and narrative
    /// line that falls due, in time order. A line and a tick due at the same
    /// instant fire line first.
    ///
    /// # Errors
    ///
    /// Propagates the first error of [`Simulation::tick`].
    pub fn advance_by(&mut self, dt: Duration) -> Result<()> {
        let target = self.clock.now + dt;
        while let Some(due) = self.next_due() {
            let at = match due {
                Due::Line(at) | Due::Tick(at) => at,
            };
            if at > target {
                break;
            }
            self.fire(due)?;
        }
        if !self.is_over() {
            self.clock.now = target;
        }
        Ok(())
    }

    /// Runs the virtual clock until the match is over.
    ///
    /// # Errors
    ///
    /// Propagates the first error of [`Simulation::tick`].
    pub fn run_to_end(&mut self) -> Result<Summary> {
        while let Some(due) = self.next_due() {
            self.fire(due)?;
        }
        Ok(self.finish())
    }

    fn next_due(&mut self) -> Option<Due> {
        if self.is_over() {
            return None;
        }
        if self.narrator.is_playing() && self.clock.next_line.is_none() {
            self.clock.next_line = Some(self.clock.now + self.config.line_duration());
        }
        match self.clock.next_line {
            Some(line) if line <= self.clock.next_tick => Some(Due::Line(line)),
            _ => Some(Due::Tick(self.clock.next_tick)),
        }
    }

    fn fire(&mut self, due: Due) -> Result<()> {
        match due {
            Due::Line(at) => {
                self.clock.now = at;
                self.advance_narrative();
                self.clock.next_line = self
                    .narrator
                    .is_playing()
                    .then(|| at + self.config.line_duration());
            }
            Due::Tick(at) => {
                self.clock.now = at;
                self.clock.next_tick = at + self.config.tick_period();
                self.tick()?;
                if self.narrator.is_playing() && self.clock.next_line.is_none() {
                    self.clock.next_line = Some(at + self.config.line_duration());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::error::MatchError;
    use crate::roster::source::StaticRoster;
    use crate::tests::helpers::{chaser, keeper, seeker, team};

    fn hawks() -> Team {
        team(
            "Hawks",
            vec![
                keeper("Oliver", 60.0),
                chaser("Katie", 60.0, 50.0),
                seeker("Harry", 80.0),
            ],
        )
    }

    fn dragons() -> Team {
        team(
            "Dragons",
            vec![
                keeper("Boris", 60.0),
                chaser("Natalia", 60.0, 50.0),
                seeker("Viktor", 80.0),
            ],
        )
    }

    /// A match whose dice never fire a snitch and never pick anything but
    /// the last option, with the given config.
    fn quiet(config: MatchConfig) -> Simulation<ScriptedDice> {
        Simulation::with_dice(
            hawks(),
            dragons(),
            PhraseBook::standard(),
            config,
            ScriptedDice::new(Vec::<f64>::new()),
        )
        .unwrap()
    }

    fn drain(sim: &mut Simulation<ScriptedDice>) {
        while sim.state().is_narrative_playing() {
            sim.advance_narrative();
        }
    }

    mod construction_tests {
        use super::*;

        #[test]
        fn invalid_config_is_rejected() {
            let config = MatchConfig {
                tick_period_ms: 0,
                ..MatchConfig::default()
            };
            let err = Simulation::new(hawks(), dragons(), PhraseBook::standard(), config, 1)
                .unwrap_err();
            assert!(matches!(err, MatchError::InvalidConfig(_)));
        }

        #[test]
        fn missing_team_never_starts() {
            let source = StaticRoster::new().with_team(&hawks());
            let err = Simulation::from_source(
                &source,
                "Hawks",
                "Dragons",
                PhraseBook::standard(),
                MatchConfig::default(),
                1,
            )
            .unwrap_err();
            assert!(matches!(err, MatchError::MissingRoster { team } if team == "Dragons"));
        }

        #[test]
        fn seed_is_kept() {
            let sim = Simulation::new(
                hawks(),
                dragons(),
                PhraseBook::standard(),
                MatchConfig::default(),
                12345,
            )
            .unwrap();
            assert_eq!(sim.seed(), Some(12345));
            assert_eq!(sim.state().minute(), 0);
            assert_eq!(sim.scheduler(), SchedulerState::Running);
        }
    }

    mod tick_tests {
        use super::*;

        #[test]
        fn tick_plays_a_minute_and_gates() {
            let mut sim = quiet(MatchConfig::default());
            assert_eq!(sim.tick().unwrap(), TickOutcome::Played { minute: 1 });
            assert!(sim.state().is_narrative_playing());

            let before = sim.state().minute();
            let log_len = sim.state().event_log().len();
            assert_eq!(sim.tick().unwrap(), TickOutcome::Deferred);
            assert_eq!(sim.state().minute(), before);
            assert_eq!(sim.state().event_log().len(), log_len);
        }

        #[test]
        fn deltas_commit_only_after_narration() {
            let mut sim = quiet(MatchConfig::default());
            sim.tick().unwrap();
            let ratings = |sim: &Simulation<ScriptedDice>| {
                sim.snapshot()
                    .home
                    .players
                    .iter()
                    .chain(sim.snapshot().away.players.iter())
                    .map(|p| p.rating)
                    .collect::<Vec<_>>()
            };
            assert!(ratings(&sim).iter().all(|r| (*r - 6.0).abs() < 1e-9));
            drain(&mut sim);
            assert!(ratings(&sim).iter().any(|r| (*r - 6.0).abs() > 1e-9));
        }

        #[test]
        fn minute_bound_cancels_and_summarizes() {
            let config = MatchConfig {
                max_minute: 3,
                ..MatchConfig::default()
            };
            let mut sim = quiet(config);
            for minute in 1..=3 {
                assert_eq!(sim.tick().unwrap(), TickOutcome::Played { minute });
                drain(&mut sim);
            }
            assert_eq!(sim.tick().unwrap(), TickOutcome::Cancelled);
            assert!(sim.is_over());
            assert!(sim.state().summary().is_some());
            assert_eq!(sim.tick().unwrap(), TickOutcome::Cancelled);
            assert_eq!(sim.state().minute(), 3);
        }

        #[test]
        fn empty_roster_stops_the_scheduler() {
            let mut sim = Simulation::with_dice(
                hawks(),
                team("Ghosts", vec![]),
                PhraseBook::standard(),
                MatchConfig::default(),
                ScriptedDice::new(Vec::<f64>::new()),
            )
            .unwrap();
            let err = sim.tick().unwrap_err();
            assert!(matches!(err, MatchError::EmptyRoster { side: Side::Away }));
            assert!(sim.is_over());
            assert_eq!(sim.tick().unwrap(), TickOutcome::Cancelled);
        }

        #[test]
        fn time_penalty_hits_both_seeker_buckets() {
            let config = MatchConfig {
                penalty_start_minute: 2,
                penalty_interval: 2,
                ..MatchConfig::default()
            };
            let mut sim = quiet(config);
            sim.tick().unwrap();
            drain(&mut sim);
            assert!(sim.state().buckets(Side::Home).seeker.abs() < f64::EPSILON);

            sim.tick().unwrap();
            for side in Side::BOTH {
                assert!((sim.state().buckets(side).seeker + 0.5).abs() < f64::EPSILON);
            }
            let logged = sim.state().event_log().len();
            drain(&mut sim);

            // Narrated last, after the shot of the same minute.
            let log = sim.state().event_log();
            assert!(log.len() > logged + 1);
            assert!(log[..log.len() - 1].iter().all(|line| !line.contains("penalises")));
            assert!(log[log.len() - 1].contains("penalises"));
        }
    }

    mod finish_tests {
        use super::*;

        #[test]
        fn finish_is_idempotent() {
            let mut sim = quiet(MatchConfig::default());
            let first = sim.finish();
            let second = sim.finish();
            assert_eq!(first, second);
            assert!(sim.is_over());
        }

        #[test]
        fn narration_after_cancel_commits_nothing() {
            let mut sim = quiet(MatchConfig::default());
            sim.tick().unwrap();
            assert!(sim.state().is_narrative_playing());

            let summary = sim.finish();
            let frozen = sim.snapshot();
            for _ in 0..8 {
                assert_eq!(sim.advance_narrative(), NarrationStep::Idle);
            }
            assert_eq!(sim.snapshot(), frozen);
            assert_eq!(summary.home_score, sim.state().score(Side::Home));
            assert_eq!(summary.away_score, sim.state().score(Side::Away));
        }
    }

    mod clock_tests {
        use super::*;

        #[test]
        fn nothing_fires_before_first_tick() {
            let mut sim = quiet(MatchConfig::default());
            sim.advance_by(Duration::from_millis(999)).unwrap();
            assert_eq!(sim.state().minute(), 0);
            sim.advance_by(Duration::from_millis(1)).unwrap();
            assert_eq!(sim.state().minute(), 1);
            assert_eq!(sim.elapsed(), Duration::from_millis(1000));
        }

        #[test]
        fn narration_holds_the_clock() {
            // Default cadence: tick every second, lines every two seconds.
            let mut sim = quiet(MatchConfig::default());
            sim.advance_by(Duration::from_millis(1000)).unwrap();
            let lines = sim.state().event_log().len();
            assert!(lines >= 1);
            // Every further tick is deferred until the chain has drained.
            sim.advance_by(Duration::from_millis(1000)).unwrap();
            assert_eq!(sim.state().minute(), 1);
        }

        #[test]
        fn run_to_end_respects_minute_bound() {
            let config = MatchConfig {
                max_minute: 10,
                ..MatchConfig::default()
            };
            let mut sim = quiet(config);
            let summary = sim.run_to_end().unwrap();
            assert_eq!(sim.state().minute(), 10);
            assert_eq!(
                sim.state().summary().map(|s| s.home_score),
                Some(summary.home_score)
            );
        }
    }
}
