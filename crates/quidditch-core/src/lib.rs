//! # Quidditch Core
//!
//! Minute-by-minute Quidditch match simulation engine.
//!
//! Two teams are loaded from a roster source and a tick scheduler plays the
//! match one minute at a time. Each minute resolves one chaser shot, unless
//! the snitch turns up first. Every play becomes an event chain of
//! narrative lines whose score and rating changes are committed only once
//! the narrator has played all of them.
//!
//! ## Architecture
//!
//! - **Roster**: teams, players and the [`roster::RosterSource`] seam
//! - **Resolvers**: [`resolver::ChaserShot`] and [`resolver::SnitchChase`] decide plays
//! - **Narrator**: a state machine revealing one line per display slot
//! - **Simulation**: the scheduler owning [`state::MatchState`]
//! - **Summary**: winner, MVP and the closing lines
//!
//! ## Usage
//!
//! ```
//! use quidditch_core::{JsonRoster, MatchConfig, PhraseBook, Simulation};
//!
//! let roster = JsonRoster::bundled().unwrap();
//! let mut sim = Simulation::from_source(
//!     &roster,
//!     "Hogwarts Hawks",
//!     "Durmstrang Dragons",
//!     PhraseBook::standard(),
//!     MatchConfig::default(),
//!     7,
//! )
//! .unwrap();
//!
//! let summary = sim.run_to_end().unwrap();
//! println!("{}", summary.lines[0]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod batch;
pub mod config;
pub mod dice;
pub mod error;
pub mod narrator;
pub mod phrases;
pub mod resolver;
pub mod roster;
pub mod simulation;
pub mod state;
pub mod summary;

pub use batch::{simulate_many, BatchReport, MatchRecord};
pub use config::MatchConfig;
pub use error::{MatchError, Result};
pub use phrases::{PhraseBook, PhraseKey};
pub use roster::{JsonRoster, RosterSource, Side, StaticRoster, Team};
pub use simulation::{Simulation, TickOutcome};
pub use state::MatchSnapshot;
pub use summary::Summary;

#[cfg(test)]
mod tests;
