//! Event resolution: deciding what happens in one simulated play.
//!
//! A resolver reads the current [`MatchState`] and produces an
//! [`EventChain`]: the narrative lines of the play plus the [`Delta`]s it
//! will cause. Resolvers never mutate the state. The deltas are committed
//! by the scheduler only after the narrator has played every line, so the
//! numbers on screen never run ahead of the story being told.
//!
//! # Invariants
//!
//! - Resolvers MUST NOT mutate state (they only get `&MatchState`)
//! - Resolvers MUST be deterministic given the same state and draw sequence
//! - Every random decision is a single draw, consumed immediately
//!
//! # Available Resolvers
//!
//! - [`ChaserShot`]: one shot on goal, resolved every un-gated minute
//! - [`SnitchChase`]: the snitch check, which takes precedence and may end the match

mod beater;
mod chaser;
mod snitch;

pub use beater::{DuelRewards, CHASER_DUEL, SNITCH_DUEL};
pub use chaser::ChaserShot;
pub use snitch::SnitchChase;

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::dice::Dice;
use crate::error::{MatchError, Result};
use crate::phrases::{PhraseBook, PhraseKey, Vars};
use crate::roster::{PlayerRef, Side};
use crate::state::{Bucket, MatchState};

/// What kind of play an event chain narrates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayKind {
    /// A shot on goal.
    ChaserShot,
    /// A snitch chase.
    SnitchChase,
}

/// A pending state change, committed after narration.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delta {
    /// Add points to a score bucket.
    Score {
        /// Credited side.
        side: Side,
        /// Credited bucket.
        bucket: Bucket,
        /// Points, may be negative.
        points: f64,
    },
    /// Shift a performance rating (clamped on apply).
    Rating {
        /// Rated player.
        player: PlayerRef,
        /// Signed change.
        amount: f64,
    },
    /// Credit a goal to a player.
    Goal {
        /// Scorer.
        player: PlayerRef,
    },
    /// Record the snitch catcher.
    SnitchCaught {
        /// Catcher.
        player: PlayerRef,
    },
}

/// Narrative lines plus pending deltas of one resolved play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventChain {
    /// Kind of play.
    pub kind: PlayKind,
    /// Lines in narration order.
    pub lines: Vec<String>,
    /// Deltas to commit once narration finishes, in order.
    pub deltas: Vec<Delta>,
    /// Whether committing this chain ends the match.
    pub ends_match: bool,
}

impl EventChain {
    /// Empty chain of `kind`.
    #[must_use]
    pub fn new(kind: PlayKind) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            deltas: Vec::new(),
            ends_match: false,
        }
    }

    /// Net score change the chain would credit to `side`.
    #[must_use]
    pub fn points_for(&self, side: Side) -> f64 {
        self.deltas
            .iter()
            .filter_map(|d| match *d {
                Delta::Score { side: s, points, .. } if s == side => Some(points),
                _ => None,
            })
            .sum()
    }

    /// Whether the chain credits a goal.
    #[must_use]
    pub fn is_goal(&self) -> bool {
        self.deltas.iter().any(|d| matches!(d, Delta::Goal { .. }))
    }
}

/// Everything a resolver may read, plus the dice.
pub struct PlayContext<'a> {
    /// Current state (read-only).
    pub state: &'a MatchState,
    /// Narrative templates.
    pub phrases: &'a PhraseBook,
    /// Match tunables.
    pub config: &'a MatchConfig,
    /// Source of random decisions.
    pub dice: &'a mut dyn Dice,
}

impl PlayContext<'_> {
    /// Renders a line for `key`.
    pub fn say(&mut self, chain: &mut EventChain, key: PhraseKey, vars: &Vars) {
        let line = self.phrases.render(key, vars, &mut *self.dice);
        chain.lines.push(line);
    }

    /// Placeholder values describing `player` as the main actor.
    #[must_use]
    pub fn actor_vars(&self, player: PlayerRef) -> Vars {
        let team = self.state.team(player.side);
        let vars = Vars::new()
            .set("team", team.nominative())
            .set("team_acc", team.accusative())
            .set("opponent", self.state.team(player.side.opponent()).nominative())
            .set("minute", self.state.minute());
        match team.player(player.index) {
            Some(p) => vars
                .set("player", p.name())
                .set("pronoun", p.gender().pronoun())
                .set("possessive", p.gender().possessive()),
            None => vars,
        }
    }

    /// Name of `player`, empty if the slot does not exist.
    #[must_use]
    pub fn name_of(&self, player: PlayerRef) -> String {
        self.state
            .player(player)
            .map(|p| p.name().to_string())
            .unwrap_or_default()
    }

    /// Fails if either side has no players.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EmptyRoster`] naming the first empty side.
    pub fn require_players(&self) -> Result<()> {
        for side in Side::BOTH {
            if self.state.team(side).is_empty() {
                return Err(MatchError::EmptyRoster { side });
            }
        }
        Ok(())
    }
}

/// Decides one play.
///
/// Returns `Ok(None)` when the play does not happen this tick (the snitch
/// stays hidden).
///
/// # Example
///
/// ```
/// use quidditch_core::resolver::{EventChain, PlayContext, PlayKind, Resolver};
/// use quidditch_core::error::Result;
///
/// struct QuietPlay;
///
/// impl Resolver for QuietPlay {
///     fn kind(&self) -> PlayKind {
///         PlayKind::ChaserShot
///     }
///
///     fn resolve(&self, _ctx: &mut PlayContext<'_>) -> Result<Option<EventChain>> {
///         Ok(None)
///     }
/// }
/// ```
pub trait Resolver {
    /// The play this resolver decides.
    fn kind(&self) -> PlayKind;

    /// Decides the play against the current state.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::EmptyRoster`] if a side cannot field anyone.
    fn resolve(&self, ctx: &mut PlayContext<'_>) -> Result<Option<EventChain>>;
}
