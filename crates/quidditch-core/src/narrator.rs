//! Narrative sequencer: plays one event chain a line at a time.
//!
//! The narrator is an explicit state machine driven by [`Narrator::advance`].
//! While a chain is playing it holds the narrative gate on [`MatchState`],
//! which freezes the tick scheduler. After the last line has had its display
//! slot, one more advance clears the screen, releases the gate and hands the
//! chain back so its deltas can be committed.
//!
//! ```text
//! Idle --start--> Playing { next } --advance--> ... --> Draining --advance--> Idle
//! ```

use tracing::{trace, warn};

use crate::resolver::EventChain;
use crate::state::MatchState;

#[derive(Debug, Clone, Default)]
enum Playback {
    #[default]
    Idle,
    Playing {
        chain: EventChain,
        next: usize,
    },
    Draining {
        chain: EventChain,
    },
}

/// What one call to [`Narrator::advance`] did.
#[derive(Debug, Clone, PartialEq)]
pub enum NarrationStep {
    /// Nothing was playing.
    Idle,
    /// A line was revealed.
    Line(String),
    /// The chain finished; its deltas are ready to commit.
    Finished(EventChain),
}

/// Plays at most one event chain at a time.
#[derive(Debug, Clone, Default)]
pub struct Narrator {
    playback: Playback,
}

impl Narrator {
    /// Idle narrator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a chain holds the narrative gate.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        !matches!(self.playback, Playback::Idle)
    }

    /// Starts playing `chain` and reveals its first line.
    ///
    /// Returns `false`, leaving everything untouched, if a chain is already
    /// playing.
    pub fn start(&mut self, chain: EventChain, state: &mut MatchState) -> bool {
        if self.is_playing() {
            warn!(kind = ?chain.kind, "narration already playing, chain dropped");
            return false;
        }
        state.set_narrative_playing(true);
        if chain.lines.is_empty() {
            self.playback = Playback::Draining { chain };
        } else {
            self.reveal(chain, 0, state);
        }
        true
    }

    /// Moves playback one display slot forward.
    pub fn advance(&mut self, state: &mut MatchState) -> NarrationStep {
        match std::mem::take(&mut self.playback) {
            Playback::Idle => NarrationStep::Idle,
            Playback::Playing { chain, next } => self.reveal(chain, next, state),
            Playback::Draining { chain } => {
                state.show_line(None);
                state.set_narrative_playing(false);
                trace!(kind = ?chain.kind, "narration finished");
                NarrationStep::Finished(chain)
            }
        }
    }

    fn reveal(&mut self, chain: EventChain, next: usize, state: &mut MatchState) -> NarrationStep {
        let line = chain.lines.get(next).cloned().unwrap_or_default();
        // Empty lines keep their slot but are not logged.
        if line.is_empty() {
            state.show_line(None);
        } else {
            state.log(line.clone());
            state.show_line(Some(line.clone()));
        }
        self.playback = if next + 1 < chain.lines.len() {
            Playback::Playing {
                chain,
                next: next + 1,
            }
        } else {
            Playback::Draining { chain }
        };
        NarrationStep::Line(line)
    }
}
