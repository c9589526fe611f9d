//! Match state: clock, score buckets, rosters and narrative buffer.
//!
//! `MatchState` is the single owned record the scheduler, narrator and
//! resolver operate on. The render layer never touches it directly; it reads
//! a [`MatchSnapshot`] instead.
//!
//! # Scoring
//!
//! Each side has four buckets: three chaser slots and one seeker bucket.
//! Goals are always credited to chaser slot 0; slots 1 and 2 are carried for
//! per-slot scoring and never credited today. The seeker bucket receives the
//! snitch bonus and the time penalties, so it can go fractional or negative.
//! The displayed team score is `max(0, floor(sum of buckets))`.

use serde::{Deserialize, Serialize};

use crate::resolver::Delta;
use crate::roster::{Player, PlayerRef, Role, Side, Team};
use crate::summary::Summary;

/// Number of chaser slots per side.
pub const CHASER_SLOTS: usize = 3;

/// Which bucket a score delta targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// A chaser slot, `0..CHASER_SLOTS`.
    Chaser(usize),
    /// The seeker/bonus bucket.
    Seeker,
}

/// The four score buckets of one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBuckets {
    /// Chaser slot buckets.
    pub chasers: [f64; CHASER_SLOTS],
    /// Snitch bonus and time penalties.
    pub seeker: f64,
}

impl ScoreBuckets {
    /// Adds `points` to `bucket`. Out-of-range chaser slots are ignored.
    pub fn credit(&mut self, bucket: Bucket, points: f64) {
        match bucket {
            Bucket::Chaser(slot) => {
                if let Some(value) = self.chasers.get_mut(slot) {
                    *value += points;
                }
            }
            Bucket::Seeker => self.seeker += points,
        }
    }

    /// Sum of all four buckets.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.chasers.iter().sum::<f64>() + self.seeker
    }

    /// `max(0, floor(sum))`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn team_score(&self) -> u32 {
        let total = self.sum().floor();
        if total <= 0.0 {
            0
        } else {
            total as u32
        }
    }
}

/// Who caught the snitch. Set once; the match ends with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnitchCatch {
    /// Catching player.
    pub player: PlayerRef,
    /// Catching team's name.
    pub team: String,
    /// Catching player's name.
    pub name: String,
    /// Minute of the catch.
    pub minute: u32,
}

/// The complete mutable state of one match.
#[derive(Debug, Clone)]
pub struct MatchState {
    teams: [Team; 2],
    minute: u32,
    buckets: [ScoreBuckets; 2],
    scores: [u32; 2],
    event_log: Vec<String>,
    current_line: Option<String>,
    narrative_playing: bool,
    snitch_catch: Option<SnitchCatch>,
    summary: Option<Summary>,
}

impl MatchState {
    /// Creates the kick-off state for two loaded teams.
    #[must_use]
    pub fn new(home: Team, away: Team) -> Self {
        Self {
            teams: [home, away],
            minute: 0,
            buckets: [ScoreBuckets::default(), ScoreBuckets::default()],
            scores: [0, 0],
            event_log: Vec::new(),
            current_line: None,
            narrative_playing: false,
            snitch_catch: None,
            summary: None,
        }
    }

    /// Current minute.
    #[must_use]
    pub const fn minute(&self) -> u32 {
        self.minute
    }

    /// Advances the clock by one minute and returns the new minute.
    pub fn advance_minute(&mut self) -> u32 {
        self.minute += 1;
        self.minute
    }

    /// Team playing on `side`.
    #[must_use]
    pub fn team(&self, side: Side) -> &Team {
        &self.teams[side.index()]
    }

    /// Player addressed by `player`.
    #[must_use]
    pub fn player(&self, player: PlayerRef) -> Option<&Player> {
        self.team(player.side).player(player.index)
    }

    /// Score buckets of `side`.
    #[must_use]
    pub fn buckets(&self, side: Side) -> &ScoreBuckets {
        &self.buckets[side.index()]
    }

    /// Last recomputed team score of `side`.
    #[must_use]
    pub fn score(&self, side: Side) -> u32 {
        self.scores[side.index()]
    }

    /// Recomputes both team scores from the buckets.
    pub fn recompute_scores(&mut self) {
        for side in Side::BOTH {
            self.scores[side.index()] = self.buckets[side.index()].team_score();
        }
    }

    /// Adds `points` to one of `side`'s buckets.
    pub fn credit(&mut self, side: Side, bucket: Bucket, points: f64) {
        self.buckets[side.index()].credit(bucket, points);
    }

    /// Shifts a player's rating, clamped to `[0, 10]`.
    pub fn adjust_rating(&mut self, player: PlayerRef, amount: f64) {
        if let Some(p) = self.teams[player.side.index()].player_mut(player.index) {
            p.adjust_rating(amount);
        }
    }

    /// Applies one pending delta.
    pub fn apply(&mut self, delta: &Delta) {
        match *delta {
            Delta::Score {
                side,
                bucket,
                points,
            } => self.credit(side, bucket, points),
            Delta::Rating { player, amount } => self.adjust_rating(player, amount),
            Delta::Goal { player } => {
                if let Some(p) = self.teams[player.side.index()].player_mut(player.index) {
                    p.add_goal();
                }
            }
            Delta::SnitchCaught { player } => self.record_catch(player),
        }
    }

    fn record_catch(&mut self, player: PlayerRef) {
        if self.snitch_catch.is_some() {
            return;
        }
        let team = self.team(player.side);
        let name = team
            .player(player.index)
            .map(|p| p.name().to_string())
            .unwrap_or_default();
        self.snitch_catch = Some(SnitchCatch {
            player,
            team: team.name().to_string(),
            name,
            minute: self.minute,
        });
    }

    /// The snitch catch, once it happened.
    #[must_use]
    pub fn snitch_catch(&self) -> Option<&SnitchCatch> {
        self.snitch_catch.as_ref()
    }

    /// Appends a line to the event log.
    pub fn log(&mut self, line: impl Into<String>) {
        self.event_log.push(line.into());
    }

    /// Every line narrated so far.
    #[must_use]
    pub fn event_log(&self) -> &[String] {
        &self.event_log
    }

    /// The line currently on screen.
    #[must_use]
    pub fn current_line(&self) -> Option<&str> {
        self.current_line.as_deref()
    }

    pub(crate) fn show_line(&mut self, line: Option<String>) {
        self.current_line = line;
    }

    /// Whether an event chain is being narrated.
    #[must_use]
    pub const fn is_narrative_playing(&self) -> bool {
        self.narrative_playing
    }

    pub(crate) fn set_narrative_playing(&mut self, playing: bool) {
        self.narrative_playing = playing;
    }

    /// The end-of-match summary, once produced.
    #[must_use]
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub(crate) fn set_summary(&mut self, summary: Summary) {
        self.summary = Some(summary);
    }

    /// Read-only view for the render layer.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        let view = |side: Side| {
            let team = self.team(side);
            SideSnapshot {
                team: team.name().to_string(),
                score: self.score(side),
                players: team
                    .players()
                    .iter()
                    .map(|p| PlayerSnapshot {
                        name: p.name().to_string(),
                        role: p.role(),
                        rating: p.rating(),
                        goals: p.goals(),
                    })
                    .collect(),
            }
        };
        MatchSnapshot {
            minute: self.minute,
            home: view(Side::Home),
            away: view(Side::Away),
            current_line: self.current_line.clone(),
            event_log: self.event_log.clone(),
            snitch_caught_by: self.snitch_catch.as_ref().map(|c| c.name.clone()),
            summary: self
                .summary
                .as_ref()
                .map(|s| s.lines.to_vec())
                .unwrap_or_default(),
        }
    }
}

/// Render view of one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player name.
    pub name: String,
    /// Playing position.
    pub role: Role,
    /// Performance rating.
    pub rating: f64,
    /// Goals this match.
    pub goals: u32,
}

/// Render view of one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideSnapshot {
    /// Team name.
    pub team: String,
    /// Team score.
    pub score: u32,
    /// Players in roster order.
    pub players: Vec<PlayerSnapshot>,
}

/// Everything the render layer shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Current minute.
    pub minute: u32,
    /// Home side.
    pub home: SideSnapshot,
    /// Away side.
    pub away: SideSnapshot,
    /// Line currently on screen.
    pub current_line: Option<String>,
    /// Every narrated line.
    pub event_log: Vec<String>,
    /// Name of the snitch catcher, if any.
    pub snitch_caught_by: Option<String>,
    /// Summary lines, empty until the match is over.
    pub summary: Vec<String>,
}
