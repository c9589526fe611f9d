//! End-of-match summary: winner, MVP and the two closing lines.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dice::Dice;
use crate::phrases::{PhraseBook, PhraseKey, Vars};
use crate::roster::{Gender, PlayerRef, Side};
use crate::state::MatchState;

/// Result of a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Winning side, `None` on a draw.
    pub winner: Option<Side>,
    /// Final home score.
    pub home_score: u32,
    /// Final away score.
    pub away_score: u32,
    /// Player of the match, `None` only if nobody played.
    pub mvp: Option<PlayerRef>,
    /// Outcome line and MVP line.
    pub lines: [String; 2],
}

/// Winner by final score.
#[must_use]
pub fn winner(home_score: u32, away_score: u32) -> Option<Side> {
    match home_score.cmp(&away_score) {
        Ordering::Greater => Some(Side::Home),
        Ordering::Less => Some(Side::Away),
        Ordering::Equal => None,
    }
}

/// Player with the strictly highest rating among `sides`, scanning in
/// roster order. The first player encountered keeps ties.
#[must_use]
pub fn most_valuable(state: &MatchState, sides: &[Side]) -> Option<PlayerRef> {
    let mut best: Option<(PlayerRef, f64)> = None;
    for &side in sides {
        for (index, player) in state.team(side).players().iter().enumerate() {
            if best.map_or(true, |(_, rating)| player.rating() > rating) {
                best = Some((PlayerRef::new(side, index), player.rating()));
            }
        }
    }
    best.map(|(player, _)| player)
}

/// Builds the summary of a finished match.
///
/// Template choices draw from `dice` like any other narration.
pub fn summarize(state: &MatchState, phrases: &PhraseBook, dice: &mut dyn Dice) -> Summary {
    let home_score = state.score(Side::Home);
    let away_score = state.score(Side::Away);
    let winner = winner(home_score, away_score);

    let scoreline = Vars::new()
        .set("home", state.team(Side::Home).nominative())
        .set("away", state.team(Side::Away).nominative())
        .set("home_score", home_score)
        .set("away_score", away_score);

    let outcome = match (state.snitch_catch(), winner) {
        (Some(catch), _) => {
            let vars = scoreline
                .set("seeker", &catch.name)
                .set("team", state.team(catch.player.side).nominative())
                .set("team_acc", state.team(catch.player.side).accusative());
            phrases.render(PhraseKey::CatchOutcome, &vars, dice)
        }
        (None, None) => phrases.render(PhraseKey::Draw, &scoreline, dice),
        (None, Some(_)) => phrases.render(PhraseKey::NoCatchOutcome, &scoreline, dice),
    };

    let mvp = match winner {
        Some(side) => most_valuable(state, &[side]),
        None => most_valuable(state, &Side::BOTH),
    };
    let mvp_line = mvp
        .and_then(|mvp| state.player(mvp).map(|p| (mvp, p)))
        .map(|(mvp, player)| {
            let vars = Vars::new()
                .set("player", player.name())
                .set("team", state.team(mvp.side).nominative())
                .set("rating", format!("{:.1}", player.rating()));
            let key = match player.gender() {
                Gender::Male => PhraseKey::MvpMale,
                Gender::Female => PhraseKey::MvpFemale,
            };
            phrases.render(key, &vars, dice)
        })
        .unwrap_or_default();

    info!(
        home_score,
        away_score,
        winner = ?winner,
        mvp = ?mvp.map(|p| p.to_string()),
        "match summary"
    );

    Summary {
        winner,
        home_score,
        away_score,
        mvp,
        lines: [outcome, mvp_line],
    }
}
