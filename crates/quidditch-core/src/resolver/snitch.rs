//! Snitch chase: the rare play that ends the match.
//!
//! Checked before the chaser shot on every un-gated tick. The snitch shows
//! up with probability `min(minute * rate, cap)`. The catching side is drawn
//! in proportion to each side's total Seeker skill; the defending Beaters
//! then get one bludger duel at the catcher. An uncontested catch is worth
//! 150 points and a rating bonus of `3 - 0.5 * floor(minute / 20)`.
//!
//! Draw order: trigger roll, side roll, (side without a Seeker) fallback
//! catcher pick, sighted template, the duel, then outcome template.

use tracing::{debug, info, warn};

use crate::config::{snitch_bonus, DEFAULT_SEEKER_REACTION, SNITCH_POINTS};
use crate::error::Result;
use crate::phrases::PhraseKey;
use crate::roster::{share, skills, PlayerRef, Role, Side};
use crate::state::{Bucket, MatchState};

use super::beater::{duel, SNITCH_DUEL};
use super::{Delta, EventChain, PlayContext, PlayKind, Resolver};

/// Rating lost by the Seeker who misses the catch.
const RIVAL_SEEKER_PENALTY: f64 = -1.0;

/// Resolves the snitch check for one tick.
#[derive(Debug, Clone, Default)]
pub struct SnitchChase;

impl SnitchChase {
    /// Creates the resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Chance that the home side makes the catch.
    ///
    /// A side without a Seeker counts as a Seeker of skill 50.
    #[must_use]
    pub fn home_catch_chance(state: &MatchState) -> f64 {
        let skill = |side: Side| {
            let team = state.team(side);
            team.first_of(Role::Seeker)
                .and_then(|index| team.player(index))
                .map_or(DEFAULT_SEEKER_REACTION, |p| p.skill_total())
        };
        share(skill(Side::Home), skill(Side::Away))
    }
}

fn seeker_of(state: &MatchState, side: Side) -> Option<PlayerRef> {
    state
        .team(side)
        .first_of(Role::Seeker)
        .map(|index| PlayerRef::new(side, index))
}

impl Resolver for SnitchChase {
    fn kind(&self) -> PlayKind {
        PlayKind::SnitchChase
    }

    fn resolve(&self, ctx: &mut PlayContext<'_>) -> Result<Option<EventChain>> {
        let minute = ctx.state.minute();
        if !ctx.dice.roll(ctx.config.snitch_chance(minute)) {
            return Ok(None);
        }
        ctx.require_players()?;

        let bonus = snitch_bonus(minute);
        let home_chance = Self::home_catch_chance(ctx.state);
        let side = if ctx.dice.roll(home_chance) {
            Side::Home
        } else {
            Side::Away
        };

        let catcher = match seeker_of(ctx.state, side) {
            Some(seeker) => seeker,
            None => {
                let team = ctx.state.team(side);
                warn!(team = team.name(), "no seeker, a random player chases the snitch");
                PlayerRef::new(side, ctx.dice.pick(team.len()))
            }
        };
        let reaction = ctx
            .state
            .player(catcher)
            .filter(|p| p.role() == Role::Seeker)
            .map_or(DEFAULT_SEEKER_REACTION, |p| p.skill(skills::REACTION));
        let rival = seeker_of(ctx.state, side.opponent());

        let mut chain = EventChain::new(PlayKind::SnitchChase);
        let vars = ctx
            .actor_vars(catcher)
            .set("seeker", ctx.name_of(catcher))
            .set("bonus", bonus);
        ctx.say(&mut chain, PhraseKey::SnitchSighted, &vars);

        let blocked = duel(ctx, &mut chain, catcher, reaction, SNITCH_DUEL);
        if blocked {
            ctx.say(&mut chain, PhraseKey::SnitchBlocked, &vars);
            debug!(minute, %side, catcher = %catcher, "snitch catch blocked");
            return Ok(Some(chain));
        }

        ctx.say(&mut chain, PhraseKey::SnitchCaught, &vars);
        chain.deltas.push(Delta::Score {
            side,
            bucket: Bucket::Seeker,
            points: SNITCH_POINTS,
        });
        chain.deltas.push(Delta::Rating {
            player: catcher,
            amount: bonus,
        });
        if let Some(rival) = rival {
            chain.deltas.push(Delta::Rating {
                player: rival,
                amount: RIVAL_SEEKER_PENALTY,
            });
        }
        chain.deltas.push(Delta::SnitchCaught { player: catcher });
        chain.ends_match = true;

        info!(minute, %side, catcher = %catcher, bonus, "snitch caught");
        Ok(Some(chain))
    }
}
