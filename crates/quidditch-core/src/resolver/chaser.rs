//! Chaser shot: one attack on goal, resolved on every un-gated minute.
//!
//! 1. The attacking side is drawn in proportion to each side's total Chaser
//!    skill (the full roster stands in for a side without Chasers).
//! 2. A random attacker from that pool shoots at the opposing Keeper.
//!    Success chance is `accuracy / (accuracy + keeper average)`; without a
//!    Keeper the shot goes in.
//! 3. A shot that beats the Keeper can still be stopped by a bludger duel.
//! 4. Goal: +10 to chaser slot 0, scorer +1 and a goal, Keeper -0.5.
//!    Miss: scorer -0.5, Keeper +1.
//!
//! Draw order: side roll, shooter pick, intro template, (Keeper present)
//! parry template and shot roll, then the duel, then outcome templates.

use tracing::{debug, warn};

use crate::error::Result;
use crate::phrases::PhraseKey;
use crate::roster::{share, skills, PlayerRef, Role, Side};
use crate::state::Bucket;

use super::beater::{duel, CHASER_DUEL};
use super::{Delta, EventChain, PlayContext, PlayKind, Resolver};

/// Rating gained for scoring.
const SCORER_GOAL: f64 = 1.0;
/// Rating lost for missing.
const SCORER_MISS: f64 = -0.5;
/// Rating lost by the Keeper who concedes.
const KEEPER_CONCEDE: f64 = -0.5;
/// Rating gained by the Keeper when the shot misses.
const KEEPER_SAVE: f64 = 1.0;

/// Resolves one shot on goal.
///
/// # Example
///
/// ```
/// use quidditch_core::resolver::{ChaserShot, PlayKind, Resolver};
///
/// assert_eq!(ChaserShot::new().kind(), PlayKind::ChaserShot);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChaserShot;

impl ChaserShot {
    /// Creates the resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Chance that the home side gets this attack.
    #[must_use]
    pub fn home_attack_chance(ctx: &PlayContext<'_>) -> f64 {
        let skill = |side: Side| {
            let team = ctx.state.team(side);
            team.total_skill(&team.attack_pool())
        };
        share(skill(Side::Home), skill(Side::Away))
    }
}

impl Resolver for ChaserShot {
    fn kind(&self) -> PlayKind {
        PlayKind::ChaserShot
    }

    fn resolve(&self, ctx: &mut PlayContext<'_>) -> Result<Option<EventChain>> {
        ctx.require_players()?;

        let home_chance = Self::home_attack_chance(ctx);
        let side = if ctx.dice.roll(home_chance) {
            Side::Home
        } else {
            Side::Away
        };
        let attacking = ctx.state.team(side);
        if attacking.first_of(Role::Chaser).is_none() {
            warn!(team = attacking.name(), "no chasers, attacking with the full roster");
        }
        let pool = attacking.attack_pool();
        let shooter = PlayerRef::new(side, pool[ctx.dice.pick(pool.len())]);
        let keeper = ctx
            .state
            .team(side.opponent())
            .first_of(Role::Keeper)
            .map(|index| PlayerRef::new(side.opponent(), index));
        let keeper_average = keeper
            .and_then(|k| ctx.state.player(k))
            .map(|p| p.skill_mean(&skills::KEEPER_DEFENSE));

        let mut chain = EventChain::new(PlayKind::ChaserShot);
        let mut vars = ctx.actor_vars(shooter);
        ctx.say(&mut chain, PhraseKey::ShotIntro, &vars);

        let accuracy = ctx
            .state
            .player(shooter)
            .map_or(0.0, |p| p.skill(skills::ACCURACY));
        let beats_keeper = match (keeper, keeper_average) {
            (Some(keeper), Some(average)) => {
                let keeper_name = ctx.name_of(keeper);
                vars = vars.set("keeper", &keeper_name);
                let keeper_vars = ctx.actor_vars(keeper).set("keeper", &keeper_name);
                ctx.say(&mut chain, PhraseKey::ParryAttempt, &keeper_vars);
                let scored = ctx.dice.roll(share(accuracy, average));
                if !scored {
                    ctx.say(&mut chain, PhraseKey::ParrySuccess, &keeper_vars);
                }
                scored
            }
            _ => true,
        };

        let goal = beats_keeper && {
            let reaction = ctx
                .state
                .player(shooter)
                .map_or(0.0, |p| p.skill(skills::REACTION));
            let blocked = duel(ctx, &mut chain, shooter, reaction, CHASER_DUEL);
            if blocked {
                ctx.say(&mut chain, PhraseKey::Miss, &vars);
            }
            !blocked
        };

        if goal {
            ctx.say(&mut chain, PhraseKey::Goal, &vars);
            chain.deltas.push(Delta::Score {
                side,
                bucket: Bucket::Chaser(0),
                points: crate::config::GOAL_POINTS,
            });
            chain.deltas.push(Delta::Rating {
                player: shooter,
                amount: SCORER_GOAL,
            });
            chain.deltas.push(Delta::Goal { player: shooter });
            if let Some(keeper) = keeper {
                chain.deltas.push(Delta::Rating {
                    player: keeper,
                    amount: KEEPER_CONCEDE,
                });
            }
        } else {
            chain.deltas.push(Delta::Rating {
                player: shooter,
                amount: SCORER_MISS,
            });
            if let Some(keeper) = keeper {
                chain.deltas.push(Delta::Rating {
                    player: keeper,
                    amount: KEEPER_SAVE,
                });
            }
        }

        debug!(
            minute = ctx.state.minute(),
            %side,
            shooter = %shooter,
            goal,
            lines = chain.lines.len(),
            "chaser shot resolved"
        );
        Ok(Some(chain))
    }
}
