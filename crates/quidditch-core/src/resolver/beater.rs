//! Bludger duel shared by both plays.
//!
//! When an attacker (a Chaser about to score or a Seeker about to catch) is
//! on the verge of success, one random Beater of the defending side may
//! send a bludger. If it lands, one random Beater of the attacking side gets
//! a single chance to knock it away.
//!
//! Draw order: defender pick, intervention roll, then (only if the bludger
//! was sent and the attacking side has Beaters) protector pick and
//! protection roll.

use crate::phrases::PhraseKey;
use crate::roster::{skills, PlayerRef, Role};

use super::{Delta, EventChain, PlayContext};

/// Rating changes handed out by a duel.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DuelRewards {
    /// To the defending beater when the bludger blocks the play.
    pub blocked: f64,
    /// To the protecting beater when the bludger is knocked away.
    pub protected: f64,
    /// To the defending beater when the bludger is knocked away.
    pub repelled: f64,
}

/// Rewards for duels over a shot on goal.
pub const CHASER_DUEL: DuelRewards = DuelRewards {
    blocked: 1.0,
    protected: 1.0,
    repelled: -0.5,
};

/// Rewards for duels over a snitch catch.
pub const SNITCH_DUEL: DuelRewards = DuelRewards {
    blocked: 2.0,
    protected: 2.0,
    repelled: -1.0,
};

/// Chance a beater with `offense` hits a target with `reaction`.
///
/// `min(1, offense / reaction)`; a target without reaction is always hit
/// unless the beater has no offense at all.
pub(crate) fn intervention_chance(offense: f64, reaction: f64) -> f64 {
    if reaction > 0.0 {
        (offense / reaction).min(1.0)
    } else if offense > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// Runs the duel over `attacker`'s play. Returns `true` if the play is
/// blocked.
pub(crate) fn duel(
    ctx: &mut PlayContext<'_>,
    chain: &mut EventChain,
    attacker: PlayerRef,
    reaction: f64,
    rewards: DuelRewards,
) -> bool {
    let defending = attacker.side.opponent();
    let defenders = ctx.state.team(defending).indices_of(Role::Beater);
    if defenders.is_empty() {
        return false;
    }
    let beater = PlayerRef::new(defending, defenders[ctx.dice.pick(defenders.len())]);
    let offense = ctx
        .state
        .player(beater)
        .map_or(0.0, |p| p.skill_mean(&skills::BEATER_OFFENSE));

    if !ctx.dice.roll(intervention_chance(offense, reaction)) {
        return false;
    }

    let vars = ctx
        .actor_vars(attacker)
        .set("seeker", ctx.name_of(attacker))
        .set("beater", ctx.name_of(beater));
    ctx.say(chain, PhraseKey::Intervention, &vars);

    let protectors = ctx.state.team(attacker.side).indices_of(Role::Beater);
    if protectors.is_empty() {
        chain.deltas.push(Delta::Rating {
            player: beater,
            amount: rewards.blocked,
        });
        return true;
    }

    let protector = PlayerRef::new(attacker.side, protectors[ctx.dice.pick(protectors.len())]);
    let protection = ctx
        .state
        .player(protector)
        .map_or(0.0, |p| p.skill(skills::BEATER_DEFENSE) / 100.0);
    let vars = vars.set("protector", ctx.name_of(protector));

    if ctx.dice.roll(protection) {
        ctx.say(chain, PhraseKey::Protection, &vars);
        chain.deltas.push(Delta::Rating {
            player: protector,
            amount: rewards.protected,
        });
        chain.deltas.push(Delta::Rating {
            player: beater,
            amount: rewards.repelled,
        });
        false
    } else {
        ctx.say(chain, PhraseKey::ProtectionFailed, &vars);
        chain.deltas.push(Delta::Rating {
            player: beater,
            amount: rewards.blocked,
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchConfig;
    use crate::dice::ScriptedDice;
    use crate::phrases::PhraseBook;
    use crate::resolver::PlayKind;
    use crate::roster::Side;
    use crate::state::MatchState;
    use crate::tests::helpers::{beater, chaser, team};

    fn state(home_beaters: bool, away_beaters: bool) -> MatchState {
        let mut home = vec![chaser("Katie", 70.0, 50.0)];
        if home_beaters {
            home.push(beater("Fred", 60.0, 60.0, 80.0));
        }
        let mut away = vec![chaser("Natalia", 60.0, 50.0)];
        if away_beaters {
            away.push(beater("Igor", 20.0, 30.0, 30.0));
        }
        MatchState::new(team("Hawks", home), team("Dragons", away))
    }

    fn run(state: &MatchState, draws: &[f64]) -> (bool, EventChain, ScriptedDice) {
        let phrases = PhraseBook::empty();
        let config = MatchConfig::default();
        let mut dice = ScriptedDice::new(draws.iter().copied());
        let mut chain = EventChain::new(PlayKind::ChaserShot);
        let blocked = {
            let mut ctx = PlayContext {
                state,
                phrases: &phrases,
                config: &config,
                dice: &mut dice,
            };
            duel(
                &mut ctx,
                &mut chain,
                PlayerRef::new(Side::Home, 0),
                50.0,
                CHASER_DUEL,
            )
        };
        (blocked, chain, dice)
    }

    #[test]
    fn chance_is_ratio_capped_at_one() {
        assert!((intervention_chance(25.0, 50.0) - 0.5).abs() < 1e-12);
        assert!((intervention_chance(80.0, 50.0) - 1.0).abs() < 1e-12);
        assert!((intervention_chance(10.0, 0.0) - 1.0).abs() < 1e-12);
        assert!(intervention_chance(0.0, 0.0).abs() < 1e-12);
    }

    #[test]
    fn no_defending_beater_draws_nothing() {
        let state = state(true, false);
        let (blocked, chain, dice) = run(&state, &[0.0]);
        assert!(!blocked);
        assert!(chain.deltas.is_empty());
        assert_eq!(dice.consumed(), 0);
    }

    #[test]
    fn missed_bludger_leaves_play_alone() {
        // Igor offense 25 against reaction 50 => chance 0.5.
        let state = state(true, true);
        let (blocked, chain, dice) = run(&state, &[0.0, 0.6, 0.0]);
        assert!(!blocked);
        assert!(chain.lines.is_empty());
        assert_eq!(dice.consumed(), 2);
    }

    #[test]
    fn unprotected_attacker_is_blocked() {
        let state = state(false, true);
        let (blocked, chain, _) = run(&state, &[0.0, 0.1]);
        assert!(blocked);
        assert_eq!(chain.lines.len(), 1);
        assert_eq!(
            chain.deltas,
            vec![Delta::Rating {
                player: PlayerRef::new(Side::Away, 1),
                amount: 1.0,
            }]
        );
    }

    #[test]
    fn protection_cancels_intervention() {
        // Fred defense 80 => protection 0.8.
        let state = state(true, true);
        let (blocked, chain, _) = run(&state, &[0.0, 0.1, 0.0, 0.5]);
        assert!(!blocked);
        assert_eq!(chain.lines.len(), 2);
        assert_eq!(
            chain.deltas,
            vec![
                Delta::Rating {
                    player: PlayerRef::new(Side::Home, 1),
                    amount: 1.0,
                },
                Delta::Rating {
                    player: PlayerRef::new(Side::Away, 1),
                    amount: -0.5,
                },
            ]
        );
    }

    #[test]
    fn failed_protection_blocks() {
        let state = state(true, true);
        let (blocked, chain, _) = run(&state, &[0.0, 0.1, 0.0, 0.85]);
        assert!(blocked);
        assert_eq!(
            chain.deltas,
            vec![Delta::Rating {
                player: PlayerRef::new(Side::Away, 1),
                amount: 1.0,
            }]
        );
    }
}
