//! Roster model: sides, roles, players and teams.
//!
//! Teams are loaded once before the scheduler starts (see [`source`]) and
//! then owned by the match state for the whole match. Players are never
//! added or removed mid-match; only their rating and goal tally change.
//!
//! # Example
//!
//! ```
//! use quidditch_core::roster::{Gender, Player, Role};
//!
//! let mut player = Player::new("Oliver Green", Role::Keeper, Gender::Male)
//!     .with_skill("reflexes", 80.0);
//!
//! player.adjust_rating(7.5);
//! assert_eq!(player.rating(), 10.0);
//! assert_eq!(player.skill("reflexes"), 80.0);
//! assert_eq!(player.skill("blocking"), 0.0);
//! ```

pub mod source;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{INITIAL_RATING, MAX_RATING, MIN_RATING};

pub use source::{JsonRoster, RosterSource, StaticRoster, TeamDocument};

/// Skill attribute names read by the resolver.
pub mod skills {
    /// Keeper defensive attributes; their mean is the keeper average.
    pub const KEEPER_DEFENSE: [&str; 3] = ["reflexes", "positioning", "blocking"];
    /// Chaser shot accuracy.
    pub const ACCURACY: &str = "accuracy";
    /// Reaction of the player a beater targets (Chaser or Seeker).
    pub const REACTION: &str = "reaction";
    /// Beater attack attributes; their mean is the beater offense.
    pub const BEATER_OFFENSE: [&str; 2] = ["power", "aim"];
    /// Beater protection attribute, read as a percentage.
    pub const BEATER_DEFENSE: &str = "defense";
}

/// One of the two fixed match sides.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// The home team.
    Home,
    /// The away team.
    Away,
}

impl Side {
    /// Both sides, home first.
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Index into per-side arrays (home = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Away => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "home"),
            Self::Away => write!(f, "away"),
        }
    }
}

/// Playing position. Declaration order is roster sort order.
///
/// Documents may spell the position in any case.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Role {
    /// Guards the hoops.
    Keeper,
    /// Scores goals.
    Chaser,
    /// Disrupts shots and catches with bludgers.
    Beater,
    /// Hunts the snitch.
    Seeker,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "keeper" => Ok(Self::Keeper),
            "chaser" => Ok(Self::Chaser),
            "beater" => Ok(Self::Beater),
            "seeker" => Ok(Self::Seeker),
            _ => Err(format!("unknown position `{tag}`")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keeper => write!(f, "Keeper"),
            Self::Chaser => write!(f, "Chaser"),
            Self::Beater => write!(f, "Beater"),
            Self::Seeker => write!(f, "Seeker"),
        }
    }
}

/// Grammatical gender tag, used only to pick pronouns in narration.
///
/// Documents may use `m`/`male` or `f`/`female` in any case.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Gender {
    /// he / his
    Male,
    /// she / her
    Female,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Self::Male),
            "f" | "w" | "female" => Ok(Self::Female),
            _ => Err(format!("unknown gender `{tag}`")),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = String;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl Gender {
    /// Subject pronoun.
    #[must_use]
    pub const fn pronoun(self) -> &'static str {
        match self {
            Self::Male => "he",
            Self::Female => "she",
        }
    }

    /// Possessive pronoun.
    #[must_use]
    pub const fn possessive(self) -> &'static str {
        match self {
            Self::Male => "his",
            Self::Female => "her",
        }
    }
}

/// Addresses one roster slot: a side plus an index into its player list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Side the player belongs to.
    pub side: Side,
    /// Index into the team's (role-sorted) player list.
    pub index: usize,
}

impl PlayerRef {
    /// Creates a reference to `side`'s player at `index`.
    #[must_use]
    pub const fn new(side: Side, index: usize) -> Self {
        Self { side, index }
    }
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.side, self.index)
    }
}

/// A player and their per-match performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    role: Role,
    skills: BTreeMap<String, f64>,
    rating: f64,
    goals: u32,
    gender: Gender,
}

impl Player {
    /// Creates a player with no skills, the initial rating and no goals.
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role, gender: Gender) -> Self {
        Self {
            name: name.into(),
            role,
            skills: BTreeMap::new(),
            rating: INITIAL_RATING,
            goals: 0,
            gender,
        }
    }

    /// Builder-style skill setter.
    #[must_use]
    pub fn with_skill(mut self, attribute: impl Into<String>, value: f64) -> Self {
        self.skills.insert(attribute.into(), value);
        self
    }

    /// Replaces the whole skill map.
    #[must_use]
    pub fn with_skills(mut self, skills: BTreeMap<String, f64>) -> Self {
        self.skills = skills;
        self
    }

    /// Player name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Playing position.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Gender tag.
    #[must_use]
    pub const fn gender(&self) -> Gender {
        self.gender
    }

    /// Current performance rating, always within `[0, 10]`.
    #[must_use]
    pub const fn rating(&self) -> f64 {
        self.rating
    }

    /// Goals scored this match.
    #[must_use]
    pub const fn goals(&self) -> u32 {
        self.goals
    }

    /// Value of a skill attribute, 0 if the player does not have it.
    #[must_use]
    pub fn skill(&self, attribute: &str) -> f64 {
        self.skills.get(attribute).copied().unwrap_or(0.0)
    }

    /// Mean of several attributes (missing ones count as 0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn skill_mean(&self, attributes: &[&str]) -> f64 {
        if attributes.is_empty() {
            return 0.0;
        }
        attributes.iter().map(|a| self.skill(a)).sum::<f64>() / attributes.len() as f64
    }

    /// Sum over every skill value the player has.
    #[must_use]
    pub fn skill_total(&self) -> f64 {
        self.skills.values().sum()
    }

    /// All skill attributes in name order.
    #[must_use]
    pub fn skills(&self) -> &BTreeMap<String, f64> {
        &self.skills
    }

    /// Shifts the rating by `amount`, clamped to `[0, 10]`.
    pub fn adjust_rating(&mut self, amount: f64) {
        self.rating = (self.rating + amount).clamp(MIN_RATING, MAX_RATING);
    }

    /// Credits one goal.
    pub fn add_goal(&mut self) {
        self.goals += 1;
    }

    /// Puts the player back into their pre-match state.
    pub fn reset_performance(&mut self) {
        self.rating = INITIAL_RATING;
        self.goals = 0;
    }
}

/// Nominative and accusative article forms used in narration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    /// e.g. "the" / "die" / "der".
    pub nominative: String,
    /// e.g. "the" / "die" / "den".
    pub accusative: String,
}

impl Prefix {
    /// Creates a prefix pair.
    #[must_use]
    pub fn new(nominative: impl Into<String>, accusative: impl Into<String>) -> Self {
        Self {
            nominative: nominative.into(),
            accusative: accusative.into(),
        }
    }
}

/// A named team with its role-sorted roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    name: String,
    prefix: Prefix,
    players: Vec<Player>,
}

impl Team {
    /// Creates a team. Players are sorted into role order and their
    /// performance is reset.
    #[must_use]
    pub fn new(name: impl Into<String>, prefix: Prefix, players: Vec<Player>) -> Self {
        let mut team = Self {
            name: name.into(),
            prefix,
            players,
        };
        team.prepare_for_match();
        team
    }

    /// Sorts players by role (stable) and resets every rating to 6.
    pub fn prepare_for_match(&mut self) {
        self.players.sort_by_key(Player::role);
        for player in &mut self.players {
            player.reset_performance();
        }
    }

    /// Team name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Article forms.
    #[must_use]
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Name with the nominative article, e.g. "the Hogwarts Hawks".
    #[must_use]
    pub fn nominative(&self) -> String {
        join_prefixed(&self.prefix.nominative, &self.name)
    }

    /// Name with the accusative article.
    #[must_use]
    pub fn accusative(&self) -> String {
        join_prefixed(&self.prefix.accusative, &self.name)
    }

    /// All players in role order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Player at `index`.
    #[must_use]
    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    /// Mutable player at `index`.
    pub fn player_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    /// Number of players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the team has no players at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Indices of every player in `role`, in roster order.
    #[must_use]
    pub fn indices_of(&self, role: Role) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.role() == role)
            .map(|(i, _)| i)
            .collect()
    }

    /// Index of the first player in `role`.
    #[must_use]
    pub fn first_of(&self, role: Role) -> Option<usize> {
        self.players.iter().position(|p| p.role() == role)
    }

    /// Players eligible to attack: the Chasers, or the full roster if the
    /// team fields none. Empty only if the team itself is empty.
    #[must_use]
    pub fn attack_pool(&self) -> Vec<usize> {
        let chasers = self.indices_of(Role::Chaser);
        if chasers.is_empty() {
            (0..self.players.len()).collect()
        } else {
            chasers
        }
    }

    /// Sum over all skill values of the players at `indices`.
    #[must_use]
    pub fn total_skill(&self, indices: &[usize]) -> f64 {
        indices
            .iter()
            .filter_map(|&i| self.players.get(i))
            .map(Player::skill_total)
            .sum()
    }
}

fn join_prefixed(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix} {name}")
    }
}

/// Probability that the first of two competing strengths wins.
///
/// Returns `a / (a + b)`, or 0.5 when both are zero.
#[must_use]
pub fn share(a: f64, b: f64) -> f64 {
    let total = a + b;
    if total > 0.0 {
        a / total
    } else {
        0.5
    }
}
