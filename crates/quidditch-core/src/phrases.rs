//! Phrase book: keyed narrative templates with `{placeholder}` slots.
//!
//! Every narrated sub-step of a play has a [`PhraseKey`]. A key maps to one
//! or more templates; when there are several, one is chosen with the match
//! dice so that narration is part of the reproducible trace.
//!
//! A missing template is not an error. The line comes back empty and a
//! warning is logged, so an event chain always completes.
//!
//! # Example
//!
//! ```
//! use quidditch_core::phrases::{fill, Vars};
//!
//! let vars = Vars::new().set("player", "Katie Smith").set("minute", 12);
//! assert_eq!(
//!     fill("{player} scores in minute {minute}! {unknown}", &vars),
//!     "Katie Smith scores in minute 12! {unknown}",
//! );
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dice::Dice;
use crate::error::{MatchError, Result};

/// Template category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Chaser shots.
    Chaser,
    /// Bludger interventions and protection.
    Beater,
    /// Snitch sightings and catches.
    Snitch,
    /// Clock-driven events.
    Clock,
    /// End-of-match summary.
    Summary,
}

/// A (category, subtype) pair naming one narrated moment.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhraseKey {
    /// A chaser breaks towards the hoops.
    ShotIntro,
    /// The keeper goes for the quaffle.
    ParryAttempt,
    /// The keeper stops the shot.
    ParrySuccess,
    /// The shot goes in.
    Goal,
    /// The shot is lost.
    Miss,
    /// A beater sends a bludger at the attacker.
    Intervention,
    /// A teammate beater knocks the bludger away.
    Protection,
    /// The teammate beater fails to knock the bludger away.
    ProtectionFailed,
    /// The snitch shows up.
    SnitchSighted,
    /// The snitch is caught.
    SnitchCaught,
    /// The catch is prevented.
    SnitchBlocked,
    /// Both seekers are penalised for time.
    TimePenalty,
    /// Final outcome after a snitch catch.
    CatchOutcome,
    /// Final outcome when time ran out.
    NoCatchOutcome,
    /// Final outcome for a level match without a catch.
    Draw,
    /// MVP line for a male player.
    MvpMale,
    /// MVP line for a female player.
    MvpFemale,
}

impl PhraseKey {
    /// Every key, in declaration order.
    pub const ALL: [PhraseKey; 17] = [
        Self::ShotIntro,
        Self::ParryAttempt,
        Self::ParrySuccess,
        Self::Goal,
        Self::Miss,
        Self::Intervention,
        Self::Protection,
        Self::ProtectionFailed,
        Self::SnitchSighted,
        Self::SnitchCaught,
        Self::SnitchBlocked,
        Self::TimePenalty,
        Self::CatchOutcome,
        Self::NoCatchOutcome,
        Self::Draw,
        Self::MvpMale,
        Self::MvpFemale,
    ];

    /// The category and subtype name of this key.
    #[must_use]
    pub const fn parts(self) -> (Category, &'static str) {
        match self {
            Self::ShotIntro => (Category::Chaser, "intro"),
            Self::ParryAttempt => (Category::Chaser, "parry_attempt"),
            Self::ParrySuccess => (Category::Chaser, "parry_success"),
            Self::Goal => (Category::Chaser, "goal"),
            Self::Miss => (Category::Chaser, "miss"),
            Self::Intervention => (Category::Beater, "intervention"),
            Self::Protection => (Category::Beater, "protection"),
            Self::ProtectionFailed => (Category::Beater, "protection_failed"),
            Self::SnitchSighted => (Category::Snitch, "sighted"),
            Self::SnitchCaught => (Category::Snitch, "caught"),
            Self::SnitchBlocked => (Category::Snitch, "blocked"),
            Self::TimePenalty => (Category::Clock, "time_penalty"),
            Self::CatchOutcome => (Category::Summary, "catch"),
            Self::NoCatchOutcome => (Category::Summary, "no_catch"),
            Self::Draw => (Category::Summary, "draw"),
            Self::MvpMale => (Category::Summary, "mvp_male"),
            Self::MvpFemale => (Category::Summary, "mvp_female"),
        }
    }

    /// Looks a key up by category and subtype name.
    #[must_use]
    pub fn from_parts(category: Category, subtype: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.parts() == (category, subtype))
    }
}

impl fmt::Display for PhraseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (category, subtype) = self.parts();
        write!(f, "{category:?}.{subtype}")
    }
}

/// Placeholder values for one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars(HashMap<&'static str, String>);

impl Vars {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    #[must_use]
    pub fn set(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        self.0.insert(key, value.to_string());
        self
    }

    /// Value bound to `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

/// Substitutes every `{key}` in `template` that `vars` binds.
///
/// Unbound placeholders and unmatched braces are copied through verbatim.
#[must_use]
pub fn fill(template: &str, vars: &Vars) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Templates for every narrated moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseBook {
    templates: BTreeMap<PhraseKey, Vec<String>>,
}

/// On-disk layout: `category -> subtype -> [templates]`.
type PhraseDocument = BTreeMap<Category, BTreeMap<String, Vec<String>>>;

impl PhraseBook {
    /// An empty book. Every lookup misses.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in English phrase set.
    #[must_use]
    pub fn standard() -> Self {
        let mut book = Self::empty();
        for (key, lines) in STANDARD {
            book = book.with(*key, lines.iter().copied());
        }
        book
    }

    /// Parses a phrase document.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Parse`] for malformed JSON or an unknown
    /// category, and [`MatchError::InvalidConfig`] for an unknown subtype.
    pub fn from_json(json: &str) -> Result<Self> {
        let doc: PhraseDocument = serde_json::from_str(json)?;
        let mut book = Self::empty();
        for (category, subtypes) in doc {
            for (subtype, lines) in subtypes {
                let key = PhraseKey::from_parts(category, &subtype).ok_or_else(|| {
                    MatchError::InvalidConfig(format!(
                        "unknown phrase subtype `{subtype}` in category {category:?}"
                    ))
                })?;
                book.templates.insert(key, lines);
            }
        }
        Ok(book)
    }

    /// Reads a phrase document from disk.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Io`] if the file cannot be read, otherwise the
    /// errors of [`PhraseBook::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| MatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Replaces the templates for `key`.
    #[must_use]
    pub fn with<S: Into<String>>(mut self, key: PhraseKey, lines: impl IntoIterator<Item = S>) -> Self {
        self.templates
            .insert(key, lines.into_iter().map(Into::into).collect());
        self
    }

    /// Templates registered for `key`.
    #[must_use]
    pub fn templates(&self, key: PhraseKey) -> &[String] {
        self.templates.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Renders a line for `key`.
    ///
    /// Draws from `dice` only when the key has more than one template.
    pub fn render(&self, key: PhraseKey, vars: &Vars, dice: &mut dyn Dice) -> String {
        let templates = self.templates(key);
        let template = match templates.len() {
            0 => {
                warn!(%key, "no phrase template, narrating an empty line");
                return String::new();
            }
            1 => &templates[0],
            n => &templates[dice.pick(n)],
        };
        fill(template, vars)
    }
}

const STANDARD: &[(PhraseKey, &[&str])] = &[
    (
        PhraseKey::ShotIntro,
        &[
            "{player} grabs the quaffle and races towards the hoops!",
            "{player} breaks away for {team}, quaffle tucked under {possessive} arm!",
            "Minute {minute}: {player} lines up a shot!",
        ],
    ),
    (
        PhraseKey::ParryAttempt,
        &[
            "{keeper} throws {possessive} broom across the hoop...",
            "{keeper} stretches for it...",
        ],
    ),
    (
        PhraseKey::ParrySuccess,
        &[
            "Saved! {keeper} keeps the quaffle out!",
            "What a parry from {keeper}!",
        ],
    ),
    (
        PhraseKey::Goal,
        &[
            "GOAL! {player} scores ten points for {team}!",
            "{player} finds the hoop, ten points to {team}!",
        ],
    ),
    (
        PhraseKey::Miss,
        &[
            "{player} loses the quaffle, no score.",
            "The chance is gone, {player} shakes {possessive} head.",
        ],
    ),
    (
        PhraseKey::Intervention,
        &[
            "{beater} sends a bludger screaming at {player}!",
            "Bludger! {beater} takes aim at {player}!",
        ],
    ),
    (
        PhraseKey::Protection,
        &[
            "{protector} smashes the bludger away just in time!",
            "{protector} covers {player} and bats the bludger off!",
        ],
    ),
    (
        PhraseKey::ProtectionFailed,
        &["{protector} swings and misses, the bludger gets through!"],
    ),
    (
        PhraseKey::SnitchSighted,
        &[
            "The snitch! {seeker} has spotted it and dives!",
            "A flash of gold, {seeker} is after the snitch!",
        ],
    ),
    (
        PhraseKey::SnitchCaught,
        &[
            "{seeker} catches the snitch! 150 points for {team}!",
            "{pronoun} has it! {seeker} closes {possessive} hand around the snitch!",
        ],
    ),
    (
        PhraseKey::SnitchBlocked,
        &[
            "The bludger knocks {seeker} off course, the snitch is gone again.",
            "{seeker} has to pull up, the snitch escapes!",
        ],
    ),
    (
        PhraseKey::TimePenalty,
        &["Minute {minute}: the referee penalises both seekers for stalling."],
    ),
    (
        PhraseKey::CatchOutcome,
        &["{seeker} caught the snitch for {team_acc}. Final score {home} {home_score} : {away_score} {away}."],
    ),
    (
        PhraseKey::NoCatchOutcome,
        &["Time is up without a snitch catch. Final score {home} {home_score} : {away_score} {away}."],
    ),
    (
        PhraseKey::Draw,
        &["A draw! {home} {home_score} : {away_score} {away}."],
    ),
    (
        PhraseKey::MvpMale,
        &["Player of the match: {player} of {team}, rated {rating}. He carried the day."],
    ),
    (
        PhraseKey::MvpFemale,
        &["Player of the match: {player} of {team}, rated {rating}. She carried the day."],
    ),
];
