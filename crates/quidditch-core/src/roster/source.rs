//! Roster provider: where the two competing teams come from.
//!
//! The engine only needs [`RosterSource::load_teams`]. Whatever the backing
//! store, loading goes through the same normalization: players are sorted
//! into role order and stored ratings/goal tallies are discarded.
//!
//! # Document format
//!
//! ```json
//! [
//!   {
//!     "name": "Hogwarts Hawks",
//!     "prefix": ["the", "the"],
//!     "players": [
//!       { "name": "Oliver Green", "position": "Keeper",
//!         "skills": { "reflexes": 80, "positioning": 75, "blocking": 70 },
//!         "gender": "m" }
//!     ]
//!   }
//! ]
//! ```
//!
//! `teamName` is accepted in place of `name`.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Gender, Player, Prefix, Role, Team};
use crate::error::{MatchError, Result};

/// Supplies the two teams of a match.
pub trait RosterSource {
    /// Loads the `home` and `away` teams by name.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MissingRoster`] if either team is absent.
    fn load_teams(&self, home: &str, away: &str) -> Result<(Team, Team)>;
}

/// Stored form of a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDocument {
    /// Team name.
    #[serde(alias = "teamName")]
    pub name: String,
    /// `[nominative, accusative]` article forms.
    #[serde(default)]
    pub prefix: [String; 2],
    /// Players in any order.
    pub players: Vec<PlayerDocument>,
}

/// Stored form of a player. Any stored rating or goal tally is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDocument {
    /// Player name.
    pub name: String,
    /// Playing position.
    pub position: Role,
    /// Attribute name to value.
    #[serde(default)]
    pub skills: BTreeMap<String, f64>,
    /// Gender tag.
    pub gender: Gender,
}

impl TeamDocument {
    /// Builds the match-ready team.
    #[must_use]
    pub fn to_team(&self) -> Team {
        let [nominative, accusative] = &self.prefix;
        let players = self
            .players
            .iter()
            .map(|p| Player::new(&p.name, p.position, p.gender).with_skills(p.skills.clone()))
            .collect();
        Team::new(&self.name, Prefix::new(nominative, accusative), players)
    }
}

impl From<&Team> for TeamDocument {
    fn from(team: &Team) -> Self {
        Self {
            name: team.name().to_string(),
            prefix: [
                team.prefix().nominative.clone(),
                team.prefix().accusative.clone(),
            ],
            players: team
                .players()
                .iter()
                .map(|p| PlayerDocument {
                    name: p.name().to_string(),
                    position: p.role(),
                    skills: p.skills().clone(),
                    gender: p.gender(),
                })
                .collect(),
        }
    }
}

fn pick_pair<'a>(
    find: impl Fn(&str) -> Option<&'a TeamDocument>,
    home: &str,
    away: &str,
) -> Result<(Team, Team)> {
    let missing = |team: &str| MatchError::MissingRoster {
        team: team.to_string(),
    };
    let home_doc = find(home).ok_or_else(|| missing(home))?;
    let away_doc = find(away).ok_or_else(|| missing(away))?;
    debug!(
        home = %home_doc.name,
        away = %away_doc.name,
        home_players = home_doc.players.len(),
        away_players = away_doc.players.len(),
        "rosters loaded"
    );
    Ok((home_doc.to_team(), away_doc.to_team()))
}

/// The bundled two-team roster (Hogwarts Hawks and Durmstrang Dragons).
pub const BUNDLED_TEAMS: &str = include_str!("../../assets/teams.json");

/// Roster source backed by a JSON array of team documents.
#[derive(Debug, Clone, Default)]
pub struct JsonRoster {
    teams: Vec<TeamDocument>,
}

impl JsonRoster {
    /// Parses a roster document.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Parse`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            teams: serde_json::from_str(json)?,
        })
    }

    /// Parses a roster document from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Parse`] if the JSON is malformed or unreadable.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(Self {
            teams: serde_json::from_reader(reader)?,
        })
    }

    /// Reads a roster file.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Io`] if the file cannot be opened.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| MatchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// The bundled roster.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Parse`] only if the bundled document is broken.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_TEAMS)
    }

    /// Names of all teams in the document, in document order.
    #[must_use]
    pub fn team_names(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.name.as_str()).collect()
    }
}

impl RosterSource for JsonRoster {
    fn load_teams(&self, home: &str, away: &str) -> Result<(Team, Team)> {
        pick_pair(
            |name| self.teams.iter().find(|t| t.name == name),
            home,
            away,
        )
    }
}

/// In-memory roster source.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    teams: Vec<TeamDocument>,
}

impl StaticRoster {
    /// Creates an empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a team. On duplicate names the first one added wins.
    #[must_use]
    pub fn with_team(mut self, team: &Team) -> Self {
        self.teams.push(TeamDocument::from(team));
        self
    }
}

impl RosterSource for StaticRoster {
    fn load_teams(&self, home: &str, away: &str) -> Result<(Team, Team)> {
        pick_pair(
            |name| self.teams.iter().find(|t| t.name == name),
            home,
            away,
        )
    }
}
