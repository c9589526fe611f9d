//! Error types for match setup and resolution.
//!
//! Only conditions that stop a match from starting or continuing are errors.
//! Missing Keepers or Seekers and missing phrase templates are part of normal
//! play and are handled in place (see the resolver and phrase modules).

use std::path::PathBuf;

use thiserror::Error;

use crate::roster::Side;

/// Errors raised while loading rosters or resolving a play.
#[derive(Debug, Error)]
pub enum MatchError {
    /// A requested team is not present in the roster source.
    #[error("missing roster: no team named `{team}`")]
    MissingRoster {
        /// Name that was looked up.
        team: String,
    },

    /// A side has no players at all, so no attack or catch can be resolved.
    #[error("the {side} side has no players")]
    EmptyRoster {
        /// The side with the empty roster.
        side: Side,
    },

    /// A roster, phrase or config document could not be parsed.
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MatchError>;
