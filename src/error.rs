//! Setup-time failures.
//!
//! Everything that can go wrong while building an island, loading animals or
//! overriding parameters ends up here. The yearly cycle itself never fails:
//! starvation, death and blocked migration are ordinary model outcomes.

use crate::island::Location;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The island map is empty")]
    EmptyMap,

    #[error("Map row {row} has length {found}, but the first row has length {expected}")]
    RaggedMap {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Unknown terrain code {code:?} at {location:?}")]
    UnknownTerrain { code: char, location: Location },

    #[error("The island is not surrounded by water: {location:?} is on the border")]
    OpenBorder { location: Location },

    #[error("Unknown species {0:?}, expected Herbivore or Carnivore")]
    UnknownSpecies(String),

    #[error("Unknown terrain {0:?}")]
    UnknownTerrainName(String),

    #[error("{owner} has no parameter {name:?}")]
    UnknownParameter { owner: String, name: String },

    #[error("Invalid value {value} for parameter {name:?}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },

    #[error("Location {0:?} is not on the island")]
    OutsideMap(Location),

    #[error("Location {0:?} cannot hold animals")]
    Uninhabitable(Location),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(name: &str, value: f64, reason: &'static str) -> Self {
        ConfigError::InvalidParameter {
            name: name.to_string(),
            value,
            reason,
        }
    }
}
