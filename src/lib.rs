//! UPSBet match prediction service
//!
//! Serves two pre-trained regression models (match goals and total corner
//! kicks) over an HTTP JSON API, backed by historical match-statistics
//! averages in SQLite.

pub mod data;
pub mod features;
pub mod model;
pub mod predict;
pub mod server;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// A home/away team pairing, optionally scoped to matches played strictly
/// before a cutoff date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fixture {
    pub home: TeamId,
    pub away: TeamId,
    pub cutoff: Option<NaiveDate>,
}

impl Fixture {
    /// Create a fixture. A pairing of a team with itself is rejected here,
    /// before any database or model access can happen.
    pub fn new(home: TeamId, away: TeamId, cutoff: Option<NaiveDate>) -> Result<Self> {
        if home == away {
            return Err(UpsBetError::SameTeam);
        }
        Ok(Fixture { home, away, cutoff })
    }

    /// The same pairing with home and away swapped, keeping the cutoff.
    pub fn mirrored(&self) -> Fixture {
        Fixture {
            home: self.away,
            away: self.home,
            cutoff: self.cutoff,
        }
    }
}

impl fmt::Display for Fixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {}", self.home, self.away)
    }
}

#[derive(Error, Debug)]
pub enum UpsBetError {
    #[error("home and away teams must differ")]
    SameTeam,

    #[error("missing team ids")]
    MissingTeams,

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("no historical data for this fixture")]
    NoHistory,

    #[error("the {0} model is not available, check the artifact files and restart")]
    ModelUnavailable(&'static str),

    #[error("feature count mismatch: model expects {expected}, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("model artifact error: {0}")]
    Artifact(String),

    #[error("unknown statistic column: {0}")]
    UnknownColumn(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, UpsBetError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub data: DataConfig,
    pub models: ModelsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub goals_path: String,
    pub corners_path: String,
    pub corners_scaler_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                static_dir: "public".to_string(),
            },
            data: DataConfig {
                database_path: "data/upsbet.db".to_string(),
            },
            models: ModelsConfig {
                goals_path: "models/goals_model.json".to_string(),
                corners_path: "models/corners_model.json".to_string(),
                corners_scaler_path: "models/corners_scaler.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            UpsBetError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| UpsBetError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| UpsBetError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
