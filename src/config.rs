//! Run configuration, read from the environment with defaults.
//!
//! Command-line flags override whatever is loaded here.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::greedy::{Params, DEFAULT_WEEKDAY, MAX_PER_BUNDLE};
use crate::model::entity::Seats;

pub const DATA_DIR_VAR: &str = "SLOT_BUNDLE_DATA_DIR";
pub const MAX_PER_BUNDLE_VAR: &str = "SLOT_BUNDLE_MAX_PER_BUNDLE";
pub const WEEKDAY_VAR: &str = "SLOT_BUNDLE_WEEKDAY";
pub const DEMAND_VAR: &str = "SLOT_BUNDLE_DEMAND";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    NotANumber { name: String, value: String },
    #[error("{name} must be at least 1")]
    Zero { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding `performers.csv`, `venues.csv` and `fixed_addresses.csv`
    pub data_dir: PathBuf,
    /// Seats one bundle may take from a venue per slot
    pub max_per_bundle: Seats,
    /// Label printed on every ticket
    pub weekday: String,
    /// Total demand; `None` means the registry's capacity per slot
    pub demand: Option<Seats>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            max_per_bundle: MAX_PER_BUNDLE,
            weekday: DEFAULT_WEEKDAY.to_string(),
            demand: None,
        }
    }
}

pub fn parse_seats(name: &str, value: &str) -> Result<Seats, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::NotANumber {
        name: name.to_string(),
        value: value.to_string(),
    })
}

pub fn parse_max_per_bundle(name: &str, value: &str) -> Result<Seats, ConfigError> {
    match parse_seats(name, value)? {
        0 => Err(ConfigError::Zero { name: name.to_string() }),
        max => Ok(max),
    }
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, ConfigError> {
        let defaults = Config::default();
        Ok(Config {
            data_dir: lookup(DATA_DIR_VAR).map(PathBuf::from).unwrap_or(defaults.data_dir),
            max_per_bundle: lookup(MAX_PER_BUNDLE_VAR)
                .map(|value| parse_max_per_bundle(MAX_PER_BUNDLE_VAR, &value))
                .transpose()?
                .unwrap_or(defaults.max_per_bundle),
            weekday: lookup(WEEKDAY_VAR).unwrap_or(defaults.weekday),
            demand: lookup(DEMAND_VAR)
                .map(|value| parse_seats(DEMAND_VAR, &value))
                .transpose()?,
        })
    }

    pub fn params(&self) -> Params {
        Params {
            max_per_bundle: self.max_per_bundle,
            weekday: self.weekday.clone(),
        }
    }
}
