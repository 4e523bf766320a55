//! Reads performers, venues and fixed addresses from header-less CSV files and
//! pairs every performer with a venue.
//!
//! Expected files in the data directory:
//! - `performers.csv`: `name,tier`
//! - `venues.csv`: `address,capacity[,zone]`
//! - `fixed_addresses.csv` (optional): `performer,address`

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use thiserror::Error;
use tracing::{info, warn};

use crate::action::PairingError;
use crate::model::entity::{Performer, Seats, Tier, Venue, Zone};
use crate::registry::Registry;

pub const PERFORMERS_FILE: &str = "performers.csv";
pub const VENUES_FILE: &str = "venues.csv";
pub const FIXED_ADDRESSES_FILE: &str = "fixed_addresses.csv";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("line {line}: {message}")]
    Record { line: u64, message: String },
    #[error("venue address {0:?} appears twice")]
    DuplicateVenue(String),
    #[error("performer {0:?} appears twice")]
    DuplicatePerformer(String),
    #[error(transparent)]
    Pairing(#[from] PairingError),
    #[error("total venue capacity does not fit in a seat count")]
    CapacityOverflow,
}

/// A paired registry plus the demand implied by its capacity.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub registry: Registry,
    pub total_demand: Seats,
}

fn csv_reader<R: io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map_or(0, |position| position.line())
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, LoadError> {
    record
        .get(index)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LoadError::Record { line: line_of(record), message: format!("missing {name}") })
}

pub fn read_performers<R: io::Read>(reader: R) -> Result<Vec<Performer>, LoadError> {
    let mut seen = HashSet::new();
    let mut performers = Vec::new();
    for record in csv_reader(reader).records() {
        let record = record?;
        let name = field(&record, 0, "performer name")?;
        let tier: Tier = field(&record, 1, "tier")?
            .parse()
            .map_err(|err| LoadError::Record { line: line_of(&record), message: format!("{err}") })?;
        if !seen.insert(name.to_string()) {
            return Err(LoadError::DuplicatePerformer(name.to_string()));
        }
        performers.push(Performer::new(name, tier));
    }
    Ok(performers)
}

pub fn read_venues<R: io::Read>(reader: R) -> Result<Vec<Venue>, LoadError> {
    let mut seen = HashSet::new();
    let mut venues = Vec::new();
    for record in csv_reader(reader).records() {
        let record = record?;
        let address = field(&record, 0, "address")?;
        let capacity: Seats = field(&record, 1, "capacity")?
            .parse()
            .map_err(|err| LoadError::Record { line: line_of(&record), message: format!("bad capacity: {err}") })?;
        let zone: Zone = record
            .get(2)
            .unwrap_or_default()
            .parse()
            .map_err(|err| LoadError::Record { line: line_of(&record), message: format!("{err}") })?;
        if !seen.insert(address.to_string()) {
            return Err(LoadError::DuplicateVenue(address.to_string()));
        }
        venues.push(Venue::new(address, capacity).with_zone(zone));
    }
    Ok(venues)
}

pub fn read_fixed_addresses<R: io::Read>(reader: R) -> Result<Vec<(String, String)>, LoadError> {
    csv_reader(reader)
        .records()
        .map(|record| -> Result<(String, String), LoadError> {
            let record = record?;
            Ok((
                field(&record, 0, "performer name")?.to_string(),
                field(&record, 1, "address")?.to_string(),
            ))
        })
        .collect()
}

/// Pairs fixed addresses first, then the strongest tiers with the largest venues.
pub fn pair_performers(registry: &mut Registry, fixed: &[(String, String)]) -> Result<(), LoadError> {
    info!(count = fixed.len(), "performers with a claimed address");
    for (name, address) in fixed {
        match (registry.performer_by_name(name), registry.venue_by_address(address)) {
            (Some(performer), Some(venue)) => registry.pair(performer, venue)?,
            _ => warn!(performer = %name, address = %address, "unknown performer or address in fixed addresses"),
        }
    }

    let performers = registry
        .performers()
        .iter()
        .enumerate()
        .filter(|(_, performer)| performer.venue().is_none())
        .sorted_by_key(|(_, performer)| performer.tier)
        .map(|(id, _)| id)
        .collect_vec();
    let venues = registry
        .venues()
        .iter()
        .enumerate()
        .filter(|(_, venue)| venue.performer().is_none())
        .sorted_by_key(|(_, venue)| std::cmp::Reverse(venue.capacity))
        .map(|(id, _)| id)
        .collect_vec();
    info!(performers = performers.len(), venues = venues.len(), "pairing remaining performers");

    for (performer, venue) in performers.into_iter().zip(venues) {
        registry.pair(performer, venue)?;
    }
    Ok(())
}

/// Builds a paired registry from in-memory records.
pub fn build(performers: Vec<Performer>, venues: Vec<Venue>, fixed: &[(String, String)]) -> Result<Loaded, LoadError> {
    if performers.len() != venues.len() {
        warn!(
            performers = performers.len(),
            venues = venues.len(),
            "performer and venue counts differ, some will stay unpaired"
        );
    }
    let mut registry = Registry::new();
    performers.into_iter().for_each(|performer| {
        registry.add_performer(performer);
    });
    venues.into_iter().for_each(|venue| {
        registry.add_venue(venue);
    });
    let total_demand = registry.total_capacity().ok_or(LoadError::CapacityOverflow)?;
    info!(shows = registry.venues().len(), total_demand, "capacity per slot");

    pair_performers(&mut registry, fixed)?;
    for venue in registry.unpaired_venues() {
        warn!(address = %venue.address, "venue has no performer and will not be booked");
    }

    let counts = registry.performers().iter().counts_by(|performer| performer.tier);
    let seats = registry.capacity_by_tier();
    for tier in Tier::ALL {
        info!(
            %tier,
            performers = counts.get(&tier).copied().unwrap_or(0),
            seats = seats.get(&tier).copied().unwrap_or(0),
            "tier totals per slot"
        );
    }
    Ok(Loaded { registry, total_demand })
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// Loads the three CSV files from `dir`. A missing fixed-address file means no fixed addresses.
pub fn load_dir(dir: &Path) -> Result<Loaded, LoadError> {
    let performers = read_performers(open(&dir.join(PERFORMERS_FILE))?)?;
    let venues = read_venues(open(&dir.join(VENUES_FILE))?)?;
    let fixed_path = dir.join(FIXED_ADDRESSES_FILE);
    let fixed = if fixed_path.exists() {
        read_fixed_addresses(open(&fixed_path)?)?
    } else {
        Vec::new()
    };
    build(performers, venues, &fixed)
}
