use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::action::StopReason;
use crate::greedy::Assignment;
use crate::model::entity::{PerformerId, Seats, Slot, VenueId};
use crate::model::ticket::{TicketBundle, TicketRow};
use crate::registry::Registry;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("bundle refers to unknown venue {0}")]
    UnknownVenue(VenueId),
    #[error("bundle refers to unknown performer {0}")]
    UnknownPerformer(PerformerId),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One `{slot, venue, performer}` row per slot, slots 1 to 4.
pub fn rows(registry: &Registry, ticket: &TicketBundle) -> Result<Vec<TicketRow>, ExportError> {
    Slot::ALL
        .into_iter()
        .map(|slot| {
            let stop = ticket.stop(slot);
            let venue = registry.venue(stop.venue).ok_or(ExportError::UnknownVenue(stop.venue))?;
            let performer = registry.performer(stop.performer).ok_or(ExportError::UnknownPerformer(stop.performer))?;
            Ok(TicketRow {
                slot: slot.number(),
                venue: venue.address.clone(),
                performer: performer.name.clone(),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    ticket: usize,
    weekday: &'a str,
    seats: Seats,
    slot: u8,
    venue: &'a str,
    performer: &'a str,
}

/// Writes every bundle as four rows: `ticket,weekday,seats,slot,venue,performer`.
pub fn write_csv<W: io::Write>(writer: W, registry: &Registry, tickets: &[TicketBundle]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for (number, ticket) in tickets.iter().enumerate() {
        for row in rows(registry, ticket)? {
            writer.serialize(CsvRecord {
                ticket: number + 1,
                weekday: &ticket.weekday,
                seats: ticket.seats,
                slot: row.slot,
                venue: &row.venue,
                performer: &row.performer,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleView {
    pub weekday: String,
    pub seats: Seats,
    pub slots: Vec<TicketRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub bundles: usize,
    pub seats_sold: Seats,
    pub remaining_demand: Seats,
    pub stop: StopReason,
}

impl Summary {
    pub fn of(assignment: &Assignment) -> Summary {
        Summary {
            bundles: assignment.tickets.len(),
            seats_sold: assignment.seats_sold(),
            remaining_demand: assignment.remaining_demand,
            stop: assignment.stop,
        }
    }
}

#[derive(Debug, Serialize)]
struct Report {
    summary: Summary,
    tickets: Vec<BundleView>,
}

pub fn write_json<W: io::Write>(writer: W, registry: &Registry, assignment: &Assignment) -> Result<(), ExportError> {
    let tickets = assignment
        .tickets
        .iter()
        .map(|ticket| {
            Ok(BundleView {
                weekday: ticket.weekday.clone(),
                seats: ticket.seats,
                slots: rows(registry, ticket)?,
            })
        })
        .collect::<Result<Vec<_>, ExportError>>()?;
    serde_json::to_writer_pretty(writer, &Report { summary: Summary::of(assignment), tickets })?;
    Ok(())
}
