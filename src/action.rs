use serde::Serialize;
use thiserror::Error;

use crate::model::entity::{PerformerId, Seats, Slot, VenueId};
use crate::model::pattern::Rotation;
use crate::model::ticket::TicketBundle;

/// Seats requested in one venue for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Booking {
    pub venue: VenueId,
    pub slot: Slot,
    pub amount: Seats,
}

/// Best venue for a slot and the most seats it can offer a single bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotOffer {
    pub slot: Slot,
    pub venue: VenueId,
    pub amount: Seats,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("venue {venue} has {available} seats left in slot {slot}, {requested} requested")]
    InsufficientCapacity {
        venue: String,
        slot: Slot,
        requested: Seats,
        available: Seats,
    },
    #[error("no venue with id {0}")]
    UnknownVenue(VenueId),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignError {
    #[error("no candidate venue for slot {slot} under rotation {rotation}")]
    NoCandidateVenue { slot: Slot, rotation: Rotation },
    #[error("ticket bundle has no venue for slot {0}")]
    IncompleteTicket(Slot),
    #[error("booking a selected bundle failed: {0}")]
    Booking(#[from] BookingError),
    #[error("total venue capacity does not fit in a seat count")]
    CapacityOverflow,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("no performer with id {0}")]
    UnknownPerformer(PerformerId),
    #[error("no venue with id {0}")]
    UnknownVenue(VenueId),
    #[error("performer {performer} is already paired with {venue}")]
    PerformerTaken { performer: String, venue: String },
    #[error("venue {venue} already hosts {performer}")]
    VenueTaken { venue: String, performer: String },
}

/// Result of one bundle round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Booked(TicketBundle),
    /// Some slot offers zero seats or no demand is left; nothing was booked.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    DemandMet,
    Exhausted,
    NoCandidateVenue { slot: u8, rotation: u8 },
}
