use std::collections::HashMap;

use itertools::Itertools;

use crate::action::{Booking, BookingError, PairingError};
use crate::model::entity::{Performer, PerformerId, Seats, Slot, Tier, Venue, VenueId};

/// Venues and performers of one evening, with their 1:1 pairing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    venues: Vec<Venue>,
    performers: Vec<Performer>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    pub fn add_venue(&mut self, mut venue: Venue) -> VenueId {
        venue.performer = None;
        self.venues.push(venue);
        self.venues.len() - 1
    }

    pub fn add_performer(&mut self, mut performer: Performer) -> PerformerId {
        performer.venue = None;
        self.performers.push(performer);
        self.performers.len() - 1
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    pub fn performers(&self) -> &[Performer] {
        &self.performers
    }

    pub fn venue(&self, id: VenueId) -> Option<&Venue> {
        self.venues.get(id)
    }

    pub fn performer(&self, id: PerformerId) -> Option<&Performer> {
        self.performers.get(id)
    }

    pub fn venue_by_address(&self, address: &str) -> Option<VenueId> {
        self.venues.iter().position(|venue| venue.address == address)
    }

    pub fn performer_by_name(&self, name: &str) -> Option<PerformerId> {
        self.performers.iter().position(|performer| performer.name == name)
    }

    /// Pairs a performer with a venue. Both sides must still be free.
    pub fn pair(&mut self, performer_id: PerformerId, venue_id: VenueId) -> Result<(), PairingError> {
        let performer = self.performers.get(performer_id).ok_or(PairingError::UnknownPerformer(performer_id))?;
        let venue = self.venues.get(venue_id).ok_or(PairingError::UnknownVenue(venue_id))?;
        if let Some(taken) = performer.venue {
            return Err(PairingError::PerformerTaken {
                performer: performer.name.clone(),
                venue: self.venues[taken].address.clone(),
            });
        }
        if let Some(taken) = venue.performer {
            return Err(PairingError::VenueTaken {
                venue: venue.address.clone(),
                performer: self.performers[taken].name.clone(),
            });
        }
        self.performers[performer_id].venue = Some(venue_id);
        self.venues[venue_id].performer = Some(performer_id);
        Ok(())
    }

    pub fn performer_of(&self, venue_id: VenueId) -> Option<&Performer> {
        self.venues.get(venue_id)?.performer.and_then(|id| self.performers.get(id))
    }

    pub fn tier_of(&self, venue_id: VenueId) -> Option<Tier> {
        self.performer_of(venue_id).map(|performer| performer.tier)
    }

    /// Paired venues in registry order. Only these can appear in a bundle.
    pub fn bookable(&self) -> Vec<VenueId> {
        self.venues
            .iter()
            .enumerate()
            .filter(|(_, venue)| venue.performer.is_some())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn unpaired_venues(&self) -> Vec<&Venue> {
        self.venues.iter().filter(|venue| venue.performer.is_none()).collect()
    }

    pub fn unpaired_performers(&self) -> Vec<&Performer> {
        self.performers.iter().filter(|performer| performer.venue.is_none()).collect()
    }

    /// Seats per slot over every venue; one full evening sells at most this many bundle seats.
    /// `None` when the sum does not fit in [`Seats`].
    pub fn total_capacity(&self) -> Option<Seats> {
        self.venues.iter().map(|venue| venue.capacity).try_fold(0, Seats::checked_add)
    }

    pub fn remaining_capacity(&self, venue_id: VenueId, slot: Slot) -> Option<Seats> {
        self.venues.get(venue_id).map(|venue| venue.remaining_capacity(slot))
    }

    pub fn capacity_by_tier(&self) -> HashMap<Tier, Seats> {
        self.venues
            .iter()
            .enumerate()
            .filter_map(|(id, venue)| Some((self.tier_of(id)?, venue.capacity)))
            .into_grouping_map()
            .fold(0, |total: Seats, _, capacity| total.saturating_add(capacity))
    }

    pub fn book_seats(&mut self, venue_id: VenueId, slot: Slot, amount: Seats) -> Result<(), BookingError> {
        self.venues
            .get_mut(venue_id)
            .ok_or(BookingError::UnknownVenue(venue_id))?
            .book_seats(slot, amount)
    }

    /// Checks that every booking fits, counting repeated venue/slot pairs together.
    pub fn simulate(&self, bookings: &[Booking]) -> Result<(), BookingError> {
        let requested = bookings
            .iter()
            .map(|booking| ((booking.venue, booking.slot), booking.amount))
            .into_grouping_map()
            .fold(0, |total: Seats, _, amount| total.saturating_add(amount));
        for ((venue_id, slot), amount) in requested.into_iter().sorted() {
            let venue = self.venues.get(venue_id).ok_or(BookingError::UnknownVenue(venue_id))?;
            let available = venue.remaining_capacity(slot);
            if amount > available {
                return Err(BookingError::InsufficientCapacity {
                    venue: venue.address.clone(),
                    slot,
                    requested: amount,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Applies all bookings or none of them.
    pub fn act(&mut self, bookings: &[Booking]) -> Result<(), BookingError> {
        self.simulate(bookings)?;
        for booking in bookings {
            self.book_seats(booking.venue, booking.slot, booking.amount)?;
        }
        Ok(())
    }
}
