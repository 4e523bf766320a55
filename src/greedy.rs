use std::cmp::Reverse;

use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::action::{AssignError, Booking, RoundOutcome, SlotOffer, StopReason};
use crate::model::entity::{Seats, Slot, VenueId, SLOT_COUNT};
use crate::model::pattern::Rotation;
use crate::model::ticket::{Stop, TicketBundle};
use crate::registry::Registry;

/// Most seats a single bundle may take from one venue and slot.
pub const MAX_PER_BUNDLE: Seats = 8;
pub const DEFAULT_WEEKDAY: &str = "Friday";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params {
    pub max_per_bundle: Seats,
    pub weekday: String,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            max_per_bundle: MAX_PER_BUNDLE,
            weekday: DEFAULT_WEEKDAY.to_string(),
        }
    }
}

struct State {
    tickets: Vec<TicketBundle>,
    remaining: Seats,
    rotation: Rotation,
}

impl State {
    fn new(demand: Seats) -> State {
        State { tickets: Vec::new(), remaining: demand, rotation: Rotation::FIRST }
    }

    fn record(&mut self, ticket: TicketBundle) {
        self.remaining -= ticket.seats;
        self.rotation = self.rotation.next();
        self.tickets.push(ticket);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub tickets: Vec<TicketBundle>,
    pub remaining_demand: Seats,
    pub stop: StopReason,
}

impl Assignment {
    pub fn seats_sold(&self) -> Seats {
        self.tickets.iter().map(|ticket| ticket.seats).sum()
    }
}

/// First-fit bundle builder: per slot, the venue with the most seats left wins.
#[derive(Debug, Clone, Default)]
pub struct Greedy {
    params: Params,
}

impl Greedy {
    pub fn new(params: Params) -> Greedy {
        Greedy { params }
    }

    pub fn select_venue_for_slot(
        &self,
        registry: &Registry,
        candidates: &[VenueId],
        slot: Slot,
        rotation: Rotation,
        chosen: &[VenueId],
    ) -> Result<SlotOffer, AssignError> {
        let previous = chosen.last().and_then(|&id| registry.venue(id));
        let constraint = rotation.constraint(slot);
        let (venue_id, venue) = candidates
            .iter()
            .copied()
            .filter(|id| !chosen.contains(id))
            .filter_map(|id| Some((id, registry.venue(id)?)))
            .filter(|(_, venue)| previous.map_or(true, |prev| prev.zone_compatible(venue)))
            .filter(|(id, _)| registry.tier_of(*id).is_some_and(|tier| constraint.admits(tier)))
            .sorted_by_key(|(_, venue)| Reverse(venue.remaining_capacity(slot)))
            .next()
            .ok_or(AssignError::NoCandidateVenue { slot, rotation })?;
        let amount = venue.remaining_capacity(slot).min(self.params.max_per_bundle);
        Ok(SlotOffer { slot, venue: venue_id, amount })
    }

    /// Picks a venue for every slot and books the common seat count on all four.
    pub fn assign_bundle(
        &self,
        registry: &mut Registry,
        rotation: Rotation,
        remaining_demand: Seats,
    ) -> Result<RoundOutcome, AssignError> {
        let candidates = registry.bookable();
        let mut chosen = Vec::with_capacity(SLOT_COUNT);
        let mut offers = Vec::with_capacity(SLOT_COUNT);
        for slot in Slot::ALL {
            let offer = self.select_venue_for_slot(registry, &candidates, slot, rotation, &chosen)?;
            chosen.push(offer.venue);
            offers.push(offer);
        }
        debug!(
            %rotation,
            amounts = ?offers.iter().map(|offer| offer.amount).collect_vec(),
            venues = ?chosen.iter().filter_map(|&id| registry.venue(id)).map(|venue| venue.address.as_str()).collect_vec(),
            "slot offers"
        );

        let seats = offers.iter().map(|offer| offer.amount).min().unwrap_or(0).min(remaining_demand);
        if seats == 0 {
            info!(%rotation, "every candidate is booked out in some slot");
            return Ok(RoundOutcome::Exhausted);
        }

        let mut stops = [None; SLOT_COUNT];
        for offer in &offers {
            stops[offer.slot.index()] = registry
                .venue(offer.venue)
                .and_then(|venue| venue.performer())
                .map(|performer| Stop { venue: offer.venue, performer });
        }
        let ticket = TicketBundle::new(self.params.weekday.as_str(), seats, stops)?;
        let bookings = offers
            .iter()
            .map(|offer| Booking { venue: offer.venue, slot: offer.slot, amount: seats })
            .collect_vec();
        registry.act(&bookings)?;
        Ok(RoundOutcome::Booked(ticket))
    }

    /// Books bundles round after round until demand or capacity runs out.
    pub fn assign_all_bundles(&self, registry: &mut Registry, total_demand: Seats) -> Result<Assignment, AssignError> {
        let mut state = State::new(total_demand);
        let stop = loop {
            if state.remaining == 0 {
                break StopReason::DemandMet;
            }
            match self.assign_bundle(registry, state.rotation, state.remaining) {
                Ok(RoundOutcome::Booked(ticket)) => {
                    info!(
                        rotation = %state.rotation,
                        seats = ticket.seats,
                        remaining = state.remaining - ticket.seats,
                        "bundle booked"
                    );
                    state.record(ticket);
                }
                Ok(RoundOutcome::Exhausted) => break StopReason::Exhausted,
                Err(AssignError::NoCandidateVenue { slot, rotation }) => {
                    warn!(%slot, %rotation, "no venue satisfies the slot constraints, stopping");
                    break StopReason::NoCandidateVenue { slot: slot.number(), rotation: rotation.id() };
                }
                Err(err) => return Err(err),
            }
        };
        info!(
            bundles = state.tickets.len(),
            remaining = state.remaining,
            stop = ?stop,
            "assignment finished"
        );
        Ok(Assignment { tickets: state.tickets, remaining_demand: state.remaining, stop })
    }

    /// Runs with demand equal to the registry's per-slot capacity.
    pub fn assign_all(&self, registry: &mut Registry) -> Result<Assignment, AssignError> {
        let demand = registry.total_capacity().ok_or(AssignError::CapacityOverflow)?;
        self.assign_all_bundles(registry, demand)
    }
}
