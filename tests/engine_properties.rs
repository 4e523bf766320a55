use std::collections::HashSet;

use proptest::prelude::*;

use slot_bundle::model::entity::{Performer, Slot, Tier, Venue, Zone};
use slot_bundle::model::pattern::Rotation;
use slot_bundle::synth::{generate, SynthParams};
use slot_bundle::{AssignError, Greedy, Params, Registry, RoundOutcome, StopReason};

fn tier() -> impl Strategy<Value = Tier> {
    prop_oneof![Just(Tier::A), Just(Tier::B), Just(Tier::C)]
}

fn zone() -> impl Strategy<Value = Zone> {
    prop_oneof![Just(Zone::West), Just(Zone::Central), Just(Zone::East)]
}

fn registry() -> impl Strategy<Value = Registry> {
    prop::collection::vec((tier(), 0u32..40, zone()), 1..14).prop_map(|rows| {
        let mut registry = Registry::new();
        for (i, (tier, capacity, zone)) in rows.into_iter().enumerate() {
            let performer = registry.add_performer(Performer::new(format!("p{i}"), tier));
            let venue = registry.add_venue(Venue::new(format!("v{i}"), capacity).with_zone(zone));
            registry.pair(performer, venue).unwrap();
        }
        registry
    })
}

proptest! {
    #[test]
    fn bundles_respect_every_constraint(
        mut registry in registry(),
        demand in 0u32..400,
        max_per_bundle in 1u32..12,
    ) {
        let initial = registry.clone();
        let greedy = Greedy::new(Params { max_per_bundle, ..Params::default() });
        let assignment = greedy.assign_all_bundles(&mut registry, demand).unwrap();

        let mut rotation = Rotation::FIRST;
        for ticket in &assignment.tickets {
            prop_assert!(ticket.seats > 0);
            prop_assert!(ticket.seats <= max_per_bundle);
            let venues = ticket.venues();
            prop_assert_eq!(venues.iter().collect::<HashSet<_>>().len(), 4);
            for pair in venues.windows(2) {
                let (a, b) = (registry.venue(pair[0]).unwrap(), registry.venue(pair[1]).unwrap());
                prop_assert!(a.zone_compatible(b));
            }
            for (slot, venue) in Slot::ALL.into_iter().zip(venues) {
                let tier = registry.tier_of(venue).unwrap();
                prop_assert!(rotation.constraint(slot).admits(tier));
            }
            rotation = rotation.next();
        }

        for (venue, before) in registry.venues().iter().zip(initial.venues()) {
            for slot in Slot::ALL {
                prop_assert!(venue.booked(slot) <= venue.capacity);
                let sold: u32 = assignment
                    .tickets
                    .iter()
                    .filter(|ticket| registry.venue(ticket.stop(slot).venue) == Some(venue))
                    .map(|ticket| ticket.seats)
                    .sum();
                prop_assert_eq!(venue.booked(slot), before.booked(slot) + sold);
            }
        }

        prop_assert_eq!(assignment.seats_sold() + assignment.remaining_demand, demand);
        if assignment.stop == StopReason::DemandMet {
            prop_assert_eq!(assignment.remaining_demand, 0);
        }
    }

    #[test]
    fn bundle_seats_are_the_smallest_capped_offer(
        mut registry in registry(),
        demand in 0u32..400,
        max_per_bundle in 1u32..12,
    ) {
        let greedy = Greedy::new(Params { max_per_bundle, ..Params::default() });
        let mut rotation = Rotation::FIRST;
        let mut remaining = demand;
        while remaining > 0 {
            let before = registry.clone();
            match greedy.assign_bundle(&mut registry, rotation, remaining) {
                Ok(RoundOutcome::Booked(ticket)) => {
                    let smallest = Slot::ALL
                        .into_iter()
                        .map(|slot| before.remaining_capacity(ticket.stop(slot).venue, slot).unwrap())
                        .min()
                        .unwrap();
                    prop_assert_eq!(ticket.seats, smallest.min(max_per_bundle).min(remaining));
                    for slot in Slot::ALL {
                        let venue = ticket.stop(slot).venue;
                        prop_assert_eq!(
                            registry.remaining_capacity(venue, slot).unwrap(),
                            before.remaining_capacity(venue, slot).unwrap() - ticket.seats
                        );
                    }
                    remaining -= ticket.seats;
                    rotation = rotation.next();
                }
                Ok(RoundOutcome::Exhausted) | Err(AssignError::NoCandidateVenue { .. }) => {
                    prop_assert_eq!(&registry, &before);
                    break;
                }
                Err(err) => prop_assert!(false, "unexpected error: {}", err),
            }
        }
    }

    #[test]
    fn identical_state_gives_identical_runs(mut registry in registry(), demand in 0u32..200) {
        let mut twin = registry.clone();
        let greedy = Greedy::default();
        let first = greedy.assign_all_bundles(&mut registry, demand).unwrap();
        let second = greedy.assign_all_bundles(&mut twin, demand).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(registry, twin);
    }
}

#[test]
fn synthetic_registry_books_until_stopped() {
    let mut registry = generate(&SynthParams { seed: 11, venues: 20, min_capacity: 5, max_capacity: 30 }).unwrap();
    let demand = registry.total_capacity().unwrap();
    let assignment = Greedy::default().assign_all_bundles(&mut registry, demand).unwrap();
    assert!(!assignment.tickets.is_empty());
    assert_eq!(assignment.seats_sold() + assignment.remaining_demand, demand);
}
