pub mod entity {
    use std::fmt;
    use std::str::FromStr;

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    use crate::action::BookingError;

    pub type VenueId = usize;
    pub type PerformerId = usize;
    pub type Seats = u32;

    pub const SLOT_COUNT: usize = 4;

    /// One of the four ordered periods of the evening, numbered 1 to 4.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Slot(u8);

    impl Slot {
        pub const ALL: [Slot; SLOT_COUNT] = [Slot(1), Slot(2), Slot(3), Slot(4)];

        pub fn new(number: u8) -> Option<Slot> {
            (1..=SLOT_COUNT as u8).contains(&number).then_some(Slot(number))
        }

        pub fn number(self) -> u8 {
            self.0
        }

        pub fn index(self) -> usize {
            usize::from(self.0) - 1
        }
    }

    impl fmt::Display for Slot {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
    pub enum Tier {
        A,
        B,
        C,
    }

    impl Tier {
        pub const ALL: [Tier; 3] = [Tier::A, Tier::B, Tier::C];
    }

    impl fmt::Display for Tier {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let label = match self {
                Tier::A => "A",
                Tier::B => "B",
                Tier::C => "C",
            };
            f.write_str(label)
        }
    }

    #[derive(Debug, Clone, Error, PartialEq, Eq)]
    pub enum ParseError {
        #[error("unknown tier {0:?}")]
        Tier(String),
        #[error("unknown zone {0:?}")]
        Zone(String),
    }

    impl FromStr for Tier {
        type Err = ParseError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_uppercase().as_str() {
                "A" => Ok(Tier::A),
                "B" => Ok(Tier::B),
                "C" => Ok(Tier::C),
                _ => Err(ParseError::Tier(s.to_string())),
            }
        }
    }

    /// Coarse geography. Consecutive slots of a bundle may not jump west↔east.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Zone {
        West,
        #[default]
        Central,
        East,
    }

    impl Zone {
        pub fn compatible(self, other: Zone) -> bool {
            !matches!((self, other), (Zone::West, Zone::East) | (Zone::East, Zone::West))
        }
    }

    impl fmt::Display for Zone {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let label = match self {
                Zone::West => "west",
                Zone::Central => "central",
                Zone::East => "east",
            };
            f.write_str(label)
        }
    }

    impl FromStr for Zone {
        type Err = ParseError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.trim().to_ascii_lowercase().as_str() {
                "west" => Ok(Zone::West),
                "" | "central" => Ok(Zone::Central),
                "east" => Ok(Zone::East),
                _ => Err(ParseError::Zone(s.to_string())),
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Venue {
        pub address: String,
        pub capacity: Seats,
        pub zone: Zone,
        pub(crate) performer: Option<PerformerId>,
        booked: [Seats; SLOT_COUNT],
    }

    impl Venue {
        pub fn new(address: impl Into<String>, capacity: Seats) -> Venue {
            Venue {
                address: address.into(),
                capacity,
                zone: Zone::default(),
                performer: None,
                booked: [0; SLOT_COUNT],
            }
        }

        pub fn with_zone(mut self, zone: Zone) -> Venue {
            self.zone = zone;
            self
        }

        pub fn performer(&self) -> Option<PerformerId> {
            self.performer
        }

        pub fn booked(&self, slot: Slot) -> Seats {
            self.booked[slot.index()]
        }

        pub fn remaining_capacity(&self, slot: Slot) -> Seats {
            self.capacity.saturating_sub(self.booked[slot.index()])
        }

        /// Books `amount` seats in `slot`. Leaves the venue untouched on failure.
        pub fn book_seats(&mut self, slot: Slot, amount: Seats) -> Result<(), BookingError> {
            let available = self.remaining_capacity(slot);
            if amount > available {
                return Err(BookingError::InsufficientCapacity {
                    venue: self.address.clone(),
                    slot,
                    requested: amount,
                    available,
                });
            }
            self.booked[slot.index()] += amount;
            Ok(())
        }

        pub fn zone_compatible(&self, other: &Venue) -> bool {
            self.zone.compatible(other.zone)
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct Performer {
        pub name: String,
        pub tier: Tier,
        pub(crate) venue: Option<VenueId>,
    }

    impl Performer {
        pub fn new(name: impl Into<String>, tier: Tier) -> Performer {
            Performer { name: name.into(), tier, venue: None }
        }

        pub fn venue(&self) -> Option<VenueId> {
            self.venue
        }
    }
}


pub mod pattern {
    use std::fmt;

    use super::entity::{Slot, Tier, SLOT_COUNT};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum SlotConstraint {
        Only(Tier),
        Any,
    }

    impl SlotConstraint {
        pub fn admits(self, tier: Tier) -> bool {
            match self {
                SlotConstraint::Only(required) => required == tier,
                SlotConstraint::Any => true,
            }
        }
    }

    impl fmt::Display for SlotConstraint {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                SlotConstraint::Only(tier) => write!(f, "{tier}"),
                SlotConstraint::Any => f.write_str("any"),
            }
        }
    }

    /// Rotation 1 reads slots 1..4 straight off this sequence.
    pub const CANONICAL: [SlotConstraint; SLOT_COUNT] = [
        SlotConstraint::Only(Tier::B),
        SlotConstraint::Only(Tier::C),
        SlotConstraint::Any,
        SlotConstraint::Only(Tier::A),
    ];

    /// One of the four cyclic shifts of [`CANONICAL`], numbered 1 to 4.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Rotation(u8);

    impl Rotation {
        pub const FIRST: Rotation = Rotation(1);
        pub const ALL: [Rotation; SLOT_COUNT] = [Rotation(1), Rotation(2), Rotation(3), Rotation(4)];

        pub fn new(id: u8) -> Option<Rotation> {
            (1..=SLOT_COUNT as u8).contains(&id).then_some(Rotation(id))
        }

        pub fn id(self) -> u8 {
            self.0
        }

        pub fn next(self) -> Rotation {
            Rotation(self.0 % SLOT_COUNT as u8 + 1)
        }

        pub fn constraint(self, slot: Slot) -> SlotConstraint {
            CANONICAL[(slot.index() + usize::from(self.0) - 1) % SLOT_COUNT]
        }

        pub fn constraints(self) -> [SlotConstraint; SLOT_COUNT] {
            Slot::ALL.map(|slot| self.constraint(slot))
        }
    }

    impl fmt::Display for Rotation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }
}


pub mod ticket {
    use serde::Serialize;

    use super::entity::{PerformerId, Seats, Slot, VenueId, SLOT_COUNT};
    use crate::action::AssignError;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Stop {
        pub venue: VenueId,
        pub performer: PerformerId,
    }

    /// A finished bundle: one venue and performer per slot, all sharing `seats`.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TicketBundle {
        pub weekday: String,
        pub seats: Seats,
        stops: [Stop; SLOT_COUNT],
    }

    impl TicketBundle {
        pub fn new(
            weekday: impl Into<String>,
            seats: Seats,
            stops: [Option<Stop>; SLOT_COUNT],
        ) -> Result<TicketBundle, AssignError> {
            let mut filled = [Stop { venue: 0, performer: 0 }; SLOT_COUNT];
            for slot in Slot::ALL {
                filled[slot.index()] = stops[slot.index()].ok_or(AssignError::IncompleteTicket(slot))?;
            }
            Ok(TicketBundle { weekday: weekday.into(), seats, stops: filled })
        }

        pub fn stop(&self, slot: Slot) -> Stop {
            self.stops[slot.index()]
        }

        pub fn venues(&self) -> [VenueId; SLOT_COUNT] {
            self.stops.map(|stop| stop.venue)
        }

        pub fn performers(&self) -> [PerformerId; SLOT_COUNT] {
            self.stops.map(|stop| stop.performer)
        }
    }

    /// Flat export record for one slot of a bundle.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize)]
    pub struct TicketRow {
        pub slot: u8,
        pub venue: String,
        pub performer: String,
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::entity::*;
    use super::pattern::*;
    use super::ticket::*;
    use crate::action::{AssignError, BookingError};

    #[test]
    fn booking_never_exceeds_capacity() {
        let mut venue = Venue::new("Keizersgracht 1", 10);
        let slot = Slot::new(2).unwrap();
        venue.book_seats(slot, 8).unwrap();
        let err = venue.book_seats(slot, 3).unwrap_err();
        assert_eq!(
            err,
            BookingError::InsufficientCapacity {
                venue: "Keizersgracht 1".into(),
                slot,
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(venue.booked(slot), 8);
        venue.book_seats(slot, 2).unwrap();
        assert_eq!(venue.remaining_capacity(slot), 0);
        assert_eq!(venue.remaining_capacity(Slot::new(1).unwrap()), 10);
    }

    #[test]
    fn only_west_east_is_incompatible() {
        let zones = [Zone::West, Zone::Central, Zone::East];
        for a in zones {
            for b in zones {
                let expected = !matches!((a, b), (Zone::West, Zone::East) | (Zone::East, Zone::West));
                assert_eq!(a.compatible(b), expected, "{a} -> {b}");
            }
        }
        assert_eq!(Venue::new("x", 1).zone, Zone::Central);
    }

    #[test]
    fn slots_are_one_to_four() {
        assert_eq!(Slot::new(0), None);
        assert_eq!(Slot::new(5), None);
        assert_eq!(Slot::ALL.map(Slot::number), [1, 2, 3, 4]);
    }

    #[test]
    fn rotation_one_is_canonical_and_wraps() {
        let b = SlotConstraint::Only(Tier::B);
        let c = SlotConstraint::Only(Tier::C);
        let a = SlotConstraint::Only(Tier::A);
        let any = SlotConstraint::Any;
        assert_eq!(Rotation::FIRST.constraints(), [b, c, any, a]);
        assert_eq!(Rotation::new(2).unwrap().constraints(), [c, any, a, b]);
        assert_eq!(Rotation::new(3).unwrap().constraints(), [any, a, b, c]);
        assert_eq!(Rotation::new(4).unwrap().constraints(), [a, b, c, any]);
        assert_eq!(Rotation::new(4).unwrap().next(), Rotation::FIRST);
        assert_eq!(Rotation::new(0), None);
    }

    #[test]
    fn every_slot_sees_every_constraint_once_per_cycle() {
        for slot in Slot::ALL {
            let mut rotation = Rotation::FIRST;
            let mut seen = HashSet::new();
            for _ in 0..SLOT_COUNT {
                assert!(seen.insert(rotation.constraint(slot)));
                rotation = rotation.next();
            }
            assert_eq!(rotation, Rotation::FIRST);
            assert_eq!(seen.len(), 4);
        }
        for rotation in Rotation::ALL {
            let constraints = rotation.constraints();
            assert_eq!(constraints.iter().filter(|c| **c == SlotConstraint::Any).count(), 1);
            for tier in Tier::ALL {
                assert_eq!(constraints.iter().filter(|c| **c == SlotConstraint::Only(tier)).count(), 1);
            }
        }
    }

    #[test]
    fn any_admits_every_tier() {
        assert!(Tier::ALL.iter().all(|&tier| SlotConstraint::Any.admits(tier)));
        assert!(!SlotConstraint::Only(Tier::A).admits(Tier::B));
    }

    #[test]
    fn parses_tiers_and_zones() {
        assert_eq!(" b ".parse::<Tier>(), Ok(Tier::B));
        assert!("D".parse::<Tier>().is_err());
        assert_eq!("East".parse::<Zone>(), Ok(Zone::East));
        assert_eq!("".parse::<Zone>(), Ok(Zone::Central));
        assert!("north".parse::<Zone>().is_err());
    }

    #[test]
    fn incomplete_bundle_is_rejected() {
        let stop = Some(Stop { venue: 0, performer: 0 });
        let err = TicketBundle::new("Friday", 4, [stop, stop, None, stop]).unwrap_err();
        assert_eq!(err, AssignError::IncompleteTicket(Slot::new(3).unwrap()));

        let full = [0, 1, 2, 3].map(|i| Some(Stop { venue: i, performer: i + 10 }));
        let ticket = TicketBundle::new("Friday", 4, full).unwrap();
        assert_eq!(ticket.venues(), [0, 1, 2, 3]);
        assert_eq!(ticket.performers(), [10, 11, 12, 13]);
        assert_eq!(ticket.stop(Slot::new(4).unwrap()).venue, 3);
    }
}
