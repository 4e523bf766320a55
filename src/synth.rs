use rand::prelude::SliceRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::action::PairingError;
use crate::model::entity::{Performer, Seats, Tier, Venue, Zone};
use crate::registry::Registry;

const ZONES: [Zone; 3] = [Zone::West, Zone::Central, Zone::East];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthParams {
    pub seed: u64,
    pub venues: usize,
    pub min_capacity: Seats,
    pub max_capacity: Seats,
}

impl Default for SynthParams {
    fn default() -> Self {
        SynthParams { seed: 7, venues: 12, min_capacity: 4, max_capacity: 60 }
    }
}

/// Random but reproducible paired registry. The first three venues are central and
/// cover tiers A, B and C.
pub fn generate(params: &SynthParams) -> Result<Registry, PairingError> {
    let mut rng = SmallRng::seed_from_u64(params.seed);
    let (low, high) = if params.min_capacity <= params.max_capacity {
        (params.min_capacity, params.max_capacity)
    } else {
        (params.max_capacity, params.min_capacity)
    };
    let mut registry = Registry::new();
    for index in 0..params.venues {
        let (tier, zone) = match Tier::ALL.get(index) {
            Some(&tier) => (tier, Zone::Central),
            None => (
                *Tier::ALL.choose(&mut rng).unwrap_or(&Tier::C),
                *ZONES.choose(&mut rng).unwrap_or(&Zone::Central),
            ),
        };
        let capacity = rng.gen_range(low..=high);
        let performer = registry.add_performer(Performer::new(format!("performer-{}", index + 1), tier));
        let venue = registry.add_venue(Venue::new(format!("venue-{}", index + 1), capacity).with_zone(zone));
        registry.pair(performer, venue)?;
    }
    Ok(registry)
}
