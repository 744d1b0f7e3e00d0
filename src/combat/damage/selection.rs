//! Hit-location selection strategies

use serde::{Deserialize, Serialize};

use crate::battle::constants::{MEK_HEAD_WEIGHT, MEK_LOCATION_WEIGHT};
use crate::battle::entity::{Entity, Location, LocationRole};
use crate::core::dice::{weighted_pick, Dice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationSelector {
    /// Uniform over valid locations
    Uniform,
    /// Head weighted 1, everything else 6
    MekWeighted,
    /// Only the first location; none once it is gone
    Single,
    /// Uniform over every trooper, dead or alive
    Troopers,
}

impl LocationSelector {
    /// Pick a hit location. `None` means nothing can be hit any more.
    pub fn select(self, entity: &Entity, dice: &mut dyn Dice) -> Option<usize> {
        match self {
            LocationSelector::Uniform => {
                let valid: Vec<usize> = valid_locations(entity).collect();
                pick_uniform(&valid, dice)
            }
            LocationSelector::MekWeighted => {
                let valid: Vec<usize> = valid_locations(entity).collect();
                let weights: Vec<u32> = valid
                    .iter()
                    .map(|&idx| mek_weight(&entity.locations[idx]))
                    .collect();
                weighted_pick(dice, &weights).map(|pick| valid[pick])
            }
            LocationSelector::Single => entity
                .locations
                .first()
                .filter(|l| l.is_valid_target())
                .map(|_| 0),
            LocationSelector::Troopers => {
                let all: Vec<usize> = (0..entity.locations.len()).collect();
                pick_uniform(&all, dice)
            }
        }
    }
}

fn valid_locations(entity: &Entity) -> impl Iterator<Item = usize> + '_ {
    entity
        .locations
        .iter()
        .enumerate()
        .filter(|(_, l)| l.is_valid_target())
        .map(|(idx, _)| idx)
}

fn pick_uniform(candidates: &[usize], dice: &mut dyn Dice) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[dice.below(candidates.len() as u32) as usize])
}

fn mek_weight(location: &Location) -> u32 {
    match location.role {
        LocationRole::Head => MEK_HEAD_WEIGHT,
        _ => MEK_LOCATION_WEIGHT,
    }
}

/// Secondary roll for a rear-arc hit: one in `rear_hit_chance`
pub fn strikes_rear(location: &Location, rear_hit_chance: u32, dice: &mut dyn Dice) -> bool {
    location.has_rear() && dice.below(rear_hit_chance) == 0
}
