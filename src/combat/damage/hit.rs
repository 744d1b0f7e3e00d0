//! Per-hit transient passed through the armor → internal → equipment → crew pipeline

use serde::{Deserialize, Serialize};

use crate::battle::entity::SystemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitDetails {
    /// Index into the entity's locations
    pub location: usize,
    pub rear: bool,
    /// Raw damage of the hit
    pub damage: i32,
    /// Armor of the struck facing after the hit
    pub armor_after: i32,
    /// Damage that went past the armor
    pub excess: i32,
    pub internal_breached: bool,
    pub critical: Option<SystemKind>,
    pub location_destroyed: bool,
    /// Crew hits caused by this hit
    pub crew_hits: u32,
    pub entity_destroyed: bool,
}

impl HitDetails {
    pub fn new(location: usize, damage: i32) -> Self {
        Self {
            location,
            rear: false,
            damage,
            armor_after: 0,
            excess: 0,
            internal_breached: false,
            critical: None,
            location_destroyed: false,
            crew_hits: 0,
            entity_destroyed: false,
        }
    }
}

/// Summary of a bulk damage application
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageReport {
    pub hits: Vec<HitDetails>,
    /// No hit location remained, so the entity was destroyed outright
    pub no_valid_location: bool,
}

impl DamageReport {
    pub fn total_damage(&self) -> i32 {
        self.hits.iter().map(|h| h.damage).sum()
    }

    pub fn destroyed_entity(&self) -> bool {
        self.no_valid_location || self.hits.iter().any(|h| h.entity_destroyed)
    }
}
