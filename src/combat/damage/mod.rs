//! Damage application
//!
//! One [`DamageApplier`] struct carries swappable strategy fields (where a hit
//! lands, what absorbs it, which criticals it can cause). [`damage_applier_for`]
//! is the single factory that assembles the right combination for an
//! [`EntityKind`]. Every change to an entity's armor, structure, crew or
//! removal condition goes through here.

pub mod crew;
pub mod hit;
pub mod selection;

pub use crew::{apply_crew_hits, try_eject, CrewOutcome};
pub use hit::{DamageReport, HitDetails};
pub use selection::LocationSelector;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::battle::constants::{
    ENGINE_HITS_TO_DESTROY, HEAD_LOSS_MAX_CREW_HITS, HEAD_LOSS_MIN_CREW_HITS,
};
use crate::battle::entity::{Entity, EntityKind, LocationRole, RemovalCondition, SystemKind};
use crate::core::config::AutoResolveConfig;
use crate::core::dice::Dice;

/// What soaks up damage once it is past the armor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Absorption {
    /// Per-location internal structure
    ArmorThenInternal,
    /// Single structural-integrity scalar
    ArmorThenIntegrity,
    /// Flat one point per hit off a trooper, armor ignored
    Trooper,
}

/// Critical-hit behavior on an internal breach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriticalPolicy {
    None,
    /// Destroy a random intact slot
    RandomSlot,
    /// Random slot with system effects; vital systems shielded when the
    /// entity must survive
    MekSystems,
}

/// Numbers the strategies read from the battle config
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageSettings {
    pub min_armor_reduction_fraction: f32,
    pub rear_hit_chance: u32,
    pub cluster_size: i32,
}

impl From<&AutoResolveConfig> for DamageSettings {
    fn from(config: &AutoResolveConfig) -> Self {
        Self {
            min_armor_reduction_fraction: config.min_armor_reduction_fraction,
            rear_hit_chance: config.rear_hit_chance,
            cluster_size: config.damage_cluster_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageApplier {
    pub kind: EntityKind,
    pub selector: LocationSelector,
    pub absorption: Absorption,
    pub criticals: CriticalPolicy,
    pub settings: DamageSettings,
}

/// Build the damage strategy for an entity kind
pub fn damage_applier_for(kind: EntityKind, config: &AutoResolveConfig) -> DamageApplier {
    let (selector, absorption, criticals) = match kind {
        EntityKind::Mek => (
            LocationSelector::MekWeighted,
            Absorption::ArmorThenInternal,
            CriticalPolicy::MekSystems,
        ),
        EntityKind::Aero => (
            LocationSelector::Uniform,
            Absorption::ArmorThenIntegrity,
            CriticalPolicy::RandomSlot,
        ),
        EntityKind::Emplacement => (
            LocationSelector::Single,
            Absorption::ArmorThenInternal,
            CriticalPolicy::RandomSlot,
        ),
        EntityKind::Infantry => (
            LocationSelector::Troopers,
            Absorption::Trooper,
            CriticalPolicy::None,
        ),
        EntityKind::Tank => (
            LocationSelector::Uniform,
            Absorption::ArmorThenInternal,
            CriticalPolicy::RandomSlot,
        ),
    };

    DamageApplier {
        kind,
        selector,
        absorption,
        criticals,
        settings: DamageSettings::from(config),
    }
}

/// Apply `damage` to an entity using its kind's strategy
pub fn apply_damage(
    entity: &mut Entity,
    damage: i32,
    must_survive: bool,
    config: &AutoResolveConfig,
    dice: &mut dyn Dice,
) -> DamageReport {
    damage_applier_for(entity.kind, config).apply_damage(entity, damage, must_survive, dice)
}

impl DamageApplier {
    /// Deliver damage in clusters until it is spent or the entity goes down
    pub fn apply_damage(
        &self,
        entity: &mut Entity,
        damage: i32,
        must_survive: bool,
        dice: &mut dyn Dice,
    ) -> DamageReport {
        let mut report = DamageReport::default();
        let cluster = self.cluster_size();

        let mut remaining = damage;
        while remaining > 0 && entity.is_active() {
            let chunk = remaining.min(cluster);
            remaining -= chunk;
            match self.apply_hit(entity, chunk, must_survive, dice) {
                Some(hit) => report.hits.push(hit),
                None => {
                    report.no_valid_location = true;
                    break;
                }
            }
        }

        report
    }

    /// Resolve a single hit. `None` means no location could be hit and the
    /// entity was destroyed outright.
    /// Apply damage without letting the entity's total loss of armor plus
    /// structure (measured from its original values) exceed `max_loss`.
    ///
    /// Each cluster is tried on a copy first; the first cluster that would
    /// overshoot the budget is discarded and delivery stops there.
    pub fn apply_capped_damage(
        &self,
        entity: &mut Entity,
        damage: i32,
        max_loss: i32,
        must_survive: bool,
        dice: &mut dyn Dice,
    ) -> DamageReport {
        let mut report = DamageReport::default();
        let total = entity.total_armor_and_structure();
        let cluster = self.cluster_size();

        let mut remaining = damage;
        while remaining > 0 && entity.is_active() {
            let headroom = max_loss - (total - entity.remaining_armor_and_structure());
            if headroom <= 0 {
                break;
            }
            let chunk = remaining.min(cluster).min(headroom);

            let mut trial = entity.clone();
            let hit = self.apply_hit(&mut trial, chunk, must_survive, dice);
            if total - trial.remaining_armor_and_structure() > max_loss {
                debug!("{} attrition budget reached", entity.name);
                break;
            }

            *entity = trial;
            remaining -= chunk;
            match hit {
                Some(hit) => report.hits.push(hit),
                None => {
                    report.no_valid_location = true;
                    break;
                }
            }
        }

        report
    }

    pub fn apply_hit(
        &self,
        entity: &mut Entity,
        damage: i32,
        must_survive: bool,
        dice: &mut dyn Dice,
    ) -> Option<HitDetails> {
        let Some(index) = self.selector.select(entity, dice) else {
            debug!("{} has no valid hit location, destroyed", entity.name);
            entity.destroy(self.destruction_condition());
            return None;
        };

        let mut hit = HitDetails::new(index, damage);
        match self.absorption {
            Absorption::Trooper => self.hit_trooper(entity, &mut hit, must_survive),
            Absorption::ArmorThenInternal => {
                self.strike_armor(entity, &mut hit, dice);
                self.absorb_internal(entity, &mut hit, must_survive, dice);
            }
            Absorption::ArmorThenIntegrity => {
                self.strike_armor(entity, &mut hit, dice);
                self.absorb_integrity(entity, &mut hit, must_survive, dice);
            }
        }

        hit.entity_destroyed = entity.destroyed;
        Some(hit)
    }

    /// Finish off an entity whose unit was destroyed: full remaining damage,
    /// no survival protection, and a salvageable hull if anything is left.
    pub fn destroy_entity(&self, entity: &mut Entity, dice: &mut dyn Dice) -> DamageReport {
        let damage = entity.remaining_armor_and_structure();
        let report = self.apply_damage(entity, damage, false, dice);
        if entity.is_active() {
            entity.destroy(RemovalCondition::Salvageable);
        }
        report
    }

    /// Tag an entity leaving play without damage (retreat, capture).
    ///
    /// Returns true when the condition was applied.
    pub fn remove(&self, entity: &mut Entity, condition: RemovalCondition) -> bool {
        entity.set_removal_condition(condition)
    }

    fn cluster_size(&self) -> i32 {
        match self.absorption {
            Absorption::Trooper => 1,
            _ => self.settings.cluster_size.max(1),
        }
    }

    fn destruction_condition(&self) -> RemovalCondition {
        match self.absorption {
            Absorption::ArmorThenIntegrity => RemovalCondition::Devastated,
            _ => RemovalCondition::Salvageable,
        }
    }

    fn strike_armor(&self, entity: &mut Entity, hit: &mut HitDetails, dice: &mut dyn Dice) {
        let rear = selection::strikes_rear(
            &entity.locations[hit.location],
            self.settings.rear_hit_chance,
            dice,
        );
        let location = &mut entity.locations[hit.location];

        let (armor, original) = if rear {
            (location.rear_armor.unwrap_or(0), location.original_rear_armor)
        } else {
            (location.armor, location.original_armor)
        };

        let floor = (original as f32 * self.settings.min_armor_reduction_fraction).ceil() as i32;
        let reduction = hit.damage.max(floor);
        let after = (armor - reduction).max(0);

        hit.rear = rear;
        hit.excess = (reduction - armor.max(0)).max(0);
        hit.armor_after = after;

        if rear {
            location.rear_armor = Some(after);
        } else {
            location.armor = after;
        }
    }

    /// Loss of this location takes the whole entity with it
    fn is_vital_location(&self, entity: &Entity, index: usize) -> bool {
        let location = &entity.locations[index];
        match location.role {
            LocationRole::Head | LocationRole::CenterTorso => true,
            LocationRole::Standard => entity
                .locations
                .iter()
                .enumerate()
                .all(|(idx, l)| idx == index || !l.is_valid_target()),
        }
    }

    fn absorb_internal(
        &self,
        entity: &mut Entity,
        hit: &mut HitDetails,
        must_survive: bool,
        dice: &mut dyn Dice,
    ) {
        if hit.excess <= 0 {
            return;
        }

        let vital = self.is_vital_location(entity, hit.location);
        let location = &mut entity.locations[hit.location];
        location.internal -= hit.excess;
        if must_survive && vital && location.internal < 1 {
            location.internal = 1;
        }
        hit.internal_breached = true;

        if entity.locations[hit.location].internal <= 0 {
            self.destroy_location(entity, hit, dice);
        } else {
            self.roll_critical(entity, hit, must_survive, dice);
        }

        if entity.is_active() {
            hit.crew_hits += 1;
            apply_crew_hits(entity, 1, must_survive);
        }
    }

    fn absorb_integrity(
        &self,
        entity: &mut Entity,
        hit: &mut HitDetails,
        must_survive: bool,
        dice: &mut dyn Dice,
    ) {
        if hit.excess <= 0 {
            return;
        }

        hit.internal_breached = true;
        entity.structural_integrity -= hit.excess;
        if must_survive && entity.structural_integrity < 1 {
            entity.structural_integrity = 1;
        }

        if entity.structural_integrity <= 0 {
            entity.structural_integrity = 0;
            entity.destroy(RemovalCondition::Devastated);
            debug!("{} structural integrity gone", entity.name);
            return;
        }

        self.roll_critical(entity, hit, must_survive, dice);
        if entity.is_active() {
            hit.crew_hits += 1;
            apply_crew_hits(entity, 1, must_survive);
        }
    }

    fn hit_trooper(&self, entity: &mut Entity, hit: &mut HitDetails, must_survive: bool) {
        let before = entity.locations[hit.location].internal;
        let last_trooper = before > 0 && entity.surviving_troopers() == 1;
        if must_survive && last_trooper && before <= 1 {
            return;
        }

        let location = &mut entity.locations[hit.location];
        location.internal = (before - 1).max(0);
        hit.internal_breached = before > 0;
        if before > 0 && location.internal == 0 {
            location.destroyed = true;
            hit.location_destroyed = true;
        }

        if !must_survive && entity.is_crippled() {
            debug!("{} crippled, removed from play", entity.name);
            entity.destroy(RemovalCondition::Salvageable);
        }
    }

    fn destroy_location(&self, entity: &mut Entity, hit: &mut HitDetails, dice: &mut dyn Dice) {
        let location = &mut entity.locations[hit.location];
        location.internal = 0;
        location.armor = 0;
        if location.rear_armor.is_some() {
            location.rear_armor = Some(0);
        }
        location.destroyed = true;
        let role = location.role;
        hit.location_destroyed = true;
        debug!("{} lost {}", entity.name, entity.locations[hit.location].name);

        match role {
            LocationRole::Head => {
                if !try_eject(entity) {
                    let spread = (HEAD_LOSS_MAX_CREW_HITS - HEAD_LOSS_MIN_CREW_HITS + 1) as u32;
                    let extra = (HEAD_LOSS_MIN_CREW_HITS + dice.below(spread) as i32) as u32;
                    hit.crew_hits += extra;
                    apply_crew_hits(entity, extra, false);
                }
                entity.destroy(RemovalCondition::Salvageable);
            }
            LocationRole::CenterTorso => entity.destroy(RemovalCondition::Salvageable),
            LocationRole::Standard => {
                if !entity.locations.iter().any(|l| l.is_valid_target()) {
                    entity.destroy(RemovalCondition::Salvageable);
                }
            }
        }
    }

    fn roll_critical(
        &self,
        entity: &mut Entity,
        hit: &mut HitDetails,
        must_survive: bool,
        dice: &mut dyn Dice,
    ) {
        let shield_vitals = match self.criticals {
            CriticalPolicy::None => return,
            CriticalPolicy::RandomSlot => false,
            CriticalPolicy::MekSystems => must_survive,
        };

        let candidates: Vec<usize> = entity.locations[hit.location]
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.destroyed && !(shield_vitals && s.system.is_vital()))
            .map(|(idx, _)| idx)
            .collect();
        if candidates.is_empty() {
            return;
        }

        let slot = candidates[dice.below(candidates.len() as u32) as usize];
        let system = {
            let slot = &mut entity.locations[hit.location].slots[slot];
            slot.destroyed = true;
            slot.system
        };
        hit.critical = Some(system);

        if self.criticals != CriticalPolicy::MekSystems {
            return;
        }

        match system {
            SystemKind::Ammo => {
                if !(must_survive && self.is_vital_location(entity, hit.location)) {
                    debug!("{} ammunition explosion", entity.name);
                    self.destroy_location(entity, hit, dice);
                }
            }
            SystemKind::Engine => {
                let engine_hits: usize = entity
                    .locations
                    .iter()
                    .map(|l| l.destroyed_systems(SystemKind::Engine))
                    .sum();
                if engine_hits >= ENGINE_HITS_TO_DESTROY {
                    entity.destroy(RemovalCondition::Salvageable);
                }
            }
            SystemKind::Cockpit => {
                let lethal = entity.crew.hits_to_death();
                hit.crew_hits += lethal;
                apply_crew_hits(entity, lethal, must_survive);
            }
            _ => {}
        }
    }
}
