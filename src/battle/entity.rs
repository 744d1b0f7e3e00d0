//! Entities: the lowest-level simulated combat objects
//!
//! An entity owns per-location armor and internal structure, a critical slot
//! table, its crew and its terminal removal condition. Damage strategies in
//! `combat::damage` are the only code that mutates an entity during a battle.

use serde::{Deserialize, Serialize};

use crate::battle::constants::CREW_DEATH_THRESHOLD;
use crate::core::types::EntityId;

/// Capability class of an entity, used to pick its damage strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Stock ground unit (tank, wheeled or hover vehicle)
    Tank,
    /// Walking combat unit
    Mek,
    /// Aerospace fighter or conventional aircraft
    Aero,
    /// Static gun emplacement
    Emplacement,
    /// Conventional infantry platoon or battle armor squad
    Infantry,
}

/// Terminal disposition of an entity leaving play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCondition {
    /// Destroyed beyond any recovery
    Devastated,
    /// Destroyed but the hull can be recovered
    Salvageable,
    /// Crew ejected, hull abandoned
    Ejected,
    /// Left the battlefield in an orderly withdrawal
    InRetreat,
    /// Taken by the side controlling the field
    Captured,
}

/// What a location means to the survival of the whole entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationRole {
    Head,
    CenterTorso,
    Standard,
}

/// Equipment occupying a critical slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemKind {
    Engine,
    Gyro,
    LifeSupport,
    Sensors,
    Cockpit,
    Actuator,
    HeatSink,
    Weapon,
    Ammo,
}

impl SystemKind {
    /// Systems whose loss can take the whole entity out at once
    pub fn is_vital(self) -> bool {
        matches!(
            self,
            SystemKind::Engine
                | SystemKind::Gyro
                | SystemKind::LifeSupport
                | SystemKind::Sensors
                | SystemKind::Cockpit
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalSlot {
    pub system: SystemKind,
    pub destroyed: bool,
}

impl CriticalSlot {
    pub fn new(system: SystemKind) -> Self {
        Self {
            system,
            destroyed: false,
        }
    }
}

/// A hit location with its armor, structure and equipment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub role: LocationRole,
    pub armor: i32,
    pub original_armor: i32,
    #[serde(default)]
    pub rear_armor: Option<i32>,
    #[serde(default)]
    pub original_rear_armor: i32,
    pub internal: i32,
    pub original_internal: i32,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    pub blown_off: bool,
    #[serde(default)]
    pub slots: Vec<CriticalSlot>,
}

impl Location {
    pub fn new(name: &str, role: LocationRole, armor: i32, internal: i32) -> Self {
        Self {
            name: name.to_string(),
            role,
            armor,
            original_armor: armor,
            rear_armor: None,
            original_rear_armor: 0,
            internal,
            original_internal: internal,
            destroyed: false,
            blown_off: false,
            slots: Vec::new(),
        }
    }

    pub fn with_rear(mut self, rear_armor: i32) -> Self {
        self.rear_armor = Some(rear_armor);
        self.original_rear_armor = rear_armor;
        self
    }

    pub fn with_slots(mut self, systems: &[SystemKind]) -> Self {
        self.slots = systems.iter().copied().map(CriticalSlot::new).collect();
        self
    }

    /// Location can still absorb a hit: intact, attached and armored
    pub fn is_valid_target(&self) -> bool {
        !self.destroyed && !self.blown_off && self.original_armor > 0
    }

    pub fn has_rear(&self) -> bool {
        self.rear_armor.is_some()
    }

    /// Armor plus internal structure still standing (rear armor included)
    pub fn remaining(&self) -> i32 {
        if self.destroyed {
            return 0;
        }
        self.armor.max(0) + self.rear_armor.unwrap_or(0).max(0) + self.internal.max(0)
    }

    pub fn total(&self) -> i32 {
        self.original_armor + self.original_rear_armor + self.original_internal
    }

    pub fn destroyed_systems(&self, system: SystemKind) -> usize {
        self.slots
            .iter()
            .filter(|s| s.system == system && s.destroyed)
            .count()
    }
}

/// Crew of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub size: u32,
    pub hits: u32,
    pub ejected: bool,
    pub dead: bool,
}

impl Crew {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            hits: 0,
            ejected: false,
            dead: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.dead && !self.ejected
    }

    /// Hits still absorbable before the crew dies
    pub fn hits_to_death(&self) -> u32 {
        CREW_DEATH_THRESHOLD.saturating_sub(self.hits)
    }
}

impl Default for Crew {
    fn default() -> Self {
        Self::new(1)
    }
}

/// A single simulated combat object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub locations: Vec<Location>,
    /// Aerospace structural integrity (zero for every other kind)
    #[serde(default)]
    pub structural_integrity: i32,
    #[serde(default)]
    pub original_structural_integrity: i32,
    pub crew: Crew,
    #[serde(default)]
    pub supports_ejection: bool,
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default)]
    removal: Option<RemovalCondition>,
}

impl Entity {
    pub fn new(name: &str, kind: EntityKind, locations: Vec<Location>) -> Self {
        Self {
            id: EntityId::new(),
            name: name.to_string(),
            kind,
            locations,
            structural_integrity: 0,
            original_structural_integrity: 0,
            crew: Crew::default(),
            supports_ejection: false,
            destroyed: false,
            removal: None,
        }
    }

    /// Tracked or wheeled vehicle: front, sides, rear and turret
    pub fn tank(name: &str, armor: i32, internal: i32) -> Self {
        let locations = vec![
            Location::new("Front", LocationRole::Standard, armor + armor / 4, internal)
                .with_slots(&[SystemKind::Weapon, SystemKind::Sensors]),
            Location::new("Left", LocationRole::Standard, armor, internal)
                .with_slots(&[SystemKind::Weapon, SystemKind::Ammo]),
            Location::new("Right", LocationRole::Standard, armor, internal)
                .with_slots(&[SystemKind::Weapon, SystemKind::Ammo]),
            Location::new("Rear", LocationRole::Standard, (armor * 3) / 4, internal)
                .with_slots(&[SystemKind::Engine]),
            Location::new("Turret", LocationRole::Standard, armor, internal)
                .with_slots(&[SystemKind::Weapon, SystemKind::Weapon]),
        ];
        let mut tank = Self::new(name, EntityKind::Tank, locations);
        tank.crew = Crew::new(4);
        tank
    }

    /// Walking combat unit with the standard eight-location layout
    pub fn mek(name: &str, armor: i32, internal: i32) -> Self {
        use SystemKind::*;

        let limb_armor = (armor * 3) / 4;
        let locations = vec![
            Location::new("Head", LocationRole::Head, armor.min(9), 3)
                .with_slots(&[LifeSupport, Sensors, Cockpit, Sensors, LifeSupport]),
            Location::new("Center Torso", LocationRole::CenterTorso, armor + armor / 2, internal + internal / 2)
                .with_rear(armor / 3)
                .with_slots(&[Engine, Engine, Engine, Gyro, Gyro, Gyro, Gyro, Engine, Engine, Engine]),
            Location::new("Left Torso", LocationRole::Standard, armor, internal)
                .with_rear(armor / 4)
                .with_slots(&[Weapon, Weapon, Ammo, HeatSink]),
            Location::new("Right Torso", LocationRole::Standard, armor, internal)
                .with_rear(armor / 4)
                .with_slots(&[Weapon, Weapon, Ammo, HeatSink]),
            Location::new("Left Arm", LocationRole::Standard, limb_armor, internal - internal / 4)
                .with_slots(&[Actuator, Actuator, Weapon]),
            Location::new("Right Arm", LocationRole::Standard, limb_armor, internal - internal / 4)
                .with_slots(&[Actuator, Actuator, Weapon]),
            Location::new("Left Leg", LocationRole::Standard, armor, internal)
                .with_slots(&[Actuator, Actuator, Actuator, Actuator]),
            Location::new("Right Leg", LocationRole::Standard, armor, internal)
                .with_slots(&[Actuator, Actuator, Actuator, Actuator]),
        ];
        let mut mek = Self::new(name, EntityKind::Mek, locations);
        mek.supports_ejection = true;
        mek
    }

    /// Aerospace fighter: armored facings over a single structural integrity value
    pub fn aero(name: &str, armor: i32, structural_integrity: i32) -> Self {
        let locations = vec![
            Location::new("Nose", LocationRole::Standard, armor, 0)
                .with_slots(&[SystemKind::Weapon, SystemKind::Sensors]),
            Location::new("Left Wing", LocationRole::Standard, (armor * 3) / 4, 0)
                .with_slots(&[SystemKind::Weapon]),
            Location::new("Right Wing", LocationRole::Standard, (armor * 3) / 4, 0)
                .with_slots(&[SystemKind::Weapon]),
            Location::new("Aft", LocationRole::Standard, armor / 2, 0)
                .with_slots(&[SystemKind::Engine]),
        ];
        let mut aero = Self::new(name, EntityKind::Aero, locations);
        aero.structural_integrity = structural_integrity;
        aero.original_structural_integrity = structural_integrity;
        aero.supports_ejection = true;
        aero
    }

    /// Static emplacement with a single hit location
    pub fn emplacement(name: &str, armor: i32, internal: i32) -> Self {
        let locations = vec![Location::new("Structure", LocationRole::Standard, armor, internal)
            .with_slots(&[SystemKind::Weapon, SystemKind::Weapon, SystemKind::Ammo])];
        let mut emplacement = Self::new(name, EntityKind::Emplacement, locations);
        emplacement.crew = Crew::new(6);
        emplacement
    }

    /// Infantry: one location per trooper, no armor
    pub fn infantry(name: &str, troopers: u32, trooper_internal: i32) -> Self {
        let locations = (1..=troopers)
            .map(|n| Location::new(&format!("Trooper {}", n), LocationRole::Standard, 0, trooper_internal))
            .collect();
        let mut infantry = Self::new(name, EntityKind::Infantry, locations);
        infantry.crew = Crew::new(troopers);
        infantry
    }

    pub fn with_crew(mut self, size: u32) -> Self {
        self.crew = Crew::new(size);
        self
    }

    pub fn with_ejection(mut self, supports_ejection: bool) -> Self {
        self.supports_ejection = supports_ejection;
        self
    }

    pub fn removal_condition(&self) -> Option<RemovalCondition> {
        self.removal
    }

    /// Set the removal condition. Only the first call takes effect.
    ///
    /// Returns true when this call set the condition.
    pub fn set_removal_condition(&mut self, condition: RemovalCondition) -> bool {
        if self.removal.is_some() {
            return false;
        }
        self.removal = Some(condition);
        true
    }

    pub fn is_removed(&self) -> bool {
        self.removal.is_some()
    }

    /// Still on the field and able to act
    pub fn is_active(&self) -> bool {
        !self.destroyed && self.removal.is_none()
    }

    /// Mark destroyed and tag the removal condition (first writer wins)
    pub fn destroy(&mut self, condition: RemovalCondition) {
        self.destroyed = true;
        self.set_removal_condition(condition);
    }

    pub fn total_armor(&self) -> i32 {
        self.locations
            .iter()
            .filter(|l| !l.destroyed)
            .map(|l| l.armor.max(0) + l.rear_armor.unwrap_or(0).max(0))
            .sum()
    }

    pub fn total_internal(&self) -> i32 {
        self.locations
            .iter()
            .filter(|l| !l.destroyed)
            .map(|l| l.internal.max(0))
            .sum()
    }

    /// Original armor plus structure (including structural integrity)
    pub fn total_armor_and_structure(&self) -> i32 {
        self.locations.iter().map(Location::total).sum::<i32>() + self.original_structural_integrity
    }

    /// Armor plus structure still standing
    pub fn remaining_armor_and_structure(&self) -> i32 {
        if self.destroyed {
            return 0;
        }
        self.locations.iter().map(Location::remaining).sum::<i32>()
            + self.structural_integrity.max(0)
    }

    pub fn location_index(&self, role: LocationRole) -> Option<usize> {
        self.locations.iter().position(|l| l.role == role)
    }

    /// Troopers still standing (infantry only)
    pub fn surviving_troopers(&self) -> usize {
        self.locations.iter().filter(|l| l.internal > 0).count()
    }

    /// Whether the entity is crippled by its own kind's definition
    pub fn is_crippled(&self) -> bool {
        if self.destroyed {
            return true;
        }
        match self.kind {
            EntityKind::Infantry => {
                let total = self.locations.len();
                total == 0 || self.surviving_troopers() * 2 < total
            }
            EntityKind::Aero => {
                self.structural_integrity * 2 <= self.original_structural_integrity
            }
            _ => {
                let engine_hits: usize = self
                    .locations
                    .iter()
                    .map(|l| l.destroyed_systems(SystemKind::Engine))
                    .sum();
                let total = self.total_armor_and_structure();
                engine_hits >= 2 || self.remaining_armor_and_structure() * 4 <= total
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_condition_is_set_once() {
        let mut mek = Entity::mek("Hunchback", 20, 10);
        assert!(mek.set_removal_condition(RemovalCondition::Salvageable));
        assert!(!mek.set_removal_condition(RemovalCondition::Devastated));
        assert_eq!(mek.removal_condition(), Some(RemovalCondition::Salvageable));
    }

    #[test]
    fn test_mek_layout() {
        let mek = Entity::mek("Griffin", 20, 10);
        assert_eq!(mek.locations.len(), 8);
        assert!(mek.location_index(LocationRole::Head).is_some());
        assert!(mek.location_index(LocationRole::CenterTorso).is_some());
        assert!(mek.supports_ejection);
    }

    #[test]
    fn test_emplacement_has_single_location() {
        let bunker = Entity::emplacement("Bunker", 30, 15);
        assert_eq!(bunker.locations.len(), 1);
    }

    #[test]
    fn test_infantry_crippled_below_half() {
        let mut platoon = Entity::infantry("Rifles", 4, 1);
        assert!(!platoon.is_crippled());
        platoon.locations[0].internal = 0;
        platoon.locations[1].internal = 0;
        assert!(!platoon.is_crippled());
        platoon.locations[2].internal = 0;
        assert!(platoon.is_crippled());
    }

    #[test]
    fn test_aero_totals_include_structural_integrity() {
        let fighter = Entity::aero("Sparrowhawk", 20, 10);
        assert_eq!(fighter.remaining_armor_and_structure(), fighter.total_armor_and_structure());
        assert!(fighter.total_armor_and_structure() > 10);
    }

    #[test]
    fn test_vital_systems() {
        assert!(SystemKind::Cockpit.is_vital());
        assert!(SystemKind::Gyro.is_vital());
        assert!(!SystemKind::Weapon.is_vital());
        assert!(!SystemKind::Ammo.is_vital());
    }

    #[test]
    fn test_crew_hits_to_death() {
        let mut crew = Crew::new(1);
        assert_eq!(crew.hits_to_death(), CREW_DEATH_THRESHOLD);
        crew.hits = 4;
        assert_eq!(crew.hits_to_death(), CREW_DEATH_THRESHOLD - 4);
    }
}
