//! Unit hierarchy: Entity → Unit → Formation
//!
//! Units group a handful of entities and track their combat state in
//! aggregate (armor, crit counters). Formations are the tactical actors of
//! the simulation: they pick targets, negotiate engagement control and
//! take morale checks.

use serde::{Deserialize, Serialize};

use crate::battle::engagement::EngagementControl;
use crate::battle::entity::Entity;
use crate::battle::morale::MoraleStatus;
use crate::battle::round_log::RoundLog;
use crate::core::types::{FormationId, PlayerId, Round, UnitId};

/// Range band of an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeBand {
    Short,
    Medium,
    Long,
    Extreme,
}

/// Damage a unit deals at each range band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageVector {
    pub short: i32,
    pub medium: i32,
    pub long: i32,
    #[serde(default)]
    pub extreme: i32,
}

impl DamageVector {
    pub fn new(short: i32, medium: i32, long: i32) -> Self {
        Self {
            short,
            medium,
            long,
            extreme: 0,
        }
    }

    pub fn at(&self, range: RangeBand) -> i32 {
        match range {
            RangeBand::Short => self.short,
            RangeBand::Medium => self.medium,
            RangeBand::Long => self.long,
            RangeBand::Extreme => self.extreme,
        }
    }

    /// Reduce every band by `amount`, never below zero
    pub fn reduced_by(&self, amount: i32) -> Self {
        Self {
            short: (self.short - amount).max(0),
            medium: (self.medium - amount).max(0),
            long: (self.long - amount).max(0),
            extreme: (self.extreme - amount).max(0),
        }
    }

    /// Band with the highest damage; ties resolve toward the shorter range
    pub fn best_range(&self) -> RangeBand {
        let mut best = RangeBand::Short;
        for band in [RangeBand::Medium, RangeBand::Long] {
            if self.at(band) > self.at(best) {
                best = band;
            }
        }
        best
    }
}

impl std::ops::Add for DamageVector {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            short: self.short + rhs.short,
            medium: self.medium + rhs.medium,
            long: self.long + rhs.long,
            extreme: self.extreme + rhs.extreme,
        }
    }
}

/// A small group of entities sharing aggregated combat state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub entities: Vec<Entity>,
    /// Original armor
    pub armor: i32,
    pub current_armor: i32,
    pub damage: DamageVector,
    /// Size class (1 light .. 4 assault)
    #[serde(default = "default_size")]
    pub size: i32,
    /// Target movement modifier
    #[serde(default)]
    pub movement_modifier: i32,
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub targeting_crits: i32,
    #[serde(default)]
    pub damage_crits: i32,
    #[serde(default)]
    pub mp_crits: i32,
    #[serde(default)]
    pub destroyed: bool,
}

fn default_size() -> i32 {
    2
}

impl Unit {
    pub fn new(name: &str, armor: i32, damage: DamageVector) -> Self {
        Self {
            id: UnitId::new(),
            name: name.to_string(),
            entities: Vec::new(),
            armor,
            current_armor: armor,
            damage,
            size: default_size(),
            movement_modifier: 0,
            jump: false,
            targeting_crits: 0,
            damage_crits: 0,
            mp_crits: 0,
            destroyed: false,
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_size(mut self, size: i32) -> Self {
        self.size = size;
        self
    }

    pub fn with_movement(mut self, movement_modifier: i32, jump: bool) -> Self {
        self.movement_modifier = movement_modifier;
        self.jump = jump;
        self
    }

    /// Damage at a range after damage crits
    pub fn current_damage(&self, range: RangeBand) -> i32 {
        (self.damage.at(range) - self.damage_crits).max(0)
    }

    pub fn current_damage_vector(&self) -> DamageVector {
        self.damage.reduced_by(self.damage_crits)
    }

    /// Target movement modifier after mobility crits
    pub fn effective_movement_modifier(&self) -> i32 {
        (self.movement_modifier - self.mp_crits).max(0)
    }

    /// Can still shoot and be shot at
    pub fn is_combat_capable(&self) -> bool {
        !self.destroyed && self.current_armor > 0
    }

    pub fn total_crits(&self) -> i32 {
        self.targeting_crits + self.damage_crits + self.mp_crits
    }

    /// Down to a quarter of its armor, or its weapons badly damaged
    pub fn is_crippled(&self) -> bool {
        self.destroyed || self.current_armor * 4 <= self.armor || self.damage_crits >= 2
    }

    /// Reduce current armor, never below zero. Returns armor actually lost.
    pub fn take_armor_damage(&mut self, damage: i32) -> i32 {
        let before = self.current_armor;
        self.current_armor = (self.current_armor - damage.max(0)).max(0);
        before - self.current_armor
    }

    /// Fraction of original armor still standing
    pub fn armor_fraction(&self) -> f32 {
        if self.armor <= 0 {
            return 0.0;
        }
        self.current_armor as f32 / self.armor as f32
    }
}

/// Whether a formation fights on the ground or in the air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Medium {
    #[default]
    Ground,
    Air,
}

/// A team-owned group of units acting as one tactical entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    pub id: FormationId,
    pub name: String,
    pub owner: PlayerId,
    pub units: Vec<Unit>,
    #[serde(default)]
    pub medium: Medium,
    pub skill: i32,
    pub tactics: i32,
    #[serde(default)]
    pub deploy_round: Round,

    #[serde(default)]
    pub morale: MoraleStatus,
    #[serde(default)]
    pub engagement_control: EngagementControl,
    #[serde(default)]
    pub target: Option<FormationId>,
    #[serde(default)]
    pub round_log: RoundLog,
    #[serde(default)]
    pub deployed: bool,
    #[serde(default)]
    pub done: bool,
}

impl Formation {
    pub fn new(name: &str, owner: PlayerId) -> Self {
        Self {
            id: FormationId::new(),
            name: name.to_string(),
            owner,
            units: Vec::new(),
            medium: Medium::Ground,
            skill: 4,
            tactics: 4,
            deploy_round: 0,
            morale: MoraleStatus::Normal,
            engagement_control: EngagementControl::None,
            target: None,
            round_log: RoundLog::new(),
            deployed: false,
            done: false,
        }
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.units.push(unit);
        self
    }

    pub fn with_skill(mut self, skill: i32, tactics: i32) -> Self {
        self.skill = skill;
        self.tactics = tactics;
        self
    }

    pub fn with_medium(mut self, medium: Medium) -> Self {
        self.medium = medium;
        self
    }

    pub fn with_deploy_round(mut self, round: Round) -> Self {
        self.deploy_round = round;
        self
    }

    /// Combined current damage of all combat-capable units
    pub fn std_damage(&self) -> DamageVector {
        self.units
            .iter()
            .filter(|u| u.is_combat_capable())
            .map(Unit::current_damage_vector)
            .fold(DamageVector::default(), |acc, d| acc + d)
    }

    /// The formation deals its best damage at long range
    pub fn favors_long_range(&self) -> bool {
        let damage = self.std_damage();
        damage.long > 0 && damage.best_range() == RangeBand::Long
    }

    pub fn has_combat_capable_units(&self) -> bool {
        self.units.iter().any(Unit::is_combat_capable)
    }

    pub fn combat_capable_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_combat_capable())
    }

    /// At least half of the units are crippled or destroyed
    pub fn is_crippled(&self) -> bool {
        if self.units.is_empty() {
            return true;
        }
        let crippled = self.units.iter().filter(|u| u.is_crippled()).count();
        crippled * 2 >= self.units.len()
    }

    /// Counts toward its team still being in the fight
    pub fn is_surviving(&self) -> bool {
        self.has_combat_capable_units() && !self.morale.is_routed()
    }

    /// Engaged this round with a bound target
    pub fn is_engaged(&self) -> bool {
        self.engagement_control != EngagementControl::None && self.target.is_some()
    }

    /// Average size class of combat-capable units
    pub fn average_size(&self) -> i32 {
        let sizes: Vec<i32> = self.combat_capable_units().map(|u| u.size).collect();
        if sizes.is_empty() {
            return 0;
        }
        sizes.iter().sum::<i32>() / sizes.len() as i32
    }

    pub fn current_armor(&self) -> i32 {
        self.units.iter().map(|u| u.current_armor).sum()
    }

    pub fn original_armor(&self) -> i32 {
        self.units.iter().map(|u| u.armor).sum()
    }

    pub fn get_unit(&self, unit_id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == unit_id)
    }

    pub fn get_unit_mut(&mut self, unit_id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == unit_id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.units.iter().flat_map(|u| u.entities.iter())
    }

    /// Drop everything scoped to the current round
    pub fn reset_round_state(&mut self) {
        self.round_log.clear();
        self.engagement_control = EngagementControl::None;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_unit(armor: i32) -> Unit {
        Unit::new("Lance", armor, DamageVector::new(3, 3, 1))
    }

    #[test]
    fn test_damage_vector_best_range() {
        assert_eq!(DamageVector::new(3, 2, 1).best_range(), RangeBand::Short);
        assert_eq!(DamageVector::new(1, 3, 2).best_range(), RangeBand::Medium);
        assert_eq!(DamageVector::new(0, 1, 3).best_range(), RangeBand::Long);
        // Ties favor the shorter band
        assert_eq!(DamageVector::new(2, 2, 2).best_range(), RangeBand::Short);
    }

    #[test]
    fn test_damage_crits_reduce_damage() {
        let mut unit = test_unit(6);
        unit.damage_crits = 2;
        assert_eq!(unit.current_damage(RangeBand::Short), 1);
        assert_eq!(unit.current_damage(RangeBand::Long), 0);
    }

    #[test]
    fn test_armor_never_negative() {
        let mut unit = test_unit(4);
        let lost = unit.take_armor_damage(10);
        assert_eq!(lost, 4);
        assert_eq!(unit.current_armor, 0);
        assert!(!unit.is_combat_capable());
    }

    #[test]
    fn test_mp_crits_reduce_movement_modifier() {
        let mut unit = test_unit(4).with_movement(2, false);
        unit.mp_crits = 3;
        assert_eq!(unit.effective_movement_modifier(), 0);
    }

    #[test]
    fn test_formation_std_damage_sums_capable_units() {
        let mut destroyed = test_unit(4);
        destroyed.destroyed = true;
        let formation = Formation::new("Alpha", PlayerId(1))
            .with_unit(test_unit(4))
            .with_unit(test_unit(4))
            .with_unit(destroyed);
        assert_eq!(formation.std_damage(), DamageVector::new(6, 6, 2));
    }

    #[test]
    fn test_formation_long_range_preference() {
        let sniper = Formation::new("Snipers", PlayerId(1))
            .with_unit(Unit::new("LRM", 4, DamageVector::new(0, 1, 3)));
        let brawler = Formation::new("Brawlers", PlayerId(1))
            .with_unit(Unit::new("AC20", 4, DamageVector::new(4, 2, 0)));
        assert!(sniper.favors_long_range());
        assert!(!brawler.favors_long_range());
    }

    #[test]
    fn test_formation_crippled_at_half() {
        let mut formation = Formation::new("Alpha", PlayerId(1))
            .with_unit(test_unit(8))
            .with_unit(test_unit(8));
        assert!(!formation.is_crippled());

        formation.units[0].current_armor = 2;
        assert!(formation.is_crippled());
    }

    #[test]
    fn test_routed_formation_is_not_surviving() {
        let mut formation = Formation::new("Alpha", PlayerId(1)).with_unit(test_unit(4));
        assert!(formation.is_surviving());
        formation.morale = MoraleStatus::Routed;
        assert!(!formation.is_surviving());
    }

    #[test]
    fn test_reset_round_state() {
        let mut formation = Formation::new("Alpha", PlayerId(1));
        formation.engagement_control = EngagementControl::Overrun;
        formation.target = Some(FormationId::new());
        formation.round_log.note_high_stress_episode();

        formation.reset_round_state();

        assert_eq!(formation.engagement_control, EngagementControl::None);
        assert!(formation.target.is_none());
        assert!(formation.round_log.is_empty());
    }
}
