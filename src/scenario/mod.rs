//! Scenario input model
//!
//! A scenario describes who fights (players and their teams) and with what
//! (formations, units, entities). It deserializes from JSON and builds a
//! ready-to-run [`BattleContext`].

pub mod demo;

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::battle::entity::{Entity, EntityKind};
use crate::battle::units::{DamageVector, Formation, Medium, Unit};
use crate::core::config::AutoResolveConfig;
use crate::core::dice::Dice;
use crate::core::error::{AcarError, Result};
use crate::core::types::{PlayerId, Round, TeamId};
use crate::simulation::context::{BattleContext, Player};

fn default_skill() -> i32 {
    4
}

fn default_troopers() -> u32 {
    7
}

fn default_size() -> i32 {
    2
}

fn default_gravity() -> f32 {
    1.0
}

/// Battlefield conditions. Carried through to reports, never read by the
/// resolution rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub planet: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub light: Option<String>,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            planet: None,
            weather: None,
            light: None,
            gravity: default_gravity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    pub id: u32,
    pub name: String,
    pub team: u32,
    /// Default skill for this player's formations
    #[serde(default = "default_skill")]
    pub skill: i32,
    #[serde(default = "default_skill")]
    pub tactics: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpec {
    pub name: String,
    pub kind: EntityKind,
    pub armor: i32,
    /// Internal structure per location, or structural integrity for aero
    pub structure: i32,
    #[serde(default)]
    pub crew: Option<u32>,
    /// Infantry only
    #[serde(default = "default_troopers")]
    pub troopers: u32,
}

impl EntitySpec {
    pub fn build(&self) -> Entity {
        let entity = match self.kind {
            EntityKind::Tank => Entity::tank(&self.name, self.armor, self.structure),
            EntityKind::Mek => Entity::mek(&self.name, self.armor, self.structure),
            EntityKind::Aero => Entity::aero(&self.name, self.armor, self.structure),
            EntityKind::Emplacement => Entity::emplacement(&self.name, self.armor, self.structure),
            EntityKind::Infantry => Entity::infantry(&self.name, self.troopers, self.structure.max(1)),
        };
        match self.crew {
            Some(size) => entity.with_crew(size),
            None => entity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    pub armor: i32,
    pub damage: DamageVector,
    #[serde(default = "default_size")]
    pub size: i32,
    #[serde(default)]
    pub movement_modifier: i32,
    #[serde(default)]
    pub jump: bool,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
}

impl UnitSpec {
    pub fn build(&self) -> Unit {
        self.entities.iter().fold(
            Unit::new(&self.name, self.armor, self.damage)
                .with_size(self.size)
                .with_movement(self.movement_modifier, self.jump),
            |unit, entity| unit.with_entity(entity.build()),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationSpec {
    pub name: String,
    pub owner: u32,
    /// Falls back to the owner's skill
    #[serde(default)]
    pub skill: Option<i32>,
    #[serde(default)]
    pub tactics: Option<i32>,
    #[serde(default)]
    pub medium: Medium,
    #[serde(default)]
    pub deploy_round: Round,
    pub units: Vec<UnitSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub environment: Environment,
    pub players: Vec<PlayerSpec>,
    pub formations: Vec<FormationSpec>,
}

impl Scenario {
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let scenario: Scenario = serde_json::from_str(contents)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn player(&self, id: u32) -> Option<&PlayerSpec> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Reject scenarios the engine cannot run
    pub fn validate(&self) -> Result<()> {
        let mut ids = BTreeSet::new();
        for player in &self.players {
            if !ids.insert(player.id) {
                return Err(AcarError::InvalidScenario(format!(
                    "duplicate player id {}",
                    player.id
                )));
            }
            check_skill(player.skill)?;
            check_skill(player.tactics)?;
        }

        let teams: BTreeSet<u32> = self.players.iter().map(|p| p.team).collect();
        if teams.len() < 2 {
            return Err(AcarError::InvalidScenario(format!(
                "'{}' needs at least two teams, found {}",
                self.name,
                teams.len()
            )));
        }

        for formation in &self.formations {
            if self.player(formation.owner).is_none() {
                return Err(AcarError::InvalidScenario(format!(
                    "formation '{}' is owned by unknown player {}",
                    formation.name, formation.owner
                )));
            }
            if let Some(skill) = formation.skill {
                check_skill(skill)?;
            }
            if let Some(tactics) = formation.tactics {
                check_skill(tactics)?;
            }
            if formation.units.is_empty() {
                return Err(AcarError::InvalidScenario(format!(
                    "formation '{}' has no units",
                    formation.name
                )));
            }
            if let Some(unit) = formation.units.iter().find(|u| u.armor <= 0) {
                return Err(AcarError::InvalidScenario(format!(
                    "unit '{}' in '{}' has no armor",
                    unit.name, formation.name
                )));
            }
        }

        Ok(())
    }

    /// Build a fresh battle context; every call yields new entity ids
    pub fn build_context(&self, config: AutoResolveConfig, dice: Box<dyn Dice>) -> Result<BattleContext> {
        self.validate()?;
        config.validate()?;

        let mut ctx = BattleContext::new(config, dice);
        for player in &self.players {
            ctx.add_player(Player::new(PlayerId(player.id), &player.name, TeamId(player.team)));
        }

        for spec in &self.formations {
            let owner = self.player(spec.owner).ok_or_else(|| {
                AcarError::InvalidScenario(format!("unknown player {}", spec.owner))
            })?;
            let formation = spec.units.iter().fold(
                Formation::new(&spec.name, PlayerId(owner.id))
                    .with_skill(
                        spec.skill.unwrap_or(owner.skill),
                        spec.tactics.unwrap_or(owner.tactics),
                    )
                    .with_medium(spec.medium)
                    .with_deploy_round(spec.deploy_round),
                |formation, unit| formation.with_unit(unit.build()),
            );
            ctx.add_formation(formation);
        }

        info!(
            scenario = %self.name,
            players = self.players.len(),
            formations = self.formations.len(),
            "Scenario loaded"
        );
        Ok(ctx)
    }
}

/// Skill and tactics ratings run from 0 (elite) to 7 (green)
fn check_skill(value: i32) -> Result<()> {
    if (0..=7).contains(&value) {
        Ok(())
    } else {
        Err(AcarError::UnknownSkill(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::FixedDice;

    const SKIRMISH: &str = r#"{
        "name": "Skirmish",
        "environment": { "planet": "Hesperus II" },
        "players": [
            { "id": 1, "name": "Blue", "team": 1, "skill": 3 },
            { "id": 2, "name": "Red", "team": 2 }
        ],
        "formations": [
            {
                "name": "Blue Lance",
                "owner": 1,
                "units": [{
                    "name": "Command",
                    "armor": 30,
                    "damage": { "short": 4, "medium": 3, "long": 1 },
                    "entities": [
                        { "name": "Atlas", "kind": "Mek", "armor": 30, "structure": 16 },
                        { "name": "Platoon", "kind": "Infantry", "armor": 0, "structure": 1, "troopers": 21 }
                    ]
                }]
            },
            {
                "name": "Red Wing",
                "owner": 2,
                "tactics": 2,
                "medium": "Air",
                "deploy_round": 2,
                "units": [{
                    "name": "Flight",
                    "armor": 18,
                    "damage": { "short": 3, "medium": 3, "long": 2 },
                    "entities": [
                        { "name": "Sparrowhawk", "kind": "Aero", "armor": 12, "structure": 8 }
                    ]
                }]
            }
        ]
    }"#;

    #[test]
    fn test_parse_and_build() {
        let scenario = Scenario::from_json_str(SKIRMISH).unwrap();
        assert_eq!(scenario.environment.planet.as_deref(), Some("Hesperus II"));
        assert_eq!(scenario.environment.gravity, 1.0);

        let ctx = scenario
            .build_context(AutoResolveConfig::default(), Box::new(FixedDice::constant(0)))
            .unwrap();

        assert_eq!(ctx.formations.len(), 2);
        let blue = &ctx.formations[0];
        assert_eq!((blue.skill, blue.tactics), (3, 4));
        assert_eq!(blue.units[0].entities.len(), 2);
        assert_eq!(blue.units[0].entities[1].locations.len(), 21);

        let red = &ctx.formations[1];
        assert_eq!((red.skill, red.tactics), (4, 2));
        assert_eq!(red.medium, Medium::Air);
        assert_eq!(red.deploy_round, 2);
        assert_eq!(ctx.team_of(red.owner), Some(TeamId(2)));
    }

    #[test]
    fn test_single_team_rejected() {
        let mut scenario = Scenario::from_json_str(SKIRMISH).unwrap();
        scenario.players[1].team = 1;
        assert!(matches!(scenario.validate(), Err(AcarError::InvalidScenario(_))));
    }

    #[test]
    fn test_unknown_owner_rejected() {
        let mut scenario = Scenario::from_json_str(SKIRMISH).unwrap();
        scenario.formations[0].owner = 9;
        assert!(matches!(scenario.validate(), Err(AcarError::InvalidScenario(_))));
    }

    #[test]
    fn test_skill_out_of_range_rejected() {
        let mut scenario = Scenario::from_json_str(SKIRMISH).unwrap();
        scenario.formations[1].skill = Some(9);
        assert!(matches!(scenario.validate(), Err(AcarError::UnknownSkill(9))));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Scenario::from_json_str("{ \"name\": 3 }"),
            Err(AcarError::SerdeError(_))
        ));
    }

    #[test]
    fn test_demo_is_valid() {
        let demo = Scenario::demo();
        assert!(demo.validate().is_ok());
        let json = demo.to_json().unwrap();
        assert_eq!(Scenario::from_json_str(&json).unwrap(), demo);
    }
}
