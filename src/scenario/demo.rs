//! Built-in demonstration scenario: a reinforced company clash

use crate::battle::entity::EntityKind;
use crate::battle::units::{DamageVector, Medium};
use crate::scenario::{Environment, EntitySpec, FormationSpec, PlayerSpec, Scenario, UnitSpec};

fn entity(name: &str, kind: EntityKind, armor: i32, structure: i32) -> EntitySpec {
    EntitySpec {
        name: name.to_string(),
        kind,
        armor,
        structure,
        crew: None,
        troopers: 7,
    }
}

fn unit(name: &str, armor: i32, damage: (i32, i32, i32), entities: Vec<EntitySpec>) -> UnitSpec {
    UnitSpec {
        name: name.to_string(),
        armor,
        damage: DamageVector::new(damage.0, damage.1, damage.2),
        size: 2,
        movement_modifier: 1,
        jump: false,
        entities,
    }
}

impl Scenario {
    /// Two players per side: a mek lance with armor support and an escort
    /// flight against a mixed defence with emplacements, infantry and late
    /// air cover.
    pub fn demo() -> Self {
        let mut assault = unit(
            "Assault Lance",
            64,
            (6, 5, 2),
            vec![
                entity("Atlas", EntityKind::Mek, 30, 16),
                entity("Awesome", EntityKind::Mek, 26, 15),
            ],
        );
        assault.size = 4;

        let mut striker = unit(
            "Striker Lance",
            40,
            (4, 4, 2),
            vec![
                entity("Griffin", EntityKind::Mek, 18, 9),
                entity("Jenner", EntityKind::Mek, 12, 6),
            ],
        );
        striker.movement_modifier = 3;
        striker.jump = true;

        let armor = unit(
            "Armor Platoon",
            36,
            (4, 3, 2),
            vec![
                entity("Manticore", EntityKind::Tank, 20, 6),
                entity("Vedette", EntityKind::Tank, 12, 4),
            ],
        );

        let mut guns = unit(
            "Bunker Line",
            48,
            (5, 5, 3),
            vec![
                entity("North Bunker", EntityKind::Emplacement, 30, 15),
                entity("South Bunker", EntityKind::Emplacement, 30, 15),
            ],
        );
        guns.movement_modifier = 0;

        let mut foot = unit(
            "Rifle Company",
            24,
            (3, 2, 0),
            vec![
                EntitySpec {
                    troopers: 21,
                    ..entity("First Platoon", EntityKind::Infantry, 0, 1)
                },
                EntitySpec {
                    troopers: 21,
                    ..entity("Second Platoon", EntityKind::Infantry, 0, 1)
                },
            ],
        );
        foot.size = 1;

        let mut wing = unit(
            "Fighter Wing",
            30,
            (4, 4, 3),
            vec![
                entity("Sparrowhawk", EntityKind::Aero, 14, 8),
                entity("Corsair", EntityKind::Aero, 18, 10),
            ],
        );
        wing.movement_modifier = 4;

        let mut escort = unit(
            "Escort Flight",
            26,
            (4, 3, 2),
            vec![
                entity("Lightning", EntityKind::Aero, 16, 9),
                entity("Stuka", EntityKind::Aero, 20, 12),
            ],
        );
        escort.movement_modifier = 4;

        Scenario {
            name: "Demo: Ridge Assault".to_string(),
            environment: Environment {
                planet: Some("Tharkad".to_string()),
                weather: Some("clear".to_string()),
                light: Some("daylight".to_string()),
                gravity: 1.0,
            },
            players: vec![
                PlayerSpec {
                    id: 1,
                    name: "Attacker".to_string(),
                    team: 1,
                    skill: 3,
                    tactics: 4,
                },
                PlayerSpec {
                    id: 2,
                    name: "Allied Armor".to_string(),
                    team: 1,
                    skill: 4,
                    tactics: 5,
                },
                PlayerSpec {
                    id: 3,
                    name: "Garrison".to_string(),
                    team: 2,
                    skill: 4,
                    tactics: 4,
                },
                PlayerSpec {
                    id: 4,
                    name: "Planetary Air".to_string(),
                    team: 2,
                    skill: 5,
                    tactics: 5,
                },
            ],
            formations: vec![
                FormationSpec {
                    name: "Command Lance".to_string(),
                    owner: 1,
                    skill: Some(2),
                    tactics: None,
                    medium: Medium::Ground,
                    deploy_round: 0,
                    units: vec![assault, striker],
                },
                FormationSpec {
                    name: "Hammer Platoon".to_string(),
                    owner: 2,
                    skill: None,
                    tactics: None,
                    medium: Medium::Ground,
                    deploy_round: 0,
                    units: vec![armor],
                },
                FormationSpec {
                    name: "Escort".to_string(),
                    owner: 2,
                    skill: None,
                    tactics: None,
                    medium: Medium::Air,
                    deploy_round: 1,
                    units: vec![escort],
                },
                FormationSpec {
                    name: "Ridge Defence".to_string(),
                    owner: 3,
                    skill: None,
                    tactics: None,
                    medium: Medium::Ground,
                    deploy_round: 0,
                    units: vec![guns, foot],
                },
                FormationSpec {
                    name: "Top Cover".to_string(),
                    owner: 4,
                    skill: None,
                    tactics: Some(3),
                    medium: Medium::Air,
                    deploy_round: 2,
                    units: vec![wing],
                },
            ],
        }
    }
}
