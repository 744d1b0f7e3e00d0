use tracing::info;

use crate::battle::entity::RemovalCondition;
use crate::battle::units::Unit;
use crate::combat::damage::damage_applier_for;
use crate::core::config::AutoResolveConfig;
use crate::core::types::TeamId;
use crate::simulation::context::BattleContext;
use crate::simulation::outcome::AutoResolveConcludedEvent;
use crate::simulation::phase::Phase;
use crate::simulation::phases::PhaseHandler;
use crate::simulation::report::ReportKind;

/// Runs once after the round loop: final attrition, field control, captures
/// and the concluded event.
pub struct VictoryPhase;

impl PhaseHandler for VictoryPhase {
    fn phase(&self) -> Phase {
        Phase::Victory
    }

    fn run(&self, ctx: &mut BattleContext) {
        apply_attrition(ctx);

        let survivors = ctx.teams_with_survivors();
        let controlling_team = if survivors.len() == 1 {
            survivors.iter().next().copied()
        } else {
            None
        };
        let hit_round_cap = survivors.len() > 1 && ctx.round >= ctx.config.max_rounds;

        if let Some(team) = controlling_team {
            capture_routed(ctx, team);
        }

        let summary = match controlling_team {
            Some(team) => format!("Team {} controls the battlefield after {} rounds", team.0, ctx.round),
            None if hit_round_cap => format!("Battle broken off after {} rounds", ctx.round),
            None => format!("No one holds the battlefield after {} rounds", ctx.round),
        };
        info!(rounds = ctx.round, controlled = controlling_team.is_some(), "{}", summary);
        ctx.report(ReportKind::Victory, summary);

        ctx.outcome = Some(AutoResolveConcludedEvent::from_context(
            ctx,
            controlling_team,
            hit_round_cap,
        ));
    }
}

/// Fraction of armor plus structure an entity of this unit loses in the
/// final reckoning
pub fn attrition_fraction(unit: &Unit, config: &AutoResolveConfig) -> f32 {
    let lost = 1.0 - unit.armor_fraction();
    let crits = unit.total_crits().max(0) as f32 * config.attrition_per_crit;
    (lost + crits).clamp(0.0, config.attrition_cap)
}

fn apply_attrition(ctx: &mut BattleContext) {
    let mut lines = Vec::new();

    for formation in &mut ctx.formations {
        for unit in &mut formation.units {
            if unit.destroyed || unit.current_armor >= unit.armor {
                continue;
            }
            let fraction = attrition_fraction(unit, &ctx.config);
            for entity in unit.entities.iter_mut().filter(|e| e.is_active()) {
                let total = entity.total_armor_and_structure();
                let damage = (total as f32 * fraction).floor() as i32;
                if damage <= 0 {
                    continue;
                }
                let max_loss = (total as f32 * ctx.config.attrition_cap).floor() as i32;
                damage_applier_for(entity.kind, &ctx.config).apply_capped_damage(
                    entity,
                    damage,
                    max_loss,
                    true,
                    ctx.dice.as_mut(),
                );
                lines.push(format!("{} takes {} attrition damage", entity.name, damage));
            }
        }
    }

    for line in lines {
        ctx.report(ReportKind::Damage, line);
    }
}

/// Units of losing teams still stuck in routed formations are taken
fn capture_routed(ctx: &mut BattleContext, controller: TeamId) {
    let mut captured = 0;
    let teams: Vec<Option<TeamId>> = ctx.formations.iter().map(|f| ctx.team_of(f.owner)).collect();

    for (formation, team) in ctx.formations.iter_mut().zip(teams) {
        if team == Some(controller) || !formation.morale.is_routed() {
            continue;
        }
        for unit in &mut formation.units {
            for entity in unit.entities.iter_mut().filter(|e| e.is_active()) {
                if damage_applier_for(entity.kind, &ctx.config).remove(entity, RemovalCondition::Captured) {
                    captured += 1;
                }
            }
        }
    }

    if captured > 0 {
        ctx.report(ReportKind::Victory, format!("{} enemy entities captured", captured));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::entity::Entity;
    use crate::battle::morale::MoraleStatus;
    use crate::battle::units::{DamageVector, Formation};
    use crate::core::dice::RngDice;
    use crate::core::types::PlayerId;
    use crate::simulation::context::Player;

    fn context() -> BattleContext {
        let mut ctx = BattleContext::new(AutoResolveConfig::default(), Box::new(RngDice::seeded(7)));
        ctx.add_player(Player::new(PlayerId(1), "Blue", TeamId(1)));
        ctx.add_player(Player::new(PlayerId(2), "Red", TeamId(2)));
        ctx.phase = Phase::Victory;
        ctx
    }

    fn formation(owner: u32, name: &str) -> Formation {
        let mut formation = Formation::new(name, PlayerId(owner)).with_unit(
            Unit::new("Lance", 20, DamageVector::new(3, 3, 1))
                .with_entity(Entity::mek("Mek", 20, 10))
                .with_entity(Entity::tank("Tank", 12, 4)),
        );
        formation.deployed = true;
        formation
    }

    #[test]
    fn test_attrition_fraction_is_capped() {
        let config = AutoResolveConfig::default();
        let mut unit = Unit::new("Lance", 20, DamageVector::new(3, 3, 1));
        unit.current_armor = 10;
        assert!((attrition_fraction(&unit, &config) - 0.5).abs() < 1e-6);

        unit.current_armor = 1;
        unit.damage_crits = 5;
        assert!((attrition_fraction(&unit, &config) - config.attrition_cap).abs() < 1e-6);
    }

    #[test]
    fn test_sole_survivor_controls_and_captures_routed() {
        let mut ctx = context();
        ctx.add_formation(formation(1, "Blue"));
        let mut red = formation(2, "Red");
        red.morale = MoraleStatus::Routed;
        ctx.add_formation(red);

        VictoryPhase.execute(&mut ctx);

        let event = ctx.outcome.as_ref().unwrap();
        assert_eq!(event.controlling_team, Some(TeamId(1)));
        assert_eq!(event.captured().len(), 2);
        assert_eq!(event.survivors().len(), 2);
        assert!(!event.hit_round_cap);
    }

    #[test]
    fn test_attrition_never_destroys() {
        let mut ctx = context();
        let mut blue = formation(1, "Blue");
        blue.units[0].current_armor = 1;
        blue.units[0].targeting_crits = 3;
        ctx.add_formation(blue);

        VictoryPhase.execute(&mut ctx);

        let event = ctx.outcome.as_ref().unwrap();
        // Nothing is destroyed outright
        assert!(event.devastated().is_empty());
        assert!(event
            .removed
            .iter()
            .all(|e| e.condition == Some(RemovalCondition::Ejected)));
    }

    #[test]
    fn test_attrition_leaves_the_uncapped_share() {
        for seed in 0..40 {
            let mut ctx = BattleContext::new(AutoResolveConfig::default(), Box::new(RngDice::seeded(seed)));
            ctx.add_player(Player::new(PlayerId(1), "Blue", TeamId(1)));
            ctx.phase = Phase::Victory;
            let mut blue = formation(1, "Blue");
            blue.units[0].current_armor = 1;
            blue.units[0].damage_crits = 4;
            let totals: Vec<i32> = blue.units[0]
                .entities
                .iter()
                .map(|e| e.total_armor_and_structure())
                .collect();
            ctx.add_formation(blue);

            VictoryPhase.execute(&mut ctx);

            let cap = ctx.config.attrition_cap;
            for (entity, total) in ctx.formations[0].units[0].entities.iter().zip(totals) {
                let floor = total - (total as f32 * cap).floor() as i32;
                assert!(
                    entity.remaining_armor_and_structure() >= floor,
                    "seed {}: {} kept {} of {}",
                    seed,
                    entity.name,
                    entity.remaining_armor_and_structure(),
                    total
                );
            }
        }
    }

    #[test]
    fn test_two_sides_standing_is_uncontrolled() {
        let mut ctx = context();
        ctx.add_formation(formation(1, "Blue"));
        ctx.add_formation(formation(2, "Red"));
        ctx.round = ctx.config.max_rounds;

        VictoryPhase.execute(&mut ctx);

        let event = ctx.outcome.as_ref().unwrap();
        assert!(!event.is_controlled());
        assert!(event.hit_round_cap);
        assert!(event.captured().is_empty());
    }
}
