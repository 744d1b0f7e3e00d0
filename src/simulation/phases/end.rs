use tracing::info;

use crate::actions::Action;
use crate::combat::damage::damage_applier_for;
use crate::core::types::FormationId;
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::phases::PhaseHandler;
use crate::simulation::report::ReportKind;

/// End-of-round bookkeeping, strictly ordered:
/// 1. destroy units with no armor left and resolve their entities
/// 2. queue withdrawal for routed or crippled formations
/// 3. queue morale checks after high-stress episodes
/// 4. queue nerve recovery for shaken-or-worse formations
/// 5. run the queue, then clear round-scoped state
pub struct EndPhase;

impl PhaseHandler for EndPhase {
    fn phase(&self) -> Phase {
        Phase::End
    }

    fn run(&self, ctx: &mut BattleContext) {
        destroy_spent_units(ctx);

        let mut withdrawals = Vec::new();
        let mut morale_checks = Vec::new();
        let mut nerve_checks = Vec::new();
        for formation in ctx.formations.iter().filter(|f| f.deployed) {
            if formation.has_combat_capable_units()
                && (formation.morale.is_routed() || formation.is_crippled())
            {
                withdrawals.push(formation.id);
            }
            if formation.round_log.had_high_stress_episode() {
                morale_checks.push(formation.id);
            }
            if formation.morale.is_shaken_or_worse() {
                nerve_checks.push(formation.id);
            }
        }

        enqueue_all(ctx, withdrawals, Action::Withdraw);
        enqueue_all(ctx, morale_checks, Action::MoraleCheck);
        enqueue_all(ctx, nerve_checks, Action::RecoveringNerve);
        ctx.process_actions();

        for formation in &mut ctx.formations {
            formation.reset_round_state();
        }
    }
}

fn enqueue_all(ctx: &mut BattleContext, ids: Vec<FormationId>, make: fn(FormationId) -> Action) {
    for id in ids {
        ctx.enqueue(make(id));
    }
}

/// Units at zero armor are destroyed; their entities take full damage with
/// no survival protection.
fn destroy_spent_units(ctx: &mut BattleContext) {
    let mut destroyed = Vec::new();

    for formation in &mut ctx.formations {
        for unit in &mut formation.units {
            if unit.destroyed || unit.current_armor > 0 {
                continue;
            }
            unit.destroyed = true;
            for entity in unit.entities.iter_mut().filter(|e| e.is_active()) {
                damage_applier_for(entity.kind, &ctx.config).destroy_entity(entity, ctx.dice.as_mut());
            }
            destroyed.push(format!("{} ({})", unit.name, formation.name));
        }
    }

    for name in destroyed {
        info!(unit = %name, "Unit destroyed");
        ctx.report(ReportKind::Destruction, format!("{} is destroyed", name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::entity::{Entity, RemovalCondition};
    use crate::battle::morale::MoraleStatus;
    use crate::battle::units::{DamageVector, Formation, Unit};
    use crate::core::config::AutoResolveConfig;
    use crate::core::dice::FixedDice;
    use crate::core::types::{PlayerId, TeamId};
    use crate::simulation::context::Player;

    fn context(script: Vec<i32>) -> BattleContext {
        let mut ctx = BattleContext::new(AutoResolveConfig::default(), Box::new(FixedDice::new(script)));
        ctx.add_player(Player::new(PlayerId(1), "Blue", TeamId(1)));
        ctx.phase = Phase::End;
        ctx
    }

    fn formation() -> Formation {
        let mut formation = Formation::new("Blue", PlayerId(1))
            .with_unit(Unit::new("A", 10, DamageVector::new(3, 3, 1)).with_entity(Entity::tank("Tank", 10, 4)))
            .with_unit(Unit::new("B", 10, DamageVector::new(3, 3, 1)));
        formation.deployed = true;
        formation
    }

    #[test]
    fn test_spent_unit_is_destroyed_with_entities() {
        let mut ctx = context(vec![0]);
        let mut f = formation();
        f.units[0].current_armor = 0;
        ctx.add_formation(f);

        EndPhase.execute(&mut ctx);

        let unit = &ctx.formations[0].units[0];
        assert!(unit.destroyed);
        assert!(unit.entities[0].destroyed);
        assert!(unit.entities[0].removal_condition().is_some());
    }

    #[test]
    fn test_high_stress_queues_morale_check() {
        // Morale roll 2 fails
        let mut ctx = context(vec![2]);
        let mut f = formation();
        f.round_log.note_high_stress_episode();
        let id = f.id;
        ctx.add_formation(f);

        EndPhase.execute(&mut ctx);

        let f = ctx.formation(id).unwrap();
        assert_eq!(f.morale, MoraleStatus::Unsteady);
        assert!(f.round_log.is_empty());
    }

    #[test]
    fn test_shaken_formation_tries_to_recover() {
        let mut ctx = context(vec![12]);
        let mut f = formation();
        f.morale = MoraleStatus::Shaken;
        let id = f.id;
        ctx.add_formation(f);

        EndPhase.execute(&mut ctx);

        assert_eq!(ctx.formation(id).unwrap().morale, MoraleStatus::Unsteady);
    }

    #[test]
    fn test_routed_formation_withdraws_on_eleven() {
        // Withdraw roll 11; nerve check never runs because the formation left
        let mut ctx = context(vec![11]);
        let mut f = formation();
        f.morale = MoraleStatus::Routed;
        let id = f.id;
        ctx.add_formation(f);

        EndPhase.execute(&mut ctx);

        assert!(ctx.formation(id).is_none());
        assert_eq!(
            ctx.withdrawn[0].units[0].entities[0].removal_condition(),
            Some(RemovalCondition::InRetreat)
        );
    }

    #[test]
    fn test_round_state_cleared() {
        let mut ctx = context(vec![12]);
        let mut f = formation();
        f.target = Some(FormationId::new());
        f.engagement_control = crate::battle::EngagementControl::Standard;
        ctx.add_formation(f);

        EndPhase.execute(&mut ctx);

        assert!(ctx.formations[0].target.is_none());
        assert!(!ctx.formations[0].is_engaged());
    }
}
