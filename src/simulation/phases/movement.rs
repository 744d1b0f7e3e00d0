use tracing::debug;

use crate::actions::{Action, AttackAction, EngagementControlAction};
use crate::battle::engagement::{choose_engagement_control, select_target, EngagementControl};
use crate::core::types::FormationId;
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::phases::PhaseHandler;
use crate::simulation::report::ReportKind;

/// Drains the turn order: target selection and engagement control per
/// formation, then one attack per combat-capable unit of every engaged
/// formation.
pub struct MovementPhase;

impl PhaseHandler for MovementPhase {
    fn phase(&self) -> Phase {
        Phase::Movement
    }

    fn run(&self, ctx: &mut BattleContext) {
        while let Some(id) = ctx.turn_order.pop_front() {
            take_turn(id, ctx);
            if let Some(formation) = ctx.formation_mut(id) {
                formation.done = true;
            }
        }

        let mut attacks = Vec::new();
        for formation in ctx.formations.iter().filter(|f| f.deployed && f.is_engaged()) {
            let Some(target) = formation.target else {
                continue;
            };
            for unit in formation.combat_capable_units() {
                attacks.push(AttackAction {
                    attacker: formation.id,
                    unit: unit.id,
                    target,
                });
            }
        }

        debug!(round = ctx.round, attacks = attacks.len(), "Resolving attacks");
        for attack in attacks {
            ctx.enqueue(Action::Attack(attack));
        }
        ctx.process_actions();
    }
}

fn take_turn(id: FormationId, ctx: &mut BattleContext) {
    let Some(idx) = ctx.formation_index(id) else {
        return;
    };
    {
        let formation = &ctx.formations[idx];
        if !formation.deployed
            || formation.done
            || !formation.has_combat_capable_units()
            || formation.engagement_control != EngagementControl::None
        {
            return;
        }
    }

    let enemies = ctx.enemies_of(id);
    let bound = ctx.formations[idx].target.filter(|t| enemies.contains(t));
    let target = match bound {
        Some(target) => Some(target),
        None => select_target(enemies, ctx.dice.as_mut()),
    };

    let Some(target) = target else {
        let name = ctx.formations[idx].name.clone();
        ctx.report(ReportKind::Skipped, format!("{} has no eligible target", name));
        return;
    };

    let control = choose_engagement_control(
        &ctx.formations[idx],
        &ctx.config.engagement_weights,
        ctx.config.min_overrun_damage,
        ctx.dice.as_mut(),
    );

    ctx.enqueue(Action::EngagementControl(EngagementControlAction {
        attacker: id,
        target,
        control,
    }));
    ctx.process_actions();
}
