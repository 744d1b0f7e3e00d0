//! Withdrawal from the field
//!
//! The tactics-based to-hit is built and reported, but success is decided by
//! the 2d6 roll against the configured withdrawal target (11 by default).

use tracing::info;

use crate::actions::{Action, ActionHandler};
use crate::battle::entity::RemovalCondition;
use crate::combat::damage::damage_applier_for;
use crate::combat::to_hit::withdraw_to_hit;
use crate::core::types::FormationId;
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::report::ReportKind;

pub struct WithdrawHandler {
    formation: FormationId,
    phase: Phase,
    finished: bool,
}

impl WithdrawHandler {
    pub fn new(formation: FormationId, phase: Phase) -> Self {
        Self {
            formation,
            phase,
            finished: false,
        }
    }
}

impl ActionHandler for WithdrawHandler {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn handle(&mut self, ctx: &mut BattleContext) {
        if Action::Withdraw(self.formation).is_legal(ctx) {
            withdraw(self.formation, ctx);
        }
        self.finished = true;
    }
}

fn withdraw(id: FormationId, ctx: &mut BattleContext) {
    let Some(idx) = ctx.formation_index(id) else {
        return;
    };

    let to_hit = withdraw_to_hit(&ctx.formations[idx]);
    let roll = ctx.dice.roll_2d6();
    let target = ctx.config.withdraw_target;
    let success = roll >= target;
    let name = ctx.formations[idx].name.clone();

    ctx.report(
        ReportKind::Withdrawal,
        format!(
            "{} attempts to withdraw (to-hit {}): rolled {} against {}, {}",
            name,
            to_hit.describe(),
            roll,
            target,
            if success { "withdraws" } else { "fails" }
        ),
    );

    if !success {
        return;
    }

    let config = &ctx.config;
    let formation = &mut ctx.formations[idx];
    for unit in &mut formation.units {
        for entity in &mut unit.entities {
            damage_applier_for(entity.kind, config).remove(entity, RemovalCondition::InRetreat);
        }
    }

    ctx.withdraw_formation(id);
    info!(formation = %name, "Withdrew from battle");
}
