//! Engagement-control contest between an attacker and its chosen target

use tracing::trace;

use crate::actions::{Action, ActionHandler, EngagementControlAction};
use crate::battle::engagement::{is_eligible_target, EngagementControl};
use crate::battle::round_log::{EngagementRecord, EngagementRole};
use crate::combat::to_hit::engagement_to_hit;
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::report::ReportKind;

pub(crate) fn is_legal(action: &EngagementControlAction, ctx: &BattleContext) -> bool {
    let (Some(attacker), Some(target)) = (ctx.formation(action.attacker), ctx.formation(action.target))
    else {
        return false;
    };

    attacker.deployed
        && attacker.has_combat_capable_units()
        && ctx.are_enemies(action.attacker, action.target)
        && is_eligible_target(attacker, target)
}

/// Attacker wins only with a margin strictly above the defender's.
/// A side that could not roll has no margin; ties go to the defender.
pub fn attacker_wins(attacker_margin: Option<i32>, defender_margin: Option<i32>) -> bool {
    match (attacker_margin, defender_margin) {
        (Some(a), Some(d)) => a > d,
        (Some(_), None) => true,
        (None, _) => false,
    }
}

pub struct EngagementControlHandler {
    action: EngagementControlAction,
    phase: Phase,
    finished: bool,
}

impl EngagementControlHandler {
    pub fn new(action: EngagementControlAction, phase: Phase) -> Self {
        Self {
            action,
            phase,
            finished: false,
        }
    }
}

impl ActionHandler for EngagementControlHandler {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn handle(&mut self, ctx: &mut BattleContext) {
        if Action::EngagementControl(self.action).is_legal(ctx) {
            resolve(&self.action, ctx);
        } else {
            trace!(action = ?self.action, "engagement control no longer legal");
        }
        self.finished = true;
    }
}

fn record(
    ctx: &mut BattleContext,
    action: &EngagementControlAction,
    won: bool,
) {
    if let Some(attacker) = ctx.formation_mut(action.attacker) {
        attacker.round_log.record_engagement(EngagementRecord {
            opponent: action.target,
            role: EngagementRole::Attacker,
            control: action.control,
            won_engagement_control: won,
        });
    }
    if let Some(target) = ctx.formation_mut(action.target) {
        target.round_log.record_engagement(EngagementRecord {
            opponent: action.attacker,
            role: EngagementRole::Defender,
            control: action.control,
            won_engagement_control: !won,
        });
    }
}

fn resolve(action: &EngagementControlAction, ctx: &mut BattleContext) {
    let (Some(ai), Some(ti)) = (
        ctx.formation_index(action.attacker),
        ctx.formation_index(action.target),
    ) else {
        return;
    };

    // Already engaged this round (e.g. bound by an earlier opponent)
    if ctx.formations[ai].engagement_control != EngagementControl::None {
        return;
    }

    let attacker_name = ctx.formations[ai].name.clone();
    let target_name = ctx.formations[ti].name.clone();

    if action.control == EngagementControl::None {
        if let Some(attacker) = ctx.formation_mut(action.attacker) {
            attacker.round_log.record_engagement(EngagementRecord {
                opponent: action.target,
                role: EngagementRole::Attacker,
                control: EngagementControl::None,
                won_engagement_control: false,
            });
        }
        ctx.report(
            ReportKind::Engagement,
            format!("{} declines to engage {}", attacker_name, target_name),
        );
        return;
    }

    let attacker_to_hit = engagement_to_hit(&ctx.formations[ai], &ctx.formations[ti], action.control);
    let defender_to_hit = engagement_to_hit(&ctx.formations[ti], &ctx.formations[ai], action.control);

    let attacker_roll = attacker_to_hit.roll(ctx.dice.as_mut());
    let defender_roll = defender_to_hit.roll(ctx.dice.as_mut());
    let won = attacker_wins(
        attacker_roll.margin(&attacker_to_hit),
        defender_roll.margin(&defender_to_hit),
    );

    record(ctx, action, won);

    if won {
        let attacker = &mut ctx.formations[ai];
        attacker.engagement_control = action.control;
        attacker.target = Some(action.target);

        // A defender that already committed this round keeps its own control
        let target = &mut ctx.formations[ti];
        if target.engagement_control == EngagementControl::None {
            target.engagement_control = action.control;
        }
        if target.target.is_none() {
            target.target = Some(action.attacker);
        }
    }

    ctx.report(
        ReportKind::Engagement,
        format!(
            "{} attempts {} against {}: {} (to-hit {}, rolled {:?}) vs {} (to-hit {}, rolled {:?})",
            attacker_name,
            action.control,
            target_name,
            if won { "succeeds" } else { "fails" },
            attacker_to_hit.describe(),
            attacker_roll.roll,
            target_name,
            defender_to_hit.describe(),
            defender_roll.roll,
        ),
    );
}
