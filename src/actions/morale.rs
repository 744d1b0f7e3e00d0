//! Morale checks after high stress, and nerve recovery for shaken formations
//!
//! Both roll 2d6 against the same nerve target number. A failed morale check
//! worsens morale exactly one step; a successful recovery improves it one
//! step. Neither moves morale any other way.

use tracing::{info, trace};

use crate::actions::{Action, ActionHandler};
use crate::combat::to_hit::nerve_to_hit;
use crate::core::types::FormationId;
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::report::ReportKind;

pub struct MoraleCheckHandler {
    formation: FormationId,
    phase: Phase,
    finished: bool,
}

impl MoraleCheckHandler {
    pub fn new(formation: FormationId, phase: Phase) -> Self {
        Self {
            formation,
            phase,
            finished: false,
        }
    }
}

impl ActionHandler for MoraleCheckHandler {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn handle(&mut self, ctx: &mut BattleContext) {
        if Action::MoraleCheck(self.formation).is_legal(ctx) {
            check_morale(self.formation, ctx);
        } else {
            trace!(formation = ?self.formation, "morale check skipped");
        }
        self.finished = true;
    }
}

fn check_morale(id: FormationId, ctx: &mut BattleContext) {
    let Some(idx) = ctx.formation_index(id) else {
        return;
    };
    let to_hit = nerve_to_hit(&ctx.formations[idx]);
    let outcome = to_hit.roll(ctx.dice.as_mut());

    let formation = &mut ctx.formations[idx];
    let before = formation.morale;
    if !outcome.success {
        formation.morale = before.worsened();
    }
    let after = formation.morale;
    let name = formation.name.clone();

    if after != before {
        info!(formation = %name, from = %before, to = %after, "Morale worsened");
    }
    ctx.report(
        ReportKind::Morale,
        format!(
            "{} morale check (to-hit {}, rolled {:?}): {} -> {}",
            name,
            to_hit.describe(),
            outcome.roll,
            before,
            after
        ),
    );
}

pub struct RecoveringNerveHandler {
    formation: FormationId,
    phase: Phase,
    finished: bool,
}

impl RecoveringNerveHandler {
    pub fn new(formation: FormationId, phase: Phase) -> Self {
        Self {
            formation,
            phase,
            finished: false,
        }
    }
}

impl ActionHandler for RecoveringNerveHandler {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn handle(&mut self, ctx: &mut BattleContext) {
        if Action::RecoveringNerve(self.formation).is_legal(ctx) {
            recover_nerve(self.formation, ctx);
        }
        self.finished = true;
    }
}

fn recover_nerve(id: FormationId, ctx: &mut BattleContext) {
    let Some(idx) = ctx.formation_index(id) else {
        return;
    };
    if !ctx.formations[idx].morale.is_shaken_or_worse() {
        return;
    }

    let to_hit = nerve_to_hit(&ctx.formations[idx]);
    let outcome = to_hit.roll(ctx.dice.as_mut());

    let formation = &mut ctx.formations[idx];
    let before = formation.morale;
    if outcome.success {
        formation.morale = before.improved();
    }
    let after = formation.morale;
    let name = formation.name.clone();

    ctx.report(
        ReportKind::Morale,
        format!(
            "{} tries to recover its nerve (to-hit {}, rolled {:?}): {} -> {}",
            name,
            to_hit.describe(),
            outcome.roll,
            before,
            after
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, formation};
    use crate::battle::morale::MoraleStatus;
    use crate::battle::units::DamageVector;
    use proptest::prelude::*;

    fn setup(script: Vec<i32>, morale: MoraleStatus) -> (BattleContext, FormationId) {
        let mut ctx = context(script);
        let mut f = formation(1, 10, DamageVector::new(3, 3, 1));
        f.morale = morale;
        let id = f.id;
        ctx.add_formation(f);
        ctx.phase = Phase::End;
        (ctx, id)
    }

    #[test]
    fn test_failed_check_worsens_one_step() {
        let (mut ctx, id) = setup(vec![2], MoraleStatus::Normal);
        ctx.enqueue(Action::MoraleCheck(id));
        ctx.process_actions();
        assert_eq!(ctx.formation(id).unwrap().morale, MoraleStatus::Unsteady);
    }

    #[test]
    fn test_passed_check_keeps_morale() {
        let (mut ctx, id) = setup(vec![12], MoraleStatus::Shaken);
        ctx.enqueue(Action::MoraleCheck(id));
        ctx.process_actions();
        assert_eq!(ctx.formation(id).unwrap().morale, MoraleStatus::Shaken);
    }

    #[test]
    fn test_routed_is_absorbing() {
        let (mut ctx, id) = setup(vec![2], MoraleStatus::Routed);
        ctx.enqueue(Action::MoraleCheck(id));
        ctx.process_actions();
        assert_eq!(ctx.formation(id).unwrap().morale, MoraleStatus::Routed);
    }

    #[test]
    fn test_recovering_nerve_improves_on_success() {
        let (mut ctx, id) = setup(vec![12], MoraleStatus::Broken);
        ctx.enqueue(Action::RecoveringNerve(id));
        ctx.process_actions();
        assert_eq!(ctx.formation(id).unwrap().morale, MoraleStatus::Shaken);
    }

    #[test]
    fn test_recovering_nerve_failure_changes_nothing() {
        let (mut ctx, id) = setup(vec![2], MoraleStatus::Shaken);
        ctx.enqueue(Action::RecoveringNerve(id));
        ctx.process_actions();
        assert_eq!(ctx.formation(id).unwrap().morale, MoraleStatus::Shaken);
    }

    fn morale_strategy() -> impl Strategy<Value = MoraleStatus> {
        prop::sample::select(MoraleStatus::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_morale_check_moves_at_most_one_step_toward_routed(
            morale in morale_strategy(),
            roll in 2i32..=12,
        ) {
            let (mut ctx, id) = setup(vec![roll], morale);
            ctx.enqueue(Action::MoraleCheck(id));
            ctx.process_actions();

            let after = ctx.formation(id).unwrap().morale;
            prop_assert!(after == morale || after == morale.worsened());
            prop_assert!(after >= morale);
        }
    }
}
