//! Formation actions and their phase-guarded handlers
//!
//! An [`Action`] is a plain value: who acts, on whom, with what parameters.
//! [`handler_for`] wraps it in an [`ActionHandler`] bound to the phase it was
//! queued in. A handler only runs while the context is in that phase, runs at
//! most once, and re-checks legality at execution time. Stale or illegal
//! actions finish without touching state.

pub mod attack;
pub mod engagement;
pub mod morale;
pub mod withdraw;

use serde::{Deserialize, Serialize};

use crate::battle::engagement::EngagementControl;
use crate::core::types::{FormationId, UnitId};
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;

pub use attack::AttackHandler;
pub use engagement::EngagementControlHandler;
pub use morale::{MoraleCheckHandler, RecoveringNerveHandler};
pub use withdraw::WithdrawHandler;

/// One unit of `attacker` fires on `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackAction {
    pub attacker: FormationId,
    pub unit: UnitId,
    pub target: FormationId,
}

/// `attacker` tries to impose `control` on `target`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementControlAction {
    pub attacker: FormationId,
    pub target: FormationId,
    pub control: EngagementControl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Attack(AttackAction),
    EngagementControl(EngagementControlAction),
    MoraleCheck(FormationId),
    RecoveringNerve(FormationId),
    Withdraw(FormationId),
}

impl Action {
    /// Formation performing the action
    pub fn actor(&self) -> FormationId {
        match self {
            Action::Attack(a) => a.attacker,
            Action::EngagementControl(a) => a.attacker,
            Action::MoraleCheck(f) | Action::RecoveringNerve(f) | Action::Withdraw(f) => *f,
        }
    }

    /// Legality, evaluated when the action is about to execute
    pub fn is_legal(&self, ctx: &BattleContext) -> bool {
        match self {
            Action::Attack(a) => attack::is_legal(a, ctx),
            Action::EngagementControl(a) => engagement::is_legal(a, ctx),
            Action::MoraleCheck(f) | Action::RecoveringNerve(f) => ctx.formation(*f).is_some(),
            Action::Withdraw(f) => ctx.formation(*f).is_some_and(|f| f.deployed),
        }
    }
}

/// Phase-guarded executor of one queued action
pub trait ActionHandler: Send {
    fn phase(&self) -> Phase;

    fn is_finished(&self) -> bool;

    fn cares(&self, ctx: &BattleContext) -> bool {
        ctx.phase == self.phase() && !self.is_finished()
    }

    /// Perform the action and mark the handler finished
    fn handle(&mut self, ctx: &mut BattleContext);
}

/// Build the handler for an action queued during `phase`
pub fn handler_for(action: Action, phase: Phase) -> Box<dyn ActionHandler> {
    match action {
        Action::Attack(a) => Box::new(AttackHandler::new(a, phase)),
        Action::EngagementControl(a) => Box::new(EngagementControlHandler::new(a, phase)),
        Action::MoraleCheck(f) => Box::new(MoraleCheckHandler::new(f, phase)),
        Action::RecoveringNerve(f) => Box::new(RecoveringNerveHandler::new(f, phase)),
        Action::Withdraw(f) => Box::new(WithdrawHandler::new(f, phase)),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::battle::units::DamageVector;

    #[test]
    fn test_handler_only_cares_in_its_phase() {
        let mut ctx = context(vec![7]);
        let f = formation(1, 6, DamageVector::new(2, 2, 2));
        let id = f.id;
        ctx.add_formation(f);

        let mut handler = handler_for(Action::MoraleCheck(id), Phase::End);
        ctx.phase = Phase::Movement;
        assert!(!handler.cares(&ctx));

        ctx.phase = Phase::End;
        assert!(handler.cares(&ctx));
        handler.handle(&mut ctx);
        assert!(handler.is_finished());
        assert!(!handler.cares(&ctx));
    }

    #[test]
    fn test_missing_formation_is_a_noop() {
        let mut ctx = context(vec![2]);
        ctx.phase = Phase::End;
        ctx.enqueue(Action::Withdraw(FormationId::new()));
        ctx.process_actions();

        assert!(ctx.actions.is_empty());
        assert!(ctx.withdrawn.is_empty());
    }

    #[test]
    fn test_wrong_phase_actions_stay_queued() {
        let mut ctx = context(vec![7]);
        let f = formation(1, 6, DamageVector::new(2, 2, 2));
        let id = f.id;
        ctx.add_formation(f);

        ctx.phase = Phase::End;
        ctx.enqueue(Action::MoraleCheck(id));
        ctx.phase = Phase::Movement;
        ctx.process_actions();

        assert_eq!(ctx.actions.len(), 1);
    }
}
