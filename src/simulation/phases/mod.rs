//! Phase handlers for the auto-resolution state machine
//!
//! Each handler declares its phase and only runs while the context is in it.
//! The runner sets the phase and calls [`PhaseHandler::execute`].

pub mod deployment;
pub mod end;
pub mod initiative;
pub mod movement;
pub mod victory;

pub use deployment::DeploymentPhase;
pub use end::EndPhase;
pub use initiative::InitiativePhase;
pub use movement::MovementPhase;
pub use victory::VictoryPhase;

use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;

pub trait PhaseHandler: Send + Sync {
    fn phase(&self) -> Phase;

    /// Phase body; only called through `execute`
    fn run(&self, ctx: &mut BattleContext);

    /// Guarded execution: does nothing unless the context is in this phase
    fn execute(&self, ctx: &mut BattleContext) {
        if ctx.phase == self.phase() {
            self.run(ctx);
        }
    }
}

/// Handlers of the repeated round, in execution order
pub fn round_handlers() -> Vec<Box<dyn PhaseHandler>> {
    vec![
        Box::new(DeploymentPhase),
        Box::new(InitiativePhase),
        Box::new(MovementPhase),
        Box::new(EndPhase),
    ]
}
