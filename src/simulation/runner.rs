//! Drives a battle through its rounds until one side is left or the round
//! cap is reached, then runs the victory phase exactly once.

use tracing::{info, warn};

use crate::core::config::AutoResolveConfig;
use crate::core::dice::RngDice;
use crate::core::error::Result;
use crate::scenario::Scenario;
use crate::simulation::context::BattleContext;
use crate::simulation::outcome::AutoResolveConcludedEvent;
use crate::simulation::phase::Phase;
use crate::simulation::phases::{round_handlers, PhaseHandler, VictoryPhase};

/// Whether another round should be fought
fn should_continue(ctx: &BattleContext) -> bool {
    if ctx.teams_with_survivors().len() <= 1 {
        return false;
    }
    if ctx.round >= ctx.config.max_rounds {
        warn!(rounds = ctx.round, "Round cap reached, breaking off the battle");
        return false;
    }
    true
}

/// Run a prepared context to completion
pub fn run_battle(ctx: &mut BattleContext) -> AutoResolveConcludedEvent {
    let handlers = round_handlers();

    while should_continue(ctx) {
        for handler in &handlers {
            ctx.phase = handler.phase();
            handler.execute(ctx);
        }
    }

    ctx.phase = Phase::Victory;
    VictoryPhase.execute(ctx);

    let event = match ctx.outcome.take() {
        Some(event) => event,
        None => AutoResolveConcludedEvent::from_context(ctx, None, false),
    };
    info!(
        rounds = event.rounds,
        controlling_team = ?event.controlling_team,
        removed = event.removed.len(),
        survivors = event.survivors.len(),
        "Battle concluded"
    );
    event
}

/// Build a fresh context from the scenario and run it with seeded dice
pub fn run_scenario(scenario: &Scenario, config: &AutoResolveConfig, seed: u64) -> Result<AutoResolveConcludedEvent> {
    let mut ctx = scenario.build_context(config.clone(), Box::new(RngDice::seeded(seed)))?;
    Ok(run_battle(&mut ctx))
}
