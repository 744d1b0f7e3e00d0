use tracing::info;

use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::phases::PhaseHandler;
use crate::simulation::report::ReportKind;

/// Brings formations onto the field on their deploy round
pub struct DeploymentPhase;

impl PhaseHandler for DeploymentPhase {
    fn phase(&self) -> Phase {
        Phase::Deployment
    }

    fn run(&self, ctx: &mut BattleContext) {
        let round = ctx.round;
        let mut arrivals = Vec::new();

        for formation in &mut ctx.formations {
            if !formation.deployed && formation.deploy_round == round {
                formation.deployed = true;
                arrivals.push(formation.name.clone());
            }
        }

        for name in arrivals {
            info!(formation = %name, round, "Deployed");
            ctx.report(ReportKind::Deployment, format!("{} deploys", name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::units::Formation;
    use crate::core::config::AutoResolveConfig;
    use crate::core::dice::FixedDice;
    use crate::core::types::PlayerId;

    #[test]
    fn test_deploys_on_matching_round_only() {
        let mut ctx = BattleContext::new(AutoResolveConfig::default(), Box::new(FixedDice::constant(0)));
        ctx.add_formation(Formation::new("Now", PlayerId(1)));
        ctx.add_formation(Formation::new("Later", PlayerId(1)).with_deploy_round(2));

        ctx.phase = Phase::Deployment;
        DeploymentPhase.execute(&mut ctx);
        assert!(ctx.formations[0].deployed);
        assert!(!ctx.formations[1].deployed);

        ctx.round = 2;
        DeploymentPhase.execute(&mut ctx);
        assert!(ctx.formations[1].deployed);
    }

    #[test]
    fn test_guarded_outside_phase() {
        let mut ctx = BattleContext::new(AutoResolveConfig::default(), Box::new(FixedDice::constant(0)));
        ctx.add_formation(Formation::new("Now", PlayerId(1)));

        ctx.phase = Phase::Movement;
        DeploymentPhase.execute(&mut ctx);
        assert!(!ctx.formations[0].deployed);
    }
}
