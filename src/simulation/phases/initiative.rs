use std::collections::BTreeMap;

use crate::battle::constants::MAX_INITIATIVE_REROLLS;
use crate::core::dice::Dice;
use crate::core::types::{FormationId, TeamId};
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::phases::PhaseHandler;
use crate::simulation::report::ReportKind;

/// Rolls initiative, advances the round and builds the turn order
pub struct InitiativePhase;

impl PhaseHandler for InitiativePhase {
    fn phase(&self) -> Phase {
        Phase::Initiative
    }

    fn run(&self, ctx: &mut BattleContext) {
        let mut counts = BTreeMap::new();
        for formation in ctx.formations.iter().filter(|f| f.deployed) {
            *counts.entry(formation.owner).or_insert(0) += 1;
        }
        ctx.formation_counts = counts;

        for formation in &mut ctx.formations {
            formation.done = false;
        }

        let teams: Vec<TeamId> = ctx.teams().into_iter().collect();
        let initiative = roll_initiative(&teams, ctx.dice.as_mut());
        ctx.round += 1;

        let mut per_team: Vec<Vec<FormationId>> = Vec::with_capacity(initiative.len());
        for (team, _) in &initiative {
            let ids = ctx
                .formations
                .iter()
                .filter(|f| f.deployed && ctx.team_of(f.owner) == Some(*team))
                .map(|f| f.id)
                .collect();
            per_team.push(ids);
        }
        ctx.turn_order = interleave(per_team).into();

        let summary: Vec<String> = initiative
            .iter()
            .map(|(team, roll)| format!("team {} rolled {}", team.0, roll))
            .collect();
        ctx.initiative = initiative;
        ctx.report(
            ReportKind::Initiative,
            format!("Round {} initiative: {}", ctx.round, summary.join(", ")),
        );
    }
}

/// 2d6 per team, best first. Tied teams re-roll, up to a fixed number of times;
/// ties that survive are broken by team id.
pub fn roll_initiative(teams: &[TeamId], dice: &mut dyn Dice) -> Vec<(TeamId, i32)> {
    let mut rolls: Vec<(TeamId, i32)> = teams.iter().map(|t| (*t, dice.roll_2d6())).collect();

    for _ in 0..MAX_INITIATIVE_REROLLS {
        let tied: Vec<usize> = (0..rolls.len())
            .filter(|&i| rolls.iter().enumerate().any(|(j, r)| j != i && r.1 == rolls[i].1))
            .collect();
        if tied.is_empty() {
            break;
        }
        for i in tied {
            rolls[i].1 = dice.roll_2d6();
        }
    }

    rolls.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    rolls
}

/// Round-robin across teams in initiative order
pub fn interleave(per_team: Vec<Vec<FormationId>>) -> Vec<FormationId> {
    let total = per_team.iter().map(Vec::len).sum();
    let mut order = Vec::with_capacity(total);
    let mut cursor = 0;

    while order.len() < total {
        for team in &per_team {
            if let Some(id) = team.get(cursor) {
                order.push(*id);
            }
        }
        cursor += 1;
    }

    order
}
