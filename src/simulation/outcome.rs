//! Concluded-battle event handed to downstream consumers
//!
//! Consumers query entities by category (`graveyard()`, `retreated()`, ...)
//! rather than matching removal conditions themselves.

use serde::{Deserialize, Serialize};

use crate::battle::entity::{EntityKind, RemovalCondition};
use crate::core::types::{EntityId, FormationId, PlayerId, Round, TeamId};
use crate::simulation::context::BattleContext;
use crate::simulation::report::ReportLine;

/// Final disposition of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOutcome {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
    pub owner: PlayerId,
    pub team: Option<TeamId>,
    pub formation: FormationId,
    /// None for survivors
    pub condition: Option<RemovalCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoResolveConcludedEvent {
    /// Team left in control of the field, if any
    pub controlling_team: Option<TeamId>,
    pub rounds: Round,
    /// The battle was stopped by the round cap rather than a decision
    pub hit_round_cap: bool,
    pub removed: Vec<EntityOutcome>,
    pub survivors: Vec<EntityOutcome>,
    pub report: Vec<ReportLine>,
}

impl AutoResolveConcludedEvent {
    /// Snapshot every entity in the roster and among withdrawn formations
    pub fn from_context(ctx: &BattleContext, controlling_team: Option<TeamId>, hit_round_cap: bool) -> Self {
        let mut removed = Vec::new();
        let mut survivors = Vec::new();

        for formation in ctx.all_formations() {
            let team = ctx.team_of(formation.owner);
            for entity in formation.entities() {
                let outcome = EntityOutcome {
                    id: entity.id,
                    name: entity.name.clone(),
                    kind: entity.kind,
                    owner: formation.owner,
                    team,
                    formation: formation.id,
                    condition: entity.removal_condition(),
                };
                if outcome.condition.is_some() {
                    removed.push(outcome);
                } else {
                    survivors.push(outcome);
                }
            }
        }

        Self {
            controlling_team,
            rounds: ctx.round,
            hit_round_cap,
            removed,
            survivors,
            report: ctx.log.lines.clone(),
        }
    }

    pub fn is_controlled(&self) -> bool {
        self.controlling_team.is_some()
    }

    fn with_conditions(&self, conditions: &[RemovalCondition]) -> Vec<&EntityOutcome> {
        self.removed
            .iter()
            .filter(|e| e.condition.is_some_and(|c| conditions.contains(&c)))
            .collect()
    }

    /// Salvageable hulks and ejected-crew wrecks
    pub fn graveyard(&self) -> Vec<&EntityOutcome> {
        self.with_conditions(&[RemovalCondition::Salvageable, RemovalCondition::Ejected])
    }

    pub fn retreated(&self) -> Vec<&EntityOutcome> {
        self.with_conditions(&[RemovalCondition::InRetreat])
    }

    pub fn devastated(&self) -> Vec<&EntityOutcome> {
        self.with_conditions(&[RemovalCondition::Devastated])
    }

    pub fn captured(&self) -> Vec<&EntityOutcome> {
        self.with_conditions(&[RemovalCondition::Captured])
    }

    pub fn survivors(&self) -> &[EntityOutcome] {
        &self.survivors
    }

    /// Survivors belonging to one team
    pub fn survivors_of(&self, team: TeamId) -> impl Iterator<Item = &EntityOutcome> {
        self.survivors.iter().filter(move |e| e.team == Some(team))
    }
}
