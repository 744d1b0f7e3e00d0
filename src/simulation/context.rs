//! Battle context: everything one auto-resolved battle owns
//!
//! The context is exclusively owned by its run. Formations in `formations`
//! are the active roster; formations that withdraw are moved to `withdrawn`
//! so their entities still show up in the outcome.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actions::{handler_for, Action, ActionHandler};
use crate::battle::engagement::is_eligible_target;
use crate::battle::units::Formation;
use crate::core::config::AutoResolveConfig;
use crate::core::dice::Dice;
use crate::core::types::{FormationId, PlayerId, Round, TeamId};
use crate::simulation::outcome::AutoResolveConcludedEvent;
use crate::simulation::phase::Phase;
use crate::simulation::report::{BattleLog, ReportKind};

/// A side's commander; owns formations, fights for a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub team: TeamId,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, team: TeamId) -> Self {
        Self {
            id,
            name: name.to_string(),
            team,
        }
    }
}

pub struct BattleContext {
    pub config: AutoResolveConfig,
    pub phase: Phase,
    pub round: Round,
    pub players: Vec<Player>,
    player_teams: AHashMap<PlayerId, TeamId>,

    /// Active roster
    pub formations: Vec<Formation>,
    /// Formations that left the field in good order
    pub withdrawn: Vec<Formation>,

    /// Remaining turns of the current Movement phase
    pub turn_order: VecDeque<FormationId>,
    /// Last initiative results, best first
    pub initiative: Vec<(TeamId, i32)>,
    /// Deployed formations per player, recomputed each Initiative phase
    pub formation_counts: BTreeMap<PlayerId, usize>,

    pub actions: VecDeque<Box<dyn ActionHandler>>,
    pub log: BattleLog,
    pub dice: Box<dyn Dice>,
    pub outcome: Option<AutoResolveConcludedEvent>,
}

impl BattleContext {
    pub fn new(config: AutoResolveConfig, dice: Box<dyn Dice>) -> Self {
        Self {
            config,
            phase: Phase::Deployment,
            round: 0,
            players: Vec::new(),
            player_teams: AHashMap::new(),
            formations: Vec::new(),
            withdrawn: Vec::new(),
            turn_order: VecDeque::new(),
            initiative: Vec::new(),
            formation_counts: BTreeMap::new(),
            actions: VecDeque::new(),
            log: BattleLog::new(),
            dice,
            outcome: None,
        }
    }

    pub fn add_player(&mut self, player: Player) {
        self.player_teams.insert(player.id, player.team);
        self.players.push(player);
    }

    pub fn add_formation(&mut self, formation: Formation) {
        self.formations.push(formation);
    }

    pub fn team_of(&self, player: PlayerId) -> Option<TeamId> {
        self.player_teams.get(&player).copied()
    }

    /// Every team with at least one player, in id order
    pub fn teams(&self) -> BTreeSet<TeamId> {
        self.players.iter().map(|p| p.team).collect()
    }

    pub fn formation_index(&self, id: FormationId) -> Option<usize> {
        self.formations.iter().position(|f| f.id == id)
    }

    pub fn formation(&self, id: FormationId) -> Option<&Formation> {
        self.formations.iter().find(|f| f.id == id)
    }

    pub fn formation_mut(&mut self, id: FormationId) -> Option<&mut Formation> {
        self.formations.iter_mut().find(|f| f.id == id)
    }

    pub fn formation_team(&self, id: FormationId) -> Option<TeamId> {
        self.formation(id).and_then(|f| self.team_of(f.owner))
    }

    pub fn are_enemies(&self, a: FormationId, b: FormationId) -> bool {
        match (self.formation_team(a), self.formation_team(b)) {
            (Some(x), Some(y)) => x != y,
            _ => false,
        }
    }

    /// Enemy formations `id` could engage right now, in roster order
    pub fn enemies_of(&self, id: FormationId) -> Vec<FormationId> {
        let Some(actor) = self.formation(id) else {
            return Vec::new();
        };
        self.formations
            .iter()
            .filter(|f| self.are_enemies(id, f.id) && is_eligible_target(actor, f))
            .map(|f| f.id)
            .collect()
    }

    /// Teams that still have a surviving formation in the roster
    pub fn teams_with_survivors(&self) -> BTreeSet<TeamId> {
        self.formations
            .iter()
            .filter(|f| f.is_surviving())
            .filter_map(|f| self.team_of(f.owner))
            .collect()
    }

    /// Move a formation out of the roster. Returns false if it was not there.
    pub fn withdraw_formation(&mut self, id: FormationId) -> bool {
        let Some(idx) = self.formation_index(id) else {
            return false;
        };
        let mut formation = self.formations.remove(idx);
        formation.deployed = false;
        formation.reset_round_state();
        self.turn_order.retain(|f| *f != id);
        self.withdrawn.push(formation);
        true
    }

    pub fn all_formations(&self) -> impl Iterator<Item = &Formation> {
        self.formations.iter().chain(self.withdrawn.iter())
    }

    pub fn dice(&mut self) -> &mut dyn Dice {
        self.dice.as_mut()
    }

    /// Queue an action for the current phase
    pub fn enqueue(&mut self, action: Action) {
        let handler = handler_for(action, self.phase);
        self.actions.push_back(handler);
    }

    /// Run every queued handler that cares about the current phase.
    ///
    /// Actions enqueued while processing run in the same pass. Handlers that
    /// did not finish stay queued.
    pub fn process_actions(&mut self) {
        let mut pending = std::mem::take(&mut self.actions);
        let mut deferred = VecDeque::new();

        while let Some(mut handler) = pending.pop_front() {
            if handler.cares(self) {
                handler.handle(self);
            }
            if !handler.is_finished() {
                deferred.push_back(handler);
            }
            pending.extend(self.actions.drain(..));
        }

        self.actions = deferred;
    }

    /// Append a report line and mirror it to the trace log
    pub fn report(&mut self, kind: ReportKind, text: String) {
        debug!(round = self.round, phase = %self.phase, "{}", text);
        self.log.push(self.round, self.phase, kind, text);
    }
}

impl std::fmt::Debug for BattleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleContext")
            .field("phase", &self.phase)
            .field("round", &self.round)
            .field("formations", &self.formations.len())
            .field("withdrawn", &self.withdrawn.len())
            .field("queued_actions", &self.actions.len())
            .finish()
    }
}
