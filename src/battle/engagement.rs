//! Engagement control: the tactical posture a formation takes toward its target
//!
//! Each round a formation picks a target among eligible enemies and samples
//! an engagement control from a weight table keyed by its morale. The table
//! is part of the configuration so alternate rule sets can be swapped in.

use serde::{Deserialize, Serialize};

use crate::battle::morale::MoraleStatus;
use crate::battle::units::{Formation, RangeBand};
use crate::core::dice::{shuffle, weighted_pick, Dice};
use crate::core::types::FormationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EngagementControl {
    #[default]
    None,
    Standard,
    Evade,
    Overrun,
    ForcedEngagement,
}

impl EngagementControl {
    pub const ALL: [EngagementControl; 5] = [
        EngagementControl::None,
        EngagementControl::Standard,
        EngagementControl::Evade,
        EngagementControl::Overrun,
        EngagementControl::ForcedEngagement,
    ];

    /// Range band attacks are resolved at under this control
    pub fn attack_range(self) -> RangeBand {
        match self {
            EngagementControl::ForcedEngagement | EngagementControl::Overrun => RangeBand::Short,
            EngagementControl::Standard | EngagementControl::None => RangeBand::Medium,
            EngagementControl::Evade => RangeBand::Long,
        }
    }

    /// Modifier on the engagement-control roll for a formation of `own_size`
    /// facing one of `opponent_size`
    pub fn roll_modifier(self, own_size: i32, opponent_size: i32) -> i32 {
        match self {
            EngagementControl::None | EngagementControl::Standard => 0,
            EngagementControl::Evade => -1,
            EngagementControl::Overrun => opponent_size - own_size,
            EngagementControl::ForcedEngagement => 1,
        }
    }

    /// Damage actually delivered under this control
    pub fn adjust_damage(self, damage: i32, attacker_size: i32, target_size: i32) -> i32 {
        match self {
            EngagementControl::Overrun if attacker_size > target_size => damage + 1,
            EngagementControl::Evade => damage / 2,
            _ => damage,
        }
    }
}

impl std::fmt::Display for EngagementControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngagementControl::None => "none",
            EngagementControl::Standard => "standard",
            EngagementControl::Evade => "evade",
            EngagementControl::Overrun => "overrun",
            EngagementControl::ForcedEngagement => "forced engagement",
        };
        f.write_str(name)
    }
}

/// Selection weight of every engagement control for one morale state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementWeights {
    #[serde(default)]
    pub none: u32,
    #[serde(default)]
    pub standard: u32,
    #[serde(default)]
    pub evade: u32,
    #[serde(default)]
    pub overrun: u32,
    #[serde(default)]
    pub forced_engagement: u32,
}

impl EngagementWeights {
    pub fn weight(&self, control: EngagementControl) -> u32 {
        match control {
            EngagementControl::None => self.none,
            EngagementControl::Standard => self.standard,
            EngagementControl::Evade => self.evade,
            EngagementControl::Overrun => self.overrun,
            EngagementControl::ForcedEngagement => self.forced_engagement,
        }
    }

    pub fn total(&self) -> u32 {
        EngagementControl::ALL.iter().map(|c| self.weight(*c)).sum()
    }
}

/// Engagement-control weights per morale state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementTable {
    pub normal: EngagementWeights,
    pub unsteady: EngagementWeights,
    pub shaken: EngagementWeights,
    pub broken: EngagementWeights,
    pub routed: EngagementWeights,
}

impl Default for EngagementTable {
    fn default() -> Self {
        Self {
            normal: EngagementWeights {
                none: 5,
                standard: 100,
                evade: 0,
                overrun: 40,
                forced_engagement: 100,
            },
            unsteady: EngagementWeights {
                none: 10,
                standard: 100,
                evade: 20,
                overrun: 20,
                forced_engagement: 50,
            },
            shaken: EngagementWeights {
                none: 20,
                standard: 60,
                evade: 60,
                overrun: 0,
                forced_engagement: 10,
            },
            broken: EngagementWeights {
                none: 50,
                standard: 20,
                evade: 100,
                overrun: 0,
                forced_engagement: 0,
            },
            routed: EngagementWeights {
                none: 100,
                ..EngagementWeights::default()
            },
        }
    }
}

impl EngagementTable {
    pub fn for_morale(&self, morale: MoraleStatus) -> &EngagementWeights {
        match morale {
            MoraleStatus::Normal => &self.normal,
            MoraleStatus::Unsteady => &self.unsteady,
            MoraleStatus::Shaken => &self.shaken,
            MoraleStatus::Broken => &self.broken,
            MoraleStatus::Routed => &self.routed,
        }
    }

    /// Every morale state has at least one option with weight
    pub fn validate(&self) -> Result<(), String> {
        for morale in MoraleStatus::ALL {
            if self.for_morale(morale).total() == 0 {
                return Err(format!("engagement weights for {} morale are all zero", morale));
            }
        }
        Ok(())
    }
}

/// Options the formation may roll, after pruning by its own capability.
///
/// Forced engagement is dropped when the formation hits hardest at long
/// range; overrun is dropped when its short-range damage is below
/// `min_overrun_damage`. Zero-weight options are never returned.
pub fn available_controls(
    formation: &Formation,
    table: &EngagementTable,
    min_overrun_damage: i32,
) -> Vec<(EngagementControl, u32)> {
    let weights = table.for_morale(formation.morale);
    let favors_long_range = formation.favors_long_range();
    let short_damage = formation.std_damage().short;

    EngagementControl::ALL
        .iter()
        .copied()
        .filter(|c| !(favors_long_range && *c == EngagementControl::ForcedEngagement))
        .filter(|c| !(short_damage < min_overrun_damage && *c == EngagementControl::Overrun))
        .map(|c| (c, weights.weight(c)))
        .filter(|(_, w)| *w > 0)
        .collect()
}

/// Weighted pick of the engagement control for this round
pub fn choose_engagement_control(
    formation: &Formation,
    table: &EngagementTable,
    min_overrun_damage: i32,
    dice: &mut dyn Dice,
) -> EngagementControl {
    let options = available_controls(formation, table, min_overrun_damage);
    let weights: Vec<u32> = options.iter().map(|(_, w)| *w).collect();

    match weighted_pick(dice, &weights) {
        Some(idx) => options[idx].0,
        None => {
            tracing::warn!(
                formation = %formation.name,
                morale = %formation.morale,
                "No engagement control option available, defaulting to none"
            );
            EngagementControl::None
        }
    }
}

/// Whether `candidate` can be targeted by `actor` (team check excluded)
pub fn is_eligible_target(actor: &Formation, candidate: &Formation) -> bool {
    candidate.id != actor.id
        && candidate.deployed
        && candidate.medium == actor.medium
        && candidate.has_combat_capable_units()
}

/// Uniformly random target among the eligible enemies
pub fn select_target(mut eligible: Vec<FormationId>, dice: &mut dyn Dice) -> Option<FormationId> {
    shuffle(dice, &mut eligible);
    eligible.first().copied()
}
