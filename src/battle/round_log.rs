//! Round-scoped memory of a formation
//!
//! Records who engaged whom this round, which targets were attacked and
//! whether the formation suffered a high-stress episode. The END phase clears
//! it; anything left over into the next round is stale.

use serde::{Deserialize, Serialize};

use crate::battle::engagement::EngagementControl;
use crate::core::types::FormationId;

/// Side of an engagement-control roll this formation was on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementRole {
    Attacker,
    Defender,
}

/// Outcome of one engagement-control roll, from this formation's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementRecord {
    pub opponent: FormationId,
    pub role: EngagementRole,
    pub control: EngagementControl,
    pub won_engagement_control: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    engagements: Vec<EngagementRecord>,
    targets_attacked: Vec<FormationId>,
    high_stress_episode: bool,
}

impl RoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_engagement(&mut self, record: EngagementRecord) {
        self.engagements.push(record);
    }

    pub fn engagements(&self) -> &[EngagementRecord] {
        &self.engagements
    }

    pub fn last_engagement(&self) -> Option<&EngagementRecord> {
        self.engagements.last()
    }

    pub fn record_attack(&mut self, target: FormationId) {
        if !self.targets_attacked.contains(&target) {
            self.targets_attacked.push(target);
        }
    }

    /// Distinct formations attacked this round
    pub fn targets_attacked(&self) -> &[FormationId] {
        &self.targets_attacked
    }

    /// Distinct targets if `target` were attacked too
    pub fn distinct_targets_with(&self, target: FormationId) -> usize {
        if self.targets_attacked.contains(&target) {
            self.targets_attacked.len()
        } else {
            self.targets_attacked.len() + 1
        }
    }

    pub fn note_high_stress_episode(&mut self) {
        self.high_stress_episode = true;
    }

    pub fn had_high_stress_episode(&self) -> bool {
        self.high_stress_episode
    }

    pub fn is_empty(&self) -> bool {
        self.engagements.is_empty() && self.targets_attacked.is_empty() && !self.high_stress_episode
    }

    pub fn clear(&mut self) {
        self.engagements.clear();
        self.targets_attacked.clear();
        self.high_stress_episode = false;
    }
}
