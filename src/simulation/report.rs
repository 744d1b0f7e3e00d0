//! Human-readable battle narrative
//!
//! Expected abnormal conditions (stale actions, missing formations,
//! impossible rolls) end up here as report lines instead of errors.

use serde::{Deserialize, Serialize};

use crate::core::types::Round;
use crate::simulation::phase::Phase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    Deployment,
    Initiative,
    Engagement,
    Attack,
    Damage,
    Morale,
    Withdrawal,
    Destruction,
    Victory,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    pub round: Round,
    pub phase: Phase,
    pub kind: ReportKind,
    pub text: String,
}

/// Report sink owned by one battle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleLog {
    pub lines: Vec<ReportLine>,
}

impl BattleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, round: Round, phase: Phase, kind: ReportKind, text: String) {
        self.lines.push(ReportLine {
            round,
            phase,
            kind,
            text,
        });
    }

    pub fn of_kind(&self, kind: ReportKind) -> impl Iterator<Item = &ReportLine> {
        self.lines.iter().filter(move |l| l.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
