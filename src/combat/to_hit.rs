//! To-hit computation
//!
//! A to-hit value is a base rating plus an ordered list of named modifiers.
//! Two sentinels exist, automatic failure and impossible; both fail without
//! consuming a die roll. A roll succeeds when it meets or beats the target.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    CRIPPLED_WITHDRAW_MODIFIER, LONG_RANGE_MODIFIER, MAX_SKILL, MAX_TARGETS_PER_ROUND,
    MEDIUM_RANGE_MODIFIER, MIN_SKILL, SECOND_TARGET_MODIFIER, SHORT_RANGE_MODIFIER,
};
use crate::battle::engagement::EngagementControl;
use crate::battle::morale::MoraleStatus;
use crate::battle::units::{Formation, RangeBand, Unit};
use crate::core::dice::Dice;

/// One named adjustment to a to-hit value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToHitModifier {
    pub value: i32,
    pub reason: String,
}

/// Resolved target number or a failing sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToHitValue {
    Target(i32),
    AutomaticFail,
    Impossible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Sentinel {
    AutomaticFail,
    Impossible,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToHitData {
    base: i32,
    base_reason: String,
    modifiers: Vec<ToHitModifier>,
    sentinel: Option<(Sentinel, String)>,
}

/// Result of rolling against a to-hit value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollOutcome {
    /// None when the roll was short-circuited by a sentinel
    pub roll: Option<i32>,
    pub success: bool,
}

impl RollOutcome {
    /// Roll minus target number; None when no roll was made
    pub fn margin(&self, to_hit: &ToHitData) -> Option<i32> {
        match (self.roll, to_hit.target()) {
            (Some(roll), Some(target)) => Some(roll - target),
            _ => None,
        }
    }
}

impl ToHitData {
    pub fn new(base: i32, reason: &str) -> Self {
        Self {
            base,
            base_reason: reason.to_string(),
            modifiers: Vec::new(),
            sentinel: None,
        }
    }

    /// Add a modifier; ignored once a sentinel is set
    pub fn add(&mut self, value: i32, reason: &str) {
        if self.sentinel.is_some() {
            return;
        }
        self.modifiers.push(ToHitModifier {
            value,
            reason: reason.to_string(),
        });
    }

    pub fn automatic_fail(&mut self, reason: &str) {
        if self.sentinel.is_none() {
            self.sentinel = Some((Sentinel::AutomaticFail, reason.to_string()));
        }
    }

    pub fn impossible(&mut self, reason: &str) {
        if self.sentinel.is_none() {
            self.sentinel = Some((Sentinel::Impossible, reason.to_string()));
        }
    }

    pub fn value(&self) -> ToHitValue {
        match &self.sentinel {
            Some((Sentinel::AutomaticFail, _)) => ToHitValue::AutomaticFail,
            Some((Sentinel::Impossible, _)) => ToHitValue::Impossible,
            None => ToHitValue::Target(self.base + self.modifiers.iter().map(|m| m.value).sum::<i32>()),
        }
    }

    /// Target number, None for either sentinel
    pub fn target(&self) -> Option<i32> {
        match self.value() {
            ToHitValue::Target(value) => Some(value),
            _ => None,
        }
    }

    pub fn cannot_succeed(&self) -> bool {
        self.sentinel.is_some()
    }

    pub fn modifiers(&self) -> &[ToHitModifier] {
        &self.modifiers
    }

    /// Human-readable breakdown for the battle report
    pub fn describe(&self) -> String {
        if let Some((sentinel, reason)) = &self.sentinel {
            return match sentinel {
                Sentinel::AutomaticFail => format!("automatic failure ({})", reason),
                Sentinel::Impossible => format!("impossible ({})", reason),
            };
        }

        let mut text = format!("{} ({})", self.base, self.base_reason);
        for modifier in &self.modifiers {
            text.push_str(&format!(" {:+} ({})", modifier.value, modifier.reason));
        }
        if let Some(target) = self.target() {
            text.push_str(&format!(" = {}", target));
        }
        text
    }

    /// Roll 2d6 against this value. Sentinels fail without touching the dice.
    pub fn roll(&self, dice: &mut dyn Dice) -> RollOutcome {
        match self.target() {
            Some(target) => {
                let roll = dice.roll_2d6();
                RollOutcome {
                    roll: Some(roll),
                    success: roll >= target,
                }
            }
            None => RollOutcome {
                roll: None,
                success: false,
            },
        }
    }
}

/// Inverted veterancy scale: green crews pay, legendary crews gain.
///
/// Returns None for ratings outside the table.
pub fn skill_modifier(skill: i32) -> Option<(i32, &'static str)> {
    let entry = match skill {
        7 => (4, "wet behind the ears"),
        6 => (3, "really green"),
        5 => (2, "green"),
        4 => (1, "regular"),
        3 => (0, "veteran"),
        2 => (-1, "elite"),
        1 => (-2, "heroic"),
        0 => (-3, "legendary"),
        _ => return None,
    };
    Some(entry)
}

fn range_modifier(range: RangeBand) -> Option<(i32, &'static str)> {
    match range {
        RangeBand::Short => Some((SHORT_RANGE_MODIFIER, "short range")),
        RangeBand::Medium => Some((MEDIUM_RANGE_MODIFIER, "medium range")),
        RangeBand::Long => Some((LONG_RANGE_MODIFIER, "long range")),
        RangeBand::Extreme => None,
    }
}

fn add_skill(to_hit: &mut ToHitData, skill: i32) {
    match skill_modifier(skill) {
        Some((value, reason)) => to_hit.add(value, reason),
        None => to_hit.impossible(&format!("unrecognized skill level {}", skill)),
    }
}

/// To-hit for one unit of `attacker` firing on `target_unit` of `target`
pub fn attack_to_hit(
    attacker: &Formation,
    unit: &Unit,
    target: &Formation,
    target_unit: &Unit,
    range: RangeBand,
) -> ToHitData {
    let mut to_hit = ToHitData::new(attacker.skill, "skill");

    if !(MIN_SKILL..=MAX_SKILL).contains(&attacker.skill) {
        to_hit.impossible(&format!("unrecognized skill level {}", attacker.skill));
        return to_hit;
    }

    match range_modifier(range) {
        Some((value, reason)) => to_hit.add(value, reason),
        None => {
            to_hit.impossible("target at extreme range");
            return to_hit;
        }
    }

    let movement = target_unit.effective_movement_modifier();
    if movement != 0 {
        to_hit.add(movement, "target movement");
    }

    if target_unit.jump && target.engagement_control == EngagementControl::Evade {
        to_hit.add(1, "target jumping");
    }

    let morale = target.morale.as_target_modifier();
    if morale != 0 {
        to_hit.add(morale, &format!("target {}", target.morale));
    }

    let targets = attacker.round_log.distinct_targets_with(target.id);
    if targets > MAX_TARGETS_PER_ROUND {
        to_hit.impossible("too many targets this round");
        return to_hit;
    }
    if targets == MAX_TARGETS_PER_ROUND {
        to_hit.add(SECOND_TARGET_MODIFIER, "secondary target");
    }

    if unit.targeting_crits > 0 {
        to_hit.add(unit.targeting_crits, "targeting damage");
    }

    to_hit
}

/// To-hit for `actor` to impose `control` on `opponent`.
///
/// The defender's side of the roll uses the same function with roles swapped.
pub fn engagement_to_hit(
    actor: &Formation,
    opponent: &Formation,
    control: EngagementControl,
) -> ToHitData {
    let mut to_hit = ToHitData::new(actor.tactics, "tactics");

    add_skill(&mut to_hit, actor.skill);

    let morale = actor.morale.own_check_modifier();
    if morale != 0 {
        to_hit.add(morale, &format!("{} morale", actor.morale));
    }

    let control_modifier = control.roll_modifier(actor.average_size(), opponent.average_size());
    if control_modifier != 0 {
        to_hit.add(control_modifier, &format!("{}", control));
    }

    let crits: i32 = actor.combat_capable_units().map(|u| u.targeting_crits).sum();
    if crits > 0 {
        to_hit.add(crits, "targeting damage");
    }

    to_hit
}

/// Nerve target number shared by morale checks and recovering nerve
pub fn nerve_to_hit(formation: &Formation) -> ToHitData {
    let mut to_hit = ToHitData::new(formation.skill, "skill");

    if !(MIN_SKILL..=MAX_SKILL).contains(&formation.skill) {
        to_hit.impossible(&format!("unrecognized skill level {}", formation.skill));
        return to_hit;
    }

    let morale = formation.morale.own_check_modifier();
    if morale != 0 {
        to_hit.add(morale, &format!("{} morale", formation.morale));
    }

    to_hit
}

/// Tactics-based withdrawal to-hit (reported alongside the fixed withdrawal roll)
pub fn withdraw_to_hit(formation: &Formation) -> ToHitData {
    let mut to_hit = ToHitData::new(formation.tactics, "tactics");

    if formation.morale == MoraleStatus::Routed {
        to_hit.automatic_fail("formation is routed");
        return to_hit;
    }

    add_skill(&mut to_hit, formation.skill);

    if formation.is_crippled() {
        to_hit.add(CRIPPLED_WITHDRAW_MODIFIER, "crippled");
    }

    to_hit
}
