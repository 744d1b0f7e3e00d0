//! Standard attack: one unit fires on a random capable unit of the bound target

use tracing::trace;

use crate::actions::{Action, ActionHandler, AttackAction};
use crate::battle::constants::{DAMAGE_CRIT_ROLL, MOBILITY_CRIT_ROLL, TARGETING_CRIT_ROLL};
use crate::battle::engagement::EngagementControl;
use crate::core::types::UnitId;
use crate::combat::to_hit::attack_to_hit;
use crate::simulation::context::BattleContext;
use crate::simulation::phase::Phase;
use crate::simulation::report::ReportKind;

/// Unit critical from the aggregate crit table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCritical {
    Targeting,
    Damage,
    Mobility,
}

impl UnitCritical {
    /// 2d6 crit table: 8-9 targeting, 10-11 damage, 12 mobility
    pub fn from_roll(roll: i32) -> Option<Self> {
        if roll >= MOBILITY_CRIT_ROLL {
            Some(UnitCritical::Mobility)
        } else if roll >= DAMAGE_CRIT_ROLL {
            Some(UnitCritical::Damage)
        } else if roll >= TARGETING_CRIT_ROLL {
            Some(UnitCritical::Targeting)
        } else {
            None
        }
    }
}

pub(crate) fn is_legal(action: &AttackAction, ctx: &BattleContext) -> bool {
    let (Some(attacker), Some(target)) = (ctx.formation(action.attacker), ctx.formation(action.target))
    else {
        return false;
    };

    attacker.deployed
        && attacker.engagement_control != EngagementControl::None
        && attacker.target == Some(action.target)
        && attacker
            .get_unit(action.unit)
            .is_some_and(|u| u.is_combat_capable())
        && target.deployed
        && target.has_combat_capable_units()
}

pub struct AttackHandler {
    action: AttackAction,
    phase: Phase,
    finished: bool,
}

impl AttackHandler {
    pub fn new(action: AttackAction, phase: Phase) -> Self {
        Self {
            action,
            phase,
            finished: false,
        }
    }
}

impl ActionHandler for AttackHandler {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn is_finished(&self) -> bool {
        self.finished
    }

    fn handle(&mut self, ctx: &mut BattleContext) {
        if Action::Attack(self.action).is_legal(ctx) {
            resolve(&self.action, ctx);
        } else {
            trace!(action = ?self.action, "attack no longer legal");
        }
        self.finished = true;
    }
}

fn resolve(action: &AttackAction, ctx: &mut BattleContext) {
    let (Some(ai), Some(ti)) = (
        ctx.formation_index(action.attacker),
        ctx.formation_index(action.target),
    ) else {
        return;
    };

    let candidates: Vec<UnitId> = ctx.formations[ti]
        .combat_capable_units()
        .map(|u| u.id)
        .collect();
    if candidates.is_empty() {
        return;
    }
    let target_unit_id = candidates[ctx.dice.below(candidates.len() as u32) as usize];

    let attacker = &ctx.formations[ai];
    let target = &ctx.formations[ti];
    let (Some(unit), Some(target_unit)) = (attacker.get_unit(action.unit), target.get_unit(target_unit_id))
    else {
        return;
    };

    let control = attacker.engagement_control;
    let range = control.attack_range();
    let to_hit = attack_to_hit(attacker, unit, target, target_unit, range);
    let damage = control.adjust_damage(unit.current_damage(range), unit.size, target_unit.size);
    let description = format!(
        "{} ({}) attacks {} ({}) at {:?} range, to-hit {}",
        unit.name,
        attacker.name,
        target_unit.name,
        target.name,
        range,
        to_hit.describe()
    );

    let outcome = to_hit.roll(ctx.dice.as_mut());
    ctx.formations[ai].round_log.record_attack(action.target);

    match outcome.roll {
        Some(roll) if outcome.success => {
            ctx.report(ReportKind::Attack, format!("{}: rolled {}, hit for {}", description, roll, damage));
            apply_attack_damage(ctx, ti, target_unit_id, damage);
        }
        Some(roll) => ctx.report(ReportKind::Attack, format!("{}: rolled {}, miss", description, roll)),
        None => ctx.report(ReportKind::Attack, format!("{}: no roll", description)),
    }
}

/// Reduce the target unit's armor, flag high stress and roll for criticals
fn apply_attack_damage(ctx: &mut BattleContext, ti: usize, unit_id: UnitId, damage: i32) {
    let stress_fraction = ctx.config.high_stress_armor_fraction;
    let target = &mut ctx.formations[ti];
    let was_crippled = target.is_crippled();

    let Some(unit) = target.get_unit_mut(unit_id) else {
        return;
    };
    let before = unit.current_armor;
    let lost = unit.take_armor_damage(damage);
    let below_half = unit.current_armor * 2 < unit.armor;
    let unit_name = unit.name.clone();
    let after = unit.current_armor;

    let became_crippled = !was_crippled && target.is_crippled();
    let heavy_loss = lost > 0 && lost as f32 >= before as f32 * stress_fraction;
    let high_stress = heavy_loss || became_crippled;
    if high_stress {
        target.round_log.note_high_stress_episode();
    }
    let target_name = target.name.clone();

    ctx.report(
        ReportKind::Damage,
        format!("{} armor {} -> {}", unit_name, before, after),
    );
    if high_stress {
        ctx.report(
            ReportKind::Morale,
            format!("{} suffers a high-stress episode", target_name),
        );
    }

    if lost == 0 || !below_half {
        return;
    }

    let roll = ctx.dice.roll_2d6();
    let Some(critical) = UnitCritical::from_roll(roll) else {
        return;
    };
    if let Some(unit) = ctx.formations[ti].get_unit_mut(unit_id) {
        match critical {
            UnitCritical::Targeting => unit.targeting_crits += 1,
            UnitCritical::Damage => unit.damage_crits += 1,
            UnitCritical::Mobility => unit.mp_crits += 1,
        }
    }
    ctx.report(
        ReportKind::Damage,
        format!("{} suffers a {:?} critical (rolled {})", unit_name, critical, roll),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::{context, formation};
    use crate::battle::morale::MoraleStatus;
    use crate::battle::units::DamageVector;

    fn engaged_pair(script: Vec<i32>) -> (BattleContext, AttackAction) {
        let mut ctx = context(script);
        let mut attacker = formation(1, 10, DamageVector::new(6, 6, 2));
        let target = formation(2, 10, DamageVector::new(2, 2, 2));
        attacker.engagement_control = EngagementControl::Standard;
        attacker.target = Some(target.id);
        let action = AttackAction {
            attacker: attacker.id,
            unit: attacker.units[0].id,
            target: target.id,
        };
        ctx.add_formation(attacker);
        ctx.add_formation(target);
        ctx.phase = Phase::Movement;
        (ctx, action)
    }

    #[test]
    fn test_crit_table() {
        assert_eq!(UnitCritical::from_roll(7), None);
        assert_eq!(UnitCritical::from_roll(8), Some(UnitCritical::Targeting));
        assert_eq!(UnitCritical::from_roll(11), Some(UnitCritical::Damage));
        assert_eq!(UnitCritical::from_roll(12), Some(UnitCritical::Mobility));
    }

    #[test]
    fn test_heavy_hit_flags_high_stress() {
        // unit pick 0, attack roll 8 vs 6, crit roll 2
        let (mut ctx, action) = engaged_pair(vec![0, 8, 2]);
        ctx.formations[0].morale = MoraleStatus::Shaken;

        ctx.enqueue(Action::Attack(action));
        ctx.process_actions();

        let target = ctx.formation(action.target).unwrap();
        assert_eq!(target.units[0].current_armor, 4);
        assert!(target.round_log.had_high_stress_episode());
        assert_eq!(target.units[0].total_crits(), 0);
        let attacker = ctx.formation(action.attacker).unwrap();
        assert_eq!(attacker.round_log.targets_attacked(), &[action.target]);
    }

    #[test]
    fn test_miss_leaves_armor() {
        let (mut ctx, action) = engaged_pair(vec![0, 5]);

        ctx.enqueue(Action::Attack(action));
        ctx.process_actions();

        let target = ctx.formation(action.target).unwrap();
        assert_eq!(target.units[0].current_armor, 10);
        assert!(!target.round_log.had_high_stress_episode());
    }

    #[test]
    fn test_below_half_rolls_critical() {
        let (mut ctx, action) = engaged_pair(vec![0, 8, 12]);

        ctx.enqueue(Action::Attack(action));
        ctx.process_actions();

        let target = ctx.formation(action.target).unwrap();
        assert_eq!(target.units[0].mp_crits, 1);
    }

    #[test]
    fn test_unbound_attacker_is_illegal() {
        let (mut ctx, action) = engaged_pair(vec![0, 12]);
        ctx.formations[0].target = None;

        ctx.enqueue(Action::Attack(action));
        ctx.process_actions();

        assert_eq!(ctx.formation(action.target).unwrap().units[0].current_armor, 10);
        assert!(ctx.actions.is_empty());
    }
}
