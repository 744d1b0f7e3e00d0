//! Auto-resolution integration tests

use acar::actions::{Action, AttackAction};
use acar::battle::*;
use acar::core::types::{PlayerId, TeamId};
use acar::core::{AutoResolveConfig, FixedDice};
use acar::scenario::Scenario;
use acar::simulation::phases::{EndPhase, VictoryPhase};
use acar::simulation::*;

fn two_team_context(script: Vec<i32>) -> BattleContext {
    let mut ctx = BattleContext::new(AutoResolveConfig::default(), Box::new(FixedDice::new(script)));
    ctx.add_player(Player::new(PlayerId(1), "Blue", TeamId(1)));
    ctx.add_player(Player::new(PlayerId(2), "Red", TeamId(2)));
    ctx
}

fn lance(name: &str, owner: u32, armor: i32) -> Formation {
    let mut formation = Formation::new(name, PlayerId(owner)).with_unit(
        Unit::new("Lance", armor, DamageVector::new(6, 6, 2))
            .with_entity(Entity::mek(&format!("{} Mek", name), 20, 10))
            .with_entity(Entity::tank(&format!("{} Tank", name), 12, 4)),
    );
    formation.deployed = true;
    formation
}

#[test]
fn test_demo_battle_accounts_for_every_entity() {
    let scenario = Scenario::demo();
    let entities: usize = scenario
        .formations
        .iter()
        .flat_map(|f| &f.units)
        .map(|u| u.entities.len())
        .sum();

    for seed in 0..5 {
        let event = run_scenario(&scenario, &AutoResolveConfig::default(), seed).unwrap();

        assert!(event.rounds >= 1);
        assert!(event.rounds <= AutoResolveConfig::default().max_rounds);
        assert_eq!(event.removed.len() + event.survivors.len(), entities);
        assert!(event.removed.iter().all(|e| e.condition.is_some()));

        let categorized = event.graveyard().len()
            + event.retreated().len()
            + event.devastated().len()
            + event.captured().len();
        assert_eq!(categorized, event.removed.len());

        assert!(event.report.iter().any(|l| l.kind == ReportKind::Victory));
        assert!(event.survivors().iter().all(|s| s.team.is_some()));
        if event.is_controlled() {
            assert!(!event.hit_round_cap);
        }
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let scenario = Scenario::demo();
    let config = AutoResolveConfig::default();

    let a = run_scenario(&scenario, &config, 2024).unwrap();
    let b = run_scenario(&scenario, &config, 2024).unwrap();

    assert_eq!(a.rounds, b.rounds);
    assert_eq!(a.controlling_team, b.controlling_team);
    assert_eq!(a.report, b.report);
}

#[test]
fn test_heavy_hit_triggers_morale_check_at_end_of_round() {
    // unit pick, attack roll 8 vs 6, crit roll, then the End phase morale roll
    let mut ctx = two_team_context(vec![0, 8, 2, 2]);
    let mut blue = lance("Blue", 1, 10);
    let red = lance("Red", 2, 10);
    blue.engagement_control = EngagementControl::Standard;
    blue.target = Some(red.id);
    let attack = AttackAction {
        attacker: blue.id,
        unit: blue.units[0].id,
        target: red.id,
    };
    let red_id = red.id;
    ctx.add_formation(blue);
    ctx.add_formation(red);

    ctx.phase = Phase::Movement;
    ctx.enqueue(Action::Attack(attack));
    ctx.process_actions();

    let red = ctx.formation(red_id).unwrap();
    assert_eq!(red.units[0].current_armor, 4);
    assert!(red.round_log.had_high_stress_episode());

    ctx.phase = Phase::End;
    EndPhase.execute(&mut ctx);

    let red = ctx.formation(red_id).unwrap();
    assert_eq!(red.morale, MoraleStatus::Unsteady);
    assert!(!red.round_log.had_high_stress_episode());
    assert!(ctx.log.of_kind(ReportKind::Morale).count() >= 1);
}

#[test]
fn test_routed_formations_retreat_or_are_captured() {
    // First routed formation rolls 11 and withdraws, the second rolls 10 and
    // stays, then its morale check rolls 2 and it remains routed
    let mut ctx = two_team_context(vec![11, 10, 2]);
    ctx.add_formation(lance("Blue", 1, 20));
    let mut escaping = lance("Escaping", 2, 20);
    escaping.morale = MoraleStatus::Routed;
    let mut trapped = lance("Trapped", 2, 20);
    trapped.morale = MoraleStatus::Routed;
    ctx.add_formation(escaping);
    ctx.add_formation(trapped);

    ctx.phase = Phase::End;
    EndPhase.execute(&mut ctx);
    assert_eq!(ctx.withdrawn.len(), 1);

    ctx.phase = Phase::Victory;
    VictoryPhase.execute(&mut ctx);
    let event = ctx.outcome.take().unwrap();

    assert_eq!(event.controlling_team, Some(TeamId(1)));
    let retreated: Vec<&str> = event.retreated().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(retreated, vec!["Escaping Mek", "Escaping Tank"]);
    let captured: Vec<&str> = event.captured().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(captured, vec!["Trapped Mek", "Trapped Tank"]);
    assert_eq!(event.survivors_of(TeamId(1)).count(), 2);
}

#[test]
fn test_mutual_standoff_hits_round_cap() {
    // Pacifist tables: nobody ever engages
    let passive = EngagementWeights {
        none: 1,
        standard: 0,
        evade: 0,
        overrun: 0,
        forced_engagement: 0,
    };
    let config = AutoResolveConfig {
        max_rounds: 4,
        engagement_weights: EngagementTable {
            normal: passive,
            unsteady: passive,
            shaken: passive,
            broken: passive,
            routed: passive,
        },
        ..AutoResolveConfig::default()
    };

    let event = run_scenario(&Scenario::demo(), &config, 9).unwrap();

    assert_eq!(event.rounds, 4);
    assert!(event.hit_round_cap);
    assert!(!event.is_controlled());
    assert!(event.removed.is_empty());
}

#[test]
fn test_batch_summary_over_demo() {
    let summary = run_batch(&Scenario::demo(), &AutoResolveConfig::default(), 1, 16).unwrap();

    assert_eq!(summary.battles, 16);
    let decided: usize = summary.wins.values().sum();
    assert_eq!(decided + summary.uncontrolled, 16);
    let rates: f64 = summary.wins.keys().map(|t| summary.win_rate(*t)).sum();
    assert!(rates <= 1.0 + 1e-9);
}
